pub mod config;
pub mod log;
pub mod process;
pub mod reset;
pub mod status;
