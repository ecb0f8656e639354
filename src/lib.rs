//! spond-attendance library root.
//! Exposes the CLI parser, the high-level `run()` function, and the
//! processing modules (ingest, mapping, merge, export).

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod ingest;
pub mod logging;
pub mod mapping;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::{AppResult, exit_code};

/// Central command dispatcher. Returns the process exit status.
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<i32> {
    match &cli.command {
        Commands::Process { .. } => cli::commands::process::handle(&cli.command, cfg),
        Commands::Status { .. } => {
            cli::commands::status::handle(&cli.command, cfg).map(|_| exit_code::SUCCESS)
        }
        Commands::Reset { .. } => {
            cli::commands::reset::handle(&cli.command, cfg).map(|_| exit_code::SUCCESS)
        }
        Commands::Log { .. } => {
            cli::commands::log::handle(&cli.command, cfg).map(|_| exit_code::SUCCESS)
        }
        Commands::Config { .. } => {
            cli::commands::config::handle(&cli.command, cfg, cli.config.as_deref())
                .map(|_| exit_code::SUCCESS)
        }
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<i32> {
    let cli = Cli::parse();

    // Config is loaded once; its log level only applies when -v is absent.
    let cfg = Config::load(cli.config.as_deref())?;
    logging::setup_logging(&cfg.log_level, cli.verbose);

    dispatch(&cli, &cfg)
}
