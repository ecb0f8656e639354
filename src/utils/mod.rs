pub mod date;
pub mod excel_date;
pub mod path;
pub mod table;
