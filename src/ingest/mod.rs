//! Reading attendance exports: file discovery, worksheet access, and the
//! wide-to-long reshaping of one export.

pub mod discovery;
pub mod header;
pub mod parser;
pub mod sheet;

pub use discovery::{discover_files, find_new_files};
pub use parser::{ParsedFile, parse_file, parse_sheet};
pub use sheet::{Cell, Sheet};
