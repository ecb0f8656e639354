//! Unified application error types.
//! Run-level failures use `AppError`; problems confined to one input file use
//! `FileError` so the pipeline can isolate them and keep going.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Exit statuses reported by the binary.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const NO_FILES_PARSED: i32 = 2;
    pub const OUTPUT_WRITE: i32 = 3;
    pub const PARTIAL: i32 = 4;
}

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // State database
    // ---------------------------
    #[error("State database error: {0}")]
    Db(#[from] rusqlite::Error),

    // ---------------------------
    // Input discovery
    // ---------------------------
    #[error("{} is not a directory", .0.display())]
    InputDir(PathBuf),

    #[error("No attendance exports found in {}", .0.display())]
    NoInputFiles(PathBuf),

    #[error(
        "Unexpected xlsx file(s) in input directory: {}. Expected format: spond_attendance_{{month}}_{{yy}}.xlsx",
        .0.join(", ")
    )]
    UnexpectedFiles(Vec<String>),

    #[error("None of the {} input file(s) could be parsed:\n{}", .0.len(), describe_failures(.0))]
    NoFilesParsed(Vec<FileError>),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    // ---------------------------
    // Output errors
    // ---------------------------
    #[error("Failed to write {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Export error: {0}")]
    Export(String),
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::NoFilesParsed(_) | AppError::NoInputFiles(_) => exit_code::NO_FILES_PARSED,
            AppError::OutputWrite { .. } | AppError::Export(_) => exit_code::OUTPUT_WRITE,
            _ => exit_code::FAILURE,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Failure confined to a single input file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileError {
    #[error("FileReadError: {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    #[error("MalformedHeaderError: {}: column {column}: {reason}", .path.display())]
    MalformedHeader {
        path: PathBuf,
        column: String,
        reason: String,
    },

    #[error("{}: no session columns found", .path.display())]
    NoSessionColumns { path: PathBuf },
}

impl FileError {
    pub fn path(&self) -> &PathBuf {
        match self {
            FileError::Read { path, .. }
            | FileError::MalformedHeader { path, .. }
            | FileError::NoSessionColumns { path } => path,
        }
    }
}

fn describe_failures(failures: &[FileError]) -> String {
    failures
        .iter()
        .map(|f| format!("  - {f}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Failure of the optional session-name suggester. Never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SuggestError {
    #[error("SuggestionServiceError: could not start '{command}': {reason}")]
    Unavailable { command: String, reason: String },

    #[error("SuggestionServiceError: suggester failed: {0}")]
    Failed(String),

    #[error("SuggestionServiceError: no answer within {0:?}")]
    Timeout(Duration),

    #[error("SuggestionServiceError: could not parse suggestions: {0}")]
    InvalidResponse(String),
}
