use serde::Serialize;
use std::cmp::Ordering;
use std::path::PathBuf;

/// Merge precedence of an input file: lower sorts first and wins.
///
/// `rank` is the export period (days since CE of the month embedded in the
/// file name) or the modification time in unix seconds, depending on the
/// configured precedence. Equal ranks fall back to the file name, compared
/// byte-wise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceOrder {
    pub rank: i64,
    pub file_name: String,
}

impl Ord for SourceOrder {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.file_name.as_bytes().cmp(other.file_name.as_bytes()))
    }
}

impl PartialOrd for SourceOrder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An attendance export discovered in the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub order: SourceOrder,
}

impl SourceFile {
    pub fn new(path: PathBuf, rank: i64) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            path,
            order: SourceOrder { rank, file_name },
        }
    }

    pub fn file_name(&self) -> &str {
        &self.order.file_name
    }
}
