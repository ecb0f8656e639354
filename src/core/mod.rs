pub mod aggregate;
pub mod merge;
pub mod pipeline;

pub use aggregate::summarize;
pub use merge::{MergeConflict, MergeOutcome, Merger, SourceBatch, merge_oldest_wins};
pub use pipeline::{OutputPaths, Pipeline, RunOptions, RunReport, RunWarning};
