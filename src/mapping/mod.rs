//! Session-name canonicalization and the optional suggestion capability.

pub mod catalog;
pub mod review;
pub mod suggest;

pub use catalog::{Resolution, SKIP_SENTINEL, SessionCatalog, normalize_label};
pub use review::{ReviewOutcome, review_suggestions};
pub use suggest::{CommandSuggester, NoopSuggester, SessionNameSuggester};
