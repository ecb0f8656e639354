//! Oldest-wins merge of attendance records across exports.
//!
//! Newer exports drop members who left the club, so the oldest export that
//! mentions a (member, session, date) key is the authoritative one. The merge
//! is a fold over sources in ascending precedence that inserts a record only
//! when its key is still absent.

use crate::models::{AttendanceRecord, RecordKey, SourceOrder};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info};

/// All records read from one source.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub source: SourceOrder,
    pub records: Vec<AttendanceRecord>,
}

/// Same key, different attended flag, in two different sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConflict {
    pub key: RecordKey,
    pub kept_source: String,
    pub kept_attended: bool,
    pub dropped_source: String,
    pub dropped_attended: bool,
}

impl fmt::Display for MergeConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, session, date) = &self.key;
        write!(
            f,
            "{name} / {session} / {date}: kept attended={} from {}, dropped attended={} from {}",
            self.kept_attended, self.kept_source, self.dropped_attended, self.dropped_source
        )
    }
}

#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// Surviving records, in output order.
    pub records: Vec<AttendanceRecord>,
    pub conflicts: Vec<MergeConflict>,
    /// Later duplicates that were discarded (conflicting or not).
    pub superseded: usize,
}

#[derive(Debug, Default)]
pub struct Merger {
    merged: BTreeMap<RecordKey, AttendanceRecord>,
    conflicts: Vec<MergeConflict>,
    superseded: usize,
    /// (key, losing source) pairs already counted, so a later export with
    /// repeated columns is reported once per key.
    dropped: BTreeSet<(RecordKey, SourceOrder)>,
    last_source: Option<SourceOrder>,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one source into the merged set.
    ///
    /// Sources must be offered oldest first; [`merge_oldest_wins`] sorts them.
    pub fn offer_batch(&mut self, batch: SourceBatch) {
        debug_assert!(
            self.last_source.as_ref().is_none_or(|last| *last <= batch.source),
            "sources must be merged in ascending precedence"
        );

        for record in batch.records {
            self.offer(record);
        }
        self.last_source = Some(batch.source);
    }

    /// Insert `record` unless its key is already present.
    pub fn offer(&mut self, record: AttendanceRecord) {
        match self.merged.entry(record.key()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(slot) => {
                let kept = slot.get();

                if kept.source == record.source {
                    debug!(
                        name = %record.name,
                        session = %record.session_name,
                        date = %record.session_date,
                        file = %record.source.file_name,
                        "duplicate session column in one export; keeping the first"
                    );
                    return;
                }

                if !self
                    .dropped
                    .insert((slot.key().clone(), record.source.clone()))
                {
                    debug!(
                        name = %record.name,
                        session = %record.session_name,
                        date = %record.session_date,
                        file = %record.source.file_name,
                        "repeated column in a superseded export"
                    );
                    return;
                }

                self.superseded += 1;

                if kept.attended != record.attended {
                    let conflict = MergeConflict {
                        key: slot.key().clone(),
                        kept_source: kept.source.file_name.clone(),
                        kept_attended: kept.attended,
                        dropped_source: record.source.file_name.clone(),
                        dropped_attended: record.attended,
                    };
                    info!("attendance conflict: {conflict}");
                    self.conflicts.push(conflict);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.merged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }

    pub fn finish(self) -> MergeOutcome {
        let mut records: Vec<AttendanceRecord> = self.merged.into_values().collect();
        sort_for_output(&mut records);

        MergeOutcome {
            records,
            conflicts: self.conflicts,
            superseded: self.superseded,
        }
    }
}

/// Merge any number of sources with oldest-wins precedence.
pub fn merge_oldest_wins(mut batches: Vec<SourceBatch>) -> MergeOutcome {
    batches.sort_by(|a, b| a.source.cmp(&b.source));

    let mut merger = Merger::new();
    for batch in batches {
        merger.offer_batch(batch);
    }
    merger.finish()
}

/// Output order of the detail table: (session_date, name, session_name).
pub fn sort_for_output(records: &mut [AttendanceRecord]) {
    records.sort_by(|a, b| {
        a.session_date
            .cmp(&b.session_date)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.session_name.cmp(&b.session_name))
    });
}
