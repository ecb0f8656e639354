use spond_attendance::core::merge::sort_for_output;
use spond_attendance::core::{Merger, SourceBatch, merge_oldest_wins, summarize};
use spond_attendance::models::{AttendanceRecord, SourceOrder};
use std::collections::BTreeSet;

mod common;
use common::date;

fn source(rank: i64, name: &str) -> SourceOrder {
    SourceOrder {
        rank,
        file_name: name.to_string(),
    }
}

fn rec(src: &SourceOrder, name: &str, session: &str, d: (u32, u32), attended: bool) -> AttendanceRecord {
    AttendanceRecord::new(name, session, date(2024, d.0, d.1), attended, src.clone())
}

fn jan() -> SourceOrder {
    source(738_886, "spond_attendance_jan_24.xlsx")
}

fn feb() -> SourceOrder {
    source(738_917, "spond_attendance_feb_24.xlsx")
}

#[test]
fn test_departed_member_is_preserved() {
    let jan = jan();
    let feb = feb();

    let outcome = merge_oldest_wins(vec![
        SourceBatch {
            source: feb.clone(),
            records: vec![rec(&feb, "Bob", "Tri Swim", (1, 5), true)],
        },
        SourceBatch {
            source: jan.clone(),
            records: vec![
                rec(&jan, "Alice", "Tri Swim", (1, 5), true),
                rec(&jan, "Bob", "Tri Swim", (1, 5), true),
            ],
        },
    ]);

    let alice: Vec<_> = outcome.records.iter().filter(|r| r.name == "Alice").collect();
    assert_eq!(alice.len(), 1);
    assert!(alice[0].attended);
    assert_eq!(alice[0].source, jan);

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.superseded, 1);
    assert!(outcome.conflicts.is_empty());
}

#[test]
fn test_conflict_keeps_oldest_value_and_is_reported() {
    let jan = jan();
    let feb = feb();

    let outcome = merge_oldest_wins(vec![
        SourceBatch {
            source: jan.clone(),
            records: vec![rec(&jan, "Bob", "Run Club", (1, 10), false)],
        },
        SourceBatch {
            source: feb.clone(),
            records: vec![rec(&feb, "Bob", "Run Club", (1, 10), true)],
        },
    ]);

    assert_eq!(outcome.records.len(), 1);
    assert!(!outcome.records[0].attended);
    assert_eq!(outcome.records[0].source, jan);

    assert_eq!(outcome.conflicts.len(), 1);
    let c = &outcome.conflicts[0];
    assert_eq!(c.kept_source, "spond_attendance_jan_24.xlsx");
    assert!(!c.kept_attended);
    assert_eq!(c.dropped_source, "spond_attendance_feb_24.xlsx");
    assert!(c.dropped_attended);
    assert!(c.to_string().contains("Bob / Run Club / 2024-01-10"));
}

#[test]
fn test_equal_rank_breaks_ties_by_file_name() {
    let a = source(100, "a_export.xlsx");
    let b = source(100, "b_export.xlsx");

    let outcome = merge_oldest_wins(vec![
        SourceBatch {
            source: b.clone(),
            records: vec![rec(&b, "Eve", "Swim", (3, 1), true)],
        },
        SourceBatch {
            source: a.clone(),
            records: vec![rec(&a, "Eve", "Swim", (3, 1), false)],
        },
    ]);

    assert_eq!(outcome.records[0].source, a);
    assert!(!outcome.records[0].attended);
}

#[test]
fn test_duplicate_column_in_one_file_keeps_first() {
    let jan = jan();
    let mut merger = Merger::new();
    merger.offer_batch(SourceBatch {
        source: jan.clone(),
        records: vec![
            rec(&jan, "Eve", "Swim", (1, 6), true),
            rec(&jan, "Eve", "Swim", (1, 6), false),
        ],
    });

    assert_eq!(merger.len(), 1);
    let outcome = merger.finish();
    assert!(outcome.records[0].attended);
    assert_eq!(outcome.superseded, 0);
    assert!(outcome.conflicts.is_empty());
}

#[test]
fn test_repeated_column_in_newer_file_reports_one_conflict() {
    let jan = jan();
    let feb = feb();

    let outcome = merge_oldest_wins(vec![
        SourceBatch {
            source: jan.clone(),
            records: vec![rec(&jan, "Eve", "Swim", (1, 6), false)],
        },
        SourceBatch {
            source: feb.clone(),
            records: vec![
                rec(&feb, "Eve", "Swim", (1, 6), true),
                rec(&feb, "Eve", "Swim", (1, 6), true),
            ],
        },
    ]);

    assert_eq!(outcome.records.len(), 1);
    assert!(!outcome.records[0].attended);
    assert_eq!(outcome.superseded, 1);
    assert_eq!(outcome.conflicts.len(), 1);
    assert_eq!(outcome.conflicts[0].dropped_source, "spond_attendance_feb_24.xlsx");
}

#[test]
fn test_merged_keys_are_unique_and_sorted() {
    let jan = jan();
    let feb = feb();

    let outcome = merge_oldest_wins(vec![
        SourceBatch {
            source: jan.clone(),
            records: vec![
                rec(&jan, "Bob", "Run Club", (1, 10), false),
                rec(&jan, "Alice", "Tri Swim", (1, 5), true),
            ],
        },
        SourceBatch {
            source: feb.clone(),
            records: vec![
                rec(&feb, "Carol", "Run Club", (2, 7), true),
                rec(&feb, "Bob", "Run Club", (1, 10), false),
                rec(&feb, "Bob", "Tri Swim", (1, 5), true),
            ],
        },
    ]);

    let keys: BTreeSet<_> = outcome.records.iter().map(|r| r.key()).collect();
    assert_eq!(keys.len(), outcome.records.len());

    let order: Vec<(String, String)> = outcome
        .records
        .iter()
        .map(|r| (r.date_str(), r.name.clone()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("2024-01-05".to_string(), "Alice".to_string()),
            ("2024-01-05".to_string(), "Bob".to_string()),
            ("2024-01-10".to_string(), "Bob".to_string()),
            ("2024-02-07".to_string(), "Carol".to_string()),
        ]
    );
}

#[test]
fn test_empty_merge() {
    let outcome = merge_oldest_wins(Vec::new());
    assert!(outcome.records.is_empty());
    assert!(summarize(&outcome.records).is_empty());
}

#[test]
fn test_summarize_counts_per_session() {
    let jan = jan();
    let mut records = vec![
        rec(&jan, "Bob", "Tri Swim", (1, 5), false),
        rec(&jan, "Alice", "Tri Swim", (1, 5), true),
        rec(&jan, "Alice", "Run Club", (1, 5), true),
        rec(&jan, "Alice", "Run Club", (1, 10), false),
    ];
    sort_for_output(&mut records);

    let summary = summarize(&records);
    let rows: Vec<(String, String, usize, usize)> = summary
        .iter()
        .map(|s| {
            (
                s.session_name.clone(),
                s.session_date.to_string(),
                s.attended_count,
                s.total_count,
            )
        })
        .collect();

    assert_eq!(
        rows,
        vec![
            ("Run Club".to_string(), "2024-01-05".to_string(), 1, 1),
            ("Tri Swim".to_string(), "2024-01-05".to_string(), 1, 2),
            ("Run Club".to_string(), "2024-01-10".to_string(), 0, 1),
        ]
    );
}

#[test]
fn test_record_day_and_flag_encoding() {
    let r = rec(&jan(), "Alice", "Tri Swim", (1, 5), true);
    assert_eq!(r.day_str(), "Friday");
    assert_eq!(r.attended_str(), "1");
    assert_eq!(rec(&jan(), "Alice", "Tri Swim", (1, 10), false).day_str(), "Wednesday");
}
