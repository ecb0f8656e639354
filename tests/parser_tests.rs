use spond_attendance::errors::FileError;
use spond_attendance::ingest::header::{clean_label, column_letter, parse_session_date};
use spond_attendance::ingest::parser::is_attended;
use spond_attendance::ingest::{Cell, Sheet, parse_sheet};
use std::path::Path;

mod common;
use common::date;

fn t(s: &str) -> Cell {
    Cell::text(s)
}

fn sample_sheet() -> Sheet {
    Sheet::new(vec![
        vec![t("Name"), t("Email"), t("2024-01-05 18:00:00"), t("Wed, 2024-01-10 07:00")],
        vec![Cell::Empty, Cell::Empty, t("Tri Swim*"), t("Run Club")],
        vec![t("Alice"), t("a@example.com"), Cell::Number(1.0), Cell::Empty],
        vec![t("Bob"), t("b@example.com"), Cell::Empty, t("x")],
        vec![Cell::Empty],
        vec![t("*Attendance is based on RSVP responses")],
    ])
}

#[test]
fn test_parse_sheet_reshapes_wide_to_long() {
    let parsed = parse_sheet(&sample_sheet(), Path::new("jan.xlsx")).expect("parse");

    assert_eq!(parsed.sessions.len(), 2);
    assert_eq!(parsed.sessions[0].raw_label, "Tri Swim");
    assert_eq!(parsed.sessions[0].date, date(2024, 1, 5));
    assert_eq!(parsed.sessions[1].raw_label, "Run Club");
    assert_eq!(parsed.sessions[1].date, date(2024, 1, 10));

    // one record per member and session, column by column
    assert_eq!(parsed.records.len(), 4);
    assert_eq!(parsed.member_count(), 2);

    let summary: Vec<(&str, &str, bool)> = parsed
        .records
        .iter()
        .map(|r| (r.member.as_str(), r.raw_label.as_str(), r.attended))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Alice", "Tri Swim", true),
            ("Bob", "Tri Swim", false),
            ("Alice", "Run Club", false),
            ("Bob", "Run Club", true),
        ]
    );
}

#[test]
fn test_parse_sheet_finds_name_column_by_header() {
    let sheet = Sheet::new(vec![
        vec![t("Group"), t("name"), t("2024-03-02")],
        vec![Cell::Empty, Cell::Empty, t("Brick")],
        vec![t("Adults"), t("Dana"), Cell::Bool(true)],
    ]);

    let parsed = parse_sheet(&sheet, Path::new("mar.xlsx")).expect("parse");
    assert_eq!(parsed.records.len(), 1);
    assert_eq!(parsed.records[0].member, "Dana");
    assert!(parsed.records[0].attended);
}

#[test]
fn test_parse_sheet_accepts_excel_serial_and_duplicate_suffix() {
    let sheet = Sheet::new(vec![
        vec![t("Name"), Cell::Number(45297.75), t("2024-01-06 09:00:00.1")],
        vec![Cell::Empty, t("Swim"), t("Swim")],
        vec![t("Eve"), Cell::Number(1.0), Cell::Number(0.0)],
    ]);

    let parsed = parse_sheet(&sheet, Path::new("jan.xlsx")).expect("parse");
    assert_eq!(parsed.sessions[0].date, date(2024, 1, 6));
    assert_eq!(parsed.sessions[1].date, date(2024, 1, 6));
    assert!(parsed.records[0].attended);
    assert!(!parsed.records[1].attended);
}

#[test]
fn test_parse_sheet_rejects_non_date_header() {
    let sheet = Sheet::new(vec![
        vec![t("Name"), t("2024-01-05"), t("Coach notes")],
        vec![Cell::Empty, t("Swim"), t("Swim")],
        vec![t("Alice"), Cell::Number(1.0), Cell::Empty],
    ]);

    let err = parse_sheet(&sheet, Path::new("bad.xlsx")).unwrap_err();
    match err {
        FileError::MalformedHeader { path, column, .. } => {
            assert_eq!(path, Path::new("bad.xlsx"));
            assert!(column.starts_with('C'), "column was {column}");
            assert!(column.contains("Coach notes"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_parse_sheet_rejects_contradicting_weekday() {
    let sheet = Sheet::new(vec![
        vec![t("Name"), t("Monday 2024-01-05")],
        vec![Cell::Empty, t("Swim")],
        vec![t("Alice"), Cell::Number(1.0)],
    ]);

    let err = parse_sheet(&sheet, Path::new("bad.xlsx")).unwrap_err();
    assert!(matches!(err, FileError::MalformedHeader { .. }));
    assert!(err.to_string().contains("MalformedHeaderError"));
}

#[test]
fn test_parse_sheet_without_sessions_fails() {
    let sheet = Sheet::new(vec![
        vec![t("Name"), t("Email")],
        vec![Cell::Empty, Cell::Empty],
        vec![t("Alice"), t("a@example.com")],
    ]);

    let err = parse_sheet(&sheet, Path::new("empty.xlsx")).unwrap_err();
    assert!(matches!(err, FileError::NoSessionColumns { .. }));
}

#[test]
fn test_parse_sheet_with_no_members_yields_no_records() {
    let sheet = Sheet::new(vec![
        vec![t("Name"), t("2024-01-05")],
        vec![Cell::Empty, t("Swim")],
    ]);

    let parsed = parse_sheet(&sheet, Path::new("jan.xlsx")).expect("parse");
    assert_eq!(parsed.sessions.len(), 1);
    assert!(parsed.records.is_empty());
    assert_eq!(parsed.member_count(), 0);
}

#[test]
fn test_parse_session_date_formats() {
    assert_eq!(parse_session_date(&t("2024-01-05")), Ok(date(2024, 1, 5)));
    assert_eq!(parse_session_date(&t("05/01/2024 18:30")), Ok(date(2024, 1, 5)));
    assert_eq!(parse_session_date(&t("Fri 2024-01-05 18:00")), Ok(date(2024, 1, 5)));
    assert_eq!(parse_session_date(&t("Friday, 2024-01-05")), Ok(date(2024, 1, 5)));

    assert!(parse_session_date(&t("Funday 2024-01-05")).is_err());
    assert!(parse_session_date(&t("tomorrow")).is_err());
    assert!(parse_session_date(&Cell::Empty).is_err());
}

#[test]
fn test_clean_label_and_column_letters() {
    assert_eq!(clean_label(&t("  Tri Swim* ")), "Tri Swim");
    assert_eq!(clean_label(&Cell::Empty), "");

    assert_eq!(column_letter(0), "A");
    assert_eq!(column_letter(25), "Z");
    assert_eq!(column_letter(26), "AA");
    assert_eq!(column_letter(27), "AB");
}

#[test]
fn test_attendance_markers() {
    assert!(is_attended(&Cell::Number(1.0)));
    assert!(is_attended(&t("Yes")));
    assert!(is_attended(&t("✓")));
    assert!(is_attended(&Cell::Bool(true)));

    assert!(!is_attended(&Cell::Number(0.0)));
    assert!(!is_attended(&Cell::Empty));
    assert!(!is_attended(&t("no")));
    assert!(!is_attended(&t("NaN")));
}
