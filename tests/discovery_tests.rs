use regex::Regex;
use spond_attendance::config::{Config, Precedence};
use spond_attendance::errors::AppError;
use spond_attendance::ingest::discovery::parse_file_period;
use spond_attendance::ingest::{discover_files, find_new_files};
use std::collections::BTreeSet;
use std::fs;

mod common;
use common::{Workspace, date, january_export};

fn names(files: &[spond_attendance::models::SourceFile]) -> Vec<&str> {
    files.iter().map(|f| f.file_name()).collect()
}

#[test]
fn test_discover_orders_by_filename_period() {
    let ws = Workspace::new();
    let export = january_export();
    for name in [
        "spond_attendance_feb_24.xlsx",
        "spond_attendance_dec_23.xlsx",
        "spond_attendance_sept_24.xlsx",
        "spond_attendance_jan_24.xlsx",
    ] {
        ws.write_input(name, &export);
    }

    let files = discover_files(&ws.input(), &Config::default()).expect("discover");
    assert_eq!(
        names(&files),
        vec![
            "spond_attendance_dec_23.xlsx",
            "spond_attendance_jan_24.xlsx",
            "spond_attendance_feb_24.xlsx",
            "spond_attendance_sept_24.xlsx",
        ]
    );
}

#[test]
fn test_discover_ignores_lock_files_and_other_extensions() {
    let ws = Workspace::new();
    ws.write_input("spond_attendance_jan_24.xlsx", &january_export());
    fs::write(ws.input().join("~$spond_attendance_jan_24.xlsx"), b"lock").unwrap();
    fs::write(ws.input().join("README.txt"), b"notes").unwrap();

    let files = discover_files(&ws.input(), &Config::default()).expect("discover");
    assert_eq!(names(&files), vec!["spond_attendance_jan_24.xlsx"]);
}

#[test]
fn test_discover_rejects_unexpected_workbooks() {
    let ws = Workspace::new();
    ws.write_input("spond_attendance_jan_24.xlsx", &january_export());
    ws.write_input("attendance copy.xlsx", &january_export());
    ws.write_input("spond_attendance_foo_24.xlsx", &january_export());

    match discover_files(&ws.input(), &Config::default()) {
        Err(AppError::UnexpectedFiles(found)) => {
            assert_eq!(found, vec!["attendance copy.xlsx", "spond_attendance_foo_24.xlsx"]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_discover_missing_directory() {
    let ws = Workspace::new();
    let err = discover_files(&ws.input().join("nope"), &Config::default()).unwrap_err();
    assert!(matches!(err, AppError::InputDir(_)));
}

#[test]
fn test_discover_by_modification_time_is_stable() {
    let ws = Workspace::new();
    ws.write_input("spond_attendance_feb_24.xlsx", &january_export());
    ws.write_input("spond_attendance_jan_24.xlsx", &january_export());

    let cfg = Config {
        precedence: Precedence::Modified,
        ..Config::default()
    };

    let first = discover_files(&ws.input(), &cfg).expect("discover");
    let second = discover_files(&ws.input(), &cfg).expect("discover");
    assert_eq!(first.len(), 2);
    assert_eq!(names(&first), names(&second));
    assert!(first[0].order <= first[1].order);
}

#[test]
fn test_parse_file_period() {
    let re = Regex::new(&Config::default().file_pattern).unwrap();

    assert_eq!(
        parse_file_period("spond_attendance_jan_24.xlsx", &re),
        Some(date(2024, 1, 1))
    );
    assert_eq!(
        parse_file_period("Spond_Attendance_SEPT_23.xlsx", &re),
        Some(date(2023, 9, 1))
    );
    assert_eq!(parse_file_period("spond_attendance_xyz_24.xlsx", &re), None);
    assert_eq!(parse_file_period("spond_attendance_jan_2024.xlsx", &re), None);
}

#[test]
fn test_find_new_files_skips_processed() {
    let ws = Workspace::new();
    ws.write_input("spond_attendance_jan_24.xlsx", &january_export());
    ws.write_input("spond_attendance_feb_24.xlsx", &january_export());

    let files = discover_files(&ws.input(), &Config::default()).expect("discover");

    let processed: BTreeSet<String> = ["spond_attendance_jan_24.xlsx".to_string()].into();
    let pending = find_new_files(&files, &processed);
    assert_eq!(names(&pending), vec!["spond_attendance_feb_24.xlsx"]);

    assert_eq!(find_new_files(&files, &BTreeSet::new()).len(), 2);
}
