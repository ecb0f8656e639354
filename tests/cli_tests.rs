use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{Workspace, february_export, january_export, spond};

const JAN: &str = "spond_attendance_jan_24.xlsx";
const FEB: &str = "spond_attendance_feb_24.xlsx";

fn process(ws: &Workspace) -> assert_cmd::Command {
    let mut cmd = spond(ws);
    cmd.args([
        "process",
        &ws.input_str(),
        "-o",
        &ws.output_str(),
        "--as-of",
        "2030-01-01",
    ]);
    cmd
}

#[test]
fn test_process_writes_outputs() {
    let ws = Workspace::new();
    ws.write_input(JAN, &january_export());
    ws.write_input(FEB, &february_export());

    process(&ws)
        .assert()
        .success()
        .stdout(contains("Processed spond_attendance_jan_24.xlsx"))
        .stdout(contains("Processed spond_attendance_feb_24.xlsx"))
        .stdout(contains("Conflicting attendance"));

    assert!(ws.output().join("spond.csv").exists());
    assert!(ws.output().join("session_attendance.csv").exists());
    assert!(ws.output().join(".spond_state.sqlite").exists());
}

#[test]
fn test_run_findings_are_printed_once() {
    let ws = Workspace::new();
    ws.write_input(JAN, &january_export());
    ws.write_input(FEB, &february_export());

    process(&ws)
        .assert()
        .success()
        .stdout(contains("Conflicting attendance").count(1))
        .stderr(contains("attendance conflict").not())
        .stderr(contains("unmapped session label").not());
}

#[test]
fn test_second_run_processes_nothing_new() {
    let ws = Workspace::new();
    ws.write_input(JAN, &january_export());

    process(&ws).assert().success();
    process(&ws)
        .assert()
        .success()
        .stdout(contains("1 export(s) found, 0 new, 1 already processed"));
}

#[test]
fn test_partial_failure_exit_code() {
    let ws = Workspace::new();
    ws.write_input(JAN, &january_export());
    fs::write(ws.input().join(FEB), b"not a workbook").unwrap();

    process(&ws)
        .assert()
        .code(4)
        .stderr(contains("FileReadError").and(contains(FEB)));

    assert!(ws.output().join("spond.csv").exists());
}

#[test]
fn test_no_parsable_files_exit_code() {
    let ws = Workspace::new();
    fs::write(ws.input().join(JAN), b"not a workbook").unwrap();

    process(&ws)
        .assert()
        .code(2)
        .stderr(contains("could be parsed"));
}

#[test]
fn test_empty_input_exit_code() {
    let ws = Workspace::new();
    process(&ws)
        .assert()
        .code(2)
        .stderr(contains("No attendance exports found"));
}

#[test]
fn test_unexpected_workbook_is_rejected() {
    let ws = Workspace::new();
    ws.write_input(JAN, &january_export());
    ws.write_input("attendance.xlsx", &january_export());

    process(&ws)
        .assert()
        .code(1)
        .stderr(contains("Unexpected xlsx file(s)").and(contains("attendance.xlsx")));
}

#[test]
fn test_invalid_as_of_date() {
    let ws = Workspace::new();
    ws.write_input(JAN, &january_export());

    spond(&ws)
        .args(["process", &ws.input_str(), "-o", &ws.output_str(), "--as-of", "01/02/2024"])
        .assert()
        .code(1)
        .stderr(contains("Invalid date"));
}

#[test]
fn test_status_reset_and_log() {
    let ws = Workspace::new();
    ws.write_input(JAN, &january_export());
    process(&ws).assert().success();

    spond(&ws)
        .args(["status", "-o", &ws.output_str()])
        .assert()
        .success()
        .stdout(contains(JAN).and(contains("1 file(s), 4 raw record(s)")));

    spond(&ws)
        .args(["log", "-o", &ws.output_str()])
        .assert()
        .success()
        .stdout(contains("process").and(contains("file_processed")));

    spond(&ws)
        .args(["reset", "-o", &ws.output_str(), "--yes"])
        .assert()
        .success()
        .stdout(contains("Processing state cleared"));

    spond(&ws)
        .args(["status", "-o", &ws.output_str()])
        .assert()
        .success()
        .stdout(contains("No files processed yet"));
}

#[test]
fn test_reset_can_be_declined() {
    let ws = Workspace::new();
    ws.write_input(JAN, &january_export());
    process(&ws).assert().success();

    spond(&ws)
        .args(["reset", "-o", &ws.output_str()])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(contains("Reset cancelled"));

    spond(&ws)
        .args(["status", "-o", &ws.output_str()])
        .assert()
        .success()
        .stdout(contains(JAN));
}

#[test]
fn test_status_before_any_run() {
    let ws = Workspace::new();
    spond(&ws)
        .args(["status", "-o", &ws.output_str()])
        .assert()
        .success()
        .stdout(contains("nothing processed yet"));
}

#[test]
fn test_config_print_defaults() {
    let ws = Workspace::new();
    spond(&ws)
        .args(["config", "--print"])
        .assert()
        .success()
        .stdout(
            contains("detail_file: spond.csv")
                .and(contains("summary_file: session_attendance.csv"))
                .and(contains("built-in defaults")),
        );
}

#[test]
fn test_missing_explicit_config_fails() {
    let ws = Workspace::new();
    let missing = ws.home().join("nope.conf");

    spond(&ws)
        .args(["--config", &missing.to_string_lossy(), "config", "--print"])
        .assert()
        .code(1)
        .stderr(contains("configuration file not found"));
}

#[test]
fn test_config_file_controls_outputs() {
    let ws = Workspace::new();
    ws.write_input(JAN, &january_export());

    let conf = ws.home().join("custom.conf");
    fs::write(
        &conf,
        format!(
            "output_dir: {}\ndetail_file: detail.csv\ndelimiter: '|'\n",
            ws.output_str()
        ),
    )
    .unwrap();

    spond(&ws)
        .args([
            "--config",
            &conf.to_string_lossy(),
            "process",
            &ws.input_str(),
            "--as-of",
            "2030-01-01",
        ])
        .assert()
        .success();

    let detail = ws.read_output("detail.csv");
    assert!(detail.starts_with("name|session_name|session_date|day_of_week|attended\n"));
    assert!(!ws.output().join("spond.csv").exists());
}

#[test]
fn test_default_config_file_in_home_is_used() {
    let ws = Workspace::new();
    ws.write_input(JAN, &january_export());

    let dir = ws.home().join(".spond-attendance");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("spond-attendance.conf"), "summary_file: sessions.csv\n").unwrap();

    process(&ws).assert().success();
    assert!(ws.output().join("sessions.csv").exists());
}

#[test]
fn test_verbose_logs_to_stderr() {
    let ws = Workspace::new();
    ws.write_input(JAN, &january_export());

    spond(&ws)
        .args([
            "-vv",
            "process",
            &ws.input_str(),
            "-o",
            &ws.output_str(),
            "--as-of",
            "2030-01-01",
        ])
        .assert()
        .success()
        .stderr(contains("starting run"));
}
