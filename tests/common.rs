#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::NaiveDate;
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Binary under test, isolated from the user's home and colors.
pub fn spond(ws: &Workspace) -> Command {
    let mut cmd = cargo_bin_cmd!("spond-attendance");
    cmd.env("HOME", ws.home())
        .env("APPDATA", ws.home())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

/// Scratch directories for one test: input exports, outputs and a fake home.
pub struct Workspace {
    root: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create tempdir");
        for sub in ["input", "output", "home"] {
            fs::create_dir_all(root.path().join(sub)).expect("create subdir");
        }
        Self { root }
    }

    pub fn input(&self) -> PathBuf {
        self.root.path().join("input")
    }

    pub fn output(&self) -> PathBuf {
        self.root.path().join("output")
    }

    pub fn home(&self) -> PathBuf {
        self.root.path().join("home")
    }

    pub fn input_str(&self) -> String {
        self.input().to_string_lossy().to_string()
    }

    pub fn output_str(&self) -> String {
        self.output().to_string_lossy().to_string()
    }

    pub fn read_output(&self, name: &str) -> String {
        fs::read_to_string(self.output().join(name)).expect("read output file")
    }

    pub fn write_input(&self, name: &str, export: &Export) {
        export.write(&self.input().join(name));
    }
}

/// One session column of an export: header text and session-name label.
pub struct SessionCol {
    pub header: String,
    pub label: String,
}

pub fn session(header: &str, label: &str) -> SessionCol {
    SessionCol {
        header: header.to_string(),
        label: label.to_string(),
    }
}

/// A wide attendance export, written in the Spond layout:
/// row 0 headers, row 1 session names, member rows, disclaimer footer.
#[derive(Default)]
pub struct Export {
    pub sessions: Vec<SessionCol>,
    pub members: Vec<(String, Vec<bool>)>,
}

impl Export {
    pub fn new(sessions: Vec<SessionCol>) -> Self {
        Self {
            sessions,
            members: Vec::new(),
        }
    }

    pub fn member(mut self, name: &str, marks: &[bool]) -> Self {
        self.members.push((name.to_string(), marks.to_vec()));
        self
    }

    pub fn write(&self, path: &Path) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        sheet.write(0, 0, "Name").expect("write header");

        for (i, s) in self.sessions.iter().enumerate() {
            let col = (i + 1) as u16;
            sheet.write(0, col, s.header.as_str()).expect("write header");
            sheet.write(1, col, s.label.as_str()).expect("write label");
        }

        for (r, (name, marks)) in self.members.iter().enumerate() {
            let row = (r + 2) as u32;
            sheet.write(row, 0, name.as_str()).expect("write member");
            for (i, attended) in marks.iter().enumerate() {
                if *attended {
                    sheet.write(row, (i + 1) as u16, 1.0).expect("write mark");
                }
            }
        }

        let footer = (self.members.len() + 3) as u32;
        sheet
            .write(footer, 0, "*Attendance is based on RSVP responses")
            .expect("write footer");

        workbook.save(path).expect("save workbook");
    }
}

/// January 2024 export: Alice and Bob, "Tri Swim" on the 5th, "Run Club" on the 10th.
pub fn january_export() -> Export {
    Export::new(vec![
        session("2024-01-05 18:00:00", "Tri Swim*"),
        session("2024-01-10 07:00:00", "Run Club"),
    ])
    .member("Alice", &[true, false])
    .member("Bob", &[true, false])
}

/// February 2024 export: Alice has left, Bob's Run Club mark changed, one new session.
pub fn february_export() -> Export {
    Export::new(vec![
        session("2024-01-05 18:00:00", "Tri Swim"),
        session("2024-01-10 07:00:00", "Run Club"),
        session("2024-02-07 19:00:00", "Run Club"),
    ])
    .member("Bob", &[true, true, true])
    .member("Carol", &[false, false, true])
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Data lines of a CSV output (header excluded).
pub fn data_lines(csv: &str) -> Vec<&str> {
    csv.lines().skip(1).collect()
}
