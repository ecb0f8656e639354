//! User-facing progress and result lines.
//!
//! Styled with ANSI colors and icons on a terminal; plain text when the
//! stream is redirected or `NO_COLOR` is set.

use std::env;
use std::fmt;
use std::io::{self, IsTerminal};

/// ANSI colors
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

const FG_BLUE: &str = "\x1b[34m";
const FG_GREEN: &str = "\x1b[32m";
const FG_YELLOW: &str = "\x1b[33m";
const FG_RED: &str = "\x1b[31m";

/// Icons
const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";

#[derive(Clone, Copy)]
enum Stream {
    Out,
    Err,
}

fn styled(stream: Stream) -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    match stream {
        Stream::Out => io::stdout().is_terminal(),
        Stream::Err => io::stderr().is_terminal(),
    }
}

fn line(stream: Stream, color: &str, icon: &str, msg: &dyn fmt::Display) -> String {
    if styled(stream) {
        format!("{color}{BOLD}{icon} {RESET}{msg}")
    } else {
        format!("{icon} {msg}")
    }
}

pub fn info<T: fmt::Display>(msg: T) {
    println!("{}", line(Stream::Out, FG_BLUE, ICON_INFO, &msg));
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{}", line(Stream::Out, FG_GREEN, ICON_OK, &msg));
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{}", line(Stream::Out, FG_YELLOW, ICON_WARN, &msg));
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{}", line(Stream::Err, FG_RED, ICON_ERR, &msg));
}

/// Section header
pub fn header<T: fmt::Display>(msg: T) {
    if styled(Stream::Out) {
        println!("{FG_BLUE}{BOLD}====================== {msg}{RESET}\n");
    } else {
        println!("====================== {msg}\n");
    }
}
