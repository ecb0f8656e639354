//! Optional suggestion capability for unmapped session labels.
//!
//! The pipeline only sees the [`SessionNameSuggester`] trait. The default
//! [`NoopSuggester`] never proposes anything; [`CommandSuggester`] asks an
//! external LLM command line tool (by default `claude -p <prompt>`) and is
//! bounded by a timeout.

use crate::errors::SuggestError;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const CATEGORY_EXAMPLES: usize = 15;

pub trait SessionNameSuggester {
    /// Whether suggestions should be requested at all.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Propose a canonical name for each unmapped raw label.
    fn suggest_names(
        &self,
        unmapped: &BTreeSet<String>,
        canonical: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, String>, SuggestError>;

    /// Propose a category for each uncategorized session name.
    fn suggest_categories(
        &self,
        uncategorized: &BTreeSet<String>,
        existing: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, SuggestError>;
}

/// Default suggester: disabled, proposes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSuggester;

impl SessionNameSuggester for NoopSuggester {
    fn is_enabled(&self) -> bool {
        false
    }

    fn suggest_names(
        &self,
        _unmapped: &BTreeSet<String>,
        _canonical: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, String>, SuggestError> {
        Ok(BTreeMap::new())
    }

    fn suggest_categories(
        &self,
        _uncategorized: &BTreeSet<String>,
        _existing: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, SuggestError> {
        Ok(BTreeMap::new())
    }
}

/// Suggester backed by an external command: `<command> -p <prompt> --output-format text`.
#[derive(Debug, Clone)]
pub struct CommandSuggester {
    command: String,
    timeout: Duration,
}

impl CommandSuggester {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    fn ask(&self, prompt: &str) -> Result<BTreeMap<String, String>, SuggestError> {
        let args = ["-p", prompt, "--output-format", "text"];
        let stdout = run_with_timeout(&self.command, &args, self.timeout)?;
        parse_json_response(&stdout)
    }
}

impl SessionNameSuggester for CommandSuggester {
    fn suggest_names(
        &self,
        unmapped: &BTreeSet<String>,
        canonical: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, String>, SuggestError> {
        if unmapped.is_empty() {
            return Ok(BTreeMap::new());
        }
        self.ask(&name_prompt(unmapped, canonical))
    }

    fn suggest_categories(
        &self,
        uncategorized: &BTreeSet<String>,
        existing: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, SuggestError> {
        if uncategorized.is_empty() {
            return Ok(BTreeMap::new());
        }
        self.ask(&category_prompt(uncategorized, existing))
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "[]".to_string())
}

pub fn name_prompt(unmapped: &BTreeSet<String>, canonical: &BTreeSet<String>) -> String {
    format!(
        r#"You are helping normalize session names for a triathlon club's attendance tracking system.

Here are the known canonical session names:
{canonical}

The following raw session names from Spond exports don't match any known canonical name.
For each one, suggest the most likely canonical name it should map to.
If a name is genuinely new (not a variant of any existing name), suggest a clean canonical name for it.

Raw session names to map:
{unmapped}

Respond with ONLY a JSON object mapping each raw name to its suggested canonical name. No other text.
Example: {{"STV Swim!": "STV Swim", "New Session Type": "New Session Type"}}"#,
        canonical = to_json(canonical),
        unmapped = to_json(unmapped),
    )
}

pub fn category_prompt(
    uncategorized: &BTreeSet<String>,
    existing: &BTreeMap<String, String>,
) -> String {
    let categories: BTreeSet<&String> = existing.values().collect();
    let examples: BTreeMap<&String, &String> = existing.iter().take(CATEGORY_EXAMPLES).collect();

    format!(
        r#"You are helping categorize session names for a triathlon club's attendance tracking system.

The available categories are:
{categories}

Here are some examples of existing categorizations:
{examples}

Assign a category to each of the following session names.
Use one of the existing categories above. Use "Other" for social events, one-offs, or anything that doesn't fit.

Session names to categorize:
{names}

Respond with ONLY a JSON object mapping each session name to its category. No other text.
Example: {{"STV Swim": "Swim", "Christmas Party": "Other"}}"#,
        categories = to_json(&categories),
        examples = to_json(&examples),
        names = to_json(uncategorized),
    )
}

static FENCED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*\n?(.*?)\n?```").expect("fence regex is valid")
});

static BRACES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("brace regex is valid"));

/// Extract a JSON object of string pairs from a free-form model answer.
///
/// Tries the whole text, then a fenced code block, then the outermost
/// `{ ... }` span.
pub fn parse_json_response(text: &str) -> Result<BTreeMap<String, String>, SuggestError> {
    let text = text.trim();

    let candidates = std::iter::once(text)
        .chain(
            FENCED_RE
                .captures(text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim()),
        )
        .chain(BRACES_RE.find(text).map(|m| m.as_str()));

    for candidate in candidates {
        if let Ok(map) = serde_json::from_str::<BTreeMap<String, String>>(candidate) {
            return Ok(map);
        }
    }

    let preview: String = text.chars().take(500).collect();
    Err(SuggestError::InvalidResponse(preview))
}

/// Run `program args…`, returning stdout, killing the child after `timeout`.
fn run_with_timeout(program: &str, args: &[&str], timeout: Duration) -> Result<String, SuggestError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| SuggestError::Unavailable {
            command: program.to_string(),
            reason: e.to_string(),
        })?;

    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                debug!(program, ?timeout, "suggester timed out; killing it");
                let _ = child.kill();
                let _ = child.wait();
                return Err(SuggestError::Timeout(timeout));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(SuggestError::Failed(e.to_string())),
        }
    };

    let stdout = stdout_reader.map(join_reader).unwrap_or_default();
    let stderr = stderr_reader.map(join_reader).unwrap_or_default();

    if !status.success() {
        return Err(SuggestError::Failed(format!(
            "{program} exited with {status}: {}",
            stderr.trim()
        )));
    }

    debug!(program, bytes = stdout.len(), "suggester answered");
    Ok(stdout)
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        let _ = pipe.read_to_string(&mut buf);
        buf
    })
}

fn join_reader(handle: thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}
