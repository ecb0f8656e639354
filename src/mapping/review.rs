//! Interactive review of suggested mappings.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, BufRead, Write};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub approved: BTreeMap<String, String>,
    pub skipped: BTreeSet<String>,
}

/// Ask about each suggestion in turn.
///
/// - empty answer → accept
/// - `s` → skip
/// - anything else → use the typed text instead
///
/// End of input stops the review; unanswered suggestions are left out.
pub fn review_suggestions<R: BufRead, W: Write>(
    suggestions: &BTreeMap<String, String>,
    input: &mut R,
    output: &mut W,
) -> io::Result<ReviewOutcome> {
    let mut outcome = ReviewOutcome::default();
    let total = suggestions.len();

    for (i, (raw, suggested)) in suggestions.iter().enumerate() {
        write!(
            output,
            "  ({}/{}) \"{}\" → \"{}\" [Enter=accept, s=skip, or type alternative]: ",
            i + 1,
            total,
            raw,
            suggested
        )?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            writeln!(output)?;
            break;
        }

        let answer = answer.trim();
        if answer.is_empty() {
            outcome.approved.insert(raw.clone(), suggested.clone());
        } else if answer.eq_ignore_ascii_case("s") {
            outcome.skipped.insert(raw.clone());
        } else {
            outcome.approved.insert(raw.clone(), answer.to_string());
        }
    }

    Ok(outcome)
}
