use regex::Regex;
use std::sync::LazyLock;

use super::grammar::PlatformGrammar;

/// A line that opens like a street address: "<digits> <word>"
static DIGIT_LED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s+\w+").expect("digit line pattern is valid"));

/// Lines joined by the address fallback, starting at the digit-led line
const FALLBACK_ADDRESS_LINES: usize = 3;

/// Fields recovered from the panel text of one screenshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFields {
    pub tracker_name: Option<String>,
    pub address: Option<String>,
    /// As matched, before any platform normalization
    pub last_seen: Option<String>,
}

/// Apply a platform grammar to recognized panel text.
///
/// Missing fields are left as `None`; nothing here fails.
pub fn parse_fields(text: &str, grammar: &PlatformGrammar) -> ParsedFields {
    let lines = non_blank_lines(text);

    ParsedFields {
        tracker_name: parse_tracker_name(&lines),
        address: parse_address(text, &lines, grammar),
        last_seen: parse_last_seen(text, grammar),
    }
}

/// Trimmed, non-empty lines in order
fn non_blank_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// The tracker label is the first line of the panel
fn parse_tracker_name(lines: &[&str]) -> Option<String> {
    lines.first().map(|line| line.to_string())
}

/// Grammar match over the whole text, else the digit-led line fallback.
///
/// The fallback joins the digit-led line with up to two following lines.
/// When the address is shorter than that, unrelated trailing lines get
/// joined too; callers review the result before it is stored.
fn parse_address(text: &str, lines: &[&str], grammar: &PlatformGrammar) -> Option<String> {
    if let Some(found) = grammar.address.find(text) {
        return Some(found.as_str().to_string());
    }

    let start = lines.iter().position(|line| DIGIT_LED_LINE.is_match(line))?;
    let end = (start + FALLBACK_ADDRESS_LINES).min(lines.len());
    Some(lines[start..end].join(" "))
}

fn parse_last_seen(text: &str, grammar: &PlatformGrammar) -> Option<String> {
    grammar
        .last_seen
        .find(text)
        .map(|found| found.as_str().to_string())
}
