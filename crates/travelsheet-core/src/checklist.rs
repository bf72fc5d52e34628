//! Checklist lines embedded in free-text wish content.
//!
//! The stored record only ever holds flat text. Checklist items are parsed on
//! read and written back by rewriting the single affected line, so any
//! interleaved non-checklist text survives a toggle untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub const OPEN_MARKER: &str = "- [ ]";
pub const DONE_MARKER: &str = "- [x]";
const DONE_MARKER_UPPER: &str = "- [X]";

static ANY_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"- \[[xX ]\]").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub done: bool,
    pub text: String,
}

/// One line of content, annotated for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentLine {
    /// Zero-based line number inside the content.
    pub index: usize,
    pub is_checklist: bool,
    pub done: bool,
    /// Marker-free text for checklist lines; the raw line otherwise.
    pub text: String,
}

fn line_marker(line: &str) -> Option<bool> {
    let trimmed = line.trim_start();
    if trimmed.starts_with(OPEN_MARKER) {
        Some(false)
    } else if trimmed.starts_with(DONE_MARKER) || trimmed.starts_with(DONE_MARKER_UPPER) {
        Some(true)
    } else {
        None
    }
}

fn strip_marker(line: &str) -> String {
    ANY_MARKER.replace(line, "").trim().to_string()
}

/// Extracts the checklist items of `content`, in order.
pub fn parse_checklist(content: &str) -> Vec<ChecklistItem> {
    content
        .lines()
        .filter_map(|line| {
            line_marker(line).map(|done| ChecklistItem {
                done,
                text: strip_marker(line),
            })
        })
        .collect()
}

/// Annotates every line of `content`.
pub fn parse_content_lines(content: &str) -> Vec<ContentLine> {
    if content.is_empty() {
        return Vec::new();
    }
    content
        .split('\n')
        .enumerate()
        .map(|(index, line)| match line_marker(line) {
            Some(done) => ContentLine {
                index,
                is_checklist: true,
                done,
                text: strip_marker(line),
            },
            None => ContentLine {
                index,
                is_checklist: false,
                done: false,
                text: line.to_string(),
            },
        })
        .collect()
}

/// Single-line preview: markers removed, line breaks turned into spaces.
pub fn collapsed_text(content: &str) -> String {
    ANY_MARKER.replace_all(content, "").replace('\n', " ")
}

/// Flips the checklist marker on line `line_index`.
///
/// Returns `None` when that line does not exist or no longer carries a
/// checklist marker; every other line is kept byte-for-byte.
pub fn toggle_checklist_line(content: &str, line_index: usize) -> Option<String> {
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    let target = lines.get(line_index)?;
    let flipped = if line_marker(target)? { OPEN_MARKER } else { DONE_MARKER };
    // Only the leading marker flips; marker-like text later on the line stays.
    let indent = target.len() - target.trim_start().len();
    let mut replaced = String::with_capacity(target.len());
    replaced.push_str(&target[..indent]);
    replaced.push_str(flipped);
    replaced.push_str(&target[indent + OPEN_MARKER.len()..]);
    lines[line_index] = replaced;
    Some(lines.join("\n"))
}

/// Maps the `ordinal`-th checklist item to its line number in `content`.
pub fn checklist_line_index(content: &str, ordinal: usize) -> Option<usize> {
    content
        .split('\n')
        .enumerate()
        .filter(|(_, line)| line_marker(line).is_some())
        .nth(ordinal)
        .map(|(index, _)| index)
}

/// Appends a fresh open checklist line to `content`.
pub fn append_checklist_marker(content: &str) -> String {
    let prefix = format!("{} ", OPEN_MARKER);
    if content.is_empty() {
        prefix
    } else if content.ends_with('\n') {
        format!("{}{}", content, prefix)
    } else {
        format!("{}\n{}", content, prefix)
    }
}
