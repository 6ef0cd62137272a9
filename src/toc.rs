//! Table of contents for a document body.
//!
//! Only level-2 and level-3 headings are listed: the article title is rendered
//! separately as the level-1 heading. [`heading_id`] is the one place anchor ids
//! are derived, and the body renderer uses it too, so a ToC link always points
//! at an anchor that exists.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingDescriptor {
    pub level: u8,
    pub text: String,
    pub id: String,
}

/// Scans `body` line by line for `## ` and `### ` headings.
pub fn extract_headings(body: &str) -> Vec<HeadingDescriptor> {
    body.split('\n')
        .filter_map(parse_heading_line)
        .map(|(level, text)| HeadingDescriptor {
            level,
            id: heading_id(text),
            text: text.to_owned(),
        })
        .collect()
}

/// Returns `(level, text)` when `line` is a level-2 or level-3 heading: exactly
/// two or three `#` followed by a space. Level 1 and level 4+ are rejected.
pub fn parse_heading_line(line: &str) -> Option<(u8, &str)> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let marker_len = line.bytes().take_while(|b| *b == b'#').count();
    if !(2..=3).contains(&marker_len) {
        return None;
    }
    let text = line[marker_len..].strip_prefix(' ')?;
    // `marker_len` is 2 or 3.
    Some((marker_len as u8, text))
}

/// Lowercases `text` and collapses every run of characters outside `[a-z0-9]`
/// into a single `-`. Leading and trailing hyphens are kept.
pub fn heading_id(text: &str) -> String {
    let mut id = String::with_capacity(text.len());
    let mut in_gap = false;
    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            id.push(ch);
            in_gap = false;
        } else if !in_gap {
            id.push('-');
            in_gap = true;
        }
    }
    id
}
