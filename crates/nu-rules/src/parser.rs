//! User rule text parsing
//!
//! Settings store lists as one comma-separated string that users edit by
//! hand (`"utm_*, fbclid,ref@*.amazon.*"`). Spaces are not significant.

use log::warn;

/// Split comma-separated settings text into entries.
///
/// All spaces are removed first; empty entries are dropped.
pub fn parse_rule_list(text: &str) -> Vec<String> {
    let compact: String = text.chars().filter(|c| *c != ' ').collect();
    let mut entries = Vec::new();
    let mut empty = 0usize;

    for entry in compact.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            empty += 1;
            continue;
        }
        entries.push(entry.to_string());
    }

    // a single empty entry is just an empty string
    if empty > 0 && !entries.is_empty() {
        warn!("dropped {} empty entries from rule list", empty);
    }

    entries
}

/// Join entries back into settings text.
pub fn format_rule_list<S: AsRef<str>>(entries: &[S]) -> String {
    entries
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}
