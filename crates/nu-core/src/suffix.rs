//! Known multi-label public suffixes (ccSLDs such as `co.uk`)
//!
//! The table is loaded once from newline-delimited text and never mutated
//! afterwards. It is only consulted for two-label suffix candidates, so it
//! does not need the full Public Suffix List rule grammar.
//!
//! # Examples
//!
//! ```
//! use nu_core::suffix::SuffixTable;
//!
//! let table = SuffixTable::from_text("co.uk\ncom.au\n");
//! assert!(table.contains("co.uk"));
//! assert!(!table.contains("example.com"));
//! ```

use std::collections::HashSet;

/// Immutable set of public-suffix-like labels.
#[derive(Debug, Clone, Default)]
pub struct SuffixTable {
    entries: HashSet<String>,
}

impl SuffixTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from newline-delimited text.
    ///
    /// Blank lines and `//` comments are skipped, entries are lowercased.
    pub fn from_text(text: &str) -> Self {
        let entries = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("//"))
            .map(|line| line.trim_end_matches('.').to_ascii_lowercase())
            .collect();
        Self { entries }
    }

    /// Check if a suffix is in the table.
    #[inline]
    pub fn contains(&self, suffix: &str) -> bool {
        self.entries.contains(suffix)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SuffixTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}
