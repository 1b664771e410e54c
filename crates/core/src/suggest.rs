//! # Suggestion Engine
//!
//! Displayed suggestions under the search box. Matching itself lives on
//! [`NameIndex::matches`](crate::catalog::NameIndex::matches); this
//! module owns what is currently shown.

/// The suggestion list container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionList {
    entries: Vec<String>,
}

impl SuggestionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at a 0-based position
    pub fn get(&self, position: usize) -> Option<&str> {
        self.entries.get(position).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace the displayed entries with `matches`.
    ///
    /// Always clears first; an empty query leaves the list empty.
    pub fn render(&mut self, matches: Vec<String>, query: &str) -> &[String] {
        self.clear();
        if query.is_empty() {
            return &self.entries;
        }
        self.entries = matches;
        &self.entries
    }

    /// Pick a displayed entry. Clears the list and returns its text.
    ///
    /// Text that is not a displayed entry is ignored.
    pub fn select(&mut self, clicked: &str) -> Option<String> {
        if !self.entries.iter().any(|e| e == clicked) {
            return None;
        }
        self.clear();
        Some(clicked.to_string())
    }
}
