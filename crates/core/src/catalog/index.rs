//! # Name Index
//!
//! Every catalog entry name in catalog order, with the reference used
//! to fetch its detail.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{DraftError, Result};

/// One entry of the catalog listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    /// Lookup reference (URL) for the entry detail
    pub url: String,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// The name index
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    entries: Vec<CatalogEntry>,
    by_name: HashMap<String, usize>,
}

impl NameIndex {
    /// Build an index, keeping the first entry for a repeated name
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut by_name = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            by_name.entry(entry.name.clone()).or_insert(idx);
        }
        Self { entries, by_name }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Names containing `query`, case-insensitive, in index order
    pub fn matches(&self, query: &str) -> Vec<String> {
        let query_lower = query.to_lowercase();
        self.names()
            .filter(|name| name.to_lowercase().contains(&query_lower))
            .map(str::to_string)
            .collect()
    }

    /// Lookup reference for an exact (case-sensitive) name
    pub fn resolve(&self, name: &str) -> Result<&str> {
        self.by_name
            .get(name)
            .map(|&idx| self.entries[idx].url.as_str())
            .ok_or_else(|| DraftError::not_found(name))
    }
}

impl FromIterator<CatalogEntry> for NameIndex {
    fn from_iter<I: IntoIterator<Item = CatalogEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
