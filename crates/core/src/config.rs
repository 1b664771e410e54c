//! # Draft Configuration
//!
//! Where the catalog and the submission backend live, and how long a
//! request may take. Defaults can be overridden from the environment
//! or from a JSON file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CATALOG_URL: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
/// Large enough to cover the whole catalog (~1300 entries).
pub const DEFAULT_INDEX_LIMIT: u32 = 1350;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration for a drafting session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DraftConfig {
    /// Catalog API base URL (without trailing slash)
    pub catalog_url: String,
    /// Number of entries requested when building the name index
    pub index_limit: u32,
    /// Backend that receives finished teams
    pub backend_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            index_limit: DEFAULT_INDEX_LIMIT,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl DraftConfig {
    /// Defaults with `POKEDRAFT_*` environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `POKEDRAFT_*` environment overrides on top of `self`
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("POKEDRAFT_CATALOG_URL") {
            self.catalog_url = url;
        }
        if let Some(url) = lookup("POKEDRAFT_BACKEND_URL") {
            self.backend_url = url;
        }
        self.index_limit = parse_or_keep(&lookup, "POKEDRAFT_INDEX_LIMIT", self.index_limit);
        self.timeout_secs = parse_or_keep(&lookup, "POKEDRAFT_TIMEOUT_SECS", self.timeout_secs);
        self.normalized()
    }

    /// Load from a JSON file; missing fields fall back to defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config.normalized())
    }

    pub fn with_catalog_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_url = url.into();
        self.normalized()
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self.normalized()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// URL of the full catalog listing
    pub fn index_url(&self) -> String {
        format!("{}/pokemon?limit={}", self.catalog_url, self.index_limit)
    }

    /// URL finished teams are posted to
    pub fn submission_url(&self) -> String {
        format!("{}/teams/new", self.backend_url)
    }

    fn normalized(mut self) -> Self {
        self.catalog_url = self.catalog_url.trim_end_matches('/').to_string();
        self.backend_url = self.backend_url.trim_end_matches('/').to_string();
        self
    }
}

fn parse_or_keep<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, current: T) -> T
where
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Invalid {key} value '{raw}': {e}, keeping {current}");
                current
            }
        },
        None => current,
    }
}
