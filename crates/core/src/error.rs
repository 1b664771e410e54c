//! # Draft Errors
//!
//! Every failure a drafting session can report. All of them are
//! recoverable: none leaves `SessionState` half-mutated.

use thiserror::Error;

use crate::team::TEAM_SIZE;

/// Errors raised by the suggestion engine, the team builder and the
/// catalog/submission ports.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// Typed name is not in the name index
    #[error("'{name}' is not in the catalog")]
    NotFound { name: String },

    /// A seventh member was added
    #[error("team already has {capacity} members")]
    CapacityExceeded { capacity: usize },

    /// Finish was requested with no members
    #[error("team has no members")]
    EmptyTeam,

    /// The name index has not been fetched yet
    #[error("name index is not loaded yet")]
    IndexNotReady,

    /// Catalog request failed or returned an unexpected shape
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Submission request failed
    #[error("submission error: {0}")]
    Submission(String),
}

impl DraftError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn capacity_exceeded() -> Self {
        Self::CapacityExceeded {
            capacity: TEAM_SIZE,
        }
    }

    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog(message.into())
    }

    pub fn submission(message: impl Into<String>) -> Self {
        Self::Submission(message.into())
    }

    /// Text of the blocking notification shown to the user.
    pub fn alert(&self) -> String {
        match self {
            Self::NotFound { .. } => "Incorrect Pokemon name, try again".to_string(),
            Self::CapacityExceeded { .. } => "Max six Pokemon in a team!".to_string(),
            Self::EmptyTeam => "Please add at least one Pokemon!".to_string(),
            Self::IndexNotReady => "Pokemon list is still loading, try again".to_string(),
            Self::Catalog(_) => "Could not reach the Pokemon catalog, try again".to_string(),
            Self::Submission(_) => "Could not save the team, try again".to_string(),
        }
    }
}

impl From<reqwest::Error> for DraftError {
    fn from(e: reqwest::Error) -> Self {
        Self::Catalog(e.to_string())
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, DraftError>;
