//! # Draft Events
//!
//! Observable side effects of a drafting session. A surface (terminal,
//! HTTP API, ...) renders these instead of reaching into session state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::team::{PaddedTeam, TeamSlot};

/// Kind of draft event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DraftEventKind {
    /// Name index fetched and ready
    IndexLoaded,
    /// Suggestion list emptied
    SuggestionsCleared,
    /// Suggestion list replaced with new entries
    SuggestionsShown,
    /// A team card was rendered for a newly added slot
    CardRendered,
    /// Blocking user notification
    Alert,
    /// Finished team accepted by the backend
    TeamSubmitted,
    /// Session returned to an empty team after submission
    SessionReset,
}

/// An event in the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: DraftEventKind,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl DraftEvent {
    pub fn new(kind: DraftEventKind) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn index_loaded(entries: usize) -> Self {
        Self::new(DraftEventKind::IndexLoaded).with_data(json!({ "entries": entries }))
    }

    pub fn suggestions_shown(names: &[String]) -> Self {
        Self::new(DraftEventKind::SuggestionsShown).with_data(json!({ "names": names }))
    }

    /// Card for the slot at `position` (0-based)
    pub fn card_rendered(position: usize, slot: &TeamSlot) -> Self {
        Self::new(DraftEventKind::CardRendered).with_data(json!({
            "position": position,
            "name": slot.name,
            "image": slot.image,
        }))
    }

    pub fn alert(message: impl Into<String>) -> Self {
        Self::new(DraftEventKind::Alert).with_data(json!({ "message": message.into() }))
    }

    pub fn team_submitted(team: &PaddedTeam) -> Self {
        Self::new(DraftEventKind::TeamSubmitted).with_data(json!({ "team": team }))
    }

    /// Message carried by an `Alert` event
    pub fn message(&self) -> Option<&str> {
        self.data.as_ref()?.get("message")?.as_str()
    }
}
