//! # Team Builder
//!
//! The provisional team: up to six confirmed name/image pairs, kept in
//! the order they were added. Finishing pads the team with empty pairs
//! so the backend always receives exactly six slots.

use serde::{Deserialize, Serialize};

use crate::error::{DraftError, Result};

/// Maximum number of members in a team
pub const TEAM_SIZE: usize = 6;

/// One confirmed team member.
///
/// Serialized as a two element array `[name, image]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct TeamSlot {
    pub name: String,
    pub image: String,
}

impl TeamSlot {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
        }
    }

    /// Filler used for unfilled positions on submission
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.image.is_empty()
    }
}

impl From<(String, String)> for TeamSlot {
    fn from((name, image): (String, String)) -> Self {
        Self { name, image }
    }
}

impl From<TeamSlot> for (String, String) {
    fn from(slot: TeamSlot) -> Self {
        (slot.name, slot.image)
    }
}

/// Team under construction. Never holds more than `TEAM_SIZE` slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Team {
    slots: Vec<TeamSlot>,
}

impl Team {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[TeamSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= TEAM_SIZE
    }

    /// Fails with `CapacityExceeded` when the team is full
    pub fn ensure_capacity(&self) -> Result<()> {
        if self.is_full() {
            return Err(DraftError::capacity_exceeded());
        }
        Ok(())
    }

    /// Append a slot, returning its 0-based position.
    ///
    /// A full team is left untouched.
    pub fn add_slot(&mut self, slot: TeamSlot) -> Result<usize> {
        self.ensure_capacity()?;
        self.slots.push(slot);
        Ok(self.slots.len() - 1)
    }

    /// Padded copy of the team ready for submission.
    ///
    /// The team itself is not modified, so a failed submission can be
    /// retried as is.
    pub fn finish(&self) -> Result<PaddedTeam> {
        if self.is_empty() {
            return Err(DraftError::EmptyTeam);
        }
        let mut slots = self.slots.clone();
        slots.resize_with(TEAM_SIZE, TeamSlot::empty);
        Ok(PaddedTeam { slots })
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

/// Exactly `TEAM_SIZE` slots, unfilled positions as `("", "")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TeamSlot>", into = "Vec<TeamSlot>")]
pub struct PaddedTeam {
    slots: Vec<TeamSlot>,
}

impl PaddedTeam {
    pub fn slots(&self) -> &[TeamSlot] {
        &self.slots
    }

    /// Number of non-empty slots
    pub fn members(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }
}

impl TryFrom<Vec<TeamSlot>> for PaddedTeam {
    type Error = String;

    fn try_from(slots: Vec<TeamSlot>) -> std::result::Result<Self, Self::Error> {
        if slots.len() != TEAM_SIZE {
            return Err(format!(
                "expected {} slots, got {}",
                TEAM_SIZE,
                slots.len()
            ));
        }
        Ok(Self { slots })
    }
}

impl From<PaddedTeam> for Vec<TeamSlot> {
    fn from(team: PaddedTeam) -> Self {
        team.slots
    }
}

/// Mutable state of one drafting session.
///
/// The member count is derived from the team, so it always matches the
/// number of successful adds. The write-once name index is held by
/// `DraftSession` next to this state.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub team: Team,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.team.len()
    }
}
