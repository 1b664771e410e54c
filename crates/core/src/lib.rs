//! # Pokedraft Core
//!
//! Business logic for drafting a team of up to six Pokemon: searching
//! the catalog, confirming members and handing the finished team to a
//! backend.
//!
//! ## Architecture
//!
//! - `catalog/` - Name index, substring matching and the catalog client
//! - `suggest` - Suggestion list shown while typing
//! - `team` - Team builder (capacity, padding) and session state
//! - `session` - Single-writer controller tying it all together
//! - `submission` - Backend that receives finished teams
//! - `events` - Observable side effects for a rendering surface
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pokedraft_core::{DraftConfig, DraftSession};
//!
//! let session = DraftSession::from_config(&DraftConfig::from_env())?;
//! session.start().await?;
//! session.search("bul").await;
//! session.add("bulbasaur").await?;
//! let team = session.finish().await?;
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod session;
pub mod submission;
pub mod suggest;
pub mod team;

pub use catalog::{CatalogEntry, CatalogService, NameIndex, PokeApiCatalog};
pub use config::DraftConfig;
pub use error::{DraftError, Result};
pub use events::{DraftEvent, DraftEventKind};
pub use session::{DraftSession, SessionStatus};
pub use submission::{HttpSubmission, SubmissionService};
pub use suggest::SuggestionList;
pub use team::{PaddedTeam, SessionState, Team, TeamSlot, TEAM_SIZE};
