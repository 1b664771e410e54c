//! In-process catalog and backend for handler and REPL tests.

use async_trait::async_trait;
use pokedraft_core::{
    CatalogEntry, CatalogService, DraftError, DraftSession, NameIndex, PaddedTeam, Result,
    SubmissionService,
};
use std::sync::Arc;

pub const NAMES: &[&str] = &["Bulbasaur", "Charmander", "Squirtle", "Eevee", "Mew"];

pub struct FakeCatalog;

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn fetch_index(&self) -> Result<NameIndex> {
        Ok(NAMES
            .iter()
            .map(|n| CatalogEntry::new(*n, format!("/pokemon/{}", n.to_lowercase())))
            .collect())
    }

    async fn fetch_image_reference(&self, reference: &str) -> Result<String> {
        match reference.strip_prefix("/pokemon/") {
            Some(name) => Ok(format!("/img/{}.png", name)),
            None => Err(DraftError::catalog("unexpected reference")),
        }
    }
}

/// Catalog that never answers
pub struct UnreachableCatalog;

#[async_trait]
impl CatalogService for UnreachableCatalog {
    async fn fetch_index(&self) -> Result<NameIndex> {
        Err(DraftError::catalog("connection refused"))
    }

    async fn fetch_image_reference(&self, _reference: &str) -> Result<String> {
        Err(DraftError::catalog("connection refused"))
    }
}

pub struct AcceptAll;

#[async_trait]
impl SubmissionService for AcceptAll {
    async fn submit(&self, _team: &PaddedTeam) -> Result<()> {
        Ok(())
    }
}

pub fn fake_session() -> DraftSession {
    DraftSession::new(Arc::new(FakeCatalog), Arc::new(AcceptAll))
}

pub fn offline_session() -> DraftSession {
    DraftSession::new(Arc::new(UnreachableCatalog), Arc::new(AcceptAll))
}
