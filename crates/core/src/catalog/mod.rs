//! # Catalog
//!
//! The remote creature catalog and the name index built from it.
//!
//! ## Modules
//!
//! - `index` - Ordered name index with substring matching and exact lookup
//! - `pokeapi` - HTTP client for the PokeAPI-shaped catalog

pub mod index;
pub mod pokeapi;

use async_trait::async_trait;

use crate::error::Result;

pub use index::{CatalogEntry, NameIndex};
pub use pokeapi::PokeApiCatalog;

/// Source of the name index and of per-entry detail.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetch the full name index. Called once per session.
    async fn fetch_index(&self) -> Result<NameIndex>;

    /// Fetch the default front-facing image reference for one entry.
    async fn fetch_image_reference(&self, reference: &str) -> Result<String>;
}
