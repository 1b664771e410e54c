//! # PokeAPI Catalog
//!
//! `CatalogService` over HTTP. Two request shapes are used:
//!
//! - `GET {base}/pokemon?limit={n}` -> `{ "results": [{ "name", "url" }, ...] }`
//! - `GET {entry url}` -> `{ "sprites": { "front_default": "<image>" } }`

use async_trait::async_trait;
use serde::Deserialize;

use super::{CatalogEntry, CatalogService, NameIndex};
use crate::config::DraftConfig;
use crate::error::{DraftError, Result};

#[derive(Debug, Deserialize)]
struct ListingResponse {
    results: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    sprites: Sprites,
}

#[derive(Debug, Deserialize)]
struct Sprites {
    front_default: Option<String>,
}

/// Build the name index from a listing response body
pub fn parse_listing(body: &str) -> Result<NameIndex> {
    let listing: ListingResponse = serde_json::from_str(body)
        .map_err(|e| DraftError::catalog(format!("Malformed listing: {}", e)))?;
    Ok(NameIndex::new(listing.results))
}

/// Extract the default front image from an entry detail body
pub fn parse_image_reference(body: &str) -> Result<String> {
    let detail: DetailResponse = serde_json::from_str(body)
        .map_err(|e| DraftError::catalog(format!("Malformed entry detail: {}", e)))?;
    detail
        .sprites
        .front_default
        .ok_or_else(|| DraftError::catalog("Entry has no front_default sprite"))
}

/// HTTP catalog client
pub struct PokeApiCatalog {
    client: reqwest::Client,
    index_url: String,
}

impl PokeApiCatalog {
    pub fn new(config: &DraftConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("pokedraft/0.1")
            .timeout(config.timeout())
            .build()
            .map_err(|e| DraftError::catalog(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            index_url: config.index_url(),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DraftError::catalog(format!("GET {} returned {}", url, status)));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl CatalogService for PokeApiCatalog {
    #[tracing::instrument(skip(self), fields(url = %self.index_url))]
    async fn fetch_index(&self) -> Result<NameIndex> {
        let body = self.get_text(&self.index_url).await?;
        let index = parse_listing(&body)?;
        tracing::debug!("Catalog listing returned {} entries", index.len());
        Ok(index)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_image_reference(&self, reference: &str) -> Result<String> {
        let body = self.get_text(reference).await?;
        parse_image_reference(&body)
    }
}
