//! Metadata resolver
//!
//! External collaborator translating a media ref into display metadata.
//! The queue engine never touches this; only the HTTP boundary consumes
//! it, and lookup failures degrade to "Unknown" on the client side.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Display metadata for a single video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub duration: String,
}

/// One entry of a resolved playlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistVideo {
    #[serde(rename = "videoId")]
    pub media_ref: String,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// A resolved playlist listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistMetadata {
    pub videos: Vec<PlaylistVideo>,
}

/// Lookup service for display titles and durations.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn video(&self, media_ref: &str) -> Result<VideoMetadata>;
    async fn playlist(&self, playlist_ref: &str) -> Result<PlaylistMetadata>;
}

/// Resolver backed by an external catalog HTTP API.
pub struct CatalogResolver {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{path}", self.base_url);
        debug!("catalog lookup: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("catalog request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Upstream(format!(
                "catalog returned {} for {path}",
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::Upstream(format!("catalog response malformed: {e}")))
    }
}

#[async_trait]
impl MetadataResolver for CatalogResolver {
    async fn video(&self, media_ref: &str) -> Result<VideoMetadata> {
        self.get_json(&format!("video/{media_ref}")).await
    }

    async fn playlist(&self, playlist_ref: &str) -> Result<PlaylistMetadata> {
        self.get_json(&format!("playlist/{playlist_ref}")).await
    }
}
