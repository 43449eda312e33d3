//! Photo retrieval from resolved media URLs

use std::sync::Arc;

use async_trait::async_trait;

use super::MediaLibrary;
use crate::device::TRANSFER_TIMEOUT;
use crate::error::{CanvasError, Result};

/// Fetches the bytes behind a photo candidate's opaque reference.
#[async_trait]
pub trait PhotoFetcher: Send + Sync {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>>;
}

/// HTTP fetcher that resolves media-source references through the host
/// library before downloading.
///
/// A single bounded attempt, no retry: download failures are very likely
/// non-transient (content removed, permission denied), so they surface as
/// per-photo errors immediately. Retry lives in the upload engine only.
pub struct HttpPhotoFetcher {
    http: reqwest::Client,
    library: Arc<dyn MediaLibrary>,
}

impl HttpPhotoFetcher {
    pub fn new(library: Arc<dyn MediaLibrary>) -> Self {
        Self::with_client(library, reqwest::Client::new())
    }

    pub fn with_client(library: Arc<dyn MediaLibrary>, http: reqwest::Client) -> Self {
        Self { http, library }
    }
}

#[async_trait]
impl PhotoFetcher for HttpPhotoFetcher {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        // A reference may itself be a media-source pointer; resolve it to a
        // transport URL first
        let url = if self.library.is_source_id(reference) {
            self.library.resolve_url(reference).await?
        } else {
            reference.to_string()
        };

        let response = self
            .http
            .get(&url)
            .timeout(TRANSFER_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CanvasError::Media(format!(
                "download failed with status {}",
                response.status()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
