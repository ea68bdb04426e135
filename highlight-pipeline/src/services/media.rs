//! Clip download client.

use crate::errors::StageError;
use async_trait::async_trait;
use bytes::Bytes;

/// Downloads clip media from a URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Downloads the content at `url`.
    async fn download(&self, url: &str) -> Result<Bytes, StageError>;
}

/// HTTP media downloader.
pub struct HttpMediaFetcher {
    http: reqwest::Client,
}

impl HttpMediaFetcher {
    /// Creates a downloader over a shared HTTP client.
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    async fn download(&self, url: &str) -> Result<Bytes, StageError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StageError::collaborator("clip download request", e))?
            .error_for_status()
            .map_err(|e| StageError::collaborator("clip download response", e))?;

        response
            .bytes()
            .await
            .map_err(|e| StageError::collaborator("clip download body", e))
    }
}
