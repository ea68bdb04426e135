//! Highlight API client.

use crate::config::{ApiConfig, HighlightQuery};
use crate::errors::StageError;
use async_trait::async_trait;
use bytes::Bytes;

/// Fetches highlight metadata from the remote API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HighlightApi: Send + Sync {
    /// Fetches highlights matching `query` and returns the raw response
    /// body. The caller validates and persists the payload.
    async fn fetch(&self, query: &HighlightQuery) -> Result<Bytes, StageError>;
}

/// RapidAPI-hosted highlight API client.
pub struct RapidApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl RapidApiClient {
    /// Creates a client over a shared HTTP client.
    #[must_use]
    pub fn new(http: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            http,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl HighlightApi for RapidApiClient {
    async fn fetch(&self, query: &HighlightQuery) -> Result<Bytes, StageError> {
        let response = self
            .http
            .get(self.config.endpoint_url())
            .header("X-RapidAPI-Key", &self.config.key)
            .header("X-RapidAPI-Host", &self.config.host)
            .query(query)
            .send()
            .await
            .map_err(|e| StageError::collaborator("highlight API request", e))?
            .error_for_status()
            .map_err(|e| StageError::collaborator("highlight API response", e))?;

        response
            .bytes()
            .await
            .map_err(|e| StageError::collaborator("highlight API body", e))
    }
}
