//! Stage 1: fetch highlight metadata and persist it.

use super::Stage;
use crate::config::HighlightQuery;
use crate::errors::StageError;
use crate::models::HighlightList;
use crate::services::HighlightApi;
use crate::store::{HandoffStore, METADATA_KEY};
use async_trait::async_trait;
use std::sync::Arc;

/// Fetches highlight metadata from the API and writes the raw payload to
/// the metadata key.
///
/// The payload is validated to parse as a [`HighlightList`] before it is
/// persisted, but the exact response bytes are what gets stored, so
/// re-runs against an unchanged API response commit an identical record.
pub struct FetchHighlightsStage {
    api: Arc<dyn HighlightApi>,
    store: Arc<dyn HandoffStore>,
    query: HighlightQuery,
}

impl FetchHighlightsStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(
        api: Arc<dyn HighlightApi>,
        store: Arc<dyn HandoffStore>,
        query: HighlightQuery,
    ) -> Self {
        Self { api, store, query }
    }
}

#[async_trait]
impl Stage for FetchHighlightsStage {
    fn name(&self) -> &str {
        "fetch-highlights"
    }

    async fn execute(&self) -> Result<(), StageError> {
        let body = self.api.fetch(&self.query).await?;

        let list: HighlightList = serde_json::from_slice(&body)
            .map_err(|e| StageError::collaborator("highlight API payload", e))?;
        if list.data.is_empty() {
            tracing::warn!(
                date = %self.query.date,
                league = %self.query.league_name,
                "highlight API returned no entries"
            );
        }
        tracing::info!(count = list.data.len(), "fetched highlight metadata");

        self.store.put(METADATA_KEY, body, "application/json").await?;
        Ok(())
    }
}
