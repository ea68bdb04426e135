//! Stage 2: download the first highlight's clip and persist it.

use super::Stage;
use crate::errors::StageError;
use crate::models::HighlightList;
use crate::services::MediaFetcher;
use crate::store::{HandoffStore, MEDIA_KEY, METADATA_KEY};
use async_trait::async_trait;
use std::sync::Arc;

/// Reads the metadata record, downloads the first highlight's clip, and
/// writes it to the media key.
///
/// The metadata contract is validated before any download happens: a
/// missing record, an empty highlight list, or an absent `url` field all
/// fail the precondition without touching the media collaborator.
pub struct DownloadClipStage {
    fetcher: Arc<dyn MediaFetcher>,
    store: Arc<dyn HandoffStore>,
}

impl DownloadClipStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(fetcher: Arc<dyn MediaFetcher>, store: Arc<dyn HandoffStore>) -> Self {
        Self { fetcher, store }
    }
}

#[async_trait]
impl Stage for DownloadClipStage {
    fn name(&self) -> &str {
        "download-clip"
    }

    async fn execute(&self) -> Result<(), StageError> {
        let raw = self.store.get(METADATA_KEY).await?;
        let list: HighlightList = serde_json::from_slice(&raw).map_err(|e| {
            StageError::precondition(format!("metadata record is not valid highlight JSON: {e}"))
        })?;
        let url = list.first_url()?;

        tracing::info!(url, "downloading clip");
        let clip = self.fetcher.download(url).await?;

        tracing::info!(size_bytes = clip.len(), key = MEDIA_KEY, "storing clip");
        self.store.put(MEDIA_KEY, clip, "video/mp4").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::media::MockMediaFetcher;
    use crate::store::MemoryHandoffStore;
    use bytes::Bytes;

    async fn store_with_metadata(json: &'static str) -> Arc<MemoryHandoffStore> {
        let store = Arc::new(MemoryHandoffStore::new());
        store
            .put(METADATA_KEY, Bytes::from_static(json.as_bytes()), "application/json")
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_downloads_first_url_and_stores_clip() {
        let store =
            store_with_metadata(r#"{"data":[{"url":"https://cdn.example.com/a.mp4"}]}"#).await;
        let mut fetcher = MockMediaFetcher::new();
        fetcher
            .expect_download()
            .withf(|url| url == "https://cdn.example.com/a.mp4")
            .times(1)
            .returning(|_| Ok(Bytes::from_static(b"clip-bytes")));

        let stage = DownloadClipStage::new(Arc::new(fetcher), store.clone());
        stage.execute().await.unwrap();

        assert_eq!(
            store.get(MEDIA_KEY).await.unwrap(),
            Bytes::from_static(b"clip-bytes")
        );
        assert_eq!(store.content_type(MEDIA_KEY).await.as_deref(), Some("video/mp4"));
    }

    #[tokio::test]
    async fn test_missing_metadata_record_fails_before_download() {
        let store = Arc::new(MemoryHandoffStore::new());
        let mut fetcher = MockMediaFetcher::new();
        fetcher.expect_download().times(0);

        let stage = DownloadClipStage::new(Arc::new(fetcher), store);
        assert!(matches!(
            stage.execute().await.unwrap_err(),
            StageError::Precondition { .. }
        ));
    }

    #[tokio::test]
    async fn test_empty_highlight_list_fails_before_download() {
        let store = store_with_metadata(r#"{"data":[]}"#).await;
        let mut fetcher = MockMediaFetcher::new();
        fetcher.expect_download().times(0);

        let stage = DownloadClipStage::new(Arc::new(fetcher), store);
        assert!(matches!(
            stage.execute().await.unwrap_err(),
            StageError::Precondition { .. }
        ));
    }

    #[tokio::test]
    async fn test_malformed_metadata_fails_before_download() {
        let store = store_with_metadata("not json at all").await;
        let mut fetcher = MockMediaFetcher::new();
        fetcher.expect_download().times(0);

        let stage = DownloadClipStage::new(Arc::new(fetcher), store);
        let err = stage.execute().await.unwrap_err();
        assert!(matches!(err, StageError::Precondition { .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_rerun_with_same_store_state_commits_same_clip() {
        let store =
            store_with_metadata(r#"{"data":[{"url":"https://cdn.example.com/a.mp4"}]}"#).await;
        let mut fetcher = MockMediaFetcher::new();
        fetcher
            .expect_download()
            .times(2)
            .returning(|_| Ok(Bytes::from_static(b"clip-bytes")));

        let stage = DownloadClipStage::new(Arc::new(fetcher), store.clone());
        stage.execute().await.unwrap();
        let first = store.get(MEDIA_KEY).await.unwrap();
        stage.execute().await.unwrap();
        let second = store.get(MEDIA_KEY).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.len().await, 2);
    }
}
