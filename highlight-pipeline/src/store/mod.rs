//! Durable handoff storage between pipeline stages.
//!
//! The store is the only state shared across stages: each stage writes its
//! artifact under a deterministic key and the next stage reads it back.
//! Deterministic keys make re-runs overwrite instead of duplicate, which is
//! what makes stage retries safe.

pub mod memory;
pub mod s3;

pub use memory::MemoryHandoffStore;
pub use s3::S3HandoffStore;

use crate::errors::StageError;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Key under which the fetch stage persists the highlight metadata.
pub const METADATA_KEY: &str = "highlights/basketball_highlights.json";

/// Key under which the download stage persists the clip.
pub const MEDIA_KEY: &str = "videos/first_video.mp4";

/// Error from a handoff store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists at the requested key.
    #[error("no record at key '{key}'")]
    NotFound {
        /// The requested key.
        key: String,
    },

    /// The storage backend failed.
    #[error("object store: {message}")]
    Backend {
        /// The backend's error message.
        message: String,
    },
}

impl StoreError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Creates a backend error.
    #[must_use]
    pub fn backend(message: impl std::fmt::Display) -> Self {
        Self::Backend {
            message: message.to_string(),
        }
    }
}

/// A missing record means the upstream stage never committed, which a
/// retry of the reading stage cannot fix; backend failures are transient.
impl From<StoreError> for StageError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { key } => {
                Self::precondition(format!("upstream record '{key}' is missing"))
            }
            StoreError::Backend { message } => Self::collaborator("object store", message),
        }
    }
}

/// Durable keyed storage for handoff records.
///
/// Implementations must make `put` atomic: a record is either fully
/// visible under its key or absent, never partially written.
#[async_trait]
pub trait HandoffStore: Send + Sync {
    /// Writes a record, overwriting any previous content at `key`.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StoreError>;

    /// Reads the record at `key`.
    async fn get(&self, key: &str) -> Result<Bytes, StoreError>;

    /// Returns whether a record is visible at `key`.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Creates the backing container if absent. Idempotent.
    async fn ensure_container(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StageError;

    #[test]
    fn test_not_found_maps_to_precondition() {
        let err = StageError::from(StoreError::not_found(METADATA_KEY));
        assert!(matches!(err, StageError::Precondition { .. }));
        assert!(err.to_string().contains(METADATA_KEY));
    }

    #[test]
    fn test_backend_failure_maps_to_retryable_collaborator() {
        let err = StageError::from(StoreError::backend("timed out"));
        assert!(err.is_retryable());
    }
}
