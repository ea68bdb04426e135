//! In-memory handoff store for tests and local dry runs.

use super::{HandoffStore, StoreError};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Record {
    data: Bytes,
    content_type: String,
}

/// Handoff store backed by a process-local map.
#[derive(Debug, Clone, Default)]
pub struct MemoryHandoffStore {
    records: Arc<RwLock<HashMap<String, Record>>>,
}

impl MemoryHandoffStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the content type recorded for `key`, if any.
    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.records
            .read()
            .await
            .get(key)
            .map(|r| r.content_type.clone())
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl HandoffStore for MemoryHandoffStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StoreError> {
        self.records.write().await.insert(
            key.to_string(),
            Record {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        self.records
            .read()
            .await
            .get(key)
            .map(|r| r.data.clone())
            .ok_or_else(|| StoreError::not_found(key))
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.records.read().await.contains_key(key))
    }

    async fn ensure_container(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
