//! S3-backed handoff store.

use super::{HandoffStore, StoreError};
use crate::config::StorageConfig;
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use bytes::Bytes;
use std::time::Instant;

/// Handoff store backed by an S3 bucket. Objects puts are atomic, which
/// gives the all-or-nothing record visibility the pipeline relies on.
#[derive(Debug, Clone)]
pub struct S3HandoffStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    region: String,
}

impl S3HandoffStore {
    /// Connects a store to the configured bucket, resolving credentials
    /// from the default provider chain.
    pub async fn connect(config: &StorageConfig) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        Self {
            client: aws_sdk_s3::Client::new(&sdk_config),
            bucket: config.bucket.clone(),
            region: config.region.clone(),
        }
    }

    /// Returns the bucket name this store writes to.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl HandoffStore for S3HandoffStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StoreError> {
        let size = data.len();
        let start = Instant::now();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    bucket = %self.bucket,
                    key,
                    size_bytes = size,
                    error = %DisplayErrorContext(&e),
                    "put failed"
                );
                StoreError::backend(DisplayErrorContext(e))
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key,
            size_bytes = size,
            duration_ms = start.elapsed().as_millis() as u64,
            "record written"
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let service = err.into_service_error();
                if service.is_no_such_key() {
                    return Err(StoreError::not_found(key));
                }
                return Err(StoreError::backend(service));
            }
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(StoreError::backend)?
            .into_bytes();

        tracing::debug!(bucket = %self.bucket, key, size_bytes = body.len(), "record read");
        Ok(body)
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let service = err.into_service_error();
                if service.is_not_found() {
                    Ok(false)
                } else {
                    Err(StoreError::backend(service))
                }
            }
        }
    }

    async fn ensure_container(&self) -> Result<(), StoreError> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                tracing::debug!(bucket = %self.bucket, "bucket exists");
                return Ok(());
            }
            Err(err) => {
                let service = err.into_service_error();
                if !service.is_not_found() {
                    return Err(StoreError::backend(service));
                }
            }
        }

        let mut request = self.client.create_bucket().bucket(&self.bucket);
        // us-east-1 rejects an explicit location constraint.
        if self.region != "us-east-1" {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => {
                tracing::info!(bucket = %self.bucket, region = %self.region, "bucket created");
                Ok(())
            }
            Err(err) => {
                let service = err.into_service_error();
                // A concurrent or earlier run creating the same bucket is fine.
                if service.is_bucket_already_owned_by_you() || service.is_bucket_already_exists() {
                    Ok(())
                } else {
                    Err(StoreError::backend(service))
                }
            }
        }
    }
}
