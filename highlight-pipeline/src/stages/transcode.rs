//! Stage 3: submit the stored clip for transcoding.

use super::Stage;
use crate::errors::StageError;
use crate::models::TranscodeProfile;
use crate::services::TranscodeSubmitter;
use crate::store::{HandoffStore, MEDIA_KEY};
use async_trait::async_trait;
use std::sync::Arc;

/// Submits a transcode job referencing the stored clip.
///
/// Verifies the media record is visible before submitting, so a missing
/// upstream artifact surfaces as a failed precondition rather than an
/// opaque service rejection.
pub struct SubmitTranscodeStage {
    submitter: Arc<dyn TranscodeSubmitter>,
    store: Arc<dyn HandoffStore>,
    bucket: String,
    destination_prefix: String,
    profile: TranscodeProfile,
}

impl SubmitTranscodeStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(
        submitter: Arc<dyn TranscodeSubmitter>,
        store: Arc<dyn HandoffStore>,
        bucket: impl Into<String>,
        destination_prefix: impl Into<String>,
        profile: TranscodeProfile,
    ) -> Self {
        Self {
            submitter,
            store,
            bucket: bucket.into(),
            destination_prefix: destination_prefix.into(),
            profile,
        }
    }

    fn input_location(&self) -> String {
        format!("s3://{}/{}", self.bucket, MEDIA_KEY)
    }

    fn output_location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.destination_prefix)
    }
}

#[async_trait]
impl Stage for SubmitTranscodeStage {
    fn name(&self) -> &str {
        "submit-transcode"
    }

    async fn execute(&self) -> Result<(), StageError> {
        if !self.store.exists(MEDIA_KEY).await? {
            return Err(StageError::precondition(format!(
                "media record '{MEDIA_KEY}' is missing"
            )));
        }

        let input = self.input_location();
        let output = self.output_location();
        let handle = self.submitter.submit(&input, &output, &self.profile).await?;

        tracing::info!(job_id = %handle.id, input = %input, output = %output, "transcode job submitted");
        Ok(())
    }
}
