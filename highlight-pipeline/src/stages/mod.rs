//! Pipeline stages.
//!
//! A stage is one side-effecting unit of work: it reads its upstream
//! handoff record (if any), calls one collaborator, and commits its own
//! record under a deterministic key. Stages are stateless between
//! invocations so a retry is just a fresh call.

pub mod download;
pub mod fetch;
pub mod transcode;

pub use download::DownloadClipStage;
pub use fetch::FetchHighlightsStage;
pub use transcode::SubmitTranscodeStage;

use crate::errors::StageError;
use async_trait::async_trait;

/// One unit of pipeline work.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Returns the stage name used in logs and error reports.
    fn name(&self) -> &str;

    /// Performs the stage's work. Either the stage's handoff record is
    /// fully committed and `Ok` is returned, or nothing observable
    /// happened and an error describes why.
    async fn execute(&self) -> Result<(), StageError>;
}
