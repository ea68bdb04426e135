//! # highlight-pipeline
//!
//! A staged acquisition pipeline for sports highlight clips. One run
//! performs three stages in order, each handing off to the next through a
//! durable object store record rather than in-process state:
//!
//! 1. **fetch-highlights** — query the highlight API and persist the raw
//!    metadata payload.
//! 2. **download-clip** — read the metadata record, download the first
//!    highlight's clip, persist it.
//! 3. **submit-transcode** — submit a transcode job referencing the
//!    stored clip.
//!
//! Each stage runs under a bounded retry policy; the orchestrator only
//! advances once the just-written record is visible in the store, and a
//! terminal stage failure halts the run without touching later stages.
//! Records are written to deterministic keys, so a full re-run after a
//! failure overwrites rather than duplicates.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc
)]

pub mod config;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod stages;
pub mod store;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{
        ApiConfig, HighlightQuery, PipelineConfig, StorageConfig, TranscodeConfig,
    };
    pub use crate::errors::{ConfigError, PipelineError, StageError};
    pub use crate::models::{Highlight, HighlightList, JobHandle, TranscodeProfile};
    pub use crate::pipeline::{Pipeline, PipelineBuilder, RetryPolicy, RunReport, Settle};
    pub use crate::services::{
        HighlightApi, HttpMediaFetcher, MediaConvertClient, MediaFetcher, RapidApiClient,
        TranscodeSubmitter,
    };
    pub use crate::stages::{
        DownloadClipStage, FetchHighlightsStage, Stage, SubmitTranscodeStage,
    };
    pub use crate::store::{
        HandoffStore, MemoryHandoffStore, S3HandoffStore, StoreError, MEDIA_KEY, METADATA_KEY,
    };
}
