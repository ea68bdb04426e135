//! Typed shapes for the cross-stage handoff records and the transcode
//! submission.
//!
//! The highlight metadata contract is deliberately narrow: the pipeline
//! only ever reads the first entry's `url`. Everything else in the API
//! payload passes through untouched because the raw response bytes are
//! what gets persisted.

use crate::errors::StageError;
use serde::{Deserialize, Serialize};

/// One highlight entry as returned by the highlight API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Highlight {
    /// Direct URL of the clip. Absent in some payloads, which the
    /// downloading stage treats as a failed precondition.
    #[serde(default)]
    pub url: Option<String>,
    /// Human-readable title, when present.
    #[serde(default)]
    pub title: Option<String>,
}

/// The highlight API response envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighlightList {
    /// Ordered highlight entries.
    #[serde(default)]
    pub data: Vec<Highlight>,
}

impl HighlightList {
    /// Returns the URL of the first highlight.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError::Precondition`] when the list is empty or
    /// the first entry carries no `url` field.
    pub fn first_url(&self) -> Result<&str, StageError> {
        let first = self
            .data
            .first()
            .ok_or_else(|| StageError::precondition("highlight list is empty"))?;
        first
            .url
            .as_deref()
            .ok_or_else(|| StageError::precondition("first highlight has no 'url' field"))
    }
}

/// Output profile for a transcode submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeProfile {
    /// Output container, e.g. `MP4`.
    pub container: String,
    /// Video codec identifier, e.g. `H_264`.
    pub video_codec: String,
    /// Video bitrate in bits per second.
    pub video_bitrate: u64,
    /// Audio codec identifier, e.g. `AAC`.
    pub audio_codec: String,
    /// Audio bitrate in bits per second.
    pub audio_bitrate: u64,
    /// Audio sample rate in Hz.
    pub sample_rate: u32,
}

impl Default for TranscodeProfile {
    fn default() -> Self {
        Self {
            container: "MP4".to_string(),
            video_codec: "H_264".to_string(),
            video_bitrate: 5_000_000,
            audio_codec: "AAC".to_string(),
            audio_bitrate: 64_000,
            sample_rate: 48_000,
        }
    }
}

/// Handle of an accepted transcode job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    /// Service-assigned job identifier.
    pub id: String,
}
