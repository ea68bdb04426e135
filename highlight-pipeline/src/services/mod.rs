//! External collaborator clients.
//!
//! Each collaborator is a trait so stages can be tested against mocks;
//! the production implementations are thin reqwest wrappers sharing one
//! HTTP client.

pub mod highlights;
pub mod media;
pub mod transcode;

pub use highlights::{HighlightApi, RapidApiClient};
pub use media::{HttpMediaFetcher, MediaFetcher};
pub use transcode::{MediaConvertClient, TranscodeSubmitter};
