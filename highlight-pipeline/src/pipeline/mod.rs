//! Pipeline orchestration: per-stage retry and the sequential runner.

pub mod retry;
pub mod runner;

pub use retry::{run_with_retry, RetryPolicy};
pub use runner::{Pipeline, PipelineBuilder, RunReport, RunState, Settle};
