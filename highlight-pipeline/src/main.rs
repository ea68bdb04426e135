//! Pipeline entry point.
//!
//! A single invocation with no arguments runs the full three-stage
//! pipeline. Exit status is zero when the run completes and non-zero when
//! it fails; the failing stage and attempt count are in the log output.

use anyhow::Context;
use highlight_pipeline::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Per-request timeout for collaborator HTTP calls. The orchestrator
/// bounds attempts, not wall-clock time, so the client has to.
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = PipelineConfig::from_env().context("loading configuration")?;

    let http = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("building HTTP client")?;

    let store: Arc<dyn HandoffStore> = Arc::new(S3HandoffStore::connect(&config.storage).await);
    store
        .ensure_container()
        .await
        .context("ensuring handoff bucket exists")?;

    let api = Arc::new(RapidApiClient::new(http.clone(), &config.api));
    let fetcher = Arc::new(HttpMediaFetcher::new(http.clone()));
    let submitter = Arc::new(MediaConvertClient::new(http, &config.transcode));

    let retry = RetryPolicy::new()
        .with_max_attempts(config.retry_max_attempts)
        .with_delay(config.retry_delay());
    let settle_for = |key: &str| {
        Settle::until_visible(key, config.settle_poll(), config.settle_max_wait())
    };

    let pipeline = PipelineBuilder::new("highlight-acquisition", store.clone())
        .stage(
            Arc::new(FetchHighlightsStage::new(
                api,
                store.clone(),
                config.query.clone(),
            )),
            retry.clone(),
            settle_for(METADATA_KEY),
        )
        .stage(
            Arc::new(DownloadClipStage::new(fetcher, store.clone())),
            retry.clone(),
            settle_for(MEDIA_KEY),
        )
        .stage(
            Arc::new(SubmitTranscodeStage::new(
                submitter,
                store,
                config.storage.bucket.clone(),
                config.transcode.destination_prefix.clone(),
                TranscodeProfile::default(),
            )),
            retry,
            Settle::None,
        )
        .build();

    let report = pipeline.run().await?;
    tracing::info!(
        run_id = %report.run_id,
        stages = report.stages_completed,
        duration_ms = report.duration.as_millis() as u64,
        "all stages completed"
    );
    Ok(())
}
