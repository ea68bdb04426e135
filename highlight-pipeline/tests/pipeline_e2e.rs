//! End-to-end pipeline runs against an in-memory store and scripted
//! collaborators.

use async_trait::async_trait;
use bytes::Bytes;
use highlight_pipeline::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const METADATA_PAYLOAD: &str =
    r#"{"data":[{"url":"https://cdn.example.com/ncaa/buzzer.mp4","title":"Buzzer beater"}]}"#;
const CLIP_BYTES: &[u8] = b"fake-mp4-clip-bytes";
const BUCKET: &str = "highlight-artifacts";

/// Highlight API double: serves a fixed payload, or fails every call.
struct ScriptedApi {
    payload: Option<&'static str>,
    calls: AtomicU32,
}

impl ScriptedApi {
    fn serving(payload: &'static str) -> Self {
        Self {
            payload: Some(payload),
            calls: AtomicU32::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            payload: None,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl HighlightApi for ScriptedApi {
    async fn fetch(&self, _query: &HighlightQuery) -> Result<Bytes, StageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.payload {
            Some(payload) => Ok(Bytes::from_static(payload.as_bytes())),
            None => Err(StageError::collaborator(
                "highlight API request",
                "503 service unavailable",
            )),
        }
    }
}

/// Media download double recording the requested URL.
#[derive(Default)]
struct ScriptedFetcher {
    calls: AtomicU32,
    last_url: Mutex<Option<String>>,
}

#[async_trait]
impl MediaFetcher for ScriptedFetcher {
    async fn download(&self, url: &str) -> Result<Bytes, StageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock().unwrap() = Some(url.to_string());
        Ok(Bytes::from_static(CLIP_BYTES))
    }
}

/// Transcode submission double recording the job locations.
#[derive(Default)]
struct ScriptedSubmitter {
    calls: AtomicU32,
    last_job: Mutex<Option<(String, String)>>,
}

#[async_trait]
impl TranscodeSubmitter for ScriptedSubmitter {
    async fn submit(
        &self,
        input_location: &str,
        output_location: &str,
        _profile: &TranscodeProfile,
    ) -> Result<JobHandle, StageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_job.lock().unwrap() =
            Some((input_location.to_string(), output_location.to_string()));
        Ok(JobHandle {
            id: "job-e2e".to_string(),
        })
    }
}

fn query() -> HighlightQuery {
    HighlightQuery {
        date: "2023-12-01".to_string(),
        league_name: "NCAA".to_string(),
        limit: 10,
    }
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new()
        .with_max_attempts(3)
        .with_delay(Duration::from_millis(1))
}

fn fast_settle(key: &str) -> Settle {
    Settle::until_visible(key, Duration::from_millis(1), Duration::from_millis(100))
}

fn build_pipeline(
    store: &Arc<MemoryHandoffStore>,
    api: Arc<ScriptedApi>,
    fetcher: Arc<ScriptedFetcher>,
    submitter: Arc<ScriptedSubmitter>,
) -> Pipeline {
    let store: Arc<dyn HandoffStore> = store.clone();
    PipelineBuilder::new("highlight-acquisition", store.clone())
        .stage(
            Arc::new(FetchHighlightsStage::new(api, store.clone(), query())),
            fast_retry(),
            fast_settle(METADATA_KEY),
        )
        .stage(
            Arc::new(DownloadClipStage::new(fetcher, store.clone())),
            fast_retry(),
            fast_settle(MEDIA_KEY),
        )
        .stage(
            Arc::new(SubmitTranscodeStage::new(
                submitter,
                store,
                BUCKET,
                "processed_videos/",
                TranscodeProfile::default(),
            )),
            fast_retry(),
            Settle::None,
        )
        .build()
}

#[tokio::test]
async fn full_run_hands_off_through_the_store() {
    let store = Arc::new(MemoryHandoffStore::new());
    let api = Arc::new(ScriptedApi::serving(METADATA_PAYLOAD));
    let fetcher = Arc::new(ScriptedFetcher::default());
    let submitter = Arc::new(ScriptedSubmitter::default());

    let pipeline = build_pipeline(&store, api.clone(), fetcher.clone(), submitter.clone());
    let report = pipeline.run().await.unwrap();
    assert_eq!(report.stages_completed, 3);

    // Stage 1 persisted the exact API payload.
    assert_eq!(
        store.get(METADATA_KEY).await.unwrap(),
        Bytes::from_static(METADATA_PAYLOAD.as_bytes())
    );

    // Stage 2 downloaded the first highlight's URL and stored the clip.
    assert_eq!(
        fetcher.last_url.lock().unwrap().as_deref(),
        Some("https://cdn.example.com/ncaa/buzzer.mp4")
    );
    assert_eq!(
        store.get(MEDIA_KEY).await.unwrap(),
        Bytes::from_static(CLIP_BYTES)
    );

    // Stage 3 referenced the stored clip and the configured destination.
    let (input, output) = submitter.last_job.lock().unwrap().clone().unwrap();
    assert_eq!(input, format!("s3://{BUCKET}/{MEDIA_KEY}"));
    assert_eq!(output, format!("s3://{BUCKET}/processed_videos/"));

    assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn api_outage_fails_at_stage_one_and_downstream_never_runs() {
    let store = Arc::new(MemoryHandoffStore::new());
    let api = Arc::new(ScriptedApi::failing());
    let fetcher = Arc::new(ScriptedFetcher::default());
    let submitter = Arc::new(ScriptedSubmitter::default());

    let pipeline = build_pipeline(&store, api.clone(), fetcher.clone(), submitter.clone());
    let err = pipeline.run().await.unwrap_err();

    assert_eq!(err.stage(), "fetch-highlights");
    assert!(matches!(
        err,
        PipelineError::StageFailed { attempts: 3, .. }
    ));
    assert_eq!(api.calls.load(Ordering::SeqCst), 3);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn second_full_run_overwrites_instead_of_duplicating() {
    let store = Arc::new(MemoryHandoffStore::new());
    let api = Arc::new(ScriptedApi::serving(METADATA_PAYLOAD));
    let fetcher = Arc::new(ScriptedFetcher::default());
    let submitter = Arc::new(ScriptedSubmitter::default());

    let pipeline = build_pipeline(&store, api, fetcher, submitter.clone());
    pipeline.run().await.unwrap();
    let first_metadata = store.get(METADATA_KEY).await.unwrap();
    let first_clip = store.get(MEDIA_KEY).await.unwrap();

    pipeline.run().await.unwrap();

    assert_eq!(store.get(METADATA_KEY).await.unwrap(), first_metadata);
    assert_eq!(store.get(MEDIA_KEY).await.unwrap(), first_clip);
    assert_eq!(store.len().await, 2);
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_highlight_list_fails_fast_without_a_download() {
    let store = Arc::new(MemoryHandoffStore::new());
    let api = Arc::new(ScriptedApi::serving(r#"{"data":[]}"#));
    let fetcher = Arc::new(ScriptedFetcher::default());
    let submitter = Arc::new(ScriptedSubmitter::default());

    let pipeline = build_pipeline(&store, api, fetcher.clone(), submitter.clone());
    let err = pipeline.run().await.unwrap_err();

    // The precondition is non-retryable: one attempt, no download, no job.
    assert_eq!(err.stage(), "download-clip");
    assert!(matches!(
        err,
        PipelineError::StageFailed { attempts: 1, .. }
    ));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
}
