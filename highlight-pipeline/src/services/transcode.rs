//! Transcode job submission client.

use crate::config::TranscodeConfig;
use crate::errors::StageError;
use crate::models::{JobHandle, TranscodeProfile};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Submits transcode jobs to the managed transcoding service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscodeSubmitter: Send + Sync {
    /// Submits a job transcoding `input_location` into `output_location`
    /// with the given output profile.
    async fn submit(
        &self,
        input_location: &str,
        output_location: &str,
        profile: &TranscodeProfile,
    ) -> Result<JobHandle, StageError>;
}

/// MediaConvert job submission client.
///
/// Posts a job settings document to the account-scoped endpoint's
/// `/2017-08-29/jobs` resource and reads the assigned job id back.
pub struct MediaConvertClient {
    http: reqwest::Client,
    config: TranscodeConfig,
}

impl MediaConvertClient {
    /// Creates a client over a shared HTTP client.
    #[must_use]
    pub fn new(http: reqwest::Client, config: &TranscodeConfig) -> Self {
        Self {
            http,
            config: config.clone(),
        }
    }

    fn jobs_url(&self) -> String {
        format!("{}/2017-08-29/jobs", self.config.endpoint.trim_end_matches('/'))
    }

    /// Builds the job settings document: one file input, one file-group
    /// output, CBR single-pass video and stereo audio per the profile.
    fn job_settings(
        &self,
        input_location: &str,
        output_location: &str,
        profile: &TranscodeProfile,
    ) -> Value {
        json!({
            "role": self.config.role_arn,
            "settings": {
                "inputs": [
                    {
                        "audioSelectors": {
                            "Audio Selector 1": { "defaultSelection": "DEFAULT" }
                        },
                        "fileInput": input_location,
                        "videoSelector": {}
                    }
                ],
                "outputGroups": [
                    {
                        "name": "File Group",
                        "outputGroupSettings": {
                            "type": "FILE_GROUP_SETTINGS",
                            "fileGroupSettings": { "destination": output_location }
                        },
                        "outputs": [
                            {
                                "containerSettings": {
                                    "container": profile.container,
                                    "mp4Settings": {}
                                },
                                "videoDescription": {
                                    "codecSettings": {
                                        "codec": profile.video_codec,
                                        "h264Settings": {
                                            "bitrate": profile.video_bitrate,
                                            "rateControlMode": "CBR",
                                            "qualityTuningLevel": "SINGLE_PASS",
                                            "codecProfile": "MAIN"
                                        }
                                    },
                                    "scalingBehavior": "DEFAULT",
                                    "timecodeInsertion": "DISABLED"
                                },
                                "audioDescriptions": [
                                    {
                                        "codecSettings": {
                                            "codec": profile.audio_codec,
                                            "aacSettings": {
                                                "bitrate": profile.audio_bitrate,
                                                "codingMode": "CODING_MODE_2_0",
                                                "sampleRate": profile.sample_rate
                                            }
                                        }
                                    }
                                ]
                            }
                        ]
                    }
                ]
            },
            "accelerationSettings": { "mode": "DISABLED" },
            "statusUpdateInterval": "SECONDS_60",
            "priority": 0
        })
    }
}

#[async_trait]
impl TranscodeSubmitter for MediaConvertClient {
    async fn submit(
        &self,
        input_location: &str,
        output_location: &str,
        profile: &TranscodeProfile,
    ) -> Result<JobHandle, StageError> {
        let settings = self.job_settings(input_location, output_location, profile);

        let response = self
            .http
            .post(self.jobs_url())
            .json(&settings)
            .send()
            .await
            .map_err(|e| StageError::collaborator("transcode submission request", e))?
            .error_for_status()
            .map_err(|e| StageError::collaborator("transcode submission response", e))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| StageError::collaborator("transcode submission body", e))?;

        let id = body
            .pointer("/job/id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                StageError::collaborator("transcode submission body", "response carries no job id")
            })?;

        Ok(JobHandle { id: id.to_string() })
    }
}
