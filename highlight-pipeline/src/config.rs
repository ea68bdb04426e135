//! Pipeline configuration.
//!
//! All configuration is resolved once at process start into an immutable
//! [`PipelineConfig`] and passed by reference from there on; nothing reads
//! the environment after construction.

use crate::errors::ConfigError;
use chrono::NaiveDate;
use serde::Serialize;
use std::time::Duration;

/// Environment variable names read by [`PipelineConfig::from_env`].
pub mod env_vars {
    /// RapidAPI key for the highlight API.
    pub const API_KEY: &str = "HIGHLIGHT_API_KEY";
    /// RapidAPI host for the highlight API.
    pub const API_HOST: &str = "HIGHLIGHT_API_HOST";
    /// Object store bucket holding the handoff records.
    pub const BUCKET: &str = "HANDOFF_BUCKET";
    /// Region of the bucket and transcoding service.
    pub const REGION: &str = "AWS_REGION";
    /// Account-scoped transcoding service endpoint URL.
    pub const TRANSCODE_ENDPOINT: &str = "MEDIACONVERT_ENDPOINT";
    /// IAM role ARN the transcoding service assumes.
    pub const TRANSCODE_ROLE: &str = "MEDIACONVERT_ROLE_ARN";
    /// Highlight query date, `YYYY-MM-DD`.
    pub const QUERY_DATE: &str = "QUERY_DATE";
    /// Highlight query league name.
    pub const QUERY_LEAGUE: &str = "QUERY_LEAGUE";
    /// Maximum number of highlights to fetch.
    pub const QUERY_LIMIT: &str = "QUERY_LIMIT";
    /// Optional: retry attempts per stage.
    pub const RETRY_MAX_ATTEMPTS: &str = "RETRY_MAX_ATTEMPTS";
    /// Optional: delay between retry attempts, in seconds.
    pub const RETRY_DELAY_SECS: &str = "RETRY_DELAY_SECS";
    /// Optional: interval between settle visibility polls, in seconds.
    pub const SETTLE_POLL_SECS: &str = "SETTLE_POLL_SECS";
    /// Optional: upper bound on the settle wait, in seconds.
    pub const SETTLE_MAX_WAIT_SECS: &str = "SETTLE_MAX_WAIT_SECS";
    /// Optional: destination prefix for transcoded output.
    pub const OUTPUT_PREFIX: &str = "OUTPUT_PREFIX";
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    30
}

fn default_settle_poll_secs() -> u64 {
    5
}

fn default_settle_max_wait_secs() -> u64 {
    60
}

fn default_output_prefix() -> String {
    "processed_videos/".to_string()
}

/// Credentials and endpoint for the highlight API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// RapidAPI key sent as `X-RapidAPI-Key`.
    pub key: String,
    /// RapidAPI host, e.g. `sport-highlights-api.p.rapidapi.com`.
    pub host: String,
}

impl ApiConfig {
    /// Returns the full basketball highlights endpoint URL.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        format!("https://{}/basketball/highlights", self.host)
    }
}

/// Location of the handoff store.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket name.
    pub bucket: String,
    /// Bucket region, e.g. `us-east-1`.
    pub region: String,
}

/// Transcoding service coordinates.
#[derive(Debug, Clone)]
pub struct TranscodeConfig {
    /// Account-scoped service endpoint URL.
    pub endpoint: String,
    /// IAM role ARN the service assumes to read and write the bucket.
    pub role_arn: String,
    /// Key prefix for transcoded output, e.g. `processed_videos/`.
    pub destination_prefix: String,
}

/// Query parameters for the highlight API, serialized straight into the
/// request query string.
#[derive(Debug, Clone, Serialize)]
pub struct HighlightQuery {
    /// Date of highlights to fetch, `YYYY-MM-DD`.
    pub date: String,
    /// League name, e.g. `NCAA`.
    #[serde(rename = "leagueName")]
    pub league_name: String,
    /// Maximum number of highlights to return.
    pub limit: u32,
}

/// Immutable configuration for one pipeline process.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Highlight API credentials.
    pub api: ApiConfig,
    /// Handoff store location.
    pub storage: StorageConfig,
    /// Transcoding service coordinates.
    pub transcode: TranscodeConfig,
    /// Highlight query parameters.
    pub query: HighlightQuery,
    /// Retry attempts per stage.
    pub retry_max_attempts: u32,
    /// Delay between retry attempts, in seconds.
    pub retry_delay_secs: u64,
    /// Interval between settle visibility polls, in seconds.
    pub settle_poll_secs: u64,
    /// Upper bound on the settle wait, in seconds.
    pub settle_max_wait_secs: u64,
}

impl PipelineConfig {
    /// Builds the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a required variable is absent or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary lookup function.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a required value is absent or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(ConfigError::missing(name)),
            }
        };

        let date = required(env_vars::QUERY_DATE)?;
        NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|e| ConfigError::invalid(env_vars::QUERY_DATE, e.to_string()))?;

        let limit = parse_value(env_vars::QUERY_LIMIT, &required(env_vars::QUERY_LIMIT)?)?;

        Ok(Self {
            api: ApiConfig {
                key: required(env_vars::API_KEY)?,
                host: required(env_vars::API_HOST)?,
            },
            storage: StorageConfig {
                bucket: required(env_vars::BUCKET)?,
                region: required(env_vars::REGION)?,
            },
            transcode: TranscodeConfig {
                endpoint: required(env_vars::TRANSCODE_ENDPOINT)?,
                role_arn: required(env_vars::TRANSCODE_ROLE)?,
                destination_prefix: lookup(env_vars::OUTPUT_PREFIX)
                    .unwrap_or_else(default_output_prefix),
            },
            query: HighlightQuery {
                date,
                league_name: required(env_vars::QUERY_LEAGUE)?,
                limit,
            },
            retry_max_attempts: optional_value(
                &lookup,
                env_vars::RETRY_MAX_ATTEMPTS,
                default_retry_max_attempts(),
            )?,
            retry_delay_secs: optional_value(
                &lookup,
                env_vars::RETRY_DELAY_SECS,
                default_retry_delay_secs(),
            )?,
            settle_poll_secs: optional_value(
                &lookup,
                env_vars::SETTLE_POLL_SECS,
                default_settle_poll_secs(),
            )?,
            settle_max_wait_secs: optional_value(
                &lookup,
                env_vars::SETTLE_MAX_WAIT_SECS,
                default_settle_max_wait_secs(),
            )?,
        })
    }

    /// Delay between retry attempts.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// Interval between settle visibility polls.
    #[must_use]
    pub fn settle_poll(&self) -> Duration {
        Duration::from_secs(self.settle_poll_secs)
    }

    /// Upper bound on the settle wait.
    #[must_use]
    pub fn settle_max_wait(&self) -> Duration {
        Duration::from_secs(self.settle_max_wait_secs)
    }
}

fn parse_value<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(name, e.to_string()))
}

fn optional_value<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}
