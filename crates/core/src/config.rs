use std::env;

use serde::{Deserialize, Serialize};

/// SQS caps a single receive at 10 messages.
pub const MAX_RECEIVE_BATCH: u32 = 10;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.as_str(), "true" | "1"),
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub aws: AwsConfig,
    pub params: ParameterNames,
    pub checker: CheckerConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `KBWATCH_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("KBWATCH_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            aws: AwsConfig::from_env_profiled(p),
            params: ParameterNames::from_env_profiled(p),
            checker: CheckerConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  aws:      region={}, static_credentials={}, endpoint={}",
            self.aws.region,
            self.aws.has_static_credentials(),
            self.aws.endpoint_url.as_deref().unwrap_or("(default)")
        );
        tracing::info!(
            "  params:   job_list={}, success_topic={}, failure_topic={}",
            self.params.job_list,
            self.params.success_topic_arn,
            self.params.failure_topic_arn
        );
        tracing::info!(
            "  checker:  batch_size={}, wait_time_secs={}, max_drain_batches={}, ack_on_notify_failure={}",
            self.checker.batch_size,
            self.checker.wait_time_secs,
            self.checker.max_drain_batches,
            self.checker.ack_on_notify_failure
        );
    }
}

// ── AWS ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub endpoint_url: Option<String>,
}

impl AwsConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            region: profiled_env_or(p, "AWS_REGION", "us-east-1"),
            access_key_id: profiled_env_opt(p, "AWS_ACCESS_KEY_ID"),
            secret_access_key: profiled_env_opt(p, "AWS_SECRET_ACCESS_KEY"),
            session_token: profiled_env_opt(p, "AWS_SESSION_TOKEN"),
            endpoint_url: profiled_env_opt(p, "AWS_ENDPOINT_URL"),
        }
    }

    pub fn has_static_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }

    /// Endpoint override with a scheme, if one is configured.
    pub fn endpoint(&self) -> Option<String> {
        self.endpoint_url.as_ref().filter(|e| !e.is_empty()).map(|endpoint| {
            if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
                endpoint.clone()
            } else {
                format!("https://{endpoint}")
            }
        })
    }
}

// ── Configuration store parameter names ───────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterNames {
    /// JSON list of knowledge bases and their data sources to ingest.
    pub job_list: String,
    /// Queue URL the initiator registers tracking records on.
    pub initiator_queue_url: String,
    /// Queue URL the status checker drains.
    pub checker_queue_url: String,
    pub success_topic_arn: String,
    pub failure_topic_arn: String,
}

impl ParameterNames {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            job_list: profiled_env_or(
                p,
                "KBWATCH_PARAM_JOB_LIST",
                "/start-kb-ingestion-jobs/config-json",
            ),
            initiator_queue_url: profiled_env_or(
                p,
                "KBWATCH_PARAM_INITIATOR_QUEUE_URL",
                "/start-kb-ingestion-jobs/sqs-queue-url",
            ),
            checker_queue_url: profiled_env_or(
                p,
                "KBWATCH_PARAM_CHECKER_QUEUE_URL",
                "/check-kb-ingestion-job-statuses/sqs-queue-url",
            ),
            success_topic_arn: profiled_env_or(
                p,
                "KBWATCH_PARAM_SUCCESS_TOPIC_ARN",
                "/check-kb-ingestion-job-statuses/success-sns-topic-arn",
            ),
            failure_topic_arn: profiled_env_or(
                p,
                "KBWATCH_PARAM_FAILURE_TOPIC_ARN",
                "/check-kb-ingestion-job-statuses/failure-sns-topic-arn",
            ),
        }
    }
}

impl Default for ParameterNames {
    fn default() -> Self {
        Self::from_env_profiled("")
    }
}

// ── Status checker ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Messages per receive, clamped to 1..=10.
    pub batch_size: u32,
    /// Long-poll seconds per receive (0 = return immediately).
    pub wait_time_secs: u32,
    /// Visibility timeout applied to received tracking records.
    pub visibility_timeout_secs: Option<u32>,
    /// Upper bound on receives per drain.
    pub max_drain_batches: u32,
    /// Remove a terminal record even when its notification could not be sent.
    pub ack_on_notify_failure: bool,
}

impl CheckerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            batch_size: profiled_env_u32(p, "KBWATCH_BATCH_SIZE", MAX_RECEIVE_BATCH)
                .clamp(1, MAX_RECEIVE_BATCH),
            wait_time_secs: profiled_env_u32(p, "KBWATCH_WAIT_TIME_SECS", 0),
            visibility_timeout_secs: profiled_env_opt(p, "KBWATCH_VISIBILITY_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok()),
            max_drain_batches: profiled_env_u32(p, "KBWATCH_MAX_DRAIN_BATCHES", 1000).max(1),
            ack_on_notify_failure: profiled_env_bool(p, "KBWATCH_ACK_ON_NOTIFY_FAILURE", false),
        }
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            batch_size: MAX_RECEIVE_BATCH,
            wait_time_secs: 0,
            visibility_timeout_secs: None,
            max_drain_batches: 1000,
            ack_on_notify_failure: false,
        }
    }
}
