//! Decoding of pushed log subscription batches.
//!
//! A batch arrives as `{"awslogs": {"data": ...}}` (or just `{"data": ...}`)
//! where `data` is base64 of a gzip-compressed JSON document:
//!
//! ```json
//! {"messageType": "DATA_MESSAGE", "logEvents": [{"id": "..", "timestamp": 0, "message": "{..}"}]}
//! ```
//!
//! Each event message is itself JSON carrying the completed job's identity
//! under `event`.

use std::io::Read;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::GzDecoder;
use serde::Deserialize;

use kbwatch_core::{JobReference, TrackerError};

/// Control messages are connectivity probes and carry no job events.
pub const CONTROL_MESSAGE: &str = "CONTROL_MESSAGE";

/// The compressed envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct LogEnvelope {
    pub data: String,
}

/// Accepted shapes of an inbound invocation payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LogInput {
    Wrapped { awslogs: LogEnvelope },
    Bare(LogEnvelope),
}

impl LogInput {
    pub fn parse(raw: &str) -> Result<Self, TrackerError> {
        serde_json::from_str(raw)
            .map_err(|e| TrackerError::malformed(format!("invalid log batch payload: {e}")))
    }

    pub fn into_envelope(self) -> LogEnvelope {
        match self {
            LogInput::Wrapped { awslogs } => awslogs,
            LogInput::Bare(envelope) => envelope,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogBatch {
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub log_group: Option<String>,
    #[serde(default)]
    pub log_stream: Option<String>,
    pub log_events: Vec<LogEvent>,
}

impl LogBatch {
    pub fn is_control(&self) -> bool {
        self.message_type.as_deref() == Some(CONTROL_MESSAGE)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct EventMessage {
    event: CompletionEvent,
}

#[derive(Debug, Deserialize)]
struct CompletionEvent {
    knowledge_base_arn: String,
    data_source_id: String,
    ingestion_job_id: String,
}

/// base64-decode, gunzip and parse an envelope into its batch of log events.
pub fn decode_log_batch(envelope: &LogEnvelope) -> Result<LogBatch, TrackerError> {
    let compressed = STANDARD
        .decode(envelope.data.trim())
        .map_err(|e| TrackerError::malformed(format!("log batch is not valid base64: {e}")))?;

    let mut text = String::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_string(&mut text)
        .map_err(|e| TrackerError::malformed(format!("log batch is not valid gzip: {e}")))?;

    serde_json::from_str(&text)
        .map_err(|e| {
            TrackerError::malformed(format!("log batch is not a log events document: {e}"))
        })
}

/// Extract the job identity from one event message.
pub fn parse_completion_event(message: &str) -> Result<JobReference, TrackerError> {
    let parsed: EventMessage = serde_json::from_str(message)
        .map_err(|e| TrackerError::malformed(format!("invalid completion event: {e}")))?;
    let event = parsed.event;
    JobReference::from_knowledge_base_arn(
        &event.knowledge_base_arn,
        event.data_source_id,
        event.ingestion_job_id,
    )
}
