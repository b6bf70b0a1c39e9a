//! Tracking-record payloads carried in queue message bodies.

use tracing::warn;

use kbwatch_core::JobReference;

use crate::client::QueueMessage;
use crate::error::QueueError;

/// Serialize a [`JobReference`] as a tracking-record body.
pub fn encode_tracking_record(reference: &JobReference) -> Result<String, QueueError> {
    serde_json::to_string(reference).map_err(|e| QueueError::Parse(e.to_string()))
}

/// Parse a queue message body into the [`JobReference`] it tracks.
///
/// The body must be a JSON object with `knowledge_base_id`, `data_source_id`
/// and `ingestion_job_id` string fields; other fields are ignored.
pub fn parse_tracking_record(msg: &QueueMessage) -> Result<JobReference, QueueError> {
    serde_json::from_str(&msg.body).map_err(|e| {
        QueueError::Parse(format!("invalid tracking record in message {}: {}", msg.id, e))
    })
}

/// Parse a batch of messages, separating successes from failures.
///
/// Good records are never blocked by bad ones. Each success is paired with
/// the message it came from so the caller can ack it later.
pub fn parse_batch(
    messages: &[QueueMessage],
) -> (Vec<(&QueueMessage, JobReference)>, Vec<(&QueueMessage, QueueError)>) {
    let mut records = Vec::with_capacity(messages.len());
    let mut errors = Vec::new();

    for msg in messages {
        match parse_tracking_record(msg) {
            Ok(reference) => records.push((msg, reference)),
            Err(e) => {
                warn!(message_id = %msg.id, error = %e, "Failed to parse tracking record");
                errors.push((msg, e));
            }
        }
    }

    (records, errors)
}
