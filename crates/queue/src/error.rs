//! Queue error types.

use kbwatch_core::TrackerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("message parse error: {0}")]
    Parse(String),

    #[error("acknowledge error: {0}")]
    Ack(String),

    #[error("send error: {0}")]
    Send(String),
}

impl From<QueueError> for TrackerError {
    fn from(e: QueueError) -> Self {
        match e {
            QueueError::Parse(msg) => TrackerError::MalformedInput(msg),
            other => TrackerError::transport("queue", other.to_string()),
        }
    }
}
