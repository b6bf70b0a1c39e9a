//! Queue client trait and types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QueueError;

/// A raw message received from a queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    /// Unique message identifier from the queue provider.
    pub id: String,
    /// Raw message body (JSON string).
    pub body: String,
    /// Provider-specific handle for ack (e.g., SQS receipt handle).
    pub receipt_handle: String,
    /// When the message was sent to the queue.
    pub timestamp: DateTime<Utc>,
    /// Number of times this message has been received.
    pub attempt_count: u32,
}

/// Trait for the queue holding tracking records.
///
/// A received message stays invisible to other consumers until the provider's
/// lease expires; messages that are never acked are redelivered after that.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Receive up to `max_messages` currently visible messages.
    ///
    /// Returns an empty vec when nothing is visible.
    async fn poll_batch(&self, max_messages: u32) -> Result<Vec<QueueMessage>, QueueError>;

    /// Acknowledge a message, removing it from the queue.
    async fn ack(&self, receipt_handle: &str) -> Result<(), QueueError>;

    /// Enqueue a message body. Returns the provider's message id.
    async fn send(&self, body: &str) -> Result<String, QueueError>;
}
