//! Publisher trait definition and shared error types.

use kbwatch_core::{Channel, TrackerError};

/// Errors that can occur during notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("destination lookup failed: {0}")]
    Destination(String),

    #[error("publish failed: {0}")]
    Publish(String),
}

impl From<NotifyError> for TrackerError {
    fn from(e: NotifyError) -> Self {
        match e {
            NotifyError::Destination(msg) => TrackerError::transport("parameter store", msg),
            NotifyError::Publish(msg) => TrackerError::transport("notification", msg),
        }
    }
}

/// Trait for pub/sub transports.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    /// Publish one message to `destination`. Returns the transport's message id.
    async fn publish(
        &self,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, NotifyError>;

    /// Human-readable name for this transport (e.g., "sns").
    fn channel_name(&self) -> &str;
}

/// Result of dispatching one notification.
#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub channel: Channel,
    pub destination: String,
    pub message_id: String,
    pub duration_ms: u64,
}
