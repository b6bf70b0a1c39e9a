use thiserror::Error;

/// Failure classification shared by every component of the tracker.
///
/// The three variants map one-to-one onto the classification strings that
/// end up in an [`InvocationResult`](crate::InvocationResult) body.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// A remote call (queue, pub/sub, configuration store, job service) failed.
    #[error("{service} call failed: {message}")]
    Transport { service: String, message: String },

    /// An inbound batch, payload, or configuration value could not be parsed.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("{0}")]
    Unexpected(String),
}

impl TrackerError {
    pub fn transport(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    /// Classification string reported to the invoker.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport_error",
            Self::MalformedInput(_) => "malformed_input",
            Self::Unexpected(_) => "unexpected_error",
        }
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedInput(e.to_string())
    }
}
