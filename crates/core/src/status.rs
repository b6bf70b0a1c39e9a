//! Ingestion job status and terminal-state classification.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Status reported by the job service for an ingestion job.
///
/// Values the service may add later are carried in [`JobStatus::Other`] and
/// classify as non-terminal, so a new status never fails a poll.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Starting,
    InProgress,
    Stopping,
    Complete,
    Failed,
    Stopped,
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Starting => "STARTING",
            Self::InProgress => "IN_PROGRESS",
            Self::Stopping => "STOPPING",
            Self::Complete => "COMPLETE",
            Self::Failed => "FAILED",
            Self::Stopped => "STOPPED",
            Self::Other(s) => s,
        }
    }

    /// `COMPLETE`, `FAILED` and `STOPPED` are absorbing; everything else is pending.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed | Self::Stopped)
    }

    /// Verdict word used in notification subjects, `None` while pending.
    pub fn verdict(&self) -> Option<&'static str> {
        match self {
            Self::Complete => Some("Completed"),
            Self::Failed => Some("FAILED"),
            Self::Stopped => Some("STOPPED"),
            _ => None,
        }
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        match s {
            "STARTING" => Self::Starting,
            "IN_PROGRESS" => Self::InProgress,
            "STOPPING" => Self::Stopping,
            "COMPLETE" => Self::Complete,
            "FAILED" => Self::Failed,
            "STOPPED" => Self::Stopped,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}
