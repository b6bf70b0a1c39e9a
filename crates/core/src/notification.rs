//! Mapping from an observed job status to an outbound notification.

use std::fmt;

use serde::Serialize;

use crate::job::IngestionJob;
use crate::status::JobStatus;

/// Outbound notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Success,
    Failure,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Success => write!(f, "success"),
            Channel::Failure => write!(f, "failure"),
        }
    }
}

/// A notification derived from one observation of a terminal job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationEvent {
    pub channel: Channel,
    pub subject: String,
    pub body: String,
}

impl NotificationEvent {
    /// Build the notification for `job`, or `None` when its status is not terminal.
    ///
    /// `COMPLETE` goes to the success channel; `FAILED` and `STOPPED` share the
    /// failure channel with distinct subjects.
    pub fn for_job(job: &IngestionJob) -> Option<Self> {
        let verdict = job.status.verdict()?;
        let channel = match job.status {
            JobStatus::Complete => Channel::Success,
            _ => Channel::Failure,
        };
        Some(Self {
            channel,
            subject: format!("Ingestion job for {} {}", job.reference, verdict),
            body: job.detail_json(),
        })
    }
}
