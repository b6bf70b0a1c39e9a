//! Status classification and notification shared by both detectors.

use std::sync::Arc;

use tracing::{info, warn};

use kbwatch_core::{IngestionJob, JobReference, NotificationEvent, TrackerError};
use kbwatch_notify::{DispatchResult, Dispatcher};

use crate::oracle::StatusOracle;

/// Outcome of observing one job once.
#[derive(Debug)]
pub enum Observation {
    /// Not terminal yet; nothing was sent.
    Pending(IngestionJob),
    /// Terminal and the notification was published.
    Notified {
        job: IngestionJob,
        event: NotificationEvent,
        dispatch: DispatchResult,
    },
    /// Terminal but publishing the notification failed.
    NotifyFailed {
        job: IngestionJob,
        event: NotificationEvent,
        error: TrackerError,
    },
}

impl Observation {
    pub fn job(&self) -> &IngestionJob {
        match self {
            Observation::Pending(job) => job,
            Observation::Notified { job, .. } => job,
            Observation::NotifyFailed { job, .. } => job,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Observation::Pending(_))
    }
}

/// Polls the job service and notifies on terminal status.
pub struct StatusChecker {
    oracle: Arc<dyn StatusOracle>,
    dispatcher: Dispatcher,
}

impl StatusChecker {
    pub fn new(oracle: Arc<dyn StatusOracle>, dispatcher: Dispatcher) -> Self {
        Self { oracle, dispatcher }
    }

    /// Query the job's status and, when terminal, dispatch exactly one notification.
    ///
    /// Only a failed status query is returned as `Err`; a failed dispatch is
    /// reported as [`Observation::NotifyFailed`] so the caller can decide what
    /// to do with the work item.
    pub async fn observe(&self, reference: &JobReference) -> Result<Observation, TrackerError> {
        info!(
            knowledge_base_id = %reference.knowledge_base_id,
            data_source_id = %reference.data_source_id,
            ingestion_job_id = %reference.ingestion_job_id,
            "Checking ingestion job status"
        );

        let job = self.oracle.get_status(reference).await?;
        info!(status = %job.status, "Ingestion job summary:\n{}", job.detail_json());

        let Some(event) = NotificationEvent::for_job(&job) else {
            return Ok(Observation::Pending(job));
        };

        match self.dispatcher.dispatch(&event).await {
            Ok(dispatch) => Ok(Observation::Notified { job, event, dispatch }),
            Err(e) => {
                warn!(%reference, error = %e, "Could not notify terminal status");
                Ok(Observation::NotifyFailed {
                    job,
                    event,
                    error: e.into(),
                })
            }
        }
    }
}
