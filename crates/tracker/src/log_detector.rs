//! Log-driven detection: check every job named in a pushed batch of
//! completion log events.
//!
//! There is no registry to update and no redelivery to fall back on, so a
//! failing event is logged and skipped; the rest of the batch still runs.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use kbwatch_core::TrackerError;

use crate::checker::{Observation, StatusChecker};
use crate::detector::{DetectionSummary, Detector};
use crate::logs::{decode_log_batch, parse_completion_event, LogEnvelope, LogEvent};

pub struct LogEventDetector {
    envelope: LogEnvelope,
}

impl LogEventDetector {
    pub fn new(envelope: LogEnvelope) -> Self {
        Self { envelope }
    }

    async fn process(
        &self,
        checker: &StatusChecker,
        event: &LogEvent,
        summary: &mut DetectionSummary,
    ) {
        let event_id = event.id.as_deref().unwrap_or("-");
        let logged_at = event.timestamp.unwrap_or_default();

        let reference = match parse_completion_event(&event.message) {
            Ok(reference) => reference,
            Err(e) => {
                warn!(event_id, logged_at, error = %e, "Skipping unreadable log event");
                summary.record_failure(&e);
                return;
            }
        };

        match checker.observe(&reference).await {
            Ok(Observation::Pending(job)) => {
                summary.observed += 1;
                debug!(%reference, status = %job.status, "Job not terminal yet");
            }
            Ok(Observation::Notified { dispatch, .. }) => {
                debug!(event_id, notification_id = %dispatch.message_id, "Log event resolved");
                summary.observed += 1;
                summary.notified += 1;
            }
            Ok(Observation::NotifyFailed { error, .. }) => {
                summary.observed += 1;
                warn!(
                    event_id,
                    logged_at,
                    %reference,
                    error = %error,
                    "Notification dropped for log event"
                );
                summary.record_failure(&error);
            }
            Err(e) => {
                warn!(
                    event_id,
                    logged_at,
                    %reference,
                    error = %e,
                    "Status check failed for log event"
                );
                summary.record_failure(&e);
            }
        }
    }
}

#[async_trait]
impl Detector for LogEventDetector {
    fn name(&self) -> &'static str {
        "log-events"
    }

    async fn detect(&self, checker: &StatusChecker) -> Result<DetectionSummary, TrackerError> {
        let batch = decode_log_batch(&self.envelope)?;
        let mut summary = DetectionSummary::default();

        if batch.is_control() {
            debug!("Ignoring control message batch");
            return Ok(summary);
        }

        info!(
            log_group = batch.log_group.as_deref().unwrap_or("-"),
            log_stream = batch.log_stream.as_deref().unwrap_or("-"),
            count = batch.log_events.len(),
            "Received completion log events"
        );

        summary.received = batch.log_events.len();
        for event in &batch.log_events {
            self.process(checker, event, &mut summary).await;
        }
        Ok(summary)
    }
}
