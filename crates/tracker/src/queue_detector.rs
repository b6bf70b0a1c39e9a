//! Queue-driven detection: drain tracking records until the queue is empty.
//!
//! Terminal records are acknowledged after their notification is attempted.
//! Pending records are left alone and come back once their lease expires,
//! which is the only retry mechanism; nothing here sleeps or loops on a timer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use kbwatch_core::config::CheckerConfig;
use kbwatch_core::{JobReference, TrackerError};
use kbwatch_queue::{parse_batch, QueueClient, QueueMessage};

use crate::checker::{Observation, StatusChecker};
use crate::detector::{DetectionSummary, Detector};

pub struct QueueDetector {
    queue: Arc<dyn QueueClient>,
    config: CheckerConfig,
}

impl QueueDetector {
    pub fn new(queue: Arc<dyn QueueClient>, config: CheckerConfig) -> Self {
        Self { queue, config }
    }

    async fn acknowledge(&self, msg: &QueueMessage, summary: &mut DetectionSummary) {
        match self.queue.ack(&msg.receipt_handle).await {
            Ok(()) => summary.acknowledged += 1,
            Err(e) => {
                warn!(message_id = %msg.id, error = %e, "Failed to remove tracking record");
                summary.record_failure(&TrackerError::from(e));
            }
        }
    }

    async fn process(
        &self,
        checker: &StatusChecker,
        msg: &QueueMessage,
        reference: &JobReference,
        summary: &mut DetectionSummary,
    ) {
        let observation = match checker.observe(reference).await {
            Ok(observation) => observation,
            Err(e) => {
                warn!(
                    message_id = %msg.id,
                    attempt = msg.attempt_count,
                    sent_at = %msg.timestamp,
                    %reference,
                    error = %e,
                    "Status check failed, record kept"
                );
                summary.record_failure(&e);
                return;
            }
        };
        summary.observed += 1;

        match observation {
            Observation::Pending(job) => {
                debug!(
                    %reference,
                    status = %job.status,
                    attempt = msg.attempt_count,
                    "Job still pending, record kept"
                );
                summary.retained += 1;
            }
            Observation::Notified { dispatch, .. } => {
                debug!(
                    message_id = %msg.id,
                    notification_id = %dispatch.message_id,
                    "Removing tracking record"
                );
                summary.notified += 1;
                self.acknowledge(msg, summary).await;
            }
            Observation::NotifyFailed { error, .. } => {
                warn!(
                    message_id = %msg.id,
                    attempt = msg.attempt_count,
                    sent_at = %msg.timestamp,
                    %reference,
                    "Notification not sent for terminal job"
                );
                summary.record_failure(&error);
                if self.config.ack_on_notify_failure {
                    self.acknowledge(msg, summary).await;
                } else {
                    summary.retained += 1;
                }
            }
        }
    }
}

#[async_trait]
impl Detector for QueueDetector {
    fn name(&self) -> &'static str {
        "queue"
    }

    async fn detect(&self, checker: &StatusChecker) -> Result<DetectionSummary, TrackerError> {
        let mut summary = DetectionSummary::default();

        for round in 1..=self.config.max_drain_batches {
            let messages = self.queue.poll_batch(self.config.batch_size).await?;
            if messages.is_empty() {
                debug!(rounds = round - 1, "Tracking queue drained");
                return Ok(summary);
            }
            summary.received += messages.len();
            info!(round, count = messages.len(), "Received tracking records");

            let (records, malformed) = parse_batch(&messages);
            for (msg, err) in malformed {
                // Left un-acked; the queue's redrive policy decides its fate.
                warn!(
                    message_id = %msg.id,
                    attempt = msg.attempt_count,
                    sent_at = %msg.timestamp,
                    "Malformed tracking record left in queue"
                );
                summary.record_failure(&TrackerError::from(err));
            }
            for (msg, reference) in records {
                self.process(checker, msg, &reference, &mut summary).await;
            }
        }

        warn!(
            max_drain_batches = self.config.max_drain_batches,
            "Stopped draining at the batch limit; remaining records wait for the next run"
        );
        Ok(summary)
    }

    fn reports_item_failures(&self) -> bool {
        true
    }
}
