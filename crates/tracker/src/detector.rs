//! Completion detection strategies.

use std::process::ExitCode;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info, warn};

use kbwatch_core::{InvocationResult, TrackerError};

use crate::checker::StatusChecker;

/// Counters for one detector run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectionSummary {
    /// Work items received (queue messages or log events).
    pub received: usize,
    /// Status queries that succeeded.
    pub observed: usize,
    /// Notifications published.
    pub notified: usize,
    /// Tracking records removed from the queue.
    pub acknowledged: usize,
    /// Work items left for a later run.
    pub retained: usize,
    /// Work items whose processing failed.
    pub failed: usize,
    #[serde(skip)]
    pub first_failure: Option<(&'static str, String)>,
}

impl DetectionSummary {
    pub(crate) fn record_failure(&mut self, err: &TrackerError) {
        self.failed += 1;
        if self.first_failure.is_none() {
            self.first_failure = Some((err.kind(), err.to_string()));
        }
    }
}

/// A way of discovering which jobs to check in one invocation.
#[async_trait]
pub trait Detector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Process all currently available work. Per-item failures are isolated
    /// and counted; `Err` means the run itself could not proceed.
    async fn detect(&self, checker: &StatusChecker) -> Result<DetectionSummary, TrackerError>;

    /// Whether isolated per-item failures turn the invocation result into a failure.
    fn reports_item_failures(&self) -> bool {
        false
    }
}

/// Run a detector once and convert its outcome into an invocation result.
pub async fn run_detector(detector: &dyn Detector, checker: &StatusChecker) -> InvocationResult {
    let name = detector.name();
    match detector.detect(checker).await {
        Ok(summary) => {
            info!(
                detector = name,
                received = summary.received,
                observed = summary.observed,
                notified = summary.notified,
                acknowledged = summary.acknowledged,
                retained = summary.retained,
                failed = summary.failed,
                "Detection run finished"
            );
            match &summary.first_failure {
                Some((kind, message)) if detector.reports_item_failures() => {
                    warn!(detector = name, failed = summary.failed, "Detection run had failures");
                    InvocationResult {
                        status_code: 500,
                        body: format!(
                            "{kind}: {} of {} item(s) failed, first: {message}",
                            summary.failed, summary.received
                        ),
                    }
                }
                _ => InvocationResult::success(),
            }
        }
        Err(e) => {
            error!(detector = name, kind = e.kind(), error = %e, "Detection run failed");
            InvocationResult::failure(&e)
        }
    }
}

/// Print the result as JSON on stdout and map it to a process exit code.
pub fn emit(result: &InvocationResult) -> ExitCode {
    match serde_json::to_string(result) {
        Ok(json) => println!("{json}"),
        Err(e) => error!(error = %e, "Could not serialize invocation result"),
    }
    if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
