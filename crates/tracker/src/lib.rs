//! Ingestion job completion tracking.
//!
//! Jobs are started by [`JobInitiator`]; their completion is observed by one
//! of two [`Detector`]s sharing a [`StatusChecker`]:
//! - [`QueueDetector`] drains tracking records from a queue
//! - [`LogEventDetector`] decodes a pushed batch of completion log events

pub mod aws;
pub mod checker;
pub mod detector;
pub mod initiator;
pub mod log_detector;
pub mod logs;
pub mod oracle;
pub mod params;
pub mod queue_detector;

#[cfg(test)]
mod testing;

pub use checker::{Observation, StatusChecker};
pub use detector::{emit, run_detector, DetectionSummary, Detector};
pub use initiator::JobInitiator;
pub use log_detector::LogEventDetector;
pub use logs::{decode_log_batch, parse_completion_event, LogBatch, LogEnvelope, LogInput};
pub use oracle::{BedrockOracle, StatusOracle};
pub use params::SsmParameterStore;
pub use queue_detector::QueueDetector;
