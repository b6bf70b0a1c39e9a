//! Completion notifications for ingestion jobs.
//!
//! This crate provides:
//! - `Publisher` trait for the pub/sub transport
//! - SNS publisher implementation
//! - Dispatcher that resolves a channel's destination and publishes to it

pub mod dispatcher;
pub mod sns;
pub mod traits;

pub use dispatcher::Dispatcher;
pub use sns::SnsPublisher;
pub use traits::{DispatchResult, NotifyError, Publisher};
