pub mod client;
pub mod error;
pub mod parser;
pub mod sqs;

pub use client::{QueueClient, QueueMessage};
pub use error::QueueError;
pub use parser::{encode_tracking_record, parse_batch, parse_tracking_record};
pub use sqs::SqsQueue;
