//! AWS SQS tracking-record queue.

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_sqs::config::BehaviorVersion;
use aws_sdk_sqs::types::{Message, MessageSystemAttributeName};
use aws_sdk_sqs::Client;
use chrono::{TimeZone, Utc};
use tracing::{debug, info};

use kbwatch_core::config::{AwsConfig, MAX_RECEIVE_BATCH};

use crate::client::{QueueClient, QueueMessage};
use crate::error::QueueError;

/// SQS-backed queue client.
pub struct SqsQueue {
    client: Client,
    queue_url: String,
    wait_time_secs: i32,
    visibility_timeout_secs: Option<i32>,
}

impl SqsQueue {
    /// Create a client for `queue_url`. Receives return immediately unless
    /// [`SqsQueue::with_receive_settings`] sets a long-poll wait.
    pub fn new(aws: &AwsConfig, queue_url: impl Into<String>) -> Self {
        let region = aws_sdk_sqs::config::Region::new(aws.region.clone());

        let mut sqs_config = aws_sdk_sqs::Config::builder()
            .region(region)
            .behavior_version(BehaviorVersion::latest());

        if let (Some(key_id), Some(secret)) = (&aws.access_key_id, &aws.secret_access_key) {
            let creds = Credentials::new(
                key_id,
                secret,
                aws.session_token.clone(),
                None,
                "kbwatch-queue-static",
            );
            sqs_config = sqs_config.credentials_provider(creds);
        }

        if let Some(endpoint) = aws.endpoint() {
            sqs_config = sqs_config.endpoint_url(endpoint);
        }

        let queue_url = queue_url.into();
        info!(queue_url = %queue_url, region = %aws.region, "SQS queue client initialized");

        Self {
            client: Client::from_conf(sqs_config.build()),
            queue_url,
            wait_time_secs: 0,
            visibility_timeout_secs: None,
        }
    }

    pub fn with_receive_settings(
        mut self,
        wait_time_secs: u32,
        visibility_timeout_secs: Option<u32>,
    ) -> Self {
        self.wait_time_secs = wait_time_secs.min(20) as i32;
        self.visibility_timeout_secs = visibility_timeout_secs.map(|v| v as i32);
        self
    }
}

/// Convert a received SQS message, reading its send time and receive count
/// from the system attributes.
fn to_queue_message(msg: Message) -> Result<QueueMessage, QueueError> {
    let id = msg.message_id().unwrap_or("unknown").to_string();
    let body = msg.body().unwrap_or("").to_string();

    let receipt_handle = msg
        .receipt_handle()
        .ok_or_else(|| QueueError::Parse(format!("message {id} has no receipt handle")))?
        .to_string();

    // SentTimestamp is epoch millis.
    let timestamp = msg
        .attributes()
        .and_then(|attrs| attrs.get(&MessageSystemAttributeName::SentTimestamp))
        .and_then(|ts| ts.parse::<i64>().ok())
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .unwrap_or_else(Utc::now);

    let attempt_count = msg
        .attributes()
        .and_then(|attrs| attrs.get(&MessageSystemAttributeName::ApproximateReceiveCount))
        .and_then(|c| c.parse::<u32>().ok())
        .unwrap_or(1);

    Ok(QueueMessage {
        id,
        body,
        receipt_handle,
        timestamp,
        attempt_count,
    })
}

#[async_trait]
impl QueueClient for SqsQueue {
    async fn poll_batch(&self, max_messages: u32) -> Result<Vec<QueueMessage>, QueueError> {
        let capped = max_messages.clamp(1, MAX_RECEIVE_BATCH) as i32;

        debug!(max_messages = capped, "Polling SQS");

        let mut request = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(capped)
            .wait_time_seconds(self.wait_time_secs)
            .message_system_attribute_names(MessageSystemAttributeName::All);
        if let Some(visibility) = self.visibility_timeout_secs {
            request = request.visibility_timeout(visibility);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| QueueError::Connection(format!("SQS receive failed: {e:?}")))?;

        let sqs_messages = resp.messages.unwrap_or_default();
        debug!(count = sqs_messages.len(), "Received SQS messages");

        sqs_messages.into_iter().map(to_queue_message).collect()
    }

    async fn ack(&self, receipt_handle: &str) -> Result<(), QueueError> {
        debug!(receipt_handle, "Deleting SQS message");

        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| QueueError::Ack(format!("SQS delete failed: {e:?}")))?;

        Ok(())
    }

    async fn send(&self, body: &str) -> Result<String, QueueError> {
        let resp = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| QueueError::Send(format!("SQS send failed: {e:?}")))?;

        let message_id = resp.message_id().unwrap_or("unknown").to_string();
        debug!(message_id = %message_id, "Sent SQS message");
        Ok(message_id)
    }
}
