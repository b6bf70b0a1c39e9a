//! AWS SNS publisher.

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_sns::config::BehaviorVersion;
use aws_sdk_sns::Client;
use tracing::{debug, info};

use kbwatch_core::config::AwsConfig;

use crate::traits::{NotifyError, Publisher};

/// SNS rejects subjects longer than this.
pub const MAX_SUBJECT_CHARS: usize = 100;

/// Publishes notifications to SNS topics.
pub struct SnsPublisher {
    client: Client,
}

impl SnsPublisher {
    pub fn new(aws: &AwsConfig) -> Self {
        let region = aws_sdk_sns::config::Region::new(aws.region.clone());

        let mut sns_config = aws_sdk_sns::Config::builder()
            .region(region)
            .behavior_version(BehaviorVersion::latest());

        if let (Some(key_id), Some(secret)) = (&aws.access_key_id, &aws.secret_access_key) {
            let creds = Credentials::new(
                key_id,
                secret,
                aws.session_token.clone(),
                None,
                "kbwatch-notify-static",
            );
            sns_config = sns_config.credentials_provider(creds);
        }

        if let Some(endpoint) = aws.endpoint() {
            sns_config = sns_config.endpoint_url(endpoint);
        }

        info!(region = %aws.region, "SNS publisher initialized");

        Self {
            client: Client::from_conf(sns_config.build()),
        }
    }
}

/// Make a subject SNS will accept: single line, at most [`MAX_SUBJECT_CHARS`].
pub fn sanitize_subject(subject: &str) -> String {
    subject
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .take(MAX_SUBJECT_CHARS)
        .collect()
}

#[async_trait]
impl Publisher for SnsPublisher {
    async fn publish(
        &self,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, NotifyError> {
        let resp = self
            .client
            .publish()
            .topic_arn(destination)
            .subject(sanitize_subject(subject))
            .message(body)
            .send()
            .await
            .map_err(|e| {
                NotifyError::Publish(format!("SNS publish to {destination} failed: {e:?}"))
            })?;

        let message_id = resp.message_id().unwrap_or("unknown").to_string();
        debug!(topic_arn = destination, message_id = %message_id, "Published to SNS");
        Ok(message_id)
    }

    fn channel_name(&self) -> &str {
        "sns"
    }
}
