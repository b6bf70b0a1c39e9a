//! Shared AWS SDK configuration.

use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::Credentials;
use aws_types::region::Region;
use tracing::info;

use kbwatch_core::config::AwsConfig;

/// Load an SDK config for the configured region, with static credentials and
/// an endpoint override when they are set.
pub async fn load_sdk_config(aws: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(aws.region.clone()));

    if let (Some(key_id), Some(secret)) = (&aws.access_key_id, &aws.secret_access_key) {
        loader = loader.credentials_provider(Credentials::new(
            key_id,
            secret,
            aws.session_token.clone(),
            None,
            "kbwatch-static",
        ));
    }

    if let Some(endpoint) = aws.endpoint() {
        loader = loader.endpoint_url(endpoint);
    }

    let sdk = loader.load().await;
    info!(region = %aws.region, "AWS SDK config loaded");
    sdk
}
