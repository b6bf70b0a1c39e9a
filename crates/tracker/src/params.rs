//! SSM Parameter Store lookups.

use async_trait::async_trait;
use aws_config::SdkConfig;
use tracing::debug;

use kbwatch_core::{ParameterStore, TrackerError};

pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    pub fn new(sdk: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_ssm::Client::new(sdk),
        }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    /// Fetch a parameter, decrypting `SecureString` values.
    async fn get(&self, name: &str) -> Result<String, TrackerError> {
        debug!(name, "Reading SSM parameter");

        let resp = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| TrackerError::transport("ssm", format!("get parameter {name}: {e:?}")))?;

        resp.parameter()
            .and_then(|p| p.value())
            .map(str::to_string)
            .ok_or_else(|| TrackerError::transport("ssm", format!("parameter {name} has no value")))
    }
}
