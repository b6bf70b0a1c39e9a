//! Key-value configuration store seam (parameter names → values).

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::TrackerError;

/// Looks up configuration values by name. No caching is implied.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<String, TrackerError>;
}

/// In-memory parameter store, for local runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticParameters {
    values: HashMap<String, String>,
}

impl StaticParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

#[async_trait]
impl ParameterStore for StaticParameters {
    async fn get(&self, name: &str) -> Result<String, TrackerError> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| {
                TrackerError::transport("parameter store", format!("parameter {name} not found"))
            })
    }
}
