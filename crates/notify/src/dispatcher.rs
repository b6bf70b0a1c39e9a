//! Routes notifications to the destination configured for their channel.
//!
//! Destinations are looked up in the parameter store on every dispatch, so a
//! topic change takes effect on the next notification. Nothing is retried
//! here; a failure is returned to the caller.

use std::sync::Arc;
use std::time::Instant;

use kbwatch_core::config::ParameterNames;
use kbwatch_core::{Channel, NotificationEvent, ParameterStore};

use crate::traits::{DispatchResult, NotifyError, Publisher};

/// Publishes [`NotificationEvent`]s to the success or failure destination.
pub struct Dispatcher {
    publisher: Arc<dyn Publisher>,
    params: Arc<dyn ParameterStore>,
    /// Parameter name holding the success destination.
    success_param: String,
    /// Parameter name holding the failure destination.
    failure_param: String,
}

impl Dispatcher {
    pub fn new(
        publisher: Arc<dyn Publisher>,
        params: Arc<dyn ParameterStore>,
        success_param: impl Into<String>,
        failure_param: impl Into<String>,
    ) -> Self {
        Self {
            publisher,
            params,
            success_param: success_param.into(),
            failure_param: failure_param.into(),
        }
    }

    /// Create a dispatcher using the configured topic parameter names.
    pub fn from_names(
        publisher: Arc<dyn Publisher>,
        params: Arc<dyn ParameterStore>,
        names: &ParameterNames,
    ) -> Self {
        Self::new(
            publisher,
            params,
            names.success_topic_arn.clone(),
            names.failure_topic_arn.clone(),
        )
    }

    fn param_for(&self, channel: Channel) -> &str {
        match channel {
            Channel::Success => &self.success_param,
            Channel::Failure => &self.failure_param,
        }
    }

    /// Resolve the event's destination and publish it once.
    pub async fn dispatch(&self, event: &NotificationEvent) -> Result<DispatchResult, NotifyError> {
        let param = self.param_for(event.channel);
        let destination = self
            .params
            .get(param)
            .await
            .map_err(|e| NotifyError::Destination(format!("{param}: {e}")))?;

        let start = Instant::now();
        let result = self
            .publisher
            .publish(&destination, &event.subject, &event.body)
            .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(message_id) => {
                tracing::info!(
                    channel = %event.channel,
                    transport = self.publisher.channel_name(),
                    destination = %destination,
                    subject = %event.subject,
                    duration_ms,
                    "Notification delivered"
                );
                Ok(DispatchResult {
                    channel: event.channel,
                    destination,
                    message_id,
                    duration_ms,
                })
            }
            Err(e) => {
                tracing::warn!(
                    channel = %event.channel,
                    transport = self.publisher.channel_name(),
                    destination = %destination,
                    error = %e,
                    duration_ms,
                    "Notification delivery failed"
                );
                Err(e)
            }
        }
    }
}
