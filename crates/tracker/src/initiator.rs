//! Starts ingestion jobs from the configured job list.
//!
//! The first failure aborts the run. Jobs started before it stay started, so
//! re-running after a partial failure starts those data sources again.

use std::sync::Arc;

use tracing::{info, warn};

use kbwatch_core::{
    parse_job_list, JobReference, KnowledgeBaseSources, ParameterStore, TrackerError,
};
use kbwatch_queue::{encode_tracking_record, QueueClient};

use crate::oracle::StatusOracle;

pub struct JobInitiator {
    oracle: Arc<dyn StatusOracle>,
    /// Where tracking records go; `None` when completion arrives via log events.
    registry: Option<Arc<dyn QueueClient>>,
}

impl JobInitiator {
    pub fn new(oracle: Arc<dyn StatusOracle>, registry: Option<Arc<dyn QueueClient>>) -> Self {
        Self { oracle, registry }
    }

    /// Load the job list from `params[job_list_param]` and start every job in it.
    pub async fn run(
        &self,
        params: &dyn ParameterStore,
        job_list_param: &str,
    ) -> Result<Vec<JobReference>, TrackerError> {
        let raw = params.get(job_list_param).await?;
        let sources = parse_job_list(&raw)?;
        self.start_all(&sources).await
    }

    /// Start one job per (knowledge base, data source) pair, in list order.
    pub async fn start_all(
        &self,
        sources: &[KnowledgeBaseSources],
    ) -> Result<Vec<JobReference>, TrackerError> {
        let mut started = Vec::new();

        for entry in sources {
            for data_source_id in &entry.data_source_ids {
                info!(
                    knowledge_base_id = %entry.knowledge_base_id,
                    data_source_id = %data_source_id,
                    "Starting ingestion job"
                );
                let job_id = self
                    .oracle
                    .start(&entry.knowledge_base_id, data_source_id)
                    .await
                    .inspect_err(|_| log_abort(&started))?;
                let reference = JobReference::new(&entry.knowledge_base_id, data_source_id, job_id);

                if let Some(registry) = &self.registry {
                    let body = encode_tracking_record(&reference)?;
                    let message_id = registry
                        .send(&body)
                        .await
                        .inspect_err(|_| log_abort(&started))?;
                    info!(%reference, message_id = %message_id, "Tracking record registered");
                }
                started.push(reference);
            }
        }

        info!(count = started.len(), "Ingestion jobs started");
        Ok(started)
    }
}

fn log_abort(started: &[JobReference]) {
    if !started.is_empty() {
        warn!(
            already_started = started.len(),
            "Aborting job start run; jobs already started will be started again on re-run"
        );
    }
}
