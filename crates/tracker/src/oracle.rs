//! The job service that starts ingestion jobs and reports their status.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_bedrockagent::primitives::DateTimeFormat;
use serde_json::json;
use tracing::{debug, info};

use kbwatch_core::{IngestionJob, JobReference, JobStatus, TrackerError};

/// Starts ingestion jobs and answers status queries for them.
#[async_trait]
pub trait StatusOracle: Send + Sync {
    /// Start an ingestion job for one data source; returns the new job id.
    async fn start(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<String, TrackerError>;

    /// Current status and detail of a job.
    async fn get_status(&self, reference: &JobReference) -> Result<IngestionJob, TrackerError>;
}

/// Amazon Bedrock knowledge base ingestion jobs.
pub struct BedrockOracle {
    client: aws_sdk_bedrockagent::Client,
}

impl BedrockOracle {
    pub fn new(sdk: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_bedrockagent::Client::new(sdk),
        }
    }
}

fn to_snapshot(
    reference: &JobReference,
    job: &aws_sdk_bedrockagent::types::IngestionJob,
) -> IngestionJob {
    let status = JobStatus::from(job.status().as_str());
    let mut snapshot = IngestionJob::new(reference.clone(), status)
        .with_detail("failureReasons", job.failure_reasons().to_vec());

    if let Some(description) = job.description() {
        snapshot = snapshot.with_detail("description", description);
    }
    if let Ok(started_at) = job.started_at().fmt(DateTimeFormat::DateTime) {
        snapshot = snapshot.with_detail("startedAt", started_at);
    }
    if let Ok(updated_at) = job.updated_at().fmt(DateTimeFormat::DateTime) {
        snapshot = snapshot.with_detail("updatedAt", updated_at);
    }
    if let Some(stats) = job.statistics() {
        snapshot = snapshot.with_detail(
            "statistics",
            json!({
                "numberOfDocumentsScanned": stats.number_of_documents_scanned(),
                "numberOfNewDocumentsIndexed": stats.number_of_new_documents_indexed(),
                "numberOfModifiedDocumentsIndexed": stats.number_of_modified_documents_indexed(),
                "numberOfDocumentsDeleted": stats.number_of_documents_deleted(),
                "numberOfDocumentsFailed": stats.number_of_documents_failed(),
            }),
        );
    }
    snapshot
}

#[async_trait]
impl StatusOracle for BedrockOracle {
    async fn start(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<String, TrackerError> {
        let resp = self
            .client
            .start_ingestion_job()
            .knowledge_base_id(knowledge_base_id)
            .data_source_id(data_source_id)
            .send()
            .await
            .map_err(|e| {
                TrackerError::transport(
                    "bedrock-agent",
                    format!("start ingestion job for {knowledge_base_id}/{data_source_id}: {e:?}"),
                )
            })?;

        let job_id = resp
            .ingestion_job()
            .map(|job| job.ingestion_job_id().to_string())
            .ok_or_else(|| {
                TrackerError::Unexpected(format!(
                    "start ingestion job for {knowledge_base_id}/{data_source_id} returned no job"
                ))
            })?;

        info!(
            knowledge_base_id,
            data_source_id,
            ingestion_job_id = %job_id,
            "Ingestion job started"
        );
        Ok(job_id)
    }

    async fn get_status(&self, reference: &JobReference) -> Result<IngestionJob, TrackerError> {
        debug!(%reference, "Querying ingestion job");

        let resp = self
            .client
            .get_ingestion_job()
            .knowledge_base_id(&reference.knowledge_base_id)
            .data_source_id(&reference.data_source_id)
            .ingestion_job_id(&reference.ingestion_job_id)
            .send()
            .await
            .map_err(|e| {
                TrackerError::transport(
                    "bedrock-agent",
                    format!("get ingestion job for {reference}: {e:?}"),
                )
            })?;

        resp.ingestion_job()
            .map(|job| to_snapshot(reference, job))
            .ok_or_else(|| {
                TrackerError::Unexpected(format!("no ingestion job returned for {reference}"))
            })
    }
}
