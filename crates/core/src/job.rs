use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TrackerError;
use crate::status::JobStatus;

/// The identifier triple of one ingestion job.
///
/// Field names match the tracking-record payload written to the queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobReference {
    pub knowledge_base_id: String,
    pub data_source_id: String,
    pub ingestion_job_id: String,
}

impl JobReference {
    pub fn new(
        knowledge_base_id: impl Into<String>,
        data_source_id: impl Into<String>,
        ingestion_job_id: impl Into<String>,
    ) -> Self {
        Self {
            knowledge_base_id: knowledge_base_id.into(),
            data_source_id: data_source_id.into(),
            ingestion_job_id: ingestion_job_id.into(),
        }
    }

    /// Build a reference from a knowledge base ARN, keeping its final path segment.
    ///
    /// `arn:aws:bedrock:us-east-1:123:knowledge-base/KB9` yields `KB9`.
    pub fn from_knowledge_base_arn(
        knowledge_base_arn: &str,
        data_source_id: impl Into<String>,
        ingestion_job_id: impl Into<String>,
    ) -> Result<Self, TrackerError> {
        let knowledge_base_id = knowledge_base_arn
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                TrackerError::malformed(format!(
                    "knowledge base ARN '{knowledge_base_arn}' has no id segment"
                ))
            })?;
        Ok(Self::new(knowledge_base_id, data_source_id, ingestion_job_id))
    }
}

impl fmt::Display for JobReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "knowledge base {} data source {} job {}",
            self.knowledge_base_id, self.data_source_id, self.ingestion_job_id
        )
    }
}

/// A point-in-time view of an ingestion job as reported by the job service.
///
/// `detail` is kept in a sorted map so its serialization is stable across
/// runs and can be diffed in an audit trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestionJob {
    pub reference: JobReference,
    pub status: JobStatus,
    pub detail: BTreeMap<String, Value>,
}

impl IngestionJob {
    /// Create a snapshot whose detail already carries the ids and status.
    pub fn new(reference: JobReference, status: JobStatus) -> Self {
        let mut detail = BTreeMap::new();
        detail.insert(
            "knowledgeBaseId".to_string(),
            Value::String(reference.knowledge_base_id.clone()),
        );
        detail.insert(
            "dataSourceId".to_string(),
            Value::String(reference.data_source_id.clone()),
        );
        detail.insert(
            "ingestionJobId".to_string(),
            Value::String(reference.ingestion_job_id.clone()),
        );
        detail.insert("status".to_string(), Value::String(status.to_string()));
        Self {
            reference,
            status,
            detail,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.detail.insert(key.into(), value.into());
        self
    }

    /// Pretty-printed detail with sorted keys.
    pub fn detail_json(&self) -> String {
        serde_json::to_string_pretty(&self.detail).unwrap_or_else(|_| "{}".to_string())
    }
}

/// One entry of the initiator's job list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseSources {
    pub knowledge_base_id: String,
    #[serde(default)]
    pub data_source_ids: Vec<String>,
}

/// Parse the initiator's job list, e.g.
/// `[{"knowledge_base_id": "kb1", "data_source_ids": ["ds1", "ds2"]}]`.
pub fn parse_job_list(raw: &str) -> Result<Vec<KnowledgeBaseSources>, TrackerError> {
    serde_json::from_str(raw)
        .map_err(|e| TrackerError::malformed(format!("invalid ingestion job list: {e}")))
}

/// Status code and body returned to whatever invoked a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResult {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResult {
    pub fn success() -> Self {
        Self {
            status_code: 200,
            body: "Success".to_string(),
        }
    }

    pub fn failure(err: &TrackerError) -> Self {
        Self {
            status_code: 500,
            body: format!("{}: {}", err.kind(), err),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

impl<T> From<&Result<T, TrackerError>> for InvocationResult {
    fn from(result: &Result<T, TrackerError>) -> Self {
        match result {
            Ok(_) => Self::success(),
            Err(e) => Self::failure(e),
        }
    }
}
