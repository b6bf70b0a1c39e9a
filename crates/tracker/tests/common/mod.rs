//! In-memory stand-ins for the queue, job service and pub/sub transport.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::json;

use kbwatch_core::{IngestionJob, JobReference, JobStatus, StaticParameters, TrackerError};
use kbwatch_notify::{Dispatcher, NotifyError, Publisher};
use kbwatch_queue::{QueueClient, QueueError, QueueMessage};
use kbwatch_tracker::{StatusChecker, StatusOracle};

pub const SUCCESS_TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:kb-ingest-success";
pub const FAILURE_TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:kb-ingest-failure";

/// Queue with SQS-like leases: a received message is hidden until `expire_leases`.
#[derive(Default)]
pub struct MemoryQueue {
    next_id: Mutex<usize>,
    visible: Mutex<VecDeque<QueueMessage>>,
    in_flight: Mutex<Vec<QueueMessage>>,
    deleted: Mutex<Vec<String>>,
}

impl MemoryQueue {
    pub fn push(&self, body: &str) {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        self.visible.lock().unwrap().push_back(QueueMessage {
            id: format!("msg-{next}"),
            body: body.to_string(),
            receipt_handle: format!("receipt-{next}"),
            timestamp: chrono::Utc::now(),
            attempt_count: 1,
        });
    }

    /// Make every un-deleted in-flight message visible again.
    pub fn expire_leases(&self) {
        let mut in_flight = self.in_flight.lock().unwrap();
        let mut visible = self.visible.lock().unwrap();
        for mut msg in in_flight.drain(..) {
            msg.attempt_count += 1;
            visible.push_back(msg);
        }
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn depth(&self) -> usize {
        self.visible.lock().unwrap().len() + self.in_flight.lock().unwrap().len()
    }

    pub fn bodies(&self) -> Vec<String> {
        let visible = self.visible.lock().unwrap();
        let in_flight = self.in_flight.lock().unwrap();
        visible.iter().chain(in_flight.iter()).map(|m| m.body.clone()).collect()
    }
}

#[async_trait]
impl QueueClient for MemoryQueue {
    async fn poll_batch(&self, max_messages: u32) -> Result<Vec<QueueMessage>, QueueError> {
        let mut visible = self.visible.lock().unwrap();
        let n = (max_messages as usize).min(visible.len());
        let batch: Vec<QueueMessage> = visible.drain(..n).collect();
        self.in_flight.lock().unwrap().extend(batch.iter().cloned());
        Ok(batch)
    }

    async fn ack(&self, receipt_handle: &str) -> Result<(), QueueError> {
        self.in_flight
            .lock()
            .unwrap()
            .retain(|m| m.receipt_handle != receipt_handle);
        self.deleted.lock().unwrap().push(receipt_handle.to_string());
        Ok(())
    }

    async fn send(&self, body: &str) -> Result<String, QueueError> {
        self.push(body);
        Ok(format!("msg-{}", *self.next_id.lock().unwrap()))
    }
}

/// Job service answering from a status table; unknown jobs are `IN_PROGRESS`.
#[derive(Default)]
pub struct ScriptedOracle {
    pub statuses: Mutex<HashMap<String, JobStatus>>,
    pub unavailable_for: Mutex<Vec<String>>,
    pub starts: Mutex<Vec<(String, String)>>,
    pub queries: Mutex<Vec<JobReference>>,
}

impl ScriptedOracle {
    pub fn set(&self, job_id: &str, status: JobStatus) {
        self.statuses.lock().unwrap().insert(job_id.to_string(), status);
    }

    pub fn unavailable_for(&self, job_id: &str) {
        self.unavailable_for.lock().unwrap().push(job_id.to_string());
    }
}

#[async_trait]
impl StatusOracle for ScriptedOracle {
    async fn start(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<String, TrackerError> {
        let mut starts = self.starts.lock().unwrap();
        starts.push((knowledge_base_id.to_string(), data_source_id.to_string()));
        Ok(format!("{data_source_id}-job"))
    }

    async fn get_status(&self, reference: &JobReference) -> Result<IngestionJob, TrackerError> {
        self.queries.lock().unwrap().push(reference.clone());
        if self.unavailable_for.lock().unwrap().contains(&reference.ingestion_job_id) {
            return Err(TrackerError::transport("bedrock-agent", "ServiceUnavailable"));
        }
        let status = self
            .statuses
            .lock()
            .unwrap()
            .get(&reference.ingestion_job_id)
            .cloned()
            .unwrap_or(JobStatus::InProgress);
        Ok(IngestionJob::new(reference.clone(), status)
            .with_detail("statistics", json!({"numberOfDocumentsScanned": 12})))
    }
}

#[derive(Default)]
pub struct Outbox {
    pub messages: Mutex<Vec<(String, String, String)>>,
    /// Publishes whose subject contains this fragment are refused.
    pub refuse: Mutex<Option<String>>,
}

impl Outbox {
    pub fn refusing(fragment: &str) -> Self {
        Self {
            refuse: Mutex::new(Some(fragment.to_string())),
            ..Default::default()
        }
    }

    pub fn to(&self, topic: &str) -> Vec<(String, String)> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _, _)| t == topic)
            .map(|(_, subject, body)| (subject.clone(), body.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl Publisher for Outbox {
    async fn publish(
        &self,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, NotifyError> {
        if let Some(fragment) = self.refuse.lock().unwrap().as_deref() {
            if subject.contains(fragment) {
                return Err(NotifyError::Publish(format!("topic refused {subject}")));
            }
        }
        let mut messages = self.messages.lock().unwrap();
        messages.push((destination.to_string(), subject.to_string(), body.to_string()));
        Ok(messages.len().to_string())
    }

    fn channel_name(&self) -> &str {
        "outbox"
    }
}

pub fn params() -> StaticParameters {
    StaticParameters::new()
        .with("/check-kb-ingestion-job-statuses/success-sns-topic-arn", SUCCESS_TOPIC)
        .with("/check-kb-ingestion-job-statuses/failure-sns-topic-arn", FAILURE_TOPIC)
        .with(
            "/start-kb-ingestion-jobs/config-json",
            r#"[{"knowledge_base_id":"kb1","data_source_ids":["ds1","ds2"]}]"#,
        )
}

pub fn status_checker(oracle: Arc<ScriptedOracle>, outbox: Arc<Outbox>) -> StatusChecker {
    let dispatcher = Dispatcher::new(
        outbox,
        Arc::new(params()),
        "/check-kb-ingestion-job-statuses/success-sns-topic-arn",
        "/check-kb-ingestion-job-statuses/failure-sns-topic-arn",
    );
    StatusChecker::new(oracle, dispatcher)
}

pub fn log_event(knowledge_base_arn: &str, data_source_id: &str, ingestion_job_id: &str) -> String {
    json!({
        "event": {
            "knowledge_base_arn": knowledge_base_arn,
            "data_source_id": data_source_id,
            "ingestion_job_id": ingestion_job_id,
            "status": "COMPLETE"
        },
        "event_type": "StartIngestionJob.StatusChanged",
        "level": "INFO"
    })
    .to_string()
}

/// `{"awslogs": {"data": base64(gzip(json))}}` for the given event messages.
pub fn awslogs_payload(messages: &[String]) -> String {
    let events: Vec<_> = messages
        .iter()
        .enumerate()
        .map(|(i, m)| {
            json!({
                "id": format!("evt-{i}"),
                "timestamp": 1_718_000_000_000_i64 + i as i64,
                "message": m,
            })
        })
        .collect();
    let doc = json!({
        "messageType": "DATA_MESSAGE",
        "owner": "123456789012",
        "logGroup": "/aws/vendedlogs/bedrock/knowledge-base/APPLICATION_LOGS/kb9",
        "logStream": "log_stream_created_by_aws_to_deliver_logs",
        "subscriptionFilters": ["ingestion-complete"],
        "logEvents": events,
    });
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(doc.to_string().as_bytes()).unwrap();
    json!({"awslogs": {"data": STANDARD.encode(encoder.finish().unwrap())}}).to_string()
}
