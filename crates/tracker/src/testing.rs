//! Test doubles for the queue, job service and pub/sub seams.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use kbwatch_core::{IngestionJob, JobReference, JobStatus, StaticParameters, TrackerError};
use kbwatch_notify::{Dispatcher, NotifyError, Publisher};
use kbwatch_queue::{encode_tracking_record, QueueClient, QueueError, QueueMessage};

use crate::checker::StatusChecker;
use crate::oracle::StatusOracle;

pub const SUCCESS_PARAM: &str = "/test/success-topic";
pub const FAILURE_PARAM: &str = "/test/failure-topic";
pub const SUCCESS_TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:ingest-ok";
pub const FAILURE_TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:ingest-failed";

pub fn checker(oracle: Arc<FakeOracle>, publisher: Arc<RecordingPublisher>) -> StatusChecker {
    let params = Arc::new(
        StaticParameters::new()
            .with(SUCCESS_PARAM, SUCCESS_TOPIC)
            .with(FAILURE_PARAM, FAILURE_TOPIC),
    );
    StatusChecker::new(
        oracle,
        Dispatcher::new(publisher, params, SUCCESS_PARAM, FAILURE_PARAM),
    )
}

// ── Queue ─────────────────────────────────────────────────────

/// In-memory queue. A received message is in flight and is not returned by
/// later receives, unless `redelivering` is set.
#[derive(Default)]
pub struct FakeQueue {
    visible: Mutex<VecDeque<QueueMessage>>,
    all: Vec<QueueMessage>,
    acked: Mutex<Vec<String>>,
    sent: Mutex<Vec<String>>,
    polls: AtomicUsize,
    fail_receive: bool,
    fail_send_after: Option<usize>,
    redeliver: bool,
}

impl FakeQueue {
    pub fn with_bodies(bodies: &[&str]) -> Self {
        let messages: Vec<QueueMessage> = bodies
            .iter()
            .enumerate()
            .map(|(i, body)| QueueMessage {
                id: format!("msg-{i}"),
                body: body.to_string(),
                receipt_handle: format!("handle-{i}"),
                timestamp: Utc::now(),
                attempt_count: 1,
            })
            .collect();
        Self {
            visible: Mutex::new(messages.iter().cloned().collect()),
            all: messages,
            ..Default::default()
        }
    }

    pub fn with_records(records: &[(&str, &str, &str)]) -> Self {
        let bodies: Vec<String> = records
            .iter()
            .map(|(kb, ds, job)| {
                encode_tracking_record(&JobReference::new(*kb, *ds, *job)).unwrap()
            })
            .collect();
        let refs: Vec<&str> = bodies.iter().map(String::as_str).collect();
        Self::with_bodies(&refs)
    }

    pub fn failing_receive(mut self) -> Self {
        self.fail_receive = true;
        self
    }

    /// Fail every send after the first `n` succeed.
    pub fn failing_send_after(mut self, n: usize) -> Self {
        self.fail_send_after = Some(n);
        self
    }

    pub fn redelivering(mut self) -> Self {
        self.redeliver = true;
        self
    }

    pub fn acked(&self) -> Vec<String> {
        self.acked.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueueClient for FakeQueue {
    async fn poll_batch(&self, max_messages: u32) -> Result<Vec<QueueMessage>, QueueError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        if self.fail_receive {
            return Err(QueueError::Connection("receive denied".to_string()));
        }
        let max = max_messages as usize;
        if self.redeliver {
            return Ok(self.all.iter().take(max).cloned().collect());
        }
        let mut visible = self.visible.lock().unwrap();
        let n = max.min(visible.len());
        Ok(visible.drain(..n).collect())
    }

    async fn ack(&self, receipt_handle: &str) -> Result<(), QueueError> {
        self.acked.lock().unwrap().push(receipt_handle.to_string());
        Ok(())
    }

    async fn send(&self, body: &str) -> Result<String, QueueError> {
        let mut sent = self.sent.lock().unwrap();
        if self.fail_send_after.is_some_and(|n| sent.len() >= n) {
            return Err(QueueError::Send("queue unavailable".to_string()));
        }
        sent.push(body.to_string());
        Ok(format!("sent-{}", sent.len()))
    }
}

// ── Job service ───────────────────────────────────────────────

#[derive(Default)]
pub struct FakeOracle {
    statuses: HashMap<String, JobStatus>,
    default_status: Option<JobStatus>,
    failing: HashSet<String>,
    fail_start_on: Option<String>,
    queries: Mutex<Vec<JobReference>>,
    started: Mutex<Vec<(String, String)>>,
}

impl FakeOracle {
    pub fn with_status(mut self, job_id: &str, status: JobStatus) -> Self {
        self.statuses.insert(job_id.to_string(), status);
        self
    }

    pub fn with_default(mut self, status: JobStatus) -> Self {
        self.default_status = Some(status);
        self
    }

    /// Status queries for `job_id` fail with a transport error.
    pub fn failing_on(mut self, job_id: &str) -> Self {
        self.failing.insert(job_id.to_string());
        self
    }

    /// Starting a job for `data_source_id` fails.
    pub fn failing_start_on(mut self, data_source_id: &str) -> Self {
        self.fail_start_on = Some(data_source_id.to_string());
        self
    }

    pub fn queries(&self) -> Vec<JobReference> {
        self.queries.lock().unwrap().clone()
    }

    pub fn started(&self) -> Vec<(String, String)> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusOracle for FakeOracle {
    async fn start(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<String, TrackerError> {
        if self.fail_start_on.as_deref() == Some(data_source_id) {
            return Err(TrackerError::transport("bedrock-agent", "ThrottlingException"));
        }
        let mut started = self.started.lock().unwrap();
        started.push((knowledge_base_id.to_string(), data_source_id.to_string()));
        Ok(format!("job-{}", started.len()))
    }

    async fn get_status(&self, reference: &JobReference) -> Result<IngestionJob, TrackerError> {
        self.queries.lock().unwrap().push(reference.clone());
        if self.failing.contains(&reference.ingestion_job_id) {
            return Err(TrackerError::transport("bedrock-agent", "AccessDeniedException"));
        }
        let status = self
            .statuses
            .get(&reference.ingestion_job_id)
            .or(self.default_status.as_ref())
            .cloned()
            .unwrap_or(JobStatus::InProgress);
        Ok(IngestionJob::new(reference.clone(), status))
    }
}

// ── Pub/sub ───────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(String, String, String)>>,
    fail: bool,
    fail_subject: Option<String>,
}

impl RecordingPublisher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Fail only publishes whose subject contains `fragment`.
    pub fn failing_for(fragment: &str) -> Self {
        Self {
            fail_subject: Some(fragment.to_string()),
            ..Default::default()
        }
    }

    /// `(destination, subject, body)` of every successful publish.
    pub fn published(&self) -> Vec<(String, String, String)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(
        &self,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, NotifyError> {
        let rejected = self.fail_subject.as_deref().is_some_and(|f| subject.contains(f));
        if self.fail || rejected {
            return Err(NotifyError::Publish("AuthorizationError".to_string()));
        }
        let mut published = self.published.lock().unwrap();
        published.push((destination.to_string(), subject.to_string(), body.to_string()));
        Ok(format!("sns-{}", published.len()))
    }

    fn channel_name(&self) -> &str {
        "recording"
    }
}
