//! start-ingestion-jobs: starts one ingestion job per configured data source.
//!
//! Reads the job list from the parameter store and, unless `--no-registry`
//! is given, registers a tracking record per started job on the queue that
//! `check-job-statuses` drains.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use kbwatch_core::config::{load_dotenv, Config};
use kbwatch_core::{InvocationResult, ParameterStore};
use kbwatch_queue::{QueueClient, SqsQueue};
use kbwatch_tracker::aws::load_sdk_config;
use kbwatch_tracker::{BedrockOracle, JobInitiator, SsmParameterStore};

// ── CLI ─────────────────────────────────────────────────────────────

/// Start knowledge base ingestion jobs.
#[derive(Parser, Debug)]
#[command(name = "start-ingestion-jobs", version, about)]
struct Cli {
    /// Only start jobs; completion is observed from the log event stream.
    #[arg(long, env = "KBWATCH_NO_REGISTRY")]
    no_registry: bool,

    /// Queue URL for tracking records, instead of reading it from the parameter store.
    #[arg(long, env = "KBWATCH_INITIATOR_QUEUE_URL")]
    queue_url: Option<String>,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_summary();

    let sdk = load_sdk_config(&config.aws).await;
    let params = SsmParameterStore::new(&sdk);
    let oracle = Arc::new(BedrockOracle::new(&sdk));

    let registry: Option<Arc<dyn QueueClient>> = if cli.no_registry {
        None
    } else {
        let queue_url = match cli.queue_url {
            Some(url) => url,
            None => match params.get(&config.params.initiator_queue_url).await {
                Ok(url) => url,
                Err(e) => return Ok(kbwatch_tracker::emit(&InvocationResult::failure(&e))),
            },
        };
        let queue: Arc<dyn QueueClient> = Arc::new(SqsQueue::new(&config.aws, queue_url));
        Some(queue)
    };

    let initiator = JobInitiator::new(oracle, registry);
    let outcome = initiator.run(&params, &config.params.job_list).await;
    if let Ok(started) = &outcome {
        info!(count = started.len(), "start-ingestion-jobs finished");
    }
    Ok(kbwatch_tracker::emit(&InvocationResult::from(&outcome)))
}
