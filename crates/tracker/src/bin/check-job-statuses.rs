//! check-job-statuses: drains the tracking queue and notifies on finished jobs.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use kbwatch_core::config::{load_dotenv, Config};
use kbwatch_core::{InvocationResult, ParameterStore};
use kbwatch_notify::{Dispatcher, SnsPublisher};
use kbwatch_queue::SqsQueue;
use kbwatch_tracker::aws::load_sdk_config;
use kbwatch_tracker::{run_detector, BedrockOracle, QueueDetector, SsmParameterStore, StatusChecker};

// ── CLI ─────────────────────────────────────────────────────────────

/// Check ingestion job statuses from the tracking queue.
#[derive(Parser, Debug)]
#[command(name = "check-job-statuses", version, about)]
struct Cli {
    /// Queue URL to drain, instead of reading it from the parameter store.
    #[arg(long, env = "KBWATCH_CHECKER_QUEUE_URL")]
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
    let params = Arc::new(SsmParameterStore::new(&sdk));

    let queue_url = match cli.queue_url {
        Some(url) => url,
        None => match params.get(&config.params.checker_queue_url).await {
            Ok(url) => url,
            Err(e) => return Ok(kbwatch_tracker::emit(&InvocationResult::failure(&e))),
        },
    };
    let queue = SqsQueue::new(&config.aws, queue_url).with_receive_settings(
        config.checker.wait_time_secs,
        config.checker.visibility_timeout_secs,
    );

    let dispatcher = Dispatcher::from_names(
        Arc::new(SnsPublisher::new(&config.aws)),
        params,
        &config.params,
    );
    let checker = StatusChecker::new(Arc::new(BedrockOracle::new(&sdk)), dispatcher);
    let detector = QueueDetector::new(Arc::new(queue), config.checker.clone());

    let result = run_detector(&detector, &checker).await;
    Ok(kbwatch_tracker::emit(&result))
}
