//! check-job-statuses-from-logs: checks the jobs named in one pushed batch
//! of completion log events and notifies on finished ones.
//!
//! The batch is read as JSON (`{"awslogs": {"data": ...}}` or `{"data": ...}`)
//! from `--input` or stdin.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use kbwatch_core::config::{load_dotenv, Config};
use kbwatch_core::InvocationResult;
use kbwatch_notify::{Dispatcher, SnsPublisher};
use kbwatch_tracker::aws::load_sdk_config;
use kbwatch_tracker::{
    run_detector, BedrockOracle, LogEventDetector, LogInput, SsmParameterStore, StatusChecker,
};

// ── CLI ─────────────────────────────────────────────────────────────

/// Check ingestion job statuses from a log subscription batch.
#[derive(Parser, Debug)]
#[command(name = "check-job-statuses-from-logs", version, about)]
struct Cli {
    /// File holding the batch payload; stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,
}

fn read_payload(input: Option<&PathBuf>) -> anyhow::Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading batch payload from {}", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("reading batch payload from stdin")?;
            Ok(raw)
        }
    }
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
    let raw = read_payload(cli.input.as_ref())?;
    let envelope = match LogInput::parse(&raw) {
        Ok(input) => input.into_envelope(),
        Err(e) => return Ok(kbwatch_tracker::emit(&InvocationResult::failure(&e))),
    };

    let config = Config::from_env();
    config.log_summary();

    let sdk = load_sdk_config(&config.aws).await;
    let params = Arc::new(SsmParameterStore::new(&sdk));
    let dispatcher = Dispatcher::from_names(
        Arc::new(SnsPublisher::new(&config.aws)),
        params,
        &config.params,
    );
    let checker = StatusChecker::new(Arc::new(BedrockOracle::new(&sdk)), dispatcher);

    let result = run_detector(&LogEventDetector::new(envelope), &checker).await;
    Ok(kbwatch_tracker::emit(&result))
}
