//! Kafka preflight entry point
//!
//! Runs the layered diagnosis once and exits with the verdict's recommended
//! code: 0 healthy, 1 failed, 2 misconfigured. Diagnostic records go to
//! stderr; stdout carries only the verdict JSON when `--json` is given.

mod args;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use args::Args;
use clap::Parser;
use kafka_preflight_broker::KafkaBrokerClient;
use kafka_preflight_core::types::{HealthVerdict, ProbeConfig};
use kafka_preflight_core::utils::redact::redact_value;
use kafka_preflight_core::{DiagnosticLog, LogFacadeSink, ProbeOrchestrator};
use kafka_preflight_netprobe::NetProbeService;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing to stderr (stdout is reserved for --json)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("kafka-preflight aborted: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    if let Some(warning) = args.credential_warning() {
        tracing::warn!("{warning}");
    }
    let keep_alive = args.keep_alive;
    let json = args.json;
    let config = args.into_config();

    let secrets: Vec<String> = config
        .credentials
        .iter()
        .map(|c| c.password.clone())
        .collect();
    let log = secrets.iter().fold(
        DiagnosticLog::new(Arc::new(LogFacadeSink)).with_field("client_id", config.client_id.clone()),
        |log, secret| log.with_secret(secret.clone()),
    );

    let orchestrator = ProbeOrchestrator::new(
        Arc::new(NetProbeService::new()),
        Arc::new(KafkaBrokerClient::new(log.clone())),
        log,
    );
    let verdict = orchestrator.run(&config).await;

    if json {
        println!("{}", render_verdict(&verdict, &secrets)?);
    }

    let code = verdict.exit_code();
    if code != 0 && keep_alive {
        wait_for_interrupt(&config).await?;
    }
    Ok(ExitCode::from(code))
}

/// Verdict JSON with every registered secret and credential field redacted.
fn render_verdict(verdict: &HealthVerdict, secrets: &[String]) -> anyhow::Result<String> {
    let mut value = serde_json::to_value(verdict).context("failed to serialize verdict")?;
    redact_value(&mut value, secrets);
    serde_json::to_string_pretty(&value).context("failed to render verdict")
}

async fn wait_for_interrupt(config: &ProbeConfig) -> anyhow::Result<()> {
    tracing::warn!(
        "Preflight against {} failed; staying alive until interrupted (--keep-alive)",
        config.brokers
    );
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    tracing::info!("Interrupted, exiting");
    Ok(())
}
