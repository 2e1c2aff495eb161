// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lexicon_webhook::{
    challenge::{dispatch, ChallengeAction, ChallengePayload, ChallengeRequest},
    constants::{SOLVER_NAME, TOKIO_WORKER_THREADS},
    metrics,
    settings::Settings,
    solver::{LexiconSolver, Solver},
};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Solve cert-manager DNS-01 challenges with lexicon.
///
/// Requests are read as JSON from FILE, or from stdin when FILE is omitted or `-`.
/// The answered `ChallengePayload` is written to stdout.
#[derive(Parser, Debug)]
#[command(name = "lexicon-webhook", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Write Prometheus metrics in text format to this file after the run
    #[arg(long, global = true, value_name = "PATH")]
    metrics_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Publish the challenge record described by a `ChallengeRequest`
    Present {
        #[arg(value_name = "FILE")]
        request: Option<PathBuf>,
    },
    /// Remove the challenge record described by a `ChallengeRequest`
    #[command(name = "cleanup")]
    CleanUp {
        #[arg(value_name = "FILE")]
        request: Option<PathBuf>,
    },
    /// Answer a full `ChallengePayload`, routing on its `request.action`
    Dispatch {
        #[arg(value_name = "FILE")]
        payload: Option<PathBuf>,
    },
    /// Print the solver name and the group it is served under
    Name,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("lexicon-webhook")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    init_logging();

    // GROUP_NAME is mandatory; without it the webhook cannot be addressed at all
    let settings = Settings::from_env().context("Failed to load solver settings")?;
    debug!("Loaded settings: {settings:?}");

    let payload = match &cli.command {
        Commands::Name => {
            println!("{}/{}", settings.group_name, SOLVER_NAME);
            return Ok(());
        }
        Commands::Present { request } => {
            request_payload(request.as_deref(), ChallengeAction::Present).await?
        }
        Commands::CleanUp { request } => {
            request_payload(request.as_deref(), ChallengeAction::CleanUp).await?
        }
        Commands::Dispatch { payload } => {
            let raw = read_input(payload.as_deref()).await?;
            decode_payload(&raw)?
        }
    };

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal, cancelling running lexicon commands");
            let _ = stop_tx.send(true);
        }
    });

    let mut solver = LexiconSolver::new(settings);
    debug!("Inferring Kubernetes client configuration");
    let kube_config = kube::Config::infer()
        .await
        .context("Failed to infer Kubernetes client configuration")?;
    solver
        .initialize(kube_config, stop_rx)
        .await
        .context("Failed to initialize solver")?;

    let answered = dispatch(&solver, payload).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&answered).context("Failed to encode response")?
    );

    if let Some(path) = cli.metrics_file.as_deref() {
        write_metrics(path).await?;
    }

    match answered.response {
        Some(response) if response.success => Ok(()),
        Some(response) => {
            let message = response
                .status
                .and_then(|status| status.message)
                .unwrap_or_default();
            error!("Challenge {} failed: {message}", response.uid);
            bail!("challenge failed: {message}")
        }
        None => bail!("no response produced"),
    }
}

/// Initialize logging.
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`text` or `json`).
/// Logs go to stderr so stdout only carries the response payload.
fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn request_payload(path: Option<&Path>, action: ChallengeAction) -> Result<ChallengePayload> {
    let raw = read_input(path).await?;
    let value = decode_object(&raw, "ChallengeRequest")?;
    let mut request: ChallengeRequest =
        serde_json::from_value(value).context("Failed to decode ChallengeRequest")?;
    request.action = Some(action);
    Ok(ChallengePayload::for_request(request))
}

fn decode_payload(raw: &str) -> Result<ChallengePayload> {
    let value = decode_object(raw, "ChallengePayload")?;
    match value.get("request") {
        None | Some(serde_json::Value::Null | serde_json::Value::Object(_)) => {}
        Some(_) => bail!("Failed to decode ChallengePayload: request must be a JSON object"),
    }
    serde_json::from_value(value).context("Failed to decode ChallengePayload")
}

/// Parse `raw` as JSON, accepting only objects.
///
/// serde would otherwise decode a positional array into a struct.
fn decode_object(raw: &str, what: &str) -> Result<serde_json::Value> {
    let value: serde_json::Value =
        serde_json::from_str(raw).with_context(|| format!("Failed to decode {what}"))?;
    if !value.is_object() {
        bail!("Failed to decode {what}: expected a JSON object");
    }
    Ok(value)
}

async fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("Failed to read stdin")?;
            Ok(raw)
        }
    }
}

async fn write_metrics(path: &Path) -> Result<()> {
    let text = metrics::gather_metrics().context("Failed to gather metrics")?;
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("Failed to write metrics to {}", path.display()))
}
