//! `zquery` -- run a zq query over JSON from the command line.
//!
//! Reads a JSON payload, runs it through the engine, and prints one
//! normalized record per line on stdout. Logs go to stderr.
//!
//! # Environment variables
//!
//! | Variable          | Required | Default | Description                       |
//! |-------------------|----------|---------|-----------------------------------|
//! | `ZQ_BINARY`       | no       | `zq`    | Engine executable                 |
//! | `ZQ_TIMEOUT_SECS` | no       | `60`    | Per-run time limit, `0` disables  |
//! | `RUST_LOG`        | no       | `zquery=info,zquery_core=info` | Log filter |

mod args;

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zquery_core::{assemble_items, process, EngineConfig, NormalizedRecords, ZqEngine};

use crate::args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zquery=info,zquery_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = format!("{e:#}");
            tracing::error!(error = %message, "zquery failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let engine = ZqEngine::new(args.engine_config(EngineConfig::from_env()));
    let config = engine.config();
    tracing::debug!(
        binary = %config.binary.display(),
        timeout_secs = config.timeout.map(|t| t.as_secs()),
        "Engine configured",
    );

    let payload = args.load_payload().await?;
    let records = process(&engine, payload, &args.query).await?;

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    for line in render_lines(records, args.items)? {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

/// Serialize records one per line, optionally wrapped as pipeline items.
fn render_lines(records: NormalizedRecords, as_items: bool) -> serde_json::Result<Vec<String>> {
    if as_items {
        assemble_items(&[], records)
            .iter()
            .map(serde_json::to_string)
            .collect()
    } else {
        records.iter().map(serde_json::to_string).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
