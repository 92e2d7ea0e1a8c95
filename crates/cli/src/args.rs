use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::AsyncReadExt;
use zquery_core::config::timeout_from_secs;
use zquery_core::{EngineConfig, Payload};

/// Command-line arguments for the `zquery` binary.
///
/// Engine settings default to `ZQ_BINARY` / `ZQ_TIMEOUT_SECS` (see
/// [`EngineConfig::from_env`]); flags override them.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "zquery",
    about = "Run a zq query over a JSON payload and print the resulting records"
)]
pub struct Args {
    /// Query statement, e.g. "cut id,name | sort id"
    pub query: String,

    /// Inline JSON payload
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,

    /// Read the JSON payload from a file (stdin when neither --data nor --file is given)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Engine executable
    #[arg(long)]
    pub binary: Option<PathBuf>,

    /// Seconds before the engine is killed; 0 waits indefinitely
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print each record as a pipeline item: {"json": <record>}
    #[arg(long, default_value_t = false)]
    pub items: bool,
}

impl Args {
    /// Merge flag overrides on top of `base`.
    pub fn engine_config(&self, base: EngineConfig) -> EngineConfig {
        EngineConfig {
            binary: self.binary.clone().unwrap_or(base.binary),
            timeout: match self.timeout_secs {
                Some(secs) => timeout_from_secs(secs),
                None => base.timeout,
            },
        }
    }

    /// Load the payload text from `--data`, `--file`, or stdin.
    pub async fn load_payload(&self) -> anyhow::Result<Payload> {
        if let Some(data) = &self.data {
            return Ok(Payload::Text(data.clone()));
        }

        let text = match &self.file {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read payload from {}", path.display()))?,
            None => {
                let mut buf = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut buf)
                    .await
                    .context("failed to read payload from stdin")?;
                buf
            }
        };
        Ok(Payload::Text(text))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
