//! `zq` engine executor.
//!
//! Runs the configured engine binary directly (not through a shell) as
//! `<binary> -j -i json <query> -`, with the payload on stdin.

use tokio::process::Command;

use super::{subprocess, ProcessOutcome, QueryEngine};
use crate::config::EngineConfig;
use crate::error::QueryError;

/// Flags placed before the query: JSON output, JSON input.
pub const OUTPUT_FLAGS: [&str; 3] = ["-j", "-i", "json"];

/// Trailing argument telling the engine to read from stdin.
pub const STDIN_ARG: &str = "-";

/// Executor backed by an external `zq` process.
#[derive(Debug, Clone, Default)]
pub struct ZqEngine {
    config: EngineConfig,
}

impl ZqEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build the engine command line for `query`.
    pub fn command(&self, query: &str) -> Command {
        let mut cmd = Command::new(&self.config.binary);
        cmd.args(OUTPUT_FLAGS).arg(query).arg(STDIN_ARG);
        cmd
    }
}

impl QueryEngine for ZqEngine {
    async fn run(&self, input: &str, query: &str) -> Result<ProcessOutcome, QueryError> {
        tracing::debug!(
            binary = %self.config.binary.display(),
            query,
            input_len = input.len(),
            "Running zq",
        );
        let mut cmd = self.command(query);
        subprocess::run_command(&mut cmd, input, self.config.timeout).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
