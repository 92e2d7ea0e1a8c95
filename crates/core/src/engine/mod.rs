//! Query engine invocation.
//!
//! Defines [`QueryEngine`], the seam between request handling and the
//! external `zq` process, along with [`ProcessOutcome`]. The subprocess
//! plumbing lives in [`subprocess`]; [`zq::ZqEngine`] wires it to the
//! engine's command line.

pub mod subprocess;
pub mod zq;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Captured result of one successful engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    /// Process exit code. Always `0` for an outcome returned by an engine.
    pub exit_code: i32,
    /// Complete stdout, trimmed of surrounding whitespace.
    pub stdout: String,
    /// Complete stderr, untrimmed.
    pub stderr: String,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl ProcessOutcome {
    /// Interpret a finished process.
    ///
    /// A non-zero exit becomes [`QueryError::ExecutionFailed`] with the full
    /// stderr. A zero exit with diagnostic output is logged as a warning
    /// and still succeeds.
    pub fn from_exit(
        exit_code: i32,
        stdout: &[u8],
        stderr: &[u8],
        duration_ms: u64,
    ) -> Result<Self, QueryError> {
        let stdout = String::from_utf8_lossy(stdout);
        let stderr = String::from_utf8_lossy(stderr).into_owned();

        tracing::debug!(
            exit_code,
            stdout_len = stdout.len(),
            stderr_len = stderr.len(),
            duration_ms,
            "Engine process closed",
        );

        if exit_code != 0 {
            tracing::error!(exit_code, stderr = %stderr, "Engine command failed");
            return Err(QueryError::ExecutionFailed { exit_code, stderr });
        }

        if !stderr.trim().is_empty() {
            tracing::warn!(stderr = %stderr.trim(), "Engine wrote to stderr");
        }

        Ok(Self {
            exit_code,
            stdout: stdout.trim().to_string(),
            stderr,
            duration_ms,
        })
    }

    /// Diagnostic text left behind by a successful run, if any.
    pub fn warning(&self) -> Option<&str> {
        let trimmed = self.stderr.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Trait implemented by anything that can execute a query against a JSON
/// payload.
///
/// The production implementation spawns `zq`; tests substitute an
/// in-process fake.
pub trait QueryEngine: Send + Sync {
    /// Run `query` against the serialized JSON `input`.
    fn run(
        &self,
        input: &str,
        query: &str,
    ) -> impl std::future::Future<Output = Result<ProcessOutcome, QueryError>> + Send;
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
