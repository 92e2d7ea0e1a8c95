//! Error taxonomy for query execution.
//!
//! [`QueryError`] covers each way a single call can fail. The caller-facing
//! [`process`](crate::node::process) operation wraps it exactly once into
//! [`ProcessingError`] so the host sees one coherent message.

/// Remediation hint attached to every spawn failure.
pub const SPAWN_HINT: &str = "ensure the engine binary is installed and on the search path";

/// Errors that can occur while running a query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The request was rejected before any process was spawned.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The engine process could not be started at all.
    #[error("Failed to spawn {program}: {message}. Please {hint}.")]
    Spawn {
        program: String,
        message: String,
        hint: &'static str,
    },

    /// The engine ran but exited with a non-zero status.
    #[error("Engine failed with exit code {exit_code}: {stderr}")]
    ExecutionFailed {
        /// Process exit code (`-1` if killed by signal).
        exit_code: i32,
        /// Complete diagnostic output, verbatim.
        stderr: String,
    },

    /// The engine exceeded its configured timeout and was killed.
    #[error("Engine timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// An I/O error occurred while communicating with a running process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine exited cleanly but its output could not be normalized.
    #[error("Failed to parse engine output as JSON ({length} bytes, near {excerpt}): {reason}")]
    OutputParse {
        /// Length of the trimmed output text.
        length: usize,
        /// Bounded window of the output around the failure position.
        excerpt: String,
        /// Parser error message.
        reason: String,
    },
}

impl QueryError {
    /// Build a [`QueryError::Spawn`] from the error returned by `spawn()`.
    pub fn spawn(program: impl Into<String>, err: &std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            message: err.to_string(),
            hint: SPAWN_HINT,
        }
    }
}

/// Consolidated failure returned by the outermost operation.
///
/// `source()` is always `None`; the cause is already part of the message.
/// Use [`ProcessingError::kind`] to inspect it.
#[derive(Debug, thiserror::Error)]
#[error("Query processing failed: {0}")]
pub struct ProcessingError(QueryError);

impl ProcessingError {
    /// The underlying cause.
    pub fn kind(&self) -> &QueryError {
        &self.0
    }
}

impl From<QueryError> for ProcessingError {
    fn from(err: QueryError) -> Self {
        Self(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
