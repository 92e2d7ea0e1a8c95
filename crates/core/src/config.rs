//! Engine configuration.
//!
//! Reads the engine binary and per-run timeout from the environment, with
//! defaults that work when `zq` is on `PATH`.

use std::path::PathBuf;
use std::time::Duration;

/// Default engine executable, resolved through `PATH`.
pub const DEFAULT_BINARY: &str = "zq";

/// Default wall-clock limit for a single engine run.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Engine configuration loaded from environment variables.
///
/// All fields have defaults that work when `zq` is installed on `PATH`.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Engine executable (default: `zq`).
    pub binary: PathBuf,
    /// Maximum wall-clock time before the process is killed. `None`
    /// waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_BINARY),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var           | Default | Notes               |
    /// |-------------------|---------|---------------------|
    /// | `ZQ_BINARY`       | `zq`    |                     |
    /// | `ZQ_TIMEOUT_SECS` | `60`    | `0` disables        |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable values fall back to
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let binary = lookup("ZQ_BINARY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BINARY));

        let timeout_secs = match lookup("ZQ_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "ZQ_TIMEOUT_SECS is not a valid u64, using default");
                DEFAULT_TIMEOUT_SECS
            }),
            None => DEFAULT_TIMEOUT_SECS,
        };

        Self {
            binary,
            timeout: timeout_from_secs(timeout_secs),
        }
    }
}

/// Map a seconds value to a timeout, treating `0` as "no limit".
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
