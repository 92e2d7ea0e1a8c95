//! Subprocess execution with concurrent stream handling.
//!
//! Provides [`run_command`]: spawn a prepared [`tokio::process::Command`],
//! feed it a payload on stdin, and drain stdout and stderr, all in separate
//! tasks. Nothing waits on one pipe while another fills up, so an engine
//! that writes diagnostics before it finishes reading its input cannot
//! stall the call.

use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use super::ProcessOutcome;
use crate::error::QueryError;

/// Spawn `cmd`, pipe `input` to its stdin, capture stdout/stderr, and
/// enforce the optional `timeout`.
///
/// The caller sets the program and arguments. Spawn failures map to
/// [`QueryError::Spawn`]; exit status is interpreted by
/// [`ProcessOutcome::from_exit`].
pub async fn run_command(
    cmd: &mut Command,
    input: &str,
    timeout: Option<Duration>,
) -> Result<ProcessOutcome, QueryError> {
    // `kill_on_drop(true)` ensures the child is killed if this future is
    // dropped before the process exits.
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let program = cmd.as_std().get_program().to_string_lossy().into_owned();
    let start = Instant::now();

    let mut child = cmd.spawn().map_err(|e| {
        tracing::error!(program = %program, error = %e, "Failed to spawn engine process");
        QueryError::spawn(program.clone(), &e)
    })?;

    let deadline = timeout.map(|limit| tokio::time::Instant::now() + limit);
    let stdin_task = tokio::spawn(write_stream(child.stdin.take(), input.as_bytes().to_vec()));
    let mut stdout_task = tokio::spawn(read_stream(child.stdout.take()));
    let mut stderr_task = tokio::spawn(read_stream(child.stderr.take()));

    // One deadline covers the exit and both drains: a descendant that keeps
    // a pipe open after the engine exits must not extend the call.
    let collected = match deadline {
        Some(deadline) => {
            tokio::time::timeout_at(
                deadline,
                collect(&mut child, &mut stdout_task, &mut stderr_task),
            )
            .await
        }
        None => Ok(collect(&mut child, &mut stdout_task, &mut stderr_task).await),
    };

    let (status, stdout_bytes, stderr_bytes) = match collected {
        Ok(result) => result?,
        Err(_elapsed) => {
            // Kill and reap so no zombie is left behind, then release the
            // pipe handles held by the I/O tasks.
            if let Err(e) = child.kill().await {
                tracing::debug!(program = %program, error = %e, "Engine already exited at timeout");
            }
            stdin_task.abort();
            stdout_task.abort();
            stderr_task.abort();
            let elapsed_ms = start.elapsed().as_millis() as u64;
            tracing::error!(program = %program, elapsed_ms, "Engine timed out");
            return Err(QueryError::Timeout { elapsed_ms });
        }
    };

    if let Err(e) = join_stream(stdin_task).await {
        tracing::debug!(error = %e, "Engine stdin task did not complete");
    }

    let duration_ms = start.elapsed().as_millis() as u64;
    let exit_code = status.code().unwrap_or(-1);

    ProcessOutcome::from_exit(exit_code, &stdout_bytes, &stderr_bytes, duration_ms)
}

/// Wait for the child to exit and for both output streams to close.
async fn collect(
    child: &mut Child,
    stdout_task: &mut JoinHandle<std::io::Result<Vec<u8>>>,
    stderr_task: &mut JoinHandle<std::io::Result<Vec<u8>>>,
) -> std::io::Result<(ExitStatus, Vec<u8>, Vec<u8>)> {
    let status = child.wait().await?;
    let stdout = stdout_task.await??;
    let stderr = stderr_task.await??;
    Ok((status, stdout, stderr))
}

/// Write the whole payload, then close the stream to signal end-of-input.
///
/// A broken pipe means the process stopped reading early; its exit status
/// decides whether that matters.
async fn write_stream<W: AsyncWrite + Unpin>(
    handle: Option<W>,
    payload: Vec<u8>,
) -> std::io::Result<()> {
    let Some(mut stdin) = handle else {
        return Ok(());
    };
    match stdin.write_all(&payload).await {
        Ok(()) => stdin.shutdown().await,
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
            tracing::debug!(
                payload_len = payload.len(),
                "Engine closed stdin before reading the whole payload"
            );
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Read an entire output stream into a byte buffer.
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        h.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Await an I/O task, folding a panicked or cancelled task into an I/O error.
async fn join_stream<T>(task: JoinHandle<std::io::Result<T>>) -> std::io::Result<T> {
    task.await?
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
