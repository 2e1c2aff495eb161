// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Lexicon process execution.
//!
//! Runs a [`CommandSpec`] as a child process, capturing stdout and stderr separately, and
//! interprets the last non-empty stdout line as the boolean result lexicon prints after a
//! record operation.
//!
//! # Result interpretation
//!
//! | Process outcome | Last stdout line | Result |
//! |---|---|---|
//! | could not start, non-zero exit, timeout, shutdown | - | `Err(Execution)`, with any stderr |
//! | exit 0 | `true` | `success = true` |
//! | exit 0 | `false` | `success = false` |
//! | exit 0 | anything else / no output | `success = false`, logged |
//!
//! Nothing is retried.

use crate::command::CommandSpec;
use crate::errors::SolverError;
use crate::metrics;
use crate::settings::Settings;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// How long to keep draining stderr after killing an unfinished command
const STDERR_GRACE: Duration = Duration::from_millis(250);

type PipeBuffer = Arc<Mutex<Vec<u8>>>;

/// Captured result of a completed lexicon invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Whether lexicon reported `true` on its last output line
    pub success: bool,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

/// Runs lexicon commands.
///
/// Cloning is cheap; each clone observes the same stop signal.
#[derive(Clone, Debug)]
pub struct CommandExecutor {
    program: PathBuf,
    timeout: Option<Duration>,
    stop: Option<watch::Receiver<bool>>,
}

impl CommandExecutor {
    /// Create an executor for `program` with an optional per-invocation timeout.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
            stop: None,
        }
    }

    /// Create an executor from solver settings
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.lexicon_path.clone(), settings.command_timeout)
    }

    /// Abort running commands once `stop` turns `true`.
    #[must_use]
    pub fn with_stop_signal(mut self, stop: watch::Receiver<bool>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Path of the lexicon binary
    #[must_use]
    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    /// Run a command to completion.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Execution`] if the process cannot be started, exits with a
    /// non-zero status, exceeds the timeout, or is interrupted by the stop signal.
    pub async fn execute(&self, spec: &CommandSpec) -> Result<ExecutionResult, SolverError> {
        let start = Instant::now();
        let operation = spec.operation.as_str();

        if self.stop.as_ref().is_some_and(|stop| *stop.borrow()) {
            warn!("Shutdown requested, not starting lexicon {operation}");
            metrics::record_command(operation, "failed", start.elapsed());
            return Err(SolverError::Execution {
                message: "cancelled by shutdown signal".to_string(),
                stderr: None,
            });
        }

        info!(
            "Lexicon command: {} {}",
            self.program.display(),
            spec.redacted_args().join(" ")
        );

        let child = Command::new(&self.program)
            .args(spec.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                error!("Failed to start {}: {e}", self.program.display());
                metrics::record_command(operation, "failed", start.elapsed());
                return Err(SolverError::Execution {
                    message: format!("failed to start {}: {e}", self.program.display()),
                    stderr: None,
                });
            }
        };

        let stdout_buf = PipeBuffer::default();
        let stderr_buf = PipeBuffer::default();
        let stdout_task = tokio::spawn(collect_pipe(child.stdout.take(), Arc::clone(&stdout_buf)));
        let mut stderr_task =
            tokio::spawn(collect_pipe(child.stderr.take(), Arc::clone(&stderr_buf)));

        let waited = tokio::select! {
            waited = wait_bounded(&mut child, self.timeout) => waited,
            () = stop_requested(self.stop.clone()) => Err("cancelled by shutdown signal".to_string()),
        };

        let status = match waited {
            Ok(status) => status,
            Err(message) => {
                if let Err(e) = child.start_kill() {
                    debug!("Failed to kill lexicon: {e}");
                }
                stdout_task.abort();
                // A killed child closes its pipes; grandchildren may keep them open
                let _ = tokio::time::timeout(STDERR_GRACE, &mut stderr_task).await;
                stderr_task.abort();

                let stderr = pipe_text(&stderr_buf);
                error!("Lexicon {operation} did not complete: {message}");
                if !stderr.trim().is_empty() {
                    warn!("Lexicon stderr output: {}", stderr.trim());
                }
                metrics::record_command(operation, "failed", start.elapsed());
                return Err(SolverError::Execution {
                    message,
                    stderr: non_empty(&stderr),
                });
            }
        };

        for task in [stdout_task, stderr_task] {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Failed to read lexicon output: {e}"),
                Err(e) => warn!("Lexicon output reader stopped: {e}"),
            }
        }

        let stdout = pipe_text(&stdout_buf);
        let stderr = pipe_text(&stderr_buf);

        if !stderr.trim().is_empty() {
            warn!("Lexicon stderr output: {}", stderr.trim());
        }

        if !status.success() {
            error!("Lexicon {operation} failed: {status}");
            metrics::record_command(operation, "failed", start.elapsed());
            return Err(SolverError::Execution {
                message: format!("lexicon exited with {status}"),
                stderr: non_empty(&stderr),
            });
        }

        debug!("Lexicon output: {stdout}");

        let (success, outcome) = match parse_result(&stdout) {
            Ok(true) => (true, "true"),
            Ok(false) => (false, "false"),
            Err(line) => {
                warn!("Could not parse lexicon result from final output line {line:?}");
                (false, "unparsable")
            }
        };

        let elapsed = start.elapsed();
        metrics::record_command(operation, outcome, elapsed);
        debug!(
            "Lexicon {operation} finished in {:.3}s with result {outcome}",
            elapsed.as_secs_f64()
        );

        Ok(ExecutionResult {
            success,
            stdout,
            stderr,
        })
    }
}

/// Parse the boolean lexicon prints as its last non-empty output line.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
///
/// # Errors
///
/// Returns the offending (trimmed) line when it is not a boolean literal, or an empty
/// string when there is no output at all.
pub fn parse_result(stdout: &str) -> Result<bool, String> {
    let line = stdout
        .lines()
        .map(str::trim)
        .rev()
        .find(|line| !line.is_empty())
        .unwrap_or_default();

    match line {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(other.to_string()),
    }
}

async fn wait_bounded(child: &mut Child, timeout: Option<Duration>) -> Result<ExitStatus, String> {
    let status = match timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait())
            .await
            .map_err(|_| format!("timed out after {}s", limit.as_secs_f64()))?,
        None => child.wait().await,
    };
    status.map_err(|e| format!("failed to wait for lexicon: {e}"))
}

async fn collect_pipe<R>(pipe: Option<R>, buffer: PipeBuffer) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(mut pipe) = pipe else {
        return Ok(());
    };
    let mut chunk = [0u8; 4096];
    loop {
        let read = pipe.read(&mut chunk).await?;
        if read == 0 {
            return Ok(());
        }
        if let Ok(mut buffer) = buffer.lock() {
            buffer.extend_from_slice(&chunk[..read]);
        }
    }
}

fn pipe_text(buffer: &PipeBuffer) -> String {
    buffer
        .lock()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

async fn stop_requested(stop: Option<watch::Receiver<bool>>) {
    if let Some(mut stop) = stop {
        if stop.wait_for(|stopped| *stopped).await.is_ok() {
            return;
        }
    }
    std::future::pending::<()>().await;
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod executor_tests;
