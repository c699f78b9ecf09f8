use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future;
use tokio::process::Command;
use tokio::sync::{oneshot, watch};
use tokio::time::timeout;
use uuid::Uuid;

use crate::config::Limits;
use crate::domain::{
    ExecutionOutcome, ExecutionRequest, FailureDescription, TIMED_OUT_TEXT, TOO_MUCH_OUTPUT_TEXT,
    TerminationReason,
};
use crate::runner::drainer::spawn_drainer;
use crate::runner::monitor::TerminationMonitor;
use crate::runner::traits::{LaunchError, Runner};
use crate::runner::watchdog::spawn_watchdog;

/// How long the launcher waits for the drainers to flush after teardown was
/// requested before giving up on their buffers.
const DRAIN_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub struct BasicRunner {
    limits: Limits,
}

impl BasicRunner {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn from_env() -> Self {
        Self::new(Limits::from_env())
    }
}

#[async_trait]
impl Runner for BasicRunner {
    #[tracing::instrument(skip(self), fields(execution_id = %Uuid::new_v4()))]
    async fn execute(
        &self,
        request: &ExecutionRequest,
    ) -> Result<ExecutionOutcome, LaunchError> {
        let (program, args) = request
            .argv
            .split_first()
            .ok_or(LaunchError::EmptyCommand)?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Backstop: the child never outlives this call, whatever path
            // leaves the scope.
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| LaunchError::Spawn {
            program: program.clone(),
            msg: e.to_string(),
        })?;
        tracing::debug!("Spawned child process: pid={:?}", child.id());

        let stdout = child
            .stdout
            .take()
            .ok_or(LaunchError::MissingStdio { stream: "stdout" })?;
        let stderr = child
            .stderr
            .take()
            .ok_or(LaunchError::MissingStdio { stream: "stderr" })?;

        let monitor = Arc::new(TerminationMonitor::new(self.limits.max_output_bytes));
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let stdout_drainer = spawn_drainer(stdout, "stdout", monitor.clone(), cancel_rx.clone());
        let stderr_drainer = spawn_drainer(stderr, "stderr", monitor.clone(), cancel_rx);

        let (kill_tx, kill_rx) = oneshot::channel();
        let watchdog = spawn_watchdog(
            monitor.clone(),
            self.limits.execution_timeout,
            cancel_tx,
            kill_tx,
        );

        let natural_exit = tokio::select! {
            status = child.wait() => Some(status),
            _ = kill_rx => None,
        };
        match natural_exit {
            Some(status) => {
                match status {
                    Ok(status) => tracing::debug!("Child exited on its own: {:?}", status),
                    Err(e) => tracing::warn!("Failed to wait for child: {}", e),
                }
                monitor.signal_normal();
            }
            None => {
                // Killing a child that has already exited is a no-op.
                if let Err(e) = child.start_kill() {
                    tracing::debug!("Kill after resolution was a no-op: {}", e);
                }
                if let Err(e) = child.wait().await {
                    tracing::warn!("Failed to reap killed child: {}", e);
                }
            }
        }

        let reason = match watchdog.await {
            Ok(reason) => reason,
            Err(e) => {
                tracing::warn!("Watchdog task failed: {}", e);
                monitor
                    .resolved_reason()
                    .unwrap_or(TerminationReason::Timeout)
            }
        };

        // The watchdog has requested cancellation by now; the buffers are
        // final only once both drainer tasks have actually stopped.
        let stdout_abort = stdout_drainer.abort_handle();
        let stderr_abort = stderr_drainer.abort_handle();
        let (standard_text, error_text) =
            match timeout(DRAIN_GRACE, future::join(stdout_drainer, stderr_drainer)).await {
                Ok((stdout_buffer, stderr_buffer)) => (
                    stdout_buffer.unwrap_or_else(|e| {
                        tracing::warn!("Stdout drainer failed: {}", e);
                        String::new()
                    }),
                    stderr_buffer.unwrap_or_else(|e| {
                        tracing::warn!("Stderr drainer failed: {}", e);
                        String::new()
                    }),
                ),
                Err(_) => {
                    tracing::warn!("Drainers still running after {:?}, dropping buffers", DRAIN_GRACE);
                    stdout_abort.abort();
                    stderr_abort.abort();
                    (String::new(), String::new())
                }
            };

        let failure = (!error_text.is_empty())
            .then(|| FailureDescription::generic(error_text.trim_end_matches('\n')));
        let standard_text = match reason {
            TerminationReason::OutputTooLarge => TOO_MUCH_OUTPUT_TEXT.to_string(),
            TerminationReason::Timeout => TIMED_OUT_TEXT.to_string(),
            TerminationReason::Normal => standard_text,
        };

        tracing::info!("Execution finished: reason={:?}", reason);
        Ok(ExecutionOutcome {
            reason,
            standard_text,
            error_text,
            failure,
        })
    }
}
