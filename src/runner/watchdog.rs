use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::domain::TerminationReason;
use crate::runner::monitor::TerminationMonitor;

/// Waits for the monitor to resolve, then unconditionally drives teardown:
/// both drainers are cancelled and a kill of the child is requested no
/// matter which condition won. Receivers that are already gone mean the
/// launcher finished that part of teardown on its own.
pub(crate) fn spawn_watchdog(
    monitor: Arc<TerminationMonitor>,
    timeout: Duration,
    cancel: watch::Sender<bool>,
    kill: oneshot::Sender<()>,
) -> JoinHandle<TerminationReason> {
    tokio::spawn(async move {
        let reason = monitor.await_resolution(timeout).await;
        tracing::debug!("Execution resolved: {:?}", reason);
        let _ = cancel.send(true);
        let _ = kill.send(());
        reason
    })
}
