use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{Instant, timeout_at};

use crate::domain::TerminationReason;

/// Shared arbitration cell for one execution: a byte counter fed by both
/// drainers and the write-once termination reason. The first signaler to
/// acquire the lock resolves the execution; later signals are ignored.
#[derive(Debug)]
pub struct TerminationMonitor {
    max_output_bytes: u64,
    state: Mutex<MonitorState>,
    resolved: Notify,
}

#[derive(Debug, Default)]
struct MonitorState {
    bytes_observed: u64,
    reason: Option<TerminationReason>,
}

impl TerminationMonitor {
    pub fn new(max_output_bytes: u64) -> Self {
        Self {
            max_output_bytes,
            state: Mutex::new(MonitorState::default()),
            resolved: Notify::new(),
        }
    }

    /// Adds `n` to the shared counter; the first crossing of the output cap
    /// resolves the execution as `OutputTooLarge` and wakes the waiter.
    pub fn report_bytes(&self, n: u64) {
        let mut state = self.lock_state();
        state.bytes_observed = state.bytes_observed.saturating_add(n);
        if state.bytes_observed > self.max_output_bytes && state.reason.is_none() {
            state.reason = Some(TerminationReason::OutputTooLarge);
            self.resolved.notify_waiters();
        }
    }

    /// Resolves the execution as `Normal`. Called once, after the child
    /// exited on its own.
    pub fn signal_normal(&self) {
        let mut state = self.lock_state();
        if state.reason.is_none() {
            state.reason = Some(TerminationReason::Normal);
            self.resolved.notify_waiters();
        }
    }

    pub fn resolved_reason(&self) -> Option<TerminationReason> {
        self.lock_state().reason
    }

    /// Blocks until the execution is resolved or `timeout` elapses. Expiry
    /// resolves the execution as `Timeout` unless a signal got there first.
    pub async fn await_resolution(&self, timeout: Duration) -> TerminationReason {
        let deadline = Instant::now() + timeout;
        loop {
            // Register the waiter before checking state so a notify between
            // the check and the await cannot be lost.
            let notified = self.resolved.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(reason) = self.resolved_reason() {
                return reason;
            }
            if timeout_at(deadline, notified).await.is_err() {
                let mut state = self.lock_state();
                return *state.reason.get_or_insert(TerminationReason::Timeout);
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, MonitorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_reports_below_cap_stay_unresolved() {
        let monitor = TerminationMonitor::new(100);
        monitor.report_bytes(40);
        monitor.report_bytes(60);
        assert_eq!(monitor.resolved_reason(), None);
    }

    #[tokio::test]
    async fn test_crossing_cap_resolves_output_too_large() {
        let monitor = TerminationMonitor::new(100);
        monitor.report_bytes(60);
        monitor.report_bytes(41);
        assert_eq!(
            monitor.resolved_reason(),
            Some(TerminationReason::OutputTooLarge)
        );
    }

    #[tokio::test]
    async fn test_normal_signal_is_not_overwritten_by_size() {
        let monitor = TerminationMonitor::new(10);
        monitor.signal_normal();
        monitor.report_bytes(1000);
        assert_eq!(monitor.resolved_reason(), Some(TerminationReason::Normal));
    }

    #[tokio::test]
    async fn test_size_resolution_is_not_overwritten_by_normal() {
        let monitor = TerminationMonitor::new(10);
        monitor.report_bytes(1000);
        monitor.signal_normal();
        assert_eq!(
            monitor.resolved_reason(),
            Some(TerminationReason::OutputTooLarge)
        );
    }

    #[tokio::test]
    async fn test_expiry_resolves_timeout() {
        let monitor = TerminationMonitor::new(100);
        let reason = monitor.await_resolution(Duration::from_millis(50)).await;
        assert_eq!(reason, TerminationReason::Timeout);
        assert_eq!(monitor.resolved_reason(), Some(TerminationReason::Timeout));
    }

    #[tokio::test]
    async fn test_already_resolved_returns_immediately() {
        let monitor = TerminationMonitor::new(100);
        monitor.signal_normal();
        let reason = monitor.await_resolution(Duration::from_secs(60)).await;
        assert_eq!(reason, TerminationReason::Normal);
    }

    #[tokio::test]
    async fn test_waiter_wakes_on_normal_signal() {
        let monitor = Arc::new(TerminationMonitor::new(100));
        let waiter = tokio::spawn({
            let monitor = monitor.clone();
            async move { monitor.await_resolution(Duration::from_secs(60)).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        monitor.signal_normal();
        assert_eq!(waiter.await.unwrap(), TerminationReason::Normal);
    }

    #[tokio::test]
    async fn test_waiter_wakes_on_cap_crossing() {
        let monitor = Arc::new(TerminationMonitor::new(100));
        let waiter = tokio::spawn({
            let monitor = monitor.clone();
            async move { monitor.await_resolution(Duration::from_secs(60)).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        monitor.report_bytes(101);
        assert_eq!(waiter.await.unwrap(), TerminationReason::OutputTooLarge);
    }
}
