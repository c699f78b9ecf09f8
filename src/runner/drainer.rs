use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;

use crate::escape::escape_line;
use crate::runner::monitor::TerminationMonitor;

pub(crate) fn spawn_drainer<R>(
    stream: R,
    label: &'static str,
    monitor: Arc<TerminationMonitor>,
    cancel: watch::Receiver<bool>,
) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(drain(stream, label, monitor, cancel))
}

/// Copies lines from one child output stream into a private buffer until
/// end-of-stream or a cancellation signal observed between reads. The
/// cancel flag alone cannot unblock a read on a silent open pipe; killing
/// the child closes the pipe and ends the stream.
async fn drain<R>(
    stream: R,
    label: &'static str,
    monitor: Arc<TerminationMonitor>,
    mut cancel: watch::Receiver<bool>,
) -> String
where
    R: AsyncRead + Unpin,
{
    let mut lines = LinesStream::new(BufReader::new(stream).lines());
    let mut buffer = String::new();
    loop {
        // Biased: lines that are already readable are drained before the
        // cancel signal is honored, so a fast-exiting child loses no
        // output. A stream that keeps producing is ended by the child
        // kill closing the pipe.
        tokio::select! {
            biased;
            line = lines.next() => match line {
                Some(Ok(line)) => {
                    buffer.push_str(&escape_line(&line));
                    buffer.push('\n');
                    monitor.report_bytes(line.len() as u64);
                }
                Some(Err(e)) => {
                    // Not fatal for the execution; the launcher keeps
                    // whatever was captured up to this point.
                    tracing::warn!("Read failure on {}: {}", label, e);
                    break;
                }
                None => break,
            },
            _ = cancel.changed() => {
                tracing::debug!("Drainer for {} cancelled", label);
                break;
            }
        }
    }
    buffer
}
