use thiserror::Error;

use crate::domain::{ExecutionOutcome, ExecutionRequest};

/// The only errors that cross the `execute` boundary. Timeouts, oversized
/// output and program-side failures are represented inside a normally
/// returned `ExecutionOutcome` instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LaunchError {
    #[error("argument vector is empty")]
    EmptyCommand,
    #[error("failed to spawn {program}: {msg}")]
    Spawn { program: String, msg: String },
    #[error("spawned child has no {stream} handle")]
    MissingStdio { stream: &'static str },
}

#[mockall::automock]
#[async_trait::async_trait]
pub trait Runner: std::fmt::Debug + Send + Sync {
    async fn execute(
        &self,
        request: &ExecutionRequest,
    ) -> Result<ExecutionOutcome, LaunchError>;
}
