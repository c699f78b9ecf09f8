use std::time::Duration;

use crate::domain::{ExecutionOutcome, ExecutionRequest};
use crate::runner::traits::{LaunchError, Runner};

#[derive(Debug, Clone)]
pub struct RunnerStub {
    result: Result<ExecutionOutcome, LaunchError>,
    delay: Duration,
}

impl RunnerStub {
    pub fn new(result: Result<ExecutionOutcome, LaunchError>, delay: Duration) -> Self {
        Self { result, delay }
    }
}

#[async_trait::async_trait]
impl Runner for RunnerStub {
    #[tracing::instrument]
    async fn execute(
        &self,
        request: &ExecutionRequest,
    ) -> Result<ExecutionOutcome, LaunchError> {
        tracing::debug!("Stub execution: request={:?}", request);
        tokio::time::sleep(self.delay).await;
        tracing::debug!("Stub result: {:?}", self.result);

        self.result.clone()
    }
}
