use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{ExecutionOutcome, ExecutionRequest, FailureDescription, TerminationReason};
use crate::runner::traits::{LaunchError, Runner};

pub const OUTPUT_OPEN_MARKER: &str = "<output>";
pub const OUTPUT_CLOSE_MARKER: &str = "</output>";

/// Transport-facing rendering of one finished execution: the captured text
/// wrapped in the fixed marker pair plus the failure as a message/classifier
/// pair, stamped with an id and a completion time.
#[derive(Clone, Debug)]
pub struct ExecutionReport {
    pub id: Uuid,
    pub finished_at: DateTime<Utc>,
    pub reason: TerminationReason,
    pub output: String,
    pub failure: Option<FailureDescription>,
}

impl From<ExecutionOutcome> for ExecutionReport {
    fn from(outcome: ExecutionOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            finished_at: Utc::now(),
            reason: outcome.reason,
            output: format!(
                "{}{}{}",
                OUTPUT_OPEN_MARKER, outcome.standard_text, OUTPUT_CLOSE_MARKER
            ),
            failure: outcome.failure,
        }
    }
}

pub async fn run_and_report(
    runner: &dyn Runner,
    request: &ExecutionRequest,
) -> Result<ExecutionReport, LaunchError> {
    let outcome = runner.execute(request).await?;
    Ok(outcome.into())
}
