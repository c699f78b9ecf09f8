/// Replacement text for captured stdout when the output cap was exceeded.
pub const TOO_MUCH_OUTPUT_TEXT: &str = "output too long";
/// Replacement text for captured stdout when the wall-clock timeout fired.
pub const TIMED_OUT_TEXT: &str = "execution timed out";

pub const GENERIC_FAILURE_CLASSIFIER: &str = "generic";

/// The argument vector for one child process, program name first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub argv: Vec<String>,
}

impl ExecutionRequest {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }
}

/// Which of the three mutually exclusive termination conditions applied.
/// Write-once per execution: the first signaler to acquire the monitor
/// lock wins and later signals are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationReason {
    Normal,
    Timeout,
    OutputTooLarge,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureDescription {
    pub message: String,
    pub classifier: String,
}

impl FailureDescription {
    pub fn generic(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            classifier: GENERIC_FAILURE_CLASSIFIER.to_string(),
        }
    }
}

/// Final result of one execution. `error_text` always holds everything
/// drained from stderr; `standard_text` holds the drained stdout unless a
/// limit replaced it with a sentinel.
#[derive(Clone, Debug)]
pub struct ExecutionOutcome {
    pub reason: TerminationReason,
    pub standard_text: String,
    pub error_text: String,
    pub failure: Option<FailureDescription>,
}
