use std::time::Duration;

pub const DEFAULT_MAX_OUTPUT_BYTES: u64 = 100 * 1024;
pub const DEFAULT_EXECUTION_TIMEOUT_MS: u64 = 10_000;

const MAX_OUTPUT_BYTES_VAR: &str = "SAFERUN_MAX_OUTPUT_BYTES";
const EXECUTION_TIMEOUT_MS_VAR: &str = "SAFERUN_TIMEOUT_MS";

/// Process-wide tunables. Read once at startup and never mutated while an
/// execution is in flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Limits {
    pub max_output_bytes: u64,
    pub execution_timeout: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            execution_timeout: Duration::from_millis(DEFAULT_EXECUTION_TIMEOUT_MS),
        }
    }
}

impl Limits {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut limits = Limits::default();
        if let Some(raw) = lookup(MAX_OUTPUT_BYTES_VAR) {
            match raw.parse() {
                Ok(value) => limits.max_output_bytes = value,
                Err(_) => {
                    tracing::warn!("Ignoring unparsable {}: {:?}", MAX_OUTPUT_BYTES_VAR, raw)
                }
            }
        }
        if let Some(raw) = lookup(EXECUTION_TIMEOUT_MS_VAR) {
            match raw.parse() {
                Ok(value) => limits.execution_timeout = Duration::from_millis(value),
                Err(_) => {
                    tracing::warn!("Ignoring unparsable {}: {:?}", EXECUTION_TIMEOUT_MS_VAR, raw)
                }
            }
        }
        limits
    }
}
