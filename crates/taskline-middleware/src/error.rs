//! Middleware errors.

use thiserror::Error;

/// The wrapped call did not finish within the configured limit.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("execution exceeded {} seconds", format_seconds(.seconds))]
pub struct TimeoutError {
  pub seconds: f64,
}

/// Whole seconds print without a fractional part.
pub(crate) fn format_seconds(seconds: &f64) -> String {
  seconds_value(*seconds).to_string()
}

/// Whole seconds are stored as JSON integers.
pub(crate) fn seconds_value(seconds: f64) -> serde_json::Value {
  if seconds.fract() == 0.0 && seconds < u64::MAX as f64 {
    serde_json::Value::from(seconds as u64)
  } else {
    serde_json::Value::from(seconds)
  }
}
