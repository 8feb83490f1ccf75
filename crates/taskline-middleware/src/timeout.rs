//! Bound the wrapped call by a time limit.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use taskline_task::{Callable, Condition, Execution, Metadata, Middleware, Next, TaskResult};
use tracing::warn;

use crate::error::{TimeoutError, seconds_value};

/// Fails the task when the wrapped call runs longer than the limit.
///
/// The limit is a literal, a named value or a closure resolved against the
/// execution; anything missing, non-positive or too large for a
/// [`Duration`] falls back to [`Timeout::DEFAULT_SECONDS`]. On expiry the
/// wrapped future is dropped at its current await point and the result
/// fails with the reason
/// `"[TimeoutError] execution exceeded N seconds"` plus `seconds` and
/// `original_exception` metadata. Errors raised by the wrapped call before
/// the limit pass through untouched.
#[derive(Debug, Clone, Default)]
pub struct Timeout {
  seconds: Option<Callable<f64>>,
  condition: Condition,
}

impl Timeout {
  pub const DEFAULT_SECONDS: f64 = 3.0;

  pub fn new() -> Self {
    Self::default()
  }

  pub fn seconds(mut self, seconds: impl Into<Callable<f64>>) -> Self {
    self.seconds = Some(seconds.into());
    self
  }

  pub fn when(mut self, predicate: impl Into<Callable<bool>>) -> Self {
    self.condition = self.condition.when(predicate);
    self
  }

  pub fn unless(mut self, predicate: impl Into<Callable<bool>>) -> Self {
    self.condition = self.condition.unless(predicate);
    self
  }

  /// The limit that applies to `execution`.
  pub fn limit(&self, execution: &Execution) -> f64 {
    self
      .seconds
      .as_ref()
      .and_then(|seconds| seconds.resolve(execution))
      .filter(|seconds| *seconds > 0.0 && Duration::try_from_secs_f64(*seconds).is_ok())
      .unwrap_or(Self::DEFAULT_SECONDS)
  }
}

#[async_trait]
impl Middleware for Timeout {
  async fn call(&self, execution: &Execution, next: Next<'_>) -> anyhow::Result<TaskResult> {
    if !self.condition.allows(execution) {
      return next.run(execution).await;
    }

    let seconds = self.limit(execution);
    match tokio::time::timeout(Duration::from_secs_f64(seconds), next.run(execution)).await {
      Ok(outcome) => outcome,
      Err(_) => {
        let error = TimeoutError { seconds };
        warn!(seconds, "task_timed_out");

        let result = execution.result();
        if result.is_success() {
          let mut metadata = Metadata::new();
          metadata.insert(
            "original_exception".to_string(),
            Value::String(format!("TimeoutError: {}", error)),
          );
          metadata.insert("seconds".to_string(), seconds_value(seconds));
          result.fail_with(format!("[TimeoutError] {}", error), metadata)?;
        }
        Ok(result.clone())
      }
    }
  }
}
