//! Interruption and fault signals crossing the task boundary.

use taskline_result::{Status, TaskResult};
use thiserror::Error;

/// Returned from work once its result was settled deliberately.
///
/// Produced by [`Execution::fail`](crate::Execution::fail),
/// [`Execution::skip`](crate::Execution::skip) and
/// [`Execution::throw`](crate::Execution::throw). The boundary recognises it
/// and leaves the already-recorded outcome untouched.
#[derive(Debug, Clone, Error)]
#[error("task '{task}' interrupted with status {status}")]
pub struct Interrupt {
  task: String,
  status: Status,
}

impl Interrupt {
  pub fn new(task: impl Into<String>, status: Status) -> Self {
    Self {
      task: task.into(),
      status,
    }
  }

  pub fn task(&self) -> &str {
    &self.task
  }

  pub fn status(&self) -> Status {
    self.status
  }
}

/// Error surfaced by strict invocation.
///
/// Both variants carry the fully recorded result. A task that lets a fault
/// escape its own work (typically via `?` on a nested strict call) adopts
/// that result through [`TaskResult::throw`].
#[derive(Debug, Error)]
pub enum Fault {
  /// The task settled with a status in its halt set.
  #[error("task '{}' halted with status {}", .result.task(), .result.status())]
  Halted { result: TaskResult },

  /// The task raised an unexpected error, recorded as a failure.
  #[error("task '{}' raised an unexpected error: {error}", .result.task())]
  Unexpected {
    result: TaskResult,
    error: anyhow::Error,
  },
}

impl Fault {
  pub fn result(&self) -> &TaskResult {
    match self {
      Fault::Halted { result } => result,
      Fault::Unexpected { result, .. } => result,
    }
  }

  pub fn into_result(self) -> TaskResult {
    match self {
      Fault::Halted { result } => result,
      Fault::Unexpected { result, .. } => result,
    }
  }
}
