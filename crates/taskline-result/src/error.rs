//! Result transition errors.

use thiserror::Error;

use crate::status::{State, Status};

/// Illegal transitions on a [`TaskResult`](crate::TaskResult).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResultError {
  /// The lifecycle state cannot move from `from` to `to`.
  #[error("cannot transition state from {from} to {to}")]
  InvalidState { from: State, to: State },

  /// The status already left `success` and can never change again.
  #[error("status is already {current}; cannot transition to {attempted}")]
  StatusSettled { current: Status, attempted: Status },
}
