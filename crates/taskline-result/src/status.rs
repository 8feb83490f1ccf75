//! Lifecycle state and outcome status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle of a task execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
  Initialized,
  Executing,
  Complete,
  Interrupted,
}

impl State {
  pub fn as_str(&self) -> &'static str {
    match self {
      State::Initialized => "initialized",
      State::Executing => "executing",
      State::Complete => "complete",
      State::Interrupted => "interrupted",
    }
  }

  /// `complete` and `interrupted` never change again.
  pub fn is_terminal(&self) -> bool {
    matches!(self, State::Complete | State::Interrupted)
  }
}

impl fmt::Display for State {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for State {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "initialized" => Ok(State::Initialized),
      "executing" => Ok(State::Executing),
      "complete" => Ok(State::Complete),
      "interrupted" => Ok(State::Interrupted),
      other => Err(format!("unknown state: {}", other)),
    }
  }
}

/// Business outcome of a task execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
  Success,
  Skipped,
  Failed,
}

impl Status {
  pub fn as_str(&self) -> &'static str {
    match self {
      Status::Success => "success",
      Status::Skipped => "skipped",
      Status::Failed => "failed",
    }
  }

  /// Success or skipped.
  pub fn is_good(&self) -> bool {
    matches!(self, Status::Success | Status::Skipped)
  }

  /// Skipped or failed. A skip is both good and bad.
  pub fn is_bad(&self) -> bool {
    matches!(self, Status::Skipped | Status::Failed)
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Status {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "success" => Ok(Status::Success),
      "skipped" => Ok(Status::Skipped),
      "failed" => Ok(Status::Failed),
      other => Err(format!("unknown status: {}", other)),
    }
  }
}
