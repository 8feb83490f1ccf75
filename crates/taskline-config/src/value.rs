//! Option values that are either literals or names resolved at run time.

use serde::{Deserialize, Serialize};

/// An `if` / `unless` predicate.
///
/// A string names a value looked up through the task, then the context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
  Bool(bool),
  Named(String),
}

/// A duration in seconds, literal or named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SecondsValue {
  Number(f64),
  Named(String),
}
