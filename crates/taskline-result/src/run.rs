//! Append-only collection of results sharing one correlation id.

use std::sync::{Mutex, MutexGuard};

use serde::{Serialize, Serializer};
use serde_json::{Value, json};

use crate::result::TaskResult;
use crate::status::{State, Status};

/// One root invocation and everything nested inside it.
///
/// Shared by reference (`Arc<Run>`) between the root task, nested calls and
/// parallel workers. Index assignment and append happen under one lock, so
/// indices stay unique and increasing with any number of writers.
pub struct Run {
  id: String,
  results: Mutex<Vec<TaskResult>>,
}

impl Run {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      results: Mutex::new(Vec::new()),
    }
  }

  fn lock(&self) -> MutexGuard<'_, Vec<TaskResult>> {
    self.results.lock().unwrap_or_else(|e| e.into_inner())
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  /// Create a fresh result for `task` at the next index and append it.
  pub fn record(&self, task: impl Into<String>) -> TaskResult {
    let mut results = self.lock();
    let result = TaskResult::new(task, self.id.clone(), results.len());
    results.push(result.clone());
    result
  }

  /// Snapshot of all results in index order.
  pub fn results(&self) -> Vec<TaskResult> {
    self.lock().clone()
  }

  pub fn get(&self, index: usize) -> Option<TaskResult> {
    self.lock().get(index).cloned()
  }

  /// The first recorded result, i.e. the root invocation.
  pub fn root(&self) -> Option<TaskResult> {
    self.get(0)
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  /// State of the root result.
  pub fn state(&self) -> Option<State> {
    self.root().map(|r| r.state())
  }

  /// Status of the root result.
  pub fn status(&self) -> Option<Status> {
    self.root().map(|r| r.status())
  }

  /// Loggable representation.
  pub fn to_value(&self) -> Value {
    let results: Vec<Value> = self.results().iter().map(TaskResult::to_value).collect();
    json!({
      "id": self.id,
      "results": results,
    })
  }
}

impl std::fmt::Debug for Run {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Run")
      .field("id", &self.id)
      .field("results", &self.lock().len())
      .finish()
  }
}

impl Serialize for Run {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.to_value().serialize(serializer)
  }
}
