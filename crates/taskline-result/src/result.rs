//! The per-execution result record.

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Serialize, Serializer};
use serde_json::{Value, json};

use crate::error::ResultError;
use crate::status::{State, Status};

/// Open key/value metadata attached to a result.
pub type Metadata = serde_json::Map<String, Value>;

/// Shared handle to the result of one task execution.
///
/// Cloning the handle is cheap and yields the same result; equality is
/// identity. State and status only move forward, see [`State`] and
/// [`Status`]. Metadata stays writable so wrappers can annotate a settled
/// result (runtime, correlation id).
#[derive(Clone)]
pub struct TaskResult {
  inner: Arc<Inner>,
}

struct Inner {
  id: String,
  task: String,
  run_id: String,
  index: usize,
  record: RwLock<Record>,
}

struct Record {
  state: State,
  status: Status,
  metadata: Metadata,
  caused_failure: Option<TaskResult>,
  threw_failure: Option<TaskResult>,
}

impl TaskResult {
  pub(crate) fn new(task: impl Into<String>, run_id: impl Into<String>, index: usize) -> Self {
    Self {
      inner: Arc::new(Inner {
        id: uuid::Uuid::new_v4().to_string(),
        task: task.into(),
        run_id: run_id.into(),
        index,
        record: RwLock::new(Record {
          state: State::Initialized,
          status: Status::Success,
          metadata: Metadata::new(),
          caused_failure: None,
          threw_failure: None,
        }),
      }),
    }
  }

  fn read(&self) -> RwLockReadGuard<'_, Record> {
    self.inner.record.read().unwrap_or_else(|e| e.into_inner())
  }

  fn write(&self) -> RwLockWriteGuard<'_, Record> {
    self.inner.record.write().unwrap_or_else(|e| e.into_inner())
  }

  /// Unique id of this execution.
  pub fn id(&self) -> &str {
    &self.inner.id
  }

  /// Name of the task that produced this result.
  pub fn task(&self) -> &str {
    &self.inner.task
  }

  /// Id of the run this result belongs to.
  pub fn run_id(&self) -> &str {
    &self.inner.run_id
  }

  /// Position within the run, in creation order.
  pub fn index(&self) -> usize {
    self.inner.index
  }

  pub fn state(&self) -> State {
    self.read().state
  }

  pub fn status(&self) -> Status {
    self.read().status
  }

  /// Snapshot of the metadata.
  pub fn metadata(&self) -> Metadata {
    self.read().metadata.clone()
  }

  pub fn metadata_value(&self, key: &str) -> Option<Value> {
    self.read().metadata.get(key).cloned()
  }

  /// The `reason` recorded by a skip or failure.
  pub fn reason(&self) -> Option<String> {
    self
      .read()
      .metadata
      .get("reason")
      .and_then(|v| v.as_str())
      .map(str::to_owned)
  }

  /// Add or replace a metadata entry.
  pub fn insert_metadata(&self, key: impl Into<String>, value: impl Into<Value>) {
    self.write().metadata.insert(key.into(), value.into());
  }

  /// The leaf result whose failure ultimately produced this one.
  pub fn caused_failure(&self) -> Option<TaskResult> {
    self.read().caused_failure.clone()
  }

  /// The immediate child result whose outcome this one adopted.
  pub fn threw_failure(&self) -> Option<TaskResult> {
    self.read().threw_failure.clone()
  }

  pub fn is_initialized(&self) -> bool {
    self.state() == State::Initialized
  }

  pub fn is_executing(&self) -> bool {
    self.state() == State::Executing
  }

  pub fn is_complete(&self) -> bool {
    self.state() == State::Complete
  }

  pub fn is_interrupted(&self) -> bool {
    self.state() == State::Interrupted
  }

  /// Complete or interrupted.
  pub fn is_executed(&self) -> bool {
    self.state().is_terminal()
  }

  pub fn is_success(&self) -> bool {
    self.status() == Status::Success
  }

  pub fn is_skipped(&self) -> bool {
    self.status() == Status::Skipped
  }

  pub fn is_failed(&self) -> bool {
    self.status() == Status::Failed
  }

  pub fn is_good(&self) -> bool {
    self.status().is_good()
  }

  pub fn is_bad(&self) -> bool {
    self.status().is_bad()
  }

  /// Failed on its own account rather than by adopting another result.
  pub fn is_failure_origin(&self) -> bool {
    let record = self.read();
    record.status == Status::Failed && record.caused_failure.is_none()
  }

  /// Move from `initialized` to `executing`.
  pub fn executing(&self) -> Result<(), ResultError> {
    let mut record = self.write();
    match record.state {
      State::Executing => Ok(()),
      State::Initialized => {
        record.state = State::Executing;
        Ok(())
      }
      from => Err(ResultError::InvalidState {
        from,
        to: State::Executing,
      }),
    }
  }

  /// Move from `executing` to `complete`.
  pub fn complete(&self) -> Result<(), ResultError> {
    let mut record = self.write();
    match record.state {
      State::Complete => Ok(()),
      State::Executing => {
        record.state = State::Complete;
        Ok(())
      }
      from => Err(ResultError::InvalidState {
        from,
        to: State::Complete,
      }),
    }
  }

  /// Move to `interrupted` from any non-terminal state.
  pub fn interrupt(&self) -> Result<(), ResultError> {
    let mut record = self.write();
    Self::interrupt_record(&mut record)
  }

  /// Settle the lifecycle: `complete` on success, `interrupted` otherwise.
  pub fn executed(&self) -> Result<(), ResultError> {
    if self.is_success() {
      self.complete()
    } else {
      self.interrupt()
    }
  }

  fn interrupt_record(record: &mut Record) -> Result<(), ResultError> {
    match record.state {
      State::Interrupted => Ok(()),
      State::Initialized | State::Executing => {
        record.state = State::Interrupted;
        Ok(())
      }
      from => Err(ResultError::InvalidState {
        from,
        to: State::Interrupted,
      }),
    }
  }

  fn settle(
    &self,
    status: Status,
    reason: String,
    metadata: Metadata,
  ) -> Result<(), ResultError> {
    let mut record = self.write();
    if record.status != Status::Success {
      return Err(ResultError::StatusSettled {
        current: record.status,
        attempted: status,
      });
    }
    Self::interrupt_record(&mut record)?;

    record.status = status;
    record.metadata.extend(metadata);
    record
      .metadata
      .insert("reason".to_string(), Value::String(reason));
    Ok(())
  }

  /// Mark the result skipped and interrupted.
  pub fn skip(&self, reason: impl Into<String>) -> Result<(), ResultError> {
    self.settle(Status::Skipped, reason.into(), Metadata::new())
  }

  /// Mark the result skipped and interrupted, recording extra metadata.
  pub fn skip_with(&self, reason: impl Into<String>, metadata: Metadata) -> Result<(), ResultError> {
    self.settle(Status::Skipped, reason.into(), metadata)
  }

  /// Mark the result failed and interrupted.
  pub fn fail(&self, reason: impl Into<String>) -> Result<(), ResultError> {
    self.settle(Status::Failed, reason.into(), Metadata::new())
  }

  /// Mark the result failed and interrupted, recording extra metadata.
  pub fn fail_with(&self, reason: impl Into<String>, metadata: Metadata) -> Result<(), ResultError> {
    self.settle(Status::Failed, reason.into(), metadata)
  }

  /// Adopt the outcome of `other`.
  ///
  /// Throwing a successful result is a no-op. Otherwise this result takes
  /// over the status and metadata of `other` (merged with `metadata`),
  /// records `other` as `threw_failure` and inherits its `caused_failure`,
  /// falling back to `other` itself when it is the origin.
  pub fn throw(&self, other: &TaskResult, metadata: Metadata) -> Result<(), ResultError> {
    // Snapshot first: `other` may be this very result.
    let (status, mut adopted, caused) = {
      let record = other.read();
      (
        record.status,
        record.metadata.clone(),
        record.caused_failure.clone(),
      )
    };
    if status == Status::Success {
      return Ok(());
    }

    let mut record = self.write();
    if record.status != Status::Success {
      return Err(ResultError::StatusSettled {
        current: record.status,
        attempted: status,
      });
    }
    Self::interrupt_record(&mut record)?;

    adopted.extend(metadata);
    record.status = status;
    record.metadata.extend(adopted);
    record.threw_failure = Some(other.clone());
    record.caused_failure = Some(caused.unwrap_or_else(|| other.clone()));
    Ok(())
  }

  pub fn handle_success<F: FnOnce(&TaskResult)>(&self, f: F) -> &Self {
    if self.is_success() {
      f(self);
    }
    self
  }

  pub fn handle_skipped<F: FnOnce(&TaskResult)>(&self, f: F) -> &Self {
    if self.is_skipped() {
      f(self);
    }
    self
  }

  pub fn handle_failed<F: FnOnce(&TaskResult)>(&self, f: F) -> &Self {
    if self.is_failed() {
      f(self);
    }
    self
  }

  pub fn handle_good<F: FnOnce(&TaskResult)>(&self, f: F) -> &Self {
    if self.is_good() {
      f(self);
    }
    self
  }

  pub fn handle_bad<F: FnOnce(&TaskResult)>(&self, f: F) -> &Self {
    if self.is_bad() {
      f(self);
    }
    self
  }

  pub fn handle_complete<F: FnOnce(&TaskResult)>(&self, f: F) -> &Self {
    if self.is_complete() {
      f(self);
    }
    self
  }

  pub fn handle_interrupted<F: FnOnce(&TaskResult)>(&self, f: F) -> &Self {
    if self.is_interrupted() {
      f(self);
    }
    self
  }

  pub fn handle_executed<F: FnOnce(&TaskResult)>(&self, f: F) -> &Self {
    if self.is_executed() {
      f(self);
    }
    self
  }

  fn summary(&self) -> Value {
    json!({
      "id": self.id(),
      "task": self.task(),
      "index": self.index(),
      "status": self.status(),
    })
  }

  /// Loggable representation.
  pub fn to_value(&self) -> Value {
    let record = self.read();
    json!({
      "id": self.id(),
      "task": self.task(),
      "run_id": self.run_id(),
      "index": self.index(),
      "state": record.state,
      "status": record.status,
      "metadata": record.metadata,
      "caused_failure": record.caused_failure.as_ref().map(TaskResult::summary),
      "threw_failure": record.threw_failure.as_ref().map(TaskResult::summary),
    })
  }
}

impl PartialEq for TaskResult {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

impl Eq for TaskResult {}

impl fmt::Debug for TaskResult {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let record = self.read();
    f.debug_struct("TaskResult")
      .field("task", &self.inner.task)
      .field("index", &self.inner.index)
      .field("run_id", &self.inner.run_id)
      .field("state", &record.state)
      .field("status", &record.status)
      .field("metadata", &record.metadata)
      .field(
        "caused_failure",
        &record.caused_failure.as_ref().map(TaskResult::index),
      )
      .field(
        "threw_failure",
        &record.threw_failure.as_ref().map(TaskResult::index),
      )
      .finish()
  }
}

impl fmt::Display for TaskResult {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let record = self.read();
    write!(
      f,
      "{}#{} ({}/{})",
      self.inner.task, self.inner.index, record.state, record.status
    )
  }
}

impl Serialize for TaskResult {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.to_value().serialize(serializer)
  }
}
