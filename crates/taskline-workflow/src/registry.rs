//! Name to task lookup used when resolving definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use taskline_task::Task;

/// Tasks addressable by name from a workflow definition.
#[derive(Clone, Default)]
pub struct TaskRegistry {
  tasks: BTreeMap<String, Arc<dyn Task>>,
}

impl TaskRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register `task` under `name`, replacing any previous entry.
  pub fn register(&mut self, name: impl Into<String>, task: Arc<dyn Task>) -> Option<Arc<dyn Task>> {
    self.tasks.insert(name.into(), task)
  }

  pub fn with(mut self, name: impl Into<String>, task: Arc<dyn Task>) -> Self {
    self.register(name, task);
    self
  }

  pub fn get(&self, name: &str) -> Option<Arc<dyn Task>> {
    self.tasks.get(name).cloned()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.tasks.contains_key(name)
  }

  /// Registered names in sorted order.
  pub fn names(&self) -> Vec<&str> {
    self.tasks.keys().map(String::as_str).collect()
  }

  pub fn len(&self) -> usize {
    self.tasks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tasks.is_empty()
  }
}

impl fmt::Debug for TaskRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TaskRegistry")
      .field("tasks", &self.names())
      .finish()
  }
}
