//! Execution groups and their options.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use taskline_task::{Callable, Condition, Status, Task};

use crate::error::WorkflowError;

/// How the tasks of a group are dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
  #[default]
  Sequential,
  Parallel,
}

impl Strategy {
  pub fn as_str(&self) -> &'static str {
    match self {
      Strategy::Sequential => "sequential",
      Strategy::Parallel => "parallel",
    }
  }
}

impl fmt::Display for Strategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Strategy {
  type Err = WorkflowError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "sequential" => Ok(Strategy::Sequential),
      "parallel" => Ok(Strategy::Parallel),
      other => Err(WorkflowError::UnknownStrategy {
        strategy: other.to_string(),
      }),
    }
  }
}

/// Set of status names that halt a workflow.
///
/// The default set is `{"failed"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoints(BTreeSet<String>);

impl Breakpoints {
  pub fn new<I, S>(statuses: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self(statuses.into_iter().map(Into::into).collect())
  }

  /// A set that never matches.
  pub fn none() -> Self {
    Self(BTreeSet::new())
  }

  pub fn matches(&self, status: Status) -> bool {
    self.0.contains(status.as_str())
  }

  pub fn contains(&self, status: &str) -> bool {
    self.0.contains(status)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.0.iter().map(String::as_str)
  }
}

impl Default for Breakpoints {
  fn default() -> Self {
    Self::new([Status::Failed.as_str()])
  }
}

impl FromIterator<Status> for Breakpoints {
  fn from_iter<I: IntoIterator<Item = Status>>(iter: I) -> Self {
    Self::new(iter.into_iter().map(|s| s.as_str()))
  }
}

/// Options shared by every task of a group.
#[derive(Debug, Clone, Default)]
pub struct GroupOptions {
  pub strategy: Strategy,
  pub condition: Condition,
  /// Overrides the workflow's breakpoints when set.
  pub breakpoints: Option<Breakpoints>,
  pub in_threads: Option<usize>,
  pub in_processes: Option<usize>,
}

/// An ordered list of tasks plus the options they run under.
#[derive(Clone, Default)]
pub struct ExecutionGroup {
  tasks: Vec<Arc<dyn Task>>,
  options: GroupOptions,
}

impl ExecutionGroup {
  pub fn new<I>(tasks: I) -> Self
  where
    I: IntoIterator<Item = Arc<dyn Task>>,
  {
    Self {
      tasks: tasks.into_iter().collect(),
      options: GroupOptions::default(),
    }
  }

  pub fn with_options(mut self, options: GroupOptions) -> Self {
    self.options = options;
    self
  }

  pub fn task(mut self, task: Arc<dyn Task>) -> Self {
    self.tasks.push(task);
    self
  }

  pub fn strategy(mut self, strategy: Strategy) -> Self {
    self.options.strategy = strategy;
    self
  }

  /// Set the strategy by name, rejecting unknown names.
  pub fn with_strategy(self, strategy: &str) -> Result<Self, WorkflowError> {
    Ok(self.strategy(strategy.parse()?))
  }

  pub fn sequential(self) -> Self {
    self.strategy(Strategy::Sequential)
  }

  pub fn parallel(self) -> Self {
    self.strategy(Strategy::Parallel)
  }

  pub fn when(mut self, predicate: impl Into<Callable<bool>>) -> Self {
    self.options.condition = self.options.condition.when(predicate);
    self
  }

  pub fn unless(mut self, predicate: impl Into<Callable<bool>>) -> Self {
    self.options.condition = self.options.condition.unless(predicate);
    self
  }

  pub fn breakpoints(mut self, breakpoints: Breakpoints) -> Self {
    self.options.breakpoints = Some(breakpoints);
    self
  }

  pub fn in_threads(mut self, threads: usize) -> Self {
    self.options.in_threads = Some(threads);
    self
  }

  pub fn in_processes(mut self, processes: usize) -> Self {
    self.options.in_processes = Some(processes);
    self
  }

  pub fn tasks(&self) -> &[Arc<dyn Task>] {
    &self.tasks
  }

  pub fn options(&self) -> &GroupOptions {
    &self.options
  }

  /// Concurrency limit for a parallel group.
  ///
  /// Both hints multiply when set. Without hints every task gets a worker.
  /// Never more workers than tasks, never fewer than one.
  pub fn workers(&self) -> usize {
    let workers = match (self.options.in_threads, self.options.in_processes) {
      (Some(threads), Some(processes)) => threads.saturating_mul(processes),
      (Some(threads), None) => threads,
      (None, Some(processes)) => processes,
      (None, None) => self.tasks.len(),
    };
    workers.clamp(1, self.tasks.len().max(1))
  }
}

impl fmt::Debug for ExecutionGroup {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ExecutionGroup")
      .field("tasks", &self.tasks.iter().map(|t| t.name()).collect::<Vec<_>>())
      .field("options", &self.options)
      .finish()
  }
}
