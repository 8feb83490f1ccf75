//! Per-execution state handed to work and middlewares.

use std::sync::Arc;

use taskline_result::{Metadata, ResultError, Run, TaskResult};

use crate::context::Context;
use crate::error::{Fault, Interrupt};
use crate::invocation::Invocation;
use crate::task::Task;

/// Everything one task execution can see.
///
/// The run and context are explicit handles rather than ambient state, so
/// nested and parallel calls receive them by hand-off.
pub struct Execution {
  task: Arc<dyn Task>,
  result: TaskResult,
  context: Context,
  run: Arc<Run>,
  correlation_id: Option<String>,
}

impl Execution {
  pub(crate) fn new(
    task: Arc<dyn Task>,
    result: TaskResult,
    context: Context,
    run: Arc<Run>,
    correlation_id: Option<String>,
  ) -> Self {
    Self {
      task,
      result,
      context,
      run,
      correlation_id,
    }
  }

  pub fn task(&self) -> &Arc<dyn Task> {
    &self.task
  }

  pub fn result(&self) -> &TaskResult {
    &self.result
  }

  pub fn context(&self) -> &Context {
    &self.context
  }

  pub fn run(&self) -> &Arc<Run> {
    &self.run
  }

  /// Correlation id supplied by whoever started this invocation.
  pub fn requested_correlation_id(&self) -> Option<&str> {
    self.correlation_id.as_deref()
  }

  fn interrupt(&self, outcome: Result<(), ResultError>) -> anyhow::Error {
    match outcome {
      Ok(()) => Interrupt::new(self.result.task(), self.result.status()).into(),
      Err(e) => e.into(),
    }
  }

  /// Fail the result. Return the error from work to stop executing.
  ///
  /// ```ignore
  /// return Err(execution.fail("insufficient funds"));
  /// ```
  pub fn fail(&self, reason: impl Into<String>) -> anyhow::Error {
    self.interrupt(self.result.fail(reason))
  }

  pub fn fail_with(&self, reason: impl Into<String>, metadata: Metadata) -> anyhow::Error {
    self.interrupt(self.result.fail_with(reason, metadata))
  }

  /// Skip the result. Return the error from work to stop executing.
  pub fn skip(&self, reason: impl Into<String>) -> anyhow::Error {
    self.interrupt(self.result.skip(reason))
  }

  pub fn skip_with(&self, reason: impl Into<String>, metadata: Metadata) -> anyhow::Error {
    self.interrupt(self.result.skip_with(reason, metadata))
  }

  /// Adopt the outcome of another result.
  pub fn throw(&self, other: &TaskResult) -> anyhow::Error {
    self.interrupt(self.result.throw(other, Metadata::new()))
  }

  pub fn throw_with(&self, other: &TaskResult, metadata: Metadata) -> anyhow::Error {
    self.interrupt(self.result.throw(other, metadata))
  }

  /// An invocation of `task` sharing this execution's run and context.
  pub fn invoke(&self, task: Arc<dyn Task>) -> Invocation {
    Invocation::new(task)
      .context(self.context.clone())
      .run(self.run.clone())
  }

  /// Run a nested task; never fails.
  pub async fn call(&self, task: Arc<dyn Task>) -> TaskResult {
    self.invoke(task).execute().await
  }

  /// Run a nested task, surfacing halts and unexpected errors.
  ///
  /// Propagating the fault out of work with `?` makes this execution adopt
  /// the nested result.
  pub async fn call_strict(&self, task: Arc<dyn Task>) -> Result<TaskResult, Fault> {
    self.invoke(task).execute_strict().await
  }
}

impl std::fmt::Debug for Execution {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Execution")
      .field("task", &self.task.name())
      .field("result", &self.result)
      .field("run_id", &self.run.id())
      .finish()
  }
}
