//! The task entry point.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use taskline_correlator::Correlator;
use taskline_result::{Metadata, Run, TaskResult};
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::context::Context;
use crate::error::{Fault, Interrupt};
use crate::execution::Execution;
use crate::middleware::Next;
use crate::task::Task;

/// A single call of a task.
///
/// Without an explicit [`Run`] the invocation is a root: it opens a new run
/// whose id is the supplied correlation id, else the active
/// [`Correlator`] id, else a generated one.
pub struct Invocation {
  task: Arc<dyn Task>,
  context: Context,
  run: Option<Arc<Run>>,
  correlation_id: Option<String>,
}

impl Invocation {
  pub fn new(task: Arc<dyn Task>) -> Self {
    Self {
      task,
      context: Context::new(),
      run: None,
      correlation_id: None,
    }
  }

  pub fn context(mut self, context: impl Into<Context>) -> Self {
    self.context = context.into();
    self
  }

  /// Append to an existing run instead of opening a new one.
  pub fn run(mut self, run: Arc<Run>) -> Self {
    self.run = Some(run);
    self
  }

  pub fn correlation_id(mut self, id: impl Into<String>) -> Self {
    self.correlation_id = Some(id.into());
    self
  }

  /// Execute and return the result. Never fails.
  pub async fn execute(self) -> TaskResult {
    let (result, _) = self.perform().await;
    result
  }

  /// Execute, then fail with a [`Fault`] if the task raised or halted.
  ///
  /// The result is fully recorded in the run either way.
  pub async fn execute_strict(self) -> Result<TaskResult, Fault> {
    let halt_on = self.task.halt_on();
    let (result, error) = self.perform().await;

    if let Some(error) = error {
      return Err(Fault::Unexpected { result, error });
    }
    if halt_on.contains(&result.status()) {
      return Err(Fault::Halted { result });
    }
    Ok(result)
  }

  async fn perform(self) -> (TaskResult, Option<anyhow::Error>) {
    let run = match self.run {
      Some(run) => run,
      None => Arc::new(Run::new(Correlator::resolve(
        self.correlation_id.as_deref(),
        None,
      ))),
    };
    let result = run.record(self.task.name());

    let span = info_span!(
      "task_execute",
      task = %result.task(),
      run_id = %run.id(),
      index = result.index(),
    );
    let execution = Execution::new(self.task, result.clone(), self.context, run, self.correlation_id);

    let error = run_chain(&execution).instrument(span).await;
    (result, error)
  }
}

/// Drive the middleware chain and settle the result.
///
/// Returns the unexpected error, if any, after recording it.
async fn run_chain(execution: &Execution) -> Option<anyhow::Error> {
  let result = execution.result();
  if let Err(e) = result.executing() {
    warn!(error = %e, "result was not fresh");
  }
  info!("task_started");
  let _guard = SettleOnDrop(result.clone());

  let middlewares = execution.task().middlewares();
  let outcome = AssertUnwindSafe(Next::new(middlewares.as_slice()).run(execution))
    .catch_unwind()
    .await;

  let error = match outcome {
    Ok(Ok(_)) => None,
    Ok(Err(error)) => absorb(result, error).err(),
    Err(panic) => Some(anyhow::anyhow!("task panicked: {}", panic_message(panic.as_ref()))),
  };

  if let Some(error) = &error {
    record_unexpected(result, error);
  }
  if let Err(e) = result.executed() {
    warn!(error = %e, "result could not be settled");
  }

  info!(
    state = %result.state(),
    status = %result.status(),
    reason = result.reason().as_deref().unwrap_or(""),
    "task_executed"
  );
  debug!(result = %result.to_value(), "task_result");

  error
}

/// Settles a result whose execution future was dropped mid-flight.
///
/// An enclosing timeout or an aborted worker drops the future without
/// running the rest of [`run_chain`]; the result is already in the run, so
/// it must not stay `executing`.
struct SettleOnDrop(TaskResult);

impl Drop for SettleOnDrop {
  fn drop(&mut self) {
    let result = &self.0;
    if result.is_executed() {
      return;
    }

    warn!(task = %result.task(), index = result.index(), "task_cancelled");
    if result.is_success() {
      let _ = result.fail("execution cancelled");
    }
    if let Err(e) = result.executed() {
      warn!(error = %e, "cancelled result could not be settled");
    }
  }
}

/// Endpoint of the chain: validation, then the task's work.
pub(crate) async fn perform(execution: &Execution) -> anyhow::Result<TaskResult> {
  let result = execution.result().clone();

  let errors = execution.task().validate(execution);
  if !errors.is_empty() {
    let mut metadata = Metadata::new();
    metadata.insert("messages".to_string(), errors.to_value());
    result.fail_with(errors.full_messages().join(". "), metadata)?;
    return Ok(result);
  }

  match execution.task().work(execution).await {
    Ok(()) => Ok(result),
    Err(error) => absorb(&result, error).map(|()| result),
  }
}

/// Fold deliberate outcomes back into the result.
///
/// An [`Interrupt`] means the result is already settled; a [`Fault`] from a
/// strict nested call is adopted. Anything else is handed back.
fn absorb(result: &TaskResult, error: anyhow::Error) -> anyhow::Result<()> {
  if error.is::<Interrupt>() {
    return Ok(());
  }
  match error.downcast::<Fault>() {
    Ok(fault) => {
      result.throw(fault.result(), Metadata::new())?;
      Ok(())
    }
    Err(error) => Err(error),
  }
}

fn record_unexpected(result: &TaskResult, error: &anyhow::Error) {
  if !result.is_success() {
    warn!(error = %error, "unexpected error after result settled");
    return;
  }

  error!(error = %error, "task raised an unexpected error");
  let mut metadata = Metadata::new();
  metadata.insert(
    "original_exception".to_string(),
    Value::String(format!("{:#}", error)),
  );
  if let Err(e) = result.fail_with(error.to_string(), metadata) {
    warn!(error = %e, "failed to record unexpected error");
  }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
  if let Some(message) = panic.downcast_ref::<&str>() {
    message.to_string()
  } else if let Some(message) = panic.downcast_ref::<String>() {
    message.clone()
  } else {
    "unknown panic payload".to_string()
  }
}
