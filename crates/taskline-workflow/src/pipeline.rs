//! Dispatch of one execution group.

use std::sync::Arc;

use taskline_correlator::Correlator;
use taskline_task::{Execution, TaskResult};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::group::{Breakpoints, ExecutionGroup, Strategy};

/// Run every task of `group` and return the first result whose status hits
/// a breakpoint.
pub(crate) async fn run_group(
  execution: &Execution,
  group: &ExecutionGroup,
  breakpoints: &Breakpoints,
) -> Option<TaskResult> {
  match group.options().strategy {
    Strategy::Sequential => run_sequential(execution, group, breakpoints).await,
    Strategy::Parallel => run_parallel(execution, group, breakpoints).await,
  }
}

/// Declared order; each result is settled before the next task starts.
async fn run_sequential(
  execution: &Execution,
  group: &ExecutionGroup,
  breakpoints: &Breakpoints,
) -> Option<TaskResult> {
  for task in group.tasks() {
    let result = execution.call(task.clone()).await;
    if breakpoints.matches(result.status()) {
      return Some(result);
    }
  }
  None
}

/// Concurrent dispatch bounded by the group's worker count.
///
/// Spawned tasks do not inherit the correlation scope, so every worker
/// re-enters it before executing. A breakpoint match cancels workers that
/// are still waiting for a slot; workers already running finish and are
/// recorded in the run. The first match in completion order wins.
async fn run_parallel(
  execution: &Execution,
  group: &ExecutionGroup,
  breakpoints: &Breakpoints,
) -> Option<TaskResult> {
  let correlation_id = Correlator::current().unwrap_or_else(|| execution.run().id().to_string());
  let semaphore = Arc::new(Semaphore::new(group.workers()));
  let cancel = CancellationToken::new();
  let mut workers = JoinSet::new();

  debug!(
    tasks = group.tasks().len(),
    workers = group.workers(),
    "dispatching parallel group"
  );

  for task in group.tasks() {
    let invocation = execution.invoke(task.clone());
    let semaphore = semaphore.clone();
    let cancel = cancel.clone();
    let correlation_id = correlation_id.clone();

    workers.spawn(async move {
      let _permit = tokio::select! {
        permit = semaphore.acquire_owned() => permit.ok()?,
        _ = cancel.cancelled() => return None,
      };
      if cancel.is_cancelled() {
        return None;
      }
      Some(Correlator::scope(correlation_id, invocation.execute()).await)
    });
  }

  let mut matched = None;
  while let Some(joined) = workers.join_next().await {
    match joined {
      Ok(Some(result)) => {
        if matched.is_none() && breakpoints.matches(result.status()) {
          cancel.cancel();
          matched = Some(result);
        }
      }
      Ok(None) => {}
      Err(e) => {
        warn!(error = %e, "worker_join_failed");
      }
    }
  }
  matched
}
