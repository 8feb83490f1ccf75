//! The workflow task.

use std::fmt;

use async_trait::async_trait;
use taskline_task::{Execution, Middleware, MiddlewareStack, Status, Task};
use tracing::{Instrument, info, info_span};

use crate::group::{Breakpoints, ExecutionGroup};
use crate::pipeline::run_group;

/// A named, ordered list of execution groups run as a single task.
///
/// The workflow records its own result in the run before any member does,
/// and members share its context. Group breakpoints take precedence over
/// the workflow's own, which default to `{"failed"}`.
#[derive(Clone)]
pub struct Workflow {
  name: String,
  groups: Vec<ExecutionGroup>,
  breakpoints: Breakpoints,
  middlewares: MiddlewareStack,
  halt_on: Vec<Status>,
}

impl Workflow {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      groups: Vec::new(),
      breakpoints: Breakpoints::default(),
      middlewares: MiddlewareStack::new(),
      halt_on: vec![Status::Failed],
    }
  }

  pub fn group(mut self, group: ExecutionGroup) -> Self {
    self.groups.push(group);
    self
  }

  pub fn breakpoints(mut self, breakpoints: Breakpoints) -> Self {
    self.breakpoints = breakpoints;
    self
  }

  pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
    self.middlewares = self.middlewares.with(middleware);
    self
  }

  pub fn with_middlewares(mut self, middlewares: MiddlewareStack) -> Self {
    self.middlewares.extend(middlewares);
    self
  }

  /// Statuses that make a strict call of this workflow fault.
  pub fn with_halt_on(mut self, statuses: Vec<Status>) -> Self {
    self.halt_on = statuses;
    self
  }

  pub fn groups(&self) -> &[ExecutionGroup] {
    &self.groups
  }

  pub fn workflow_breakpoints(&self) -> &Breakpoints {
    &self.breakpoints
  }
}

#[async_trait]
impl Task for Workflow {
  fn name(&self) -> &str {
    &self.name
  }

  fn middlewares(&self) -> MiddlewareStack {
    self.middlewares.clone()
  }

  fn halt_on(&self) -> Vec<Status> {
    self.halt_on.clone()
  }

  async fn work(&self, execution: &Execution) -> anyhow::Result<()> {
    for (index, group) in self.groups.iter().enumerate() {
      let options = group.options();
      if !options.condition.allows(execution) {
        info!(group = index, "group_skipped");
        continue;
      }

      let breakpoints = options.breakpoints.as_ref().unwrap_or(&self.breakpoints);
      let span = info_span!(
        "workflow_group",
        group = index,
        strategy = %options.strategy,
      );
      info!(
        group = index,
        strategy = %options.strategy,
        tasks = group.tasks().len(),
        "group_started"
      );

      if let Some(result) = run_group(execution, group, breakpoints)
        .instrument(span)
        .await
      {
        info!(
          group = index,
          task = %result.task(),
          index = result.index(),
          status = %result.status(),
          "breakpoint_matched"
        );
        return Err(execution.throw(&result));
      }
    }
    Ok(())
  }
}

impl fmt::Debug for Workflow {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Workflow")
      .field("name", &self.name)
      .field("groups", &self.groups)
      .field("breakpoints", &self.breakpoints)
      .field("middlewares", &self.middlewares)
      .finish()
  }
}
