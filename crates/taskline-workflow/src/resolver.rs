//! Turn workflow definitions into runnable workflows.

use std::sync::Arc;

use taskline_config::{ConditionValue, GroupDef, MiddlewareDef, SecondsValue, WorkflowDef};
use taskline_middleware::{Correlate, Runtime, Timeout};
use taskline_task::{Callable, Condition, Middleware, MiddlewareStack, Status, Task};

use crate::error::WorkflowError;
use crate::group::{Breakpoints, ExecutionGroup, GroupOptions, Strategy};
use crate::registry::TaskRegistry;
use crate::workflow::Workflow;

/// Resolves [`WorkflowDef`]s against a [`TaskRegistry`].
///
/// Every task name, strategy and breakpoint is checked up front, so a
/// definition either resolves completely or fails before anything runs.
#[derive(Debug, Clone)]
pub struct Resolver {
  registry: TaskRegistry,
}

impl Resolver {
  pub fn new(registry: TaskRegistry) -> Self {
    Self { registry }
  }

  pub fn registry(&self) -> &TaskRegistry {
    &self.registry
  }

  pub fn resolve(&self, def: WorkflowDef) -> Result<Workflow, WorkflowError> {
    let mut workflow = Workflow::new(def.name);

    if let Some(breakpoints) = def.breakpoints {
      workflow = workflow.breakpoints(resolve_breakpoints(breakpoints)?);
    }

    let mut middlewares = MiddlewareStack::new();
    for middleware in def.middlewares {
      middlewares.push(resolve_middleware(middleware));
    }
    workflow = workflow.with_middlewares(middlewares);

    for group in def.groups {
      workflow = workflow.group(self.resolve_group(group)?);
    }

    Ok(workflow)
  }

  fn resolve_group(&self, def: GroupDef) -> Result<ExecutionGroup, WorkflowError> {
    let strategy = match def.strategy {
      Some(strategy) => strategy.parse::<Strategy>()?,
      None => Strategy::default(),
    };

    let tasks = def
      .tasks
      .into_iter()
      .map(|name| self.lookup(name))
      .collect::<Result<Vec<_>, _>>()?;

    let breakpoints = def.breakpoints.map(resolve_breakpoints).transpose()?;

    Ok(ExecutionGroup::new(tasks).with_options(GroupOptions {
      strategy,
      condition: resolve_condition(def.when, def.unless),
      breakpoints,
      in_threads: def.in_threads,
      in_processes: def.in_processes,
    }))
  }

  fn lookup(&self, name: String) -> Result<Arc<dyn Task>, WorkflowError> {
    self
      .registry
      .get(&name)
      .ok_or(WorkflowError::TaskNotFound { name })
  }
}

fn resolve_breakpoints(statuses: Vec<String>) -> Result<Breakpoints, WorkflowError> {
  for status in &statuses {
    status
      .parse::<Status>()
      .map_err(|message| WorkflowError::InvalidBreakpoint {
        breakpoint: status.clone(),
        message,
      })?;
  }
  Ok(Breakpoints::new(statuses))
}

fn resolve_middleware(def: MiddlewareDef) -> Arc<dyn Middleware> {
  match def {
    MiddlewareDef::Timeout {
      seconds,
      when,
      unless,
    } => {
      let mut timeout = Timeout::new();
      if let Some(seconds) = seconds {
        timeout = timeout.seconds(seconds_callable(seconds));
      }
      if let Some(when) = when {
        timeout = timeout.when(condition_callable(when));
      }
      if let Some(unless) = unless {
        timeout = timeout.unless(condition_callable(unless));
      }
      Arc::new(timeout)
    }
    MiddlewareDef::Runtime { when, unless } => {
      let mut runtime = Runtime::new();
      if let Some(when) = when {
        runtime = runtime.when(condition_callable(when));
      }
      if let Some(unless) = unless {
        runtime = runtime.unless(condition_callable(unless));
      }
      Arc::new(runtime)
    }
    MiddlewareDef::Correlate { id, when, unless } => {
      let mut correlate = Correlate::new();
      if let Some(id) = id {
        correlate = correlate.id(id);
      }
      if let Some(when) = when {
        correlate = correlate.when(condition_callable(when));
      }
      if let Some(unless) = unless {
        correlate = correlate.unless(condition_callable(unless));
      }
      Arc::new(correlate)
    }
  }
}

fn resolve_condition(when: Option<ConditionValue>, unless: Option<ConditionValue>) -> Condition {
  let mut condition = Condition::new();
  if let Some(when) = when {
    condition = condition.when(condition_callable(when));
  }
  if let Some(unless) = unless {
    condition = condition.unless(condition_callable(unless));
  }
  condition
}

fn condition_callable(value: ConditionValue) -> Callable<bool> {
  match value {
    ConditionValue::Bool(value) => Callable::value(value),
    ConditionValue::Named(name) => Callable::named(name),
  }
}

fn seconds_callable(value: SecondsValue) -> Callable<f64> {
  match value {
    SecondsValue::Number(seconds) => Callable::value(seconds),
    SecondsValue::Named(name) => Callable::named(name),
  }
}
