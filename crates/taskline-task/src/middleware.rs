//! Onion-style middleware chain around task work.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use taskline_result::TaskResult;

use crate::execution::Execution;
use crate::invocation::perform;

/// Wraps the execution of a task.
///
/// A middleware may run code before and after `next.run(execution)`, may
/// decline to call it, and returns what `next` returned or a substitute
/// result. Errors returned by `next` are unexpected failures of the wrapped
/// call; they must be passed on unless the middleware exists to classify
/// them.
#[async_trait]
pub trait Middleware: Send + Sync {
  fn name(&self) -> &str {
    let full = std::any::type_name::<Self>();
    full.rsplit("::").next().unwrap_or(full)
  }

  async fn call(&self, execution: &Execution, next: Next<'_>) -> anyhow::Result<TaskResult>;
}

/// The rest of the chain, ending in the task's work.
#[derive(Clone, Copy)]
pub struct Next<'a> {
  remaining: &'a [Arc<dyn Middleware>],
}

impl<'a> Next<'a> {
  pub(crate) fn new(remaining: &'a [Arc<dyn Middleware>]) -> Self {
    Self { remaining }
  }

  pub async fn run(self, execution: &Execution) -> anyhow::Result<TaskResult> {
    match self.remaining.split_first() {
      Some((middleware, rest)) => middleware.call(execution, Next::new(rest)).await,
      None => perform(execution).await,
    }
  }
}

/// Ordered middleware registrations; the first entry is outermost.
#[derive(Clone, Default)]
pub struct MiddlewareStack {
  entries: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareStack {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
    self.entries.push(Arc::new(middleware));
    self
  }

  pub fn push(&mut self, middleware: Arc<dyn Middleware>) {
    self.entries.push(middleware);
  }

  pub fn extend(&mut self, other: MiddlewareStack) {
    self.entries.extend(other.entries);
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn as_slice(&self) -> &[Arc<dyn Middleware>] {
    &self.entries
  }
}

impl fmt::Debug for MiddlewareStack {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list()
      .entries(self.entries.iter().map(|m| m.name()))
      .finish()
  }
}
