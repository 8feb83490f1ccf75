//! The task contract.

use async_trait::async_trait;
use serde_json::Value;
use taskline_result::Status;

use crate::attribute::AttributeErrors;
use crate::execution::Execution;
use crate::middleware::MiddlewareStack;

/// A unit of business work.
///
/// Only [`Task::work`] is required. Work reports a deliberate outcome by
/// returning the error produced by [`Execution::fail`] or
/// [`Execution::skip`]; any other error (or a panic) is recorded as an
/// unexpected failure.
#[async_trait]
pub trait Task: Send + Sync + 'static {
  /// Name recorded on every result this task produces.
  fn name(&self) -> &str {
    let full = std::any::type_name::<Self>();
    full.rsplit("::").next().unwrap_or(full)
  }

  /// Middlewares wrapped around [`Task::work`], outermost first.
  fn middlewares(&self) -> MiddlewareStack {
    MiddlewareStack::new()
  }

  /// Statuses that make a strict invocation return a [`Fault`](crate::Fault).
  fn halt_on(&self) -> Vec<Status> {
    vec![Status::Failed]
  }

  /// Attribute validation. Any error fails the task before work runs.
  fn validate(&self, _execution: &Execution) -> AttributeErrors {
    AttributeErrors::new()
  }

  /// Resolve a named option value (see [`Callable::Named`](crate::Callable::Named)).
  fn lookup(&self, _name: &str, _execution: &Execution) -> Option<Value> {
    None
  }

  async fn work(&self, execution: &Execution) -> anyhow::Result<()>;
}
