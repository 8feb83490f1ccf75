//! Scope an execution under a correlation id.

use async_trait::async_trait;
use taskline_correlator::Correlator;
use taskline_task::{Callable, Condition, Execution, Middleware, Next, TaskResult};
use tracing::debug;

/// Runs the wrapped call with the resolved id active in the [`Correlator`].
///
/// The id is chosen by [`Correlator::resolve`]: this middleware's own `id`
/// option or the id requested by the caller, then the active id, then the
/// run's id, then a generated one. It is also recorded under the
/// `correlation_id` metadata key.
#[derive(Debug, Clone, Default)]
pub struct Correlate {
  id: Option<Callable<String>>,
  condition: Condition,
}

impl Correlate {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn id(mut self, id: impl Into<Callable<String>>) -> Self {
    self.id = Some(id.into());
    self
  }

  pub fn when(mut self, predicate: impl Into<Callable<bool>>) -> Self {
    self.condition = self.condition.when(predicate);
    self
  }

  pub fn unless(mut self, predicate: impl Into<Callable<bool>>) -> Self {
    self.condition = self.condition.unless(predicate);
    self
  }

  /// The id that applies to `execution`.
  pub fn resolve(&self, execution: &Execution) -> String {
    let explicit = self
      .id
      .as_ref()
      .and_then(|id| id.resolve(execution))
      .or_else(|| execution.requested_correlation_id().map(str::to_owned));
    Correlator::resolve(explicit.as_deref(), Some(execution.run().id()))
  }
}

#[async_trait]
impl Middleware for Correlate {
  async fn call(&self, execution: &Execution, next: Next<'_>) -> anyhow::Result<TaskResult> {
    if !self.condition.allows(execution) {
      return next.run(execution).await;
    }

    let id = self.resolve(execution);
    debug!(correlation_id = %id, "correlation scoped");
    execution
      .result()
      .insert_metadata("correlation_id", id.clone());
    Correlator::scope(id, next.run(execution)).await
  }
}
