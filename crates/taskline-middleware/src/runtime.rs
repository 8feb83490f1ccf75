//! Record how long the wrapped call took.

use std::time::Instant;

use async_trait::async_trait;
use taskline_task::{Callable, Condition, Execution, Middleware, Next, TaskResult};

/// Stores elapsed milliseconds under the `runtime` metadata key.
///
/// Nothing is recorded when the wrapped call returns an error.
#[derive(Debug, Clone, Default)]
pub struct Runtime {
  condition: Condition,
}

impl Runtime {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn when(mut self, predicate: impl Into<Callable<bool>>) -> Self {
    self.condition = self.condition.when(predicate);
    self
  }

  pub fn unless(mut self, predicate: impl Into<Callable<bool>>) -> Self {
    self.condition = self.condition.unless(predicate);
    self
  }
}

#[async_trait]
impl Middleware for Runtime {
  async fn call(&self, execution: &Execution, next: Next<'_>) -> anyhow::Result<TaskResult> {
    if !self.condition.allows(execution) {
      return next.run(execution).await;
    }

    let started = Instant::now();
    let result = next.run(execution).await?;
    let elapsed = started.elapsed().as_millis() as u64;
    execution.result().insert_metadata("runtime", elapsed);
    Ok(result)
  }
}
