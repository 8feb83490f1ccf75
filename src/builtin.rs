//! Demo tasks available to workflow files run from the command line.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use taskline_task::{Execution, Task};
use taskline_workflow::TaskRegistry;

/// Does nothing and succeeds.
struct Noop;

#[async_trait]
impl Task for Noop {
  fn name(&self) -> &str {
    "noop"
  }

  async fn work(&self, _execution: &Execution) -> anyhow::Result<()> {
    Ok(())
  }
}

/// Sleeps for `sleep_ms` milliseconds from the context.
struct Sleep;

#[async_trait]
impl Task for Sleep {
  fn name(&self) -> &str {
    "sleep"
  }

  async fn work(&self, execution: &Execution) -> anyhow::Result<()> {
    let millis = execution.context().get_as::<u64>("sleep_ms").unwrap_or(0);
    tokio::time::sleep(Duration::from_millis(millis)).await;
    Ok(())
  }
}

/// Fails with `fail_reason` from the context.
struct Fail;

#[async_trait]
impl Task for Fail {
  fn name(&self) -> &str {
    "fail"
  }

  async fn work(&self, execution: &Execution) -> anyhow::Result<()> {
    let reason = execution
      .context()
      .get_as::<String>("fail_reason")
      .unwrap_or_else(|| "failed on request".to_string());
    Err(execution.fail(reason))
  }
}

struct Skip;

#[async_trait]
impl Task for Skip {
  fn name(&self) -> &str {
    "skip"
  }

  async fn work(&self, execution: &Execution) -> anyhow::Result<()> {
    Err(execution.skip("skipped on request"))
  }
}

/// Adds one to the context `counter`.
struct Increment;

#[async_trait]
impl Task for Increment {
  fn name(&self) -> &str {
    "increment"
  }

  async fn work(&self, execution: &Execution) -> anyhow::Result<()> {
    execution.context().update("counter", |current| {
      json!(current.and_then(Value::as_u64).unwrap_or(0) + 1)
    });
    Ok(())
  }
}

pub fn registry() -> TaskRegistry {
  let tasks: [Arc<dyn Task>; 5] = [
    Arc::new(Noop),
    Arc::new(Sleep),
    Arc::new(Fail),
    Arc::new(Skip),
    Arc::new(Increment),
  ];

  let mut registry = TaskRegistry::new();
  for task in tasks {
    registry.register(task.name().to_string(), task);
  }
  registry
}

#[cfg(test)]
mod tests {
  use super::*;
  use taskline_config::WorkflowDef;
  use taskline_task::Invocation;
  use taskline_workflow::Resolver;

  #[test]
  fn test_registry_names() {
    assert_eq!(
      registry().names(),
      vec!["fail", "increment", "noop", "skip", "sleep"]
    );
  }

  #[tokio::test]
  async fn test_builtin_workflow() {
    let def = WorkflowDef::from_json(
      r#"{
        "name": "demo",
        "groups": [
          { "tasks": ["noop", "sleep"] },
          { "tasks": ["increment", "increment", "increment"], "strategy": "parallel" },
          { "tasks": ["skip", "fail"] }
        ]
      }"#,
    )
    .unwrap();
    let workflow = Resolver::new(registry()).resolve(def).unwrap();
    let context = taskline_task::Context::from(json!({ "sleep_ms": 1, "fail_reason": "no stock" }));

    let result = Invocation::new(Arc::new(workflow))
      .context(context.clone())
      .execute()
      .await;

    assert!(result.is_failed());
    assert_eq!(result.reason().as_deref(), Some("no stock"));
    assert_eq!(context.get_as::<u64>("counter"), Some(3));
  }
}
