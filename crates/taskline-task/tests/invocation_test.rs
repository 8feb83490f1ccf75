//! Integration tests for task invocation, the failure chain and the
//! middleware contract.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use taskline_correlator::Correlator;
use taskline_task::{
  AttributeErrors, Callable, Condition, Execution, Fault, Invocation, Middleware, MiddlewareStack,
  Next, Run, State, Status, Task, TaskResult,
};

struct Succeed;

#[async_trait]
impl Task for Succeed {
  async fn work(&self, execution: &Execution) -> anyhow::Result<()> {
    execution.context().insert("succeeded", true);
    Ok(())
  }
}

struct Decline;

#[async_trait]
impl Task for Decline {
  async fn work(&self, execution: &Execution) -> anyhow::Result<()> {
    Err(execution.fail_with("card declined", {
      let mut md = taskline_task::Metadata::new();
      md.insert("code".to_string(), json!("E42"));
      md
    }))
  }
}

struct Nothing;

#[async_trait]
impl Task for Nothing {
  async fn work(&self, execution: &Execution) -> anyhow::Result<()> {
    Err(execution.skip("nothing to do"))
  }
}

struct Explode;

#[async_trait]
impl Task for Explode {
  async fn work(&self, _execution: &Execution) -> anyhow::Result<()> {
    anyhow::bail!("database unavailable")
  }
}

struct Panic;

#[async_trait]
impl Task for Panic {
  async fn work(&self, _execution: &Execution) -> anyhow::Result<()> {
    panic!("invariant violated")
  }
}

/// Calls `inner` strictly and lets any fault escape.
struct Wrapper {
  name: &'static str,
  inner: Arc<dyn Task>,
}

#[async_trait]
impl Task for Wrapper {
  fn name(&self) -> &str {
    self.name
  }

  async fn work(&self, execution: &Execution) -> anyhow::Result<()> {
    execution.call_strict(self.inner.clone()).await?;
    Ok(())
  }
}

#[tokio::test]
async fn test_success_completes() {
  let result = Invocation::new(Arc::new(Succeed)).execute().await;

  assert_eq!(result.state(), State::Complete);
  assert_eq!(result.status(), Status::Success);
  assert_eq!(result.task(), "Succeed");
  assert_eq!(result.index(), 0);
}

#[tokio::test]
async fn test_fail_records_metadata() {
  let result = Invocation::new(Arc::new(Decline)).execute().await;

  assert!(result.is_failed());
  assert!(result.is_interrupted());
  assert_eq!(result.reason().as_deref(), Some("card declined"));
  assert_eq!(result.metadata_value("code"), Some(json!("E42")));
  assert!(result.is_failure_origin());
}

#[tokio::test]
async fn test_skip_is_interrupted() {
  let result = Invocation::new(Arc::new(Nothing)).execute().await;

  assert!(result.is_skipped());
  assert!(result.is_interrupted());
  assert!(result.is_good() && result.is_bad());
}

#[tokio::test]
async fn test_unexpected_error_is_captured_in_safe_mode() {
  let result = Invocation::new(Arc::new(Explode)).execute().await;

  assert!(result.is_failed());
  assert!(result.is_interrupted());
  assert_eq!(result.reason().as_deref(), Some("database unavailable"));
  assert!(
    result
      .metadata_value("original_exception")
      .and_then(|v| v.as_str().map(str::to_owned))
      .is_some_and(|v| v.contains("database unavailable"))
  );
}

#[tokio::test]
async fn test_unexpected_error_is_raised_in_strict_mode_after_recording() {
  let run = Arc::new(Run::new("strict-run"));
  let fault = Invocation::new(Arc::new(Explode))
    .run(run.clone())
    .execute_strict()
    .await
    .unwrap_err();

  match &fault {
    Fault::Unexpected { result, error } => {
      assert!(result.is_failed());
      assert!(result.is_interrupted());
      assert_eq!(error.to_string(), "database unavailable");
    }
    other => panic!("expected unexpected fault, got {other:?}"),
  }
  assert_eq!(run.root(), Some(fault.result().clone()));
}

#[tokio::test]
async fn test_strict_mode_halts_on_failed_but_not_on_skipped() {
  let fault = Invocation::new(Arc::new(Decline))
    .execute_strict()
    .await
    .unwrap_err();
  assert!(matches!(fault, Fault::Halted { .. }));
  assert!(fault.into_result().is_failed());

  let skipped = Invocation::new(Arc::new(Nothing))
    .execute_strict()
    .await
    .unwrap();
  assert!(skipped.is_skipped());

  let success = Invocation::new(Arc::new(Succeed))
    .execute_strict()
    .await
    .unwrap();
  assert!(success.is_success());
}

struct StrictAboutSkips;

#[async_trait]
impl Task for StrictAboutSkips {
  fn halt_on(&self) -> Vec<Status> {
    vec![Status::Skipped, Status::Failed]
  }

  async fn work(&self, execution: &Execution) -> anyhow::Result<()> {
    Err(execution.skip("not today"))
  }
}

#[tokio::test]
async fn test_custom_halt_statuses() {
  let fault = Invocation::new(Arc::new(StrictAboutSkips))
    .execute_strict()
    .await
    .unwrap_err();
  assert!(fault.result().is_skipped());
}

#[tokio::test]
async fn test_panic_is_captured() {
  let result = Invocation::new(Arc::new(Panic)).execute().await;

  assert!(result.is_failed());
  assert!(result.is_interrupted());
  assert_eq!(
    result.reason().as_deref(),
    Some("task panicked: invariant violated")
  );
}

#[tokio::test]
async fn test_failure_chain_across_nested_calls() {
  let b: Arc<dyn Task> = Arc::new(Decline);
  let a: Arc<dyn Task> = Arc::new(Wrapper {
    name: "A",
    inner: b,
  });
  let c: Arc<dyn Task> = Arc::new(Wrapper {
    name: "C",
    inner: a,
  });

  let run = Arc::new(Run::new("chain-run"));
  let c_result = Invocation::new(c).run(run.clone()).execute().await;

  let results = run.results();
  assert_eq!(results.len(), 3);
  let (c_res, a_res, b_res) = (&results[0], &results[1], &results[2]);
  assert_eq!(c_res, &c_result);
  assert_eq!((c_res.task(), a_res.task(), b_res.task()), ("C", "A", "Decline"));

  assert!(b_res.is_failure_origin());

  assert!(a_res.is_failed());
  assert_eq!(a_res.caused_failure().as_ref(), Some(b_res));
  assert_eq!(a_res.threw_failure().as_ref(), Some(b_res));

  assert!(c_res.is_failed());
  assert!(c_res.is_interrupted());
  assert_eq!(c_res.caused_failure().as_ref(), Some(b_res));
  assert_eq!(c_res.threw_failure().as_ref(), Some(a_res));
  assert_eq!(c_res.reason().as_deref(), Some("card declined"));
}

#[tokio::test]
async fn test_safe_nested_call_does_not_propagate() {
  struct Tolerant;

  #[async_trait]
  impl Task for Tolerant {
    async fn work(&self, execution: &Execution) -> anyhow::Result<()> {
      let nested = execution.call(Arc::new(Decline)).await;
      execution.context().insert("nested_failed", nested.is_failed());
      Ok(())
    }
  }

  let result = Invocation::new(Arc::new(Tolerant)).execute().await;
  assert!(result.is_success());
  assert!(result.is_complete());
  assert_eq!(result.threw_failure(), None);
}

#[tokio::test]
async fn test_nested_calls_share_run_and_context() {
  struct Parent;

  #[async_trait]
  impl Task for Parent {
    async fn work(&self, execution: &Execution) -> anyhow::Result<()> {
      let nested = execution.call(Arc::new(Succeed)).await;
      assert_eq!(nested.run_id(), execution.run().id());
      Ok(())
    }
  }

  let context = taskline_task::Context::from(json!({ "order": 7 }));
  let result = Invocation::new(Arc::new(Parent))
    .context(context.clone())
    .correlation_id("req-123")
    .execute()
    .await;

  assert_eq!(result.run_id(), "req-123");
  assert_eq!(context.get("succeeded"), Some(json!(true)));
  assert_eq!(context.get("order"), Some(json!(7)));
}

#[tokio::test]
async fn test_root_run_id_uses_active_correlator() {
  let result = Correlator::scope("active-id", Invocation::new(Arc::new(Succeed)).execute()).await;
  assert_eq!(result.run_id(), "active-id");

  let explicit = Correlator::scope(
    "active-id",
    Invocation::new(Arc::new(Succeed))
      .correlation_id("explicit-id")
      .execute(),
  )
  .await;
  assert_eq!(explicit.run_id(), "explicit-id");

  let generated = Invocation::new(Arc::new(Succeed)).execute().await;
  assert!(!generated.run_id().is_empty());
  assert_ne!(generated.run_id(), "active-id");
}

struct Validated {
  worked: Arc<AtomicBool>,
}

#[async_trait]
impl Task for Validated {
  fn validate(&self, execution: &Execution) -> AttributeErrors {
    let mut errors = AttributeErrors::new();
    if !execution.context().contains_key("email") {
      errors.add("email", "is required");
    }
    if execution.context().get_as::<u64>("age").is_none() {
      errors.add("age", "must be an integer");
    }
    errors
  }

  async fn work(&self, _execution: &Execution) -> anyhow::Result<()> {
    self.worked.store(true, Ordering::SeqCst);
    Ok(())
  }
}

#[tokio::test]
async fn test_validation_errors_fail_before_work() {
  let worked = Arc::new(AtomicBool::new(false));
  let result = Invocation::new(Arc::new(Validated {
    worked: worked.clone(),
  }))
  .context(json!({ "age": "old" }))
  .execute()
  .await;

  assert!(!worked.load(Ordering::SeqCst));
  assert!(result.is_failed());
  assert!(result.is_interrupted());
  assert_eq!(
    result.reason().as_deref(),
    Some("age must be an integer. email is required")
  );
  assert_eq!(
    result.metadata_value("messages"),
    Some(json!({ "age": ["must be an integer"], "email": ["is required"] }))
  );

  let valid = Invocation::new(Arc::new(Validated {
    worked: worked.clone(),
  }))
  .context(json!({ "age": 30, "email": "a@b.c" }))
  .execute()
  .await;
  assert!(valid.is_success());
  assert!(worked.load(Ordering::SeqCst));
}

/// Records entry and exit around `next`.
struct Trace {
  label: &'static str,
  log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Middleware for Trace {
  async fn call(&self, execution: &Execution, next: Next<'_>) -> anyhow::Result<TaskResult> {
    self.log.lock().unwrap().push(format!("{}:before", self.label));
    let result = next.run(execution).await;
    self.log.lock().unwrap().push(format!("{}:after", self.label));
    result
  }
}

/// Never calls `next`; substitutes a skipped result.
struct Gatekeeper;

#[async_trait]
impl Middleware for Gatekeeper {
  async fn call(&self, execution: &Execution, _next: Next<'_>) -> anyhow::Result<TaskResult> {
    execution.result().skip("gate closed")?;
    Ok(execution.result().clone())
  }
}

struct Layered {
  stack: MiddlewareStack,
  runs: Arc<AtomicUsize>,
}

#[async_trait]
impl Task for Layered {
  fn middlewares(&self) -> MiddlewareStack {
    self.stack.clone()
  }

  async fn work(&self, _execution: &Execution) -> anyhow::Result<()> {
    self.runs.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }
}

#[tokio::test]
async fn test_middlewares_compose_as_an_onion() {
  let log = Arc::new(Mutex::new(Vec::new()));
  let runs = Arc::new(AtomicUsize::new(0));
  let stack = MiddlewareStack::new()
    .with(Trace {
      label: "outer",
      log: log.clone(),
    })
    .with(Trace {
      label: "inner",
      log: log.clone(),
    });

  let result = Invocation::new(Arc::new(Layered {
    stack,
    runs: runs.clone(),
  }))
  .execute()
  .await;

  assert!(result.is_success());
  assert_eq!(runs.load(Ordering::SeqCst), 1);
  assert_eq!(
    *log.lock().unwrap(),
    vec!["outer:before", "inner:before", "inner:after", "outer:after"]
  );
}

#[tokio::test]
async fn test_middleware_may_skip_the_work() {
  let runs = Arc::new(AtomicUsize::new(0));
  let result = Invocation::new(Arc::new(Layered {
    stack: MiddlewareStack::new().with(Gatekeeper),
    runs: runs.clone(),
  }))
  .execute()
  .await;

  assert_eq!(runs.load(Ordering::SeqCst), 0);
  assert!(result.is_skipped());
  assert!(result.is_interrupted());
  assert_eq!(result.reason().as_deref(), Some("gate closed"));
}

struct Options;

#[async_trait]
impl Task for Options {
  fn lookup(&self, name: &str, _execution: &Execution) -> Option<Value> {
    match name {
      "enabled" => Some(json!(true)),
      _ => None,
    }
  }

  async fn work(&self, execution: &Execution) -> anyhow::Result<()> {
    let from_task = Callable::<bool>::named("enabled").resolve(execution);
    let from_context = Callable::<u64>::named("limit").resolve(execution);
    let missing = Callable::<u64>::named("missing").resolve(execution);
    let closure =
      Callable::closure(|e: &Execution| e.context().get_as::<u64>("limit").map(|l| l * 2));

    execution.context().insert("from_task", json!(from_task));
    execution.context().insert("from_context", json!(from_context));
    execution.context().insert("missing", json!(missing));
    execution.context().insert("closure", json!(closure.resolve(execution)));

    let open = Condition::new().when(Callable::named("enabled"));
    let closed = Condition::new()
      .when(true)
      .unless(Callable::named("enabled"));
    let unknown = Condition::new().when(Callable::named("missing"));
    execution.context().insert("open", open.allows(execution));
    execution.context().insert("closed", closed.allows(execution));
    execution.context().insert("unknown", unknown.allows(execution));
    execution
      .context()
      .insert("unconditional", Condition::new().allows(execution));
    Ok(())
  }
}

#[tokio::test]
async fn test_callables_resolve_against_task_and_context() {
  let context = taskline_task::Context::from(json!({ "limit": 5 }));
  let result = Invocation::new(Arc::new(Options))
    .context(context.clone())
    .execute()
    .await;

  assert!(result.is_success());
  assert_eq!(context.get("from_task"), Some(json!(true)));
  assert_eq!(context.get("from_context"), Some(json!(5)));
  assert_eq!(context.get("missing"), Some(Value::Null));
  assert_eq!(context.get("closure"), Some(json!(10)));
  assert_eq!(context.get("open"), Some(json!(true)));
  assert_eq!(context.get("closed"), Some(json!(false)));
  assert_eq!(context.get("unknown"), Some(json!(false)));
  assert_eq!(context.get("unconditional"), Some(json!(true)));
}

#[tokio::test]
async fn test_illegal_second_fail_is_an_unexpected_error() {
  struct Twice;

  #[async_trait]
  impl Task for Twice {
    async fn work(&self, execution: &Execution) -> anyhow::Result<()> {
      let _ = execution.skip("first");
      Err(execution.fail("second"))
    }
  }

  let fault = Invocation::new(Arc::new(Twice))
    .execute_strict()
    .await
    .unwrap_err();

  // The first settlement stands; the illegal transition surfaces as an error.
  let result = fault.result();
  assert!(result.is_skipped());
  assert_eq!(result.reason().as_deref(), Some("first"));
  assert!(matches!(fault, Fault::Unexpected { .. }));
}

#[tokio::test]
async fn test_dropped_execution_is_settled_as_failed() {
  struct Slow;

  #[async_trait]
  impl Task for Slow {
    async fn work(&self, _execution: &Execution) -> anyhow::Result<()> {
      tokio::time::sleep(std::time::Duration::from_millis(500)).await;
      Ok(())
    }
  }

  let run = Arc::new(Run::new("run-1"));
  let pending = Invocation::new(Arc::new(Slow)).run(run.clone()).execute();
  let outcome = tokio::time::timeout(std::time::Duration::from_millis(20), pending).await;
  assert!(outcome.is_err());

  let result = run.root().unwrap();
  assert_eq!(result.state(), State::Interrupted);
  assert_eq!(result.status(), Status::Failed);
  assert_eq!(result.reason().as_deref(), Some("execution cancelled"));
}
