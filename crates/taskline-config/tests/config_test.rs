use std::io::Write;

use serde_json::json;
use taskline_config::{ConditionValue, ConfigError, MiddlewareDef, SecondsValue, WorkflowDef};

fn checkout_json() -> String {
  json!({
    "name": "checkout",
    "breakpoints": ["failed", "skipped"],
    "middlewares": [
      { "type": "timeout", "seconds": 5, "unless": "trusted" },
      { "type": "runtime" },
      { "type": "correlate", "id": "order-1" }
    ],
    "groups": [
      { "tasks": ["reserve", "charge"] },
      {
        "tasks": ["email", "sms"],
        "strategy": "parallel",
        "if": "notify",
        "breakpoints": [],
        "in_threads": 2
      },
      { "tasks": ["audit"], "unless": true, "strategy": "sequential" }
    ]
  })
  .to_string()
}

#[test]
fn test_parse_full_definition() {
  let def = WorkflowDef::from_json(&checkout_json()).unwrap();

  assert_eq!(def.name, "checkout");
  assert_eq!(
    def.breakpoints,
    Some(vec!["failed".to_string(), "skipped".to_string()])
  );
  assert_eq!(def.groups.len(), 3);

  let first = &def.groups[0];
  assert_eq!(first.tasks, vec!["reserve", "charge"]);
  assert_eq!(first.strategy, None);
  assert_eq!(first.breakpoints, None);
  assert_eq!(first.when, None);

  let second = &def.groups[1];
  assert_eq!(second.strategy.as_deref(), Some("parallel"));
  assert_eq!(second.when, Some(ConditionValue::Named("notify".to_string())));
  assert_eq!(second.breakpoints, Some(vec![]));
  assert_eq!(second.in_threads, Some(2));
  assert_eq!(second.in_processes, None);

  assert_eq!(def.groups[2].unless, Some(ConditionValue::Bool(true)));
}

#[test]
fn test_parse_middlewares() {
  let def = WorkflowDef::from_json(&checkout_json()).unwrap();

  assert_eq!(
    def.middlewares,
    vec![
      MiddlewareDef::Timeout {
        seconds: Some(SecondsValue::Number(5.0)),
        when: None,
        unless: Some(ConditionValue::Named("trusted".to_string())),
      },
      MiddlewareDef::Runtime {
        when: None,
        unless: None,
      },
      MiddlewareDef::Correlate {
        id: Some("order-1".to_string()),
        when: None,
        unless: None,
      },
    ]
  );
}

#[test]
fn test_named_seconds() {
  let def: MiddlewareDef =
    serde_json::from_value(json!({ "type": "timeout", "seconds": "limit" })).unwrap();

  assert_eq!(
    def,
    MiddlewareDef::Timeout {
      seconds: Some(SecondsValue::Named("limit".to_string())),
      when: None,
      unless: None,
    }
  );
}

#[test]
fn test_minimal_definition() {
  let def: WorkflowDef = r#"{ "name": "empty", "groups": [] }"#.parse().unwrap();

  assert!(def.middlewares.is_empty());
  assert_eq!(def.breakpoints, None);

  let value = serde_json::to_value(&def).unwrap();
  assert_eq!(value, json!({ "name": "empty", "groups": [] }));
}

#[test]
fn test_unknown_middleware_type_is_rejected() {
  let result = WorkflowDef::from_json(
    r#"{ "name": "x", "middlewares": [{ "type": "retry" }], "groups": [] }"#,
  );

  assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_load_from_file() {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  file.write_all(checkout_json().as_bytes()).unwrap();

  let def = WorkflowDef::load(file.path()).unwrap();
  assert_eq!(def.name, "checkout");
}

#[test]
fn test_load_missing_file() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("missing.json");

  let err = WorkflowDef::load(&path).unwrap_err();
  assert!(matches!(err, ConfigError::Read { .. }));
  assert!(err.to_string().contains("missing.json"));
}
