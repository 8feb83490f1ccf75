//! Execution group definitions.

use serde::{Deserialize, Serialize};

use crate::value::ConditionValue;

/// One execution group of a workflow.
///
/// `strategy` stays a plain string here; unknown values are rejected when
/// the definition is resolved, before anything runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDef {
  pub tasks: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub strategy: Option<String>,
  #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
  pub when: Option<ConditionValue>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub unless: Option<ConditionValue>,
  /// Status strings that halt the workflow. Overrides the workflow's set.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub breakpoints: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub in_threads: Option<usize>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub in_processes: Option<usize>,
}
