//! Middleware definitions attached to a workflow.

use serde::{Deserialize, Serialize};

use crate::value::{ConditionValue, SecondsValue};

/// A middleware entry, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MiddlewareDef {
  Timeout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    seconds: Option<SecondsValue>,
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    when: Option<ConditionValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unless: Option<ConditionValue>,
  },
  Runtime {
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    when: Option<ConditionValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unless: Option<ConditionValue>,
  },
  Correlate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    when: Option<ConditionValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unless: Option<ConditionValue>,
  },
}
