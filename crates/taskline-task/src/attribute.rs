//! Attribute validation errors.
//!
//! Declaring, coercing and validating task attributes is left to the task
//! itself (see [`Task::validate`](crate::Task::validate)); the boundary only
//! consumes the resulting error map.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Validation messages keyed by attribute name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeErrors {
  errors: BTreeMap<String, Vec<String>>,
}

impl AttributeErrors {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
    self
      .errors
      .entry(attribute.into())
      .or_default()
      .push(message.into());
  }

  pub fn is_empty(&self) -> bool {
    self.errors.is_empty()
  }

  pub fn len(&self) -> usize {
    self.errors.values().map(Vec::len).sum()
  }

  pub fn messages_for(&self, attribute: &str) -> &[String] {
    self
      .errors
      .get(attribute)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// `"<attribute> <message>"` for every message, in attribute order.
  pub fn full_messages(&self) -> Vec<String> {
    self
      .errors
      .iter()
      .flat_map(|(attribute, messages)| {
        messages
          .iter()
          .map(move |message| format!("{} {}", attribute, message))
      })
      .collect()
  }

  pub fn to_value(&self) -> Value {
    serde_json::to_value(&self.errors).unwrap_or(Value::Null)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_full_messages() {
    let mut errors = AttributeErrors::new();
    assert!(errors.is_empty());

    errors.add("name", "is required");
    errors.add("age", "must be an integer");
    errors.add("age", "must be positive");

    assert_eq!(errors.len(), 3);
    assert_eq!(errors.messages_for("age").len(), 2);
    assert!(errors.messages_for("email").is_empty());
    assert_eq!(
      errors.full_messages(),
      vec![
        "age must be an integer",
        "age must be positive",
        "name is required"
      ]
    );
    assert_eq!(errors.to_value()["name"][0], "is required");
  }
}
