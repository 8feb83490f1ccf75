//! Shared key/value data passed between tasks.

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Data shared by every task of an invocation tree.
///
/// Cloning yields another handle to the same data, so a workflow and all
/// of its members (including parallel workers) see each other's writes.
#[derive(Clone, Default)]
pub struct Context {
  data: Arc<RwLock<Map<String, Value>>>,
}

impl Context {
  pub fn new() -> Self {
    Self::default()
  }

  fn read(&self) -> RwLockReadGuard<'_, Map<String, Value>> {
    self.data.read().unwrap_or_else(|e| e.into_inner())
  }

  fn write(&self) -> RwLockWriteGuard<'_, Map<String, Value>> {
    self.data.write().unwrap_or_else(|e| e.into_inner())
  }

  pub fn get(&self, key: &str) -> Option<Value> {
    self.read().get(key).cloned()
  }

  /// Get a value and deserialize it, `None` when missing or mistyped.
  pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
    self
      .get(key)
      .and_then(|value| serde_json::from_value(value).ok())
  }

  pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
    self.write().insert(key.into(), value.into())
  }

  pub fn remove(&self, key: &str) -> Option<Value> {
    self.write().remove(key)
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.read().contains_key(key)
  }

  /// Read-modify-write `key` under a single write lock.
  pub fn update<F>(&self, key: impl Into<String>, f: F) -> Value
  where
    F: FnOnce(Option<&Value>) -> Value,
  {
    let key = key.into();
    let mut data = self.write();
    let value = f(data.get(&key));
    data.insert(key, value.clone());
    value
  }

  pub fn len(&self) -> usize {
    self.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.read().is_empty()
  }

  /// Copy of the current data.
  pub fn snapshot(&self) -> Map<String, Value> {
    self.read().clone()
  }

  pub fn to_value(&self) -> Value {
    Value::Object(self.snapshot())
  }
}

impl From<Map<String, Value>> for Context {
  fn from(data: Map<String, Value>) -> Self {
    Self {
      data: Arc::new(RwLock::new(data)),
    }
  }
}

/// Objects become the context data; any other value is stored under `"value"`.
impl From<Value> for Context {
  fn from(value: Value) -> Self {
    match value {
      Value::Object(data) => data.into(),
      Value::Null => Self::new(),
      other => {
        let mut data = Map::new();
        data.insert("value".to_string(), other);
        data.into()
      }
    }
  }
}

impl fmt::Debug for Context {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Context").field(&*self.read()).finish()
  }
}
