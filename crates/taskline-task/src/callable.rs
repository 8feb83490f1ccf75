//! Values resolved lazily against an execution.
//!
//! Options such as timeouts and group conditions may be given as a literal,
//! as the name of a value the task or its context knows about, as a
//! closure, or as an object implementing [`Resolve`]. All of them go through
//! [`Callable::resolve`].

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::execution::Execution;

/// Object form of a callable option.
pub trait Resolve<T>: Send + Sync {
  fn resolve(&self, execution: &Execution) -> Option<T>;
}

/// An option value that may depend on the running execution.
pub enum Callable<T> {
  /// A literal.
  Value(T),
  /// Looked up via [`Task::lookup`](crate::Task::lookup), then the context.
  Named(String),
  Closure(Arc<dyn Fn(&Execution) -> Option<T> + Send + Sync>),
  Object(Arc<dyn Resolve<T>>),
}

impl<T> Callable<T> {
  pub fn value(value: T) -> Self {
    Callable::Value(value)
  }

  pub fn named(name: impl Into<String>) -> Self {
    Callable::Named(name.into())
  }

  pub fn closure<F>(f: F) -> Self
  where
    F: Fn(&Execution) -> Option<T> + Send + Sync + 'static,
  {
    Callable::Closure(Arc::new(f))
  }

  pub fn object<R>(object: R) -> Self
  where
    R: Resolve<T> + 'static,
  {
    Callable::Object(Arc::new(object))
  }
}

impl<T: Clone + DeserializeOwned> Callable<T> {
  /// Resolve against `execution`. `None` means nothing usable was found.
  pub fn resolve(&self, execution: &Execution) -> Option<T> {
    match self {
      Callable::Value(value) => Some(value.clone()),
      Callable::Named(name) => execution
        .task()
        .lookup(name, execution)
        .or_else(|| execution.context().get(name))
        .and_then(|value| serde_json::from_value(value).ok()),
      Callable::Closure(f) => f(execution),
      Callable::Object(object) => object.resolve(execution),
    }
  }
}

impl<T> From<T> for Callable<T> {
  fn from(value: T) -> Self {
    Callable::Value(value)
  }
}

impl<T: Clone> Clone for Callable<T> {
  fn clone(&self) -> Self {
    match self {
      Callable::Value(value) => Callable::Value(value.clone()),
      Callable::Named(name) => Callable::Named(name.clone()),
      Callable::Closure(f) => Callable::Closure(f.clone()),
      Callable::Object(object) => Callable::Object(object.clone()),
    }
  }
}

impl<T: fmt::Debug> fmt::Debug for Callable<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Callable::Value(value) => f.debug_tuple("Value").field(value).finish(),
      Callable::Named(name) => f.debug_tuple("Named").field(name).finish(),
      Callable::Closure(_) => f.write_str("Closure(..)"),
      Callable::Object(_) => f.write_str("Object(..)"),
    }
  }
}

/// Optional `if` / `unless` predicates gating a behaviour.
///
/// An `if` predicate must resolve to `true`; an `unless` predicate must not.
/// A predicate that resolves to nothing counts as `false`.
#[derive(Clone, Debug, Default)]
pub struct Condition {
  when: Option<Callable<bool>>,
  unless: Option<Callable<bool>>,
}

impl Condition {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn when(mut self, predicate: impl Into<Callable<bool>>) -> Self {
    self.when = Some(predicate.into());
    self
  }

  pub fn unless(mut self, predicate: impl Into<Callable<bool>>) -> Self {
    self.unless = Some(predicate.into());
    self
  }

  pub fn is_unconditional(&self) -> bool {
    self.when.is_none() && self.unless.is_none()
  }

  pub fn allows(&self, execution: &Execution) -> bool {
    let when = self
      .when
      .as_ref()
      .is_none_or(|p| p.resolve(execution).unwrap_or(false));
    let unless = self
      .unless
      .as_ref()
      .is_some_and(|p| p.resolve(execution).unwrap_or(false));
    when && !unless
  }
}
