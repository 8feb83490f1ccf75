//! Scoped correlation identifier storage.

use std::cell::RefCell;
use std::future::Future;

tokio::task_local! {
  static CORRELATION_ID: RefCell<Option<String>>;
}

/// Access point for the active correlation identifier.
///
/// A scope is opened with [`Correlator::scope`] (or [`Correlator::sync_scope`]
/// for synchronous code). Inside a scope [`Correlator::set`] and
/// [`Correlator::clear`] mutate the innermost scope only; when the scope ends
/// the enclosing value becomes visible again, whether the scoped code
/// returned normally, returned an error, or panicked.
pub struct Correlator;

impl Correlator {
  /// The active identifier, if any scope has set one.
  pub fn current() -> Option<String> {
    CORRELATION_ID
      .try_with(|id| id.borrow().clone())
      .ok()
      .flatten()
  }

  /// Replace the identifier of the innermost scope.
  ///
  /// Returns `false` when called outside of any scope, in which case there
  /// is nowhere to store the value and nothing changes.
  pub fn set(id: impl Into<String>) -> bool {
    let id = id.into();
    CORRELATION_ID
      .try_with(|slot| {
        slot.replace(Some(id));
      })
      .is_ok()
  }

  /// Clear the identifier of the innermost scope, returning what was there.
  pub fn clear() -> Option<String> {
    CORRELATION_ID
      .try_with(|slot| slot.borrow_mut().take())
      .ok()
      .flatten()
  }

  /// Generate a fresh unique identifier.
  pub fn generate() -> String {
    uuid::Uuid::new_v4().to_string()
  }

  /// Run `future` with `id` as the active identifier.
  pub fn scope<F>(id: impl Into<String>, future: F) -> impl Future<Output = F::Output>
  where
    F: Future,
  {
    CORRELATION_ID.scope(RefCell::new(Some(id.into())), future)
  }

  /// Run `f` with `id` as the active identifier.
  pub fn sync_scope<F, R>(id: impl Into<String>, f: F) -> R
  where
    F: FnOnce() -> R,
  {
    CORRELATION_ID.sync_scope(RefCell::new(Some(id.into())), f)
  }

  /// Decide which identifier an execution should use.
  ///
  /// Precedence, highest first: the explicitly supplied identifier, the
  /// active scope's identifier, the id of an already established run, and
  /// finally a freshly generated one. Blank strings count as absent.
  pub fn resolve(explicit: Option<&str>, run_id: Option<&str>) -> String {
    explicit
      .filter(|id| !id.trim().is_empty())
      .map(str::to_owned)
      .or_else(|| Self::current().filter(|id| !id.trim().is_empty()))
      .or_else(|| {
        run_id
          .filter(|id| !id.trim().is_empty())
          .map(str::to_owned)
      })
      .unwrap_or_else(Self::generate)
  }
}
