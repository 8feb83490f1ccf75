//! Taskline Middleware
//!
//! Stock [`Middleware`](taskline_task::Middleware) implementations:
//!
//! - [`Correlate`] scopes the execution under a resolved correlation id.
//! - [`Timeout`] bounds the wrapped call and converts expiry into a failure.
//! - [`Runtime`] records elapsed milliseconds under the `runtime` key.
//!
//! Each accepts optional `if` / `unless` predicates through
//! [`Condition`](taskline_task::Condition); when the condition rejects the
//! execution the middleware simply passes through.

mod correlate;
mod error;
mod runtime;
mod timeout;

pub use correlate::Correlate;
pub use error::TimeoutError;
pub use runtime::Runtime;
pub use timeout::Timeout;
