//! Taskline Task
//!
//! A [`Task`] is a unit of business work. Running it through an
//! [`Invocation`] always yields exactly one [`TaskResult`]:
//!
//! - [`Invocation::execute`] never fails; unexpected errors and panics are
//!   captured into a failed result.
//! - [`Invocation::execute_strict`] records the result the same way and then
//!   surfaces a [`Fault`] when the task halted or raised, so nested callers
//!   can propagate it with `?`.
//!
//! Cross-cutting behaviour is layered around the work function by a
//! [`MiddlewareStack`], composed onion-style through [`Next`].

mod attribute;
mod callable;
mod context;
mod error;
mod execution;
mod invocation;
mod middleware;
mod task;

pub use attribute::AttributeErrors;
pub use callable::{Callable, Condition, Resolve};
pub use context::Context;
pub use error::{Fault, Interrupt};
pub use execution::Execution;
pub use invocation::Invocation;
pub use middleware::{Middleware, MiddlewareStack, Next};
pub use task::Task;

pub use taskline_result::{Metadata, ResultError, Run, State, Status, TaskResult};
