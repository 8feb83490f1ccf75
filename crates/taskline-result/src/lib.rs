//! Taskline Result
//!
//! Every task execution produces exactly one [`TaskResult`]. A result
//! carries two independent one-way lattices:
//!
//! - [`State`] tracks the lifecycle: `initialized -> executing -> {complete, interrupted}`.
//! - [`Status`] tracks the business outcome: `success -> {skipped, failed}`.
//!
//! Results created within one root invocation are appended to a shared
//! [`Run`], which assigns each of them a unique, increasing index. When a
//! result adopts the outcome of another one ([`TaskResult::throw`]), it keeps
//! a pointer to the immediate hop (`threw_failure`) and to the original
//! failure site (`caused_failure`).

mod error;
mod result;
mod run;
mod status;

pub use error::ResultError;
pub use result::{Metadata, TaskResult};
pub use run::Run;
pub use status::{State, Status};
