//! Taskline Workflow
//!
//! A [`Workflow`] is a [`Task`](taskline_task::Task) whose work runs an
//! ordered list of [`ExecutionGroup`]s against one shared context:
//!
//! - a group whose `if` / `unless` condition rejects the workflow is skipped
//!   without producing any results;
//! - a sequential group runs its tasks in declared order;
//! - a parallel group runs its tasks concurrently on the tokio runtime,
//!   bounded by its worker hints.
//!
//! After each task the result's status is tested against the group's
//! [`Breakpoints`]. On a match the workflow adopts that result through
//! `throw`, linking the failure chain, and no further tasks are started.
//!
//! Workflows can also be described declaratively with
//! [`taskline_config::WorkflowDef`] and turned into a runnable workflow by a
//! [`Resolver`] backed by a [`TaskRegistry`].

mod error;
mod group;
mod pipeline;
mod registry;
mod resolver;
mod workflow;

pub use error::WorkflowError;
pub use group::{Breakpoints, ExecutionGroup, GroupOptions, Strategy};
pub use registry::TaskRegistry;
pub use resolver::Resolver;
pub use workflow::Workflow;
