//! Error types for building workflows.

use thiserror::Error;

/// Configuration errors. These are raised before any task runs and never
/// end up in a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
  /// Group strategy other than `sequential` or `parallel`.
  #[error("unknown execution strategy: {strategy}")]
  UnknownStrategy { strategy: String },

  /// Task name not present in the registry.
  #[error("task not found: {name}")]
  TaskNotFound { name: String },

  /// Breakpoint that names no status.
  #[error("invalid breakpoint '{breakpoint}': {message}")]
  InvalidBreakpoint { breakpoint: String, message: String },
}
