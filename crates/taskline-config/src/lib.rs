//! Taskline Config
//!
//! Serializable workflow definitions. These types describe a workflow before
//! it is resolved against a task registry into something runnable.
//!
//! ```json
//! {
//!   "name": "checkout",
//!   "breakpoints": ["failed"],
//!   "middlewares": [{ "type": "timeout", "seconds": 5 }],
//!   "groups": [
//!     { "tasks": ["reserve", "charge"] },
//!     { "tasks": ["email", "sms"], "strategy": "parallel", "if": "notify" }
//!   ]
//! }
//! ```

mod error;
mod group;
mod middleware;
mod value;
mod workflow;

pub use error::ConfigError;
pub use group::GroupDef;
pub use middleware::MiddlewareDef;
pub use value::{ConditionValue, SecondsValue};
pub use workflow::WorkflowDef;
