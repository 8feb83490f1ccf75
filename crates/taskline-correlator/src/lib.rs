//! Taskline Correlator
//!
//! Holds the single active correlation identifier for the current
//! execution scope. Storage is tokio task-local, so a value set inside a
//! scope follows the future across worker threads but is *not* inherited by
//! freshly spawned tasks. Code that fans work out to new tasks has to
//! re-establish the scope explicitly (see [`Correlator::scope`]).

mod correlator;

pub use correlator::Correlator;
