//! Incremental build engine turning a directory of source documents into pages.
//!
//! A build seeds a single [`Task::Scan`]; every task that turns out to be stale
//! runs and may append follow-up tasks, so the task graph grows while it is
//! being executed:
//!
//! ```text
//! scan ─┬─► parse(a.rst) ─► transform(a) ─► write_cache(a)     compile queue
//!       └─► link(a)                                            link queue
//! ```
//!
//! The compile queue is drained to a fixpoint before the link queue starts,
//! because link staleness is judged from what `write_cache` recorded.
//!
//! Only one build may own a set of build/cache directories at a time; running
//! two concurrently against the same directories is unsupported.

#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod project;
pub mod task;

pub use context::{BuildContext, TaskQueue, QUIRE_VERSION};
pub use error::BuildError;
pub use project::{Project, Target};
pub use task::{is_outdated, Task};
