//! taskrun - launch a fixed group of concurrent tasks and join them.
//!
//! ## Architecture
//!
//! - **Runner**: `TaskRunner::run_all(n, task)` starts tasks `0..n` and
//!   returns only after every one has completed
//! - **Scope**: `TaskScope` owns the spawned tasks of one run; nothing it
//!   spawns outlives it
//! - **Barrier**: `CompletionCounter` is the call-scoped join point; each
//!   task lowers it exactly once through a drop guard
//! - **Journal**: `EventJournal` collects the start/finish markers emitted
//!   by `MarkerTask`
//!
//! ## Guarantees
//!
//! - `run_all(0)` returns immediately
//! - Concurrent runs never share a counter
//! - A panicking task still releases the barrier and is reported in `RunStats`
//! - No ordering between tasks is promised

pub mod barrier;
pub mod journal;
pub mod models;
pub mod pool;

// Re-exports for convenience
pub use barrier::{CompletionCounter, CompletionGuard};
pub use journal::EventJournal;
pub use models::{
    Config, MarkerKind, Result, RunStats, TaskContext, TaskEvent, TaskId, TaskrunError,
};
pub use pool::{MarkerTask, Task, TaskRunner, TaskScope, task_fn};
