//! Task identity, marker events and run statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Index of a task within one run, in `[0, n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub usize);

impl TaskId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a task body knows about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskContext {
    /// Run the task belongs to
    pub run_id: Uuid,
    /// Index of the task within the run
    pub id: TaskId,
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which marker a task emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Started,
    Finished,
}

impl MarkerKind {
    /// Verb used when echoing the marker.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Started => "starting",
            Self::Finished => "finished",
        }
    }
}

/// A single marker emitted by a task body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEvent {
    /// Run this event belongs to
    pub run_id: Uuid,

    /// Task that emitted it
    pub task: TaskId,

    /// Start or finish
    pub kind: MarkerKind,

    /// Task label ("Worker")
    pub label: String,

    /// Wall-clock time of emission
    pub at: DateTime<Utc>,
}

impl TaskEvent {
    pub fn new(run_id: Uuid, task: TaskId, kind: MarkerKind, label: impl Into<String>) -> Self {
        Self {
            run_id,
            task,
            kind,
            label: label.into(),
            at: Utc::now(),
        }
    }
}

impl fmt::Display for TaskEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.label, self.task, self.kind.verb())
    }
}

/// Statistics for one `run_all` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    /// Unique identifier of the run
    pub run_id: Uuid,

    /// Tasks launched
    pub total_tasks: usize,

    /// Tasks whose body returned normally
    pub completed: usize,

    /// Tasks whose body panicked (still counted down)
    pub panicked: usize,

    /// When the first task was launched
    pub started_at: DateTime<Utc>,

    /// When the barrier released
    pub finished_at: DateTime<Utc>,

    /// Total runtime in seconds
    pub runtime_secs: f64,

    /// Completed tasks per second
    pub throughput_per_sec: f64,
}

impl RunStats {
    pub fn new(run_id: Uuid, total_tasks: usize) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            total_tasks,
            completed: 0,
            panicked: 0,
            started_at: now,
            finished_at: now,
            runtime_secs: 0.0,
            throughput_per_sec: 0.0,
        }
    }

    /// Stamp the finish time and calculate derived stats.
    pub fn finalize(&mut self, runtime_secs: f64) {
        self.finished_at = Utc::now();
        self.runtime_secs = runtime_secs;
        if runtime_secs > 0.0 {
            self.throughput_per_sec = self.completed as f64 / runtime_secs;
        }
    }

    /// Every launched task has been accounted for.
    pub fn is_settled(&self) -> bool {
        self.completed + self.panicked == self.total_tasks
    }
}
