//! Task runner: launch N tasks and block until all have completed.
//!
//! - Each `run_all` call gets its own scope and completion counter
//! - No ordering guarantee between tasks
//! - Task bodies cannot fail; a panic is counted, not propagated

use crate::models::{Result, RunStats, RunnerConfig, TaskContext, TaskId, TaskrunError};
use crate::pool::TaskScope;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// A unit of work launched once per index.
pub trait Task: Send + Sync + 'static {
    /// Side-effect-only body; returns nothing and cannot fail.
    fn run(&self, ctx: TaskContext) -> impl Future<Output = ()> + Send;
}

/// Adapter turning an async closure into a [`Task`].
pub struct FnTask<F>(F);

/// Wrap `f` as a task.
pub fn task_fn<F, Fut>(f: F) -> FnTask<F>
where
    F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send,
{
    FnTask(f)
}

impl<F, Fut> Task for FnTask<F>
where
    F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send,
{
    fn run(&self, ctx: TaskContext) -> impl Future<Output = ()> + Send {
        (self.0)(ctx)
    }
}

/// Launches fixed-size groups of concurrent tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskRunner {
    /// Max bodies executing at once (None = all)
    concurrency: Option<usize>,
    /// Draw a progress bar per run
    progress: bool,
}

impl TaskRunner {
    /// Runner with no concurrency bound.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Runner allowing at most `limit` bodies at once.
    pub fn with_concurrency(limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(TaskrunError::InvalidInput(
                "concurrency limit must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            concurrency: Some(limit),
            progress: false,
        })
    }

    /// Build a runner from configuration.
    pub fn from_config(config: &RunnerConfig) -> Result<Self> {
        let mut runner = match config.concurrency {
            Some(limit) => Self::with_concurrency(limit)?,
            None => Self::unbounded(),
        };
        runner.progress = config.progress;
        Ok(runner)
    }

    pub fn concurrency(&self) -> Option<usize> {
        self.concurrency
    }

    fn progress_bar(&self, n: usize) -> Option<ProgressBar> {
        if !self.progress {
            return None;
        }
        let pb = ProgressBar::new(n as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
        {
            pb.set_style(style.progress_chars("##-"));
        }
        Some(pb)
    }

    /// Start tasks `0..n` and return once every one of them has completed.
    pub async fn run_all<T: Task>(&self, n: usize, task: Arc<T>) -> RunStats {
        let run_id = Uuid::new_v4();
        let start = Instant::now();
        let mut stats = RunStats::new(run_id, n);

        info!(
            run_id = %run_id,
            tasks = n,
            concurrency = ?self.concurrency,
            "Starting run"
        );

        let progress = self.progress_bar(n);
        let mut scope = TaskScope::new(self.concurrency);
        if let Some(pb) = &progress {
            scope = scope.with_progress(pb.clone());
        }

        for index in 0..n {
            let ctx = TaskContext {
                run_id,
                id: TaskId(index),
            };
            let task = Arc::clone(&task);
            scope.spawn(ctx.id, async move { task.run(ctx).await });
        }

        let outcome = scope.join().await;

        stats.completed = outcome.completed;
        stats.panicked = outcome.panicked.len();
        stats.finalize(start.elapsed().as_secs_f64());

        if let Some(pb) = progress {
            pb.finish_with_message(format!(
                "Done! {} completed, {} panicked",
                stats.completed, stats.panicked
            ));
        }

        if stats.panicked > 0 {
            warn!(
                run_id = %run_id,
                panicked = stats.panicked,
                "Run finished with panicked tasks"
            );
        }

        info!(
            run_id = %run_id,
            completed = stats.completed,
            runtime = format!("{:.3}s", stats.runtime_secs),
            "Run complete"
        );

        stats
    }
}
