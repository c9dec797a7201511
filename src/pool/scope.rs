//! Task scope: owns every task spawned for one run.
//!
//! Invariants:
//! - Each spawned task holds one completion guard for its whole lifetime
//! - `join` returns only after the counter reaches zero and every handle is reaped
//! - Dropping an unjoined scope aborts whatever is still running

use crate::barrier::CompletionCounter;
use crate::models::TaskId;
use indicatif::ProgressBar;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How the tasks of a joined scope ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeOutcome {
    /// Tasks whose body returned normally
    pub completed: usize,
    /// Tasks whose body panicked
    pub panicked: Vec<TaskId>,
}

/// Structured owner of a group of spawned tasks.
pub struct TaskScope {
    counter: Arc<CompletionCounter>,
    semaphore: Option<Arc<Semaphore>>,
    progress: Option<ProgressBar>,
    handles: Vec<(TaskId, JoinHandle<()>)>,
}

impl TaskScope {
    /// Create a scope; `concurrency` bounds how many bodies run at once.
    pub fn new(concurrency: Option<usize>) -> Self {
        Self {
            counter: Arc::new(CompletionCounter::new()),
            semaphore: concurrency.map(|k| Arc::new(Semaphore::new(k))),
            progress: None,
            handles: Vec::new(),
        }
    }

    /// Tick `progress` once per finished body.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Tasks spawned and not yet finished.
    pub fn pending(&self) -> usize {
        self.counter.pending()
    }

    /// Spawn `body` as task `id`.
    pub fn spawn<F>(&mut self, id: TaskId, body: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // Counted before the spawn so a fast task cannot release the barrier early.
        let guard = self.counter.guard();
        let semaphore = self.semaphore.clone();
        let progress = self.progress.clone();

        let handle = tokio::spawn(async move {
            let _guard = guard;

            // The scope never closes its semaphore, so acquisition cannot fail.
            let _permit = match semaphore {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };

            body.await;

            if let Some(pb) = progress {
                pb.inc(1);
            }
        });

        self.handles.push((id, handle));
    }

    /// Wait for every spawned task, then reap their handles.
    pub async fn join(mut self) -> ScopeOutcome {
        self.counter.wait().await;
        debug!(tasks = self.handles.len(), "Completion barrier released");

        let handles = std::mem::take(&mut self.handles);
        let mut outcome = ScopeOutcome::default();

        for (id, handle) in handles {
            // `join` owns the scope, so nothing can abort a handle here:
            // every JoinError is a panic.
            match handle.await {
                Ok(()) => outcome.completed += 1,
                Err(e) => {
                    warn!(task = %id, error = %e, "Task panicked");
                    outcome.panicked.push(id);
                }
            }
        }

        outcome
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        let mut aborted = 0usize;
        for (_, handle) in &self.handles {
            if !handle.is_finished() {
                handle.abort();
                aborted += 1;
            }
        }
        if aborted > 0 {
            warn!(aborted, "Task scope dropped before join, aborting tasks");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn join_on_empty_scope_is_immediate() {
        let scope = TaskScope::new(None);
        let outcome = tokio::time::timeout(Duration::from_secs(1), scope.join())
            .await
            .unwrap();
        assert_eq!(outcome, ScopeOutcome::default());
    }

    #[tokio::test]
    async fn panicking_body_is_reported() {
        let mut scope = TaskScope::new(None);
        scope.spawn(TaskId(0), async {});
        scope.spawn(TaskId(1), async { panic!("boom") });

        let outcome = scope.join().await;
        assert_eq!(outcome.completed, 1);
        assert_eq!(outcome.panicked, vec![TaskId(1)]);
    }

    #[tokio::test]
    async fn progress_ticks_once_per_completed_body() {
        let pb = ProgressBar::hidden();
        let mut scope = TaskScope::new(Some(2)).with_progress(pb.clone());
        for i in 0..4 {
            scope.spawn(TaskId(i), async {});
        }
        scope.spawn(TaskId(4), async { panic!("boom") });

        let outcome = scope.join().await;
        assert_eq!(outcome.completed, 4);
        assert_eq!(outcome.panicked, vec![TaskId(4)]);
        assert_eq!(pb.position(), 4);
    }

    #[tokio::test]
    async fn dropping_scope_aborts_running_tasks() {
        let finished = Arc::new(AtomicUsize::new(0));
        let mut scope = TaskScope::new(None);

        for i in 0..3 {
            let finished = Arc::clone(&finished);
            scope.spawn(TaskId(i), async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                finished.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(scope.pending(), 3);
        drop(scope);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }
}
