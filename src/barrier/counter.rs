//! Completion counter: a countdown join barrier.
//!
//! Invariants:
//! - The pending count never wraps; lowering it past zero is an error.
//! - A waiter registers for wakeup before reading the count, so a
//!   decrement to zero between the read and the sleep is never missed.
//! - A `CompletionGuard` lowers the count exactly once, on drop, which
//!   also covers a task body that panics.

use crate::models::{Result, TaskrunError};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use tracing::{trace, warn};

/// Shared counter of outstanding tasks.
#[derive(Debug, Default)]
pub struct CompletionCounter {
    pending: AtomicUsize,
    notify: Notify,
}

impl CompletionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the pending count. Call before launching the work it tracks.
    pub fn add(&self, n: usize) {
        let prev = self.pending.fetch_add(n, Ordering::AcqRel);
        trace!(pending = prev + n, "Completion counter raised");
    }

    /// Lower the pending count by one, waking waiters when it reaches zero.
    pub fn done(&self) -> Result<()> {
        let prev = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map_err(|_| TaskrunError::CounterUnderflow)?;

        if prev == 1 {
            self.notify.notify_waiters();
        }
        Ok(())
    }

    /// Current pending count.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Resolve once the pending count is zero.
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.pending() == 0 {
                return;
            }

            notified.await;
        }
    }

    /// Add one to the count and return a guard that removes it on drop.
    pub fn guard(self: &Arc<Self>) -> CompletionGuard {
        self.add(1);
        CompletionGuard {
            counter: Arc::clone(self),
        }
    }
}

/// Lowers its counter by one when dropped.
#[derive(Debug)]
#[must_use = "dropping the guard immediately marks the work complete"]
pub struct CompletionGuard {
    counter: Arc<CompletionCounter>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Err(e) = self.counter.done() {
            // Only reachable if someone called done() by hand alongside guards.
            warn!(error = %e, "Completion guard released an empty counter");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn wait_returns_immediately_when_nothing_pending() {
        let counter = CompletionCounter::new();
        tokio::time::timeout(Duration::from_secs(1), counter.wait())
            .await
            .expect("wait on an empty counter should not block");
    }

    #[test]
    fn done_without_add_is_underflow() {
        let counter = CompletionCounter::new();
        assert!(matches!(counter.done(), Err(TaskrunError::CounterUnderflow)));
        assert_eq!(counter.pending(), 0);
    }

    #[test]
    fn add_and_done_track_pending() {
        let counter = CompletionCounter::new();
        counter.add(3);
        counter.done().unwrap();
        assert_eq!(counter.pending(), 2);
        counter.done().unwrap();
        counter.done().unwrap();
        assert_eq!(counter.pending(), 0);
        assert!(counter.done().is_err());
    }

    #[tokio::test]
    async fn guard_drop_releases_waiter() {
        let counter = Arc::new(CompletionCounter::new());
        let guard = counter.guard();
        assert_eq!(counter.pending(), 1);

        let waiter = {
            let counter = Arc::clone(&counter);
            tokio::spawn(async move { counter.wait().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should be released")
            .unwrap();
    }

    #[tokio::test]
    async fn guard_releases_on_panic() {
        let counter = Arc::new(CompletionCounter::new());
        let guard = counter.guard();

        let handle: tokio::task::JoinHandle<()> = tokio::spawn(async move {
            let _guard = guard;
            panic!("task body blew up");
        });

        assert!(handle.await.unwrap_err().is_panic());
        assert_eq!(counter.pending(), 0);
    }

    #[tokio::test]
    async fn many_waiters_all_wake() {
        let counter = Arc::new(CompletionCounter::new());
        counter.add(1);

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let counter = Arc::clone(&counter);
                tokio::spawn(async move { counter.wait().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(10)).await;
        counter.done().unwrap();

        for waiter in waiters {
            tokio::time::timeout(Duration::from_secs(1), waiter)
                .await
                .expect("every waiter should wake")
                .unwrap();
        }
    }
}
