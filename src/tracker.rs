use tokio_util::task::{task_tracker::TaskTrackerToken, TaskTracker};

/// Counted join barrier over every task spawned during one executor run.
///
/// Each [`register`](Self::register) hands out a [`CompletionGuard`]; the task
/// counts as in flight until that guard is dropped. Clones share the same count.
#[derive(Debug, Clone, Default)]
pub struct CompletionTracker {
    inner: TaskTracker,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one in-flight task. Must be called before the task body starts running.
    #[must_use = "dropping the guard immediately marks the task as done"]
    pub fn register(&self) -> CompletionGuard {
        CompletionGuard {
            _token: self.inner.token(),
        }
    }

    /// Number of registered tasks whose guard is still alive.
    pub fn in_flight(&self) -> usize {
        self.inner.len()
    }

    /// Waits until every registered task has been marked done.
    ///
    /// Registrations made while waiting are waited on too. No timeout is applied here.
    pub async fn wait_all(&self) {
        // The underlying tracker only resolves once closed; closing does not
        // prevent further registrations.
        self.inner.close();
        self.inner.wait().await;
    }
}

/// Proof that a task is registered with a [`CompletionTracker`].
///
/// Dropping it marks the task done, which also happens while unwinding.
#[derive(Debug)]
pub struct CompletionGuard {
    _token: TaskTrackerToken,
}

impl CompletionGuard {
    /// Marks the task done. Same as dropping the guard.
    pub fn mark_done(self) {}
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn wait_all_returns_immediately_when_nothing_registered() {
        let tracker = CompletionTracker::new();
        assert_eq!(tracker.in_flight(), 0);
        tokio::time::timeout(Duration::from_millis(10), tracker.wait_all())
            .await
            .expect("empty tracker should not block");
    }

    #[tokio::test]
    async fn wait_all_blocks_until_every_guard_is_released() {
        tokio::time::pause();
        let tracker = CompletionTracker::new();
        let first = tracker.register();
        let second = tracker.register();
        assert_eq!(tracker.in_flight(), 2);

        let waiter = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.wait_all().await }
        });

        first.mark_done();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(!waiter.is_finished());
        assert_eq!(tracker.in_flight(), 1);

        drop(second);
        waiter.await.unwrap();
        assert_eq!(tracker.in_flight(), 0);
    }

    #[tokio::test]
    async fn registrations_during_wait_are_covered() {
        tokio::time::pause();
        let tracker = CompletionTracker::new();
        let parent = tracker.register();

        let waiter = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.wait_all().await }
        });
        tokio::time::sleep(Duration::from_millis(1)).await;

        let child = tracker.register();
        drop(parent);
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(!waiter.is_finished());

        drop(child);
        waiter.await.unwrap();
    }
}
