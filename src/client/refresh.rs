use std::{
    future::Future,
    sync::{Mutex, MutexGuard, PoisonError},
};

use tokio::sync::oneshot;

#[derive(Default)]
struct QueueState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<bool>>,
}

/// Serialises token refreshes. The first caller runs the refresh, later
/// callers wait for its outcome instead of starting their own.
#[derive(Default)]
pub struct RefreshQueue {
    state: Mutex<QueueState>,
}

enum Role {
    Leader,
    Waiter(oneshot::Receiver<bool>),
}

/// Wakes the waiters when the leader finishes or is dropped mid-refresh.
struct LeaderGuard<'a> {
    queue: &'a RefreshQueue,
    outcome: Option<bool>,
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        let waiters = {
            let mut state = self.queue.lock();
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };

        let outcome = self.outcome.unwrap_or(false);
        for waiter in waiters {
            let _ = waiter.send(outcome);
        }
    }
}

impl RefreshQueue {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of callers parked behind the running refresh.
    pub fn waiting(&self) -> usize {
        self.lock().waiters.len()
    }

    /// Runs `refresh` unless one is already running, in which case this
    /// waits for that one. Returns whether the refresh succeeded.
    pub async fn run<F, Fut>(&self, refresh: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = bool>,
    {
        let role = {
            let mut state = self.lock();
            if state.in_flight {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Role::Waiter(rx)
            } else {
                state.in_flight = true;
                Role::Leader
            }
        };

        match role {
            Role::Waiter(rx) => rx.await.unwrap_or(false),
            Role::Leader => {
                let mut guard = LeaderGuard {
                    queue: self,
                    outcome: None,
                };
                let outcome = refresh().await;
                guard.outcome = Some(outcome);
                drop(guard);

                outcome
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use super::*;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let queue = Arc::new(RefreshQueue::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let queue = queue.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                queue
                    .run(|| async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        true
                    })
                    .await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(queue.waiting(), 0);
    }

    #[tokio::test]
    async fn test_failure_reaches_every_waiter() {
        let queue = Arc::new(RefreshQueue::default());

        let leader = {
            let queue = queue.clone();
            tokio::spawn(async move {
                queue
                    .run(|| async {
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        false
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        let waiter = queue.run(|| async { true }).await;

        assert!(!waiter);
        assert!(!leader.await.unwrap());
    }

    #[tokio::test]
    async fn test_cancelled_leader_releases_waiters() {
        let queue = Arc::new(RefreshQueue::default());

        let leader = {
            let queue = queue.clone();
            tokio::spawn(async move {
                queue
                    .run(|| async {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                        true
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.run(|| async { true }).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        leader.abort();

        assert!(!waiter.await.unwrap());

        // The next caller leads a fresh refresh.
        assert!(queue.run(|| async { true }).await);
    }
}
