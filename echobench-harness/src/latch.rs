use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Count-down latch released after a fixed number of completion signals.
///
/// The orchestrator waits on it while every worker signals once per measured
/// call. Signals past zero are ignored.
#[derive(Debug)]
pub struct CompletionLatch {
    remaining: AtomicUsize,
    released: Notify,
}

impl CompletionLatch {
    pub fn new(count: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(count),
            released: Notify::new(),
        }
    }

    /// Signals still outstanding.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    /// Record one completion. Returns `false` if the latch was already released.
    pub fn count_down(&self) -> bool {
        let prev = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        match prev {
            Ok(1) => {
                self.released.notify_waiters();
                true
            }
            Ok(_) => true,
            Err(_) => false,
        }
    }

    /// Resolve once the count has reached zero.
    pub async fn wait(&self) {
        loop {
            // Registered before the check so a release in between is not missed.
            let notified = self.released.notified();
            if self.remaining() == 0 {
                return;
            }
            notified.await;
        }
    }
}
