use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per repository full name. Entries are dropped once the
/// last holder or waiter lets go, so the map only tracks repositories with
/// work in flight.
#[derive(Default)]
pub struct RepoLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl RepoLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `full_name`. Waiters are served in FIFO
    /// order.
    pub async fn acquire(&self, full_name: &str) -> RepoLockGuard {
        let mutex = self
            .locks
            .entry(full_name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = mutex.lock_owned().await;
        RepoLockGuard {
            key: full_name.to_string(),
            locks: Arc::clone(&self.locks),
            guard: Some(guard),
        }
    }

    /// Number of repositories with a holder or waiter.
    pub fn in_flight(&self) -> usize {
        self.locks.len()
    }
}

pub struct RepoLockGuard {
    key: String,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RepoLockGuard {
    fn drop(&mut self) {
        // Release first so the strong count reflects only the map entry and
        // any waiters.
        drop(self.guard.take());
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
