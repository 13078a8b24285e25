use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Millisecond timestamps for artifact keys that never repeat, even when two
/// uploads land in the same millisecond or the wall clock steps backwards.
#[derive(Debug, Default)]
pub struct KeyClock {
    last: AtomicI64,
}

impl KeyClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_millis(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }
}

/// `<repo_name>.<millis>.zip`
pub fn artifact_key(repo_name: &str, millis: i64) -> String {
    format!("{repo_name}.{millis}.zip")
}
