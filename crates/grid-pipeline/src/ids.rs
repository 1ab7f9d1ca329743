//! Monotonic id counters, mirroring the `next_conn_id`/`next_ts` fields the
//! session hub keeps alongside its other coarse-locked state.

use std::sync::Mutex;

/// A simple `prefix-N` id minter.
#[derive(Debug)]
pub struct IdCounter {
    prefix: &'static str,
    next: Mutex<u64>,
}

impl IdCounter {
    /// Builds a counter starting at 1.
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: Mutex::new(1),
        }
    }

    /// Mints the next id.
    pub fn next_id(&self) -> String {
        let mut next = self.next.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let id = format!("{}-{}", self.prefix, *next);
        *next += 1;
        id
    }
}
