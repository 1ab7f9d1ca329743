//! Per-action-class, per-agent token buckets.

use std::collections::HashMap;
use std::sync::Mutex;

/// The throttle classes named by the design notes. `Relocate` has no action
/// wired to it yet (the frontier-relocation endpoint is out of scope) but
/// keeps its documented limit so a future endpoint only has to call
/// [`ThrottleRegistry::try_acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionClass {
    /// `BUILD_PRIMITIVE` and each item of `BUILD_MULTI`.
    Primitive,
    /// `BUILD_BLUEPRINT_START`.
    BlueprintStart,
    /// `BUILD_BLUEPRINT_CONTINUE`.
    BlueprintContinue,
    /// Reserved for the out-of-scope relocate endpoint.
    Relocate,
}

impl ActionClass {
    fn limits(self) -> (f64, u64) {
        match self {
            ActionClass::Primitive => (12.0, 10_000),
            ActionClass::BlueprintStart => (2.0, 20_000),
            ActionClass::BlueprintContinue => (6.0, 30_000),
            ActionClass::Relocate => (1.0, 20_000),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    last_refill_ms: u64,
}

impl Bucket {
    fn full(capacity: f64, now_ms: u64) -> Self {
        Self {
            tokens: capacity,
            last_refill_ms: now_ms,
        }
    }

    fn refill(&mut self, capacity: f64, window_ms: u64, now_ms: u64) {
        let elapsed = now_ms.saturating_sub(self.last_refill_ms);
        if elapsed == 0 {
            return;
        }
        let rate = capacity / window_ms as f64;
        self.tokens = (self.tokens + rate * elapsed as f64).min(capacity);
        self.last_refill_ms = now_ms;
    }
}

/// Tracks one token bucket per `(action class, agent)` pair.
#[derive(Debug, Default)]
pub struct ThrottleRegistry {
    buckets: Mutex<HashMap<(ActionClass, String), Bucket>>,
}

impl ThrottleRegistry {
    /// Builds an empty registry; every agent starts with a full bucket the
    /// first time it is consulted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to spend one token for `agent_id` under `class`. On refusal,
    /// returns the number of milliseconds until a token becomes available.
    pub fn try_acquire(&self, class: ActionClass, agent_id: &str, now_ms: u64) -> Result<(), u64> {
        let (capacity, window_ms) = class.limits();
        let mut buckets = self.buckets.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let bucket = buckets
            .entry((class, agent_id.to_string()))
            .or_insert_with(|| Bucket::full(capacity, now_ms));
        bucket.refill(capacity, window_ms, now_ms);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return Ok(());
        }

        let rate = capacity / window_ms as f64;
        let retry_after_ms = ((1.0 - bucket.tokens) / rate).ceil() as u64;
        Err(retry_after_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_fresh_bucket_admits_up_to_capacity() {
        let registry = ThrottleRegistry::new();
        for _ in 0..12 {
            assert!(registry.try_acquire(ActionClass::Primitive, "a1", 0).is_ok());
        }
        assert!(registry.try_acquire(ActionClass::Primitive, "a1", 0).is_err());
    }

    #[test]
    fn tokens_refill_over_the_window() {
        let registry = ThrottleRegistry::new();
        for _ in 0..12 {
            registry.try_acquire(ActionClass::Primitive, "a1", 0).unwrap();
        }
        assert!(registry.try_acquire(ActionClass::Primitive, "a1", 833).is_ok());
    }

    #[test]
    fn buckets_are_independent_per_agent_and_class() {
        let registry = ThrottleRegistry::new();
        for _ in 0..12 {
            registry.try_acquire(ActionClass::Primitive, "a1", 0).unwrap();
        }
        assert!(registry.try_acquire(ActionClass::Primitive, "a2", 0).is_ok());
        assert!(registry.try_acquire(ActionClass::BlueprintStart, "a1", 0).is_ok());
    }

    #[test]
    fn refusal_reports_a_retry_after_hint() {
        let registry = ThrottleRegistry::new();
        registry.try_acquire(ActionClass::BlueprintStart, "a1", 0).unwrap();
        registry.try_acquire(ActionClass::BlueprintStart, "a1", 0).unwrap();
        let err = registry.try_acquire(ActionClass::BlueprintStart, "a1", 0).unwrap_err();
        assert_eq!(err, 10_000);
    }
}
