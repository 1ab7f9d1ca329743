//! Per-agent credit balances and the atomic debit-and-place operation.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use grid_world::{PlaceRejection, Primitive, WorldStore};

use crate::error::LedgerError;

const REFILL_INTERVAL_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Default)]
struct Inner {
    credits: HashMap<String, u64>,
    /// Unix ms of each agent's last refill; absent until the first refill,
    /// in which case eligibility is measured from the agent's join time
    /// (passed in by the caller at `ensure_account`).
    last_refill_at: HashMap<String, u64>,
    rewarded_directives: HashSet<String>,
}

/// Credit ledger. Composes its own lock with [`WorldStore`]'s, always
/// acquired in ledger-then-store order, so [`CreditLedger::debit_and_place`]
/// commits both sides as one atomic unit.
#[derive(Debug, Default)]
pub struct CreditLedger {
    inner: Mutex<Inner>,
}

impl CreditLedger {
    /// Builds an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Opens an account at `starting_balance` if one doesn't already exist.
    /// Idempotent: a second call for the same agent is a no-op.
    pub fn ensure_account(&self, agent_id: &str, starting_balance: u64, joined_at_ms: u64) {
        let mut inner = self.lock();
        inner
            .credits
            .entry(agent_id.to_string())
            .or_insert(starting_balance);
        inner
            .last_refill_at
            .entry(agent_id.to_string())
            .or_insert(joined_at_ms);
    }

    /// Current balance; unknown agents have zero credits.
    pub fn get_credits(&self, agent_id: &str) -> u64 {
        self.lock().credits.get(agent_id).copied().unwrap_or(0)
    }

    /// The single composed operation used by every build action: succeeds
    /// only if the agent had sufficient credits *and* `build` accepted the
    /// candidate and the store inserted it; otherwise neither side
    /// changes.
    ///
    /// `build` runs while the ledger lock is held and receives a consistent
    /// snapshot of the world's current primitives (passed through from
    /// `WorldStore::try_insert_primitive`), so the final overlap check it
    /// performs is race-free with respect to other callers of this method.
    pub fn debit_and_place(
        &self,
        store: &WorldStore,
        agent_id: &str,
        cost: u64,
        build: impl FnOnce(&[Primitive]) -> Result<Primitive, PlaceRejection>,
    ) -> Result<Primitive, LedgerError> {
        let mut inner = self.lock();
        let balance = inner.credits.get(agent_id).copied().unwrap_or(0);
        if balance < cost {
            return Err(LedgerError::InsufficientCredits {
                balance,
                required: cost,
            });
        }

        let primitive = store.try_insert_primitive(build)?;
        inner.credits.insert(agent_id.to_string(), balance - cost);
        Ok(primitive)
    }

    /// Moves `amount` from `from` to `to`. Both accounts must already exist.
    pub fn transfer(&self, from: &str, to: &str, amount: u64) -> Result<(), LedgerError> {
        if from == to {
            return Err(LedgerError::SelfTransfer);
        }
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let mut inner = self.lock();
        let from_balance = *inner
            .credits
            .get(from)
            .ok_or_else(|| LedgerError::UnknownAccount(from.to_string()))?;
        if !inner.credits.contains_key(to) {
            return Err(LedgerError::UnknownAccount(to.to_string()));
        }
        if from_balance < amount {
            return Err(LedgerError::InsufficientCredits {
                balance: from_balance,
                required: amount,
            });
        }
        inner.credits.insert(from.to_string(), from_balance - amount);
        *inner.credits.entry(to.to_string()).or_insert(0) += amount;
        Ok(())
    }

    /// Grants `amount` to every voter on `directive_id`'s completion.
    /// Idempotent: a directive already rewarded is a silent no-op.
    pub fn reward_directive_voters(&self, directive_id: &str, voter_ids: &[String], amount: u64) {
        let mut inner = self.lock();
        if !inner.rewarded_directives.insert(directive_id.to_string()) {
            return;
        }
        for voter in voter_ids {
            *inner.credits.entry(voter.clone()).or_insert(0) += amount;
        }
    }

    /// Grants the daily allowance if at least 24 rolling hours have passed
    /// since the agent's last refill (or join time, before its first
    /// refill). Returns `true` if a refill was applied.
    pub fn apply_daily_refill(&self, agent_id: &str, now_ms: u64, allowance: u64) -> bool {
        let mut inner = self.lock();
        let last = inner.last_refill_at.get(agent_id).copied().unwrap_or(now_ms);
        if now_ms.saturating_sub(last) < REFILL_INTERVAL_MS {
            return false;
        }
        *inner.credits.entry(agent_id.to_string()).or_insert(0) += allowance;
        inner.last_refill_at.insert(agent_id.to_string(), now_ms);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_geom::{Shape, Vec3};

    fn primitive(id: &str, owner: &str) -> Primitive {
        Primitive {
            id: id.into(),
            owner_agent_id: owner.into(),
            owner_agent_name: "Ada".into(),
            shape: Shape::Box,
            position: Vec3::new(10.0, 0.5, 0.0),
            rotation: Vec3::ZERO,
            scale: Vec3::new(1.0, 1.0, 1.0),
            color: "#fff".into(),
            created_at: 0,
        }
    }

    #[test]
    fn debit_and_place_rolls_back_on_insufficient_credits() {
        let store = WorldStore::new();
        let ledger = CreditLedger::new();
        ledger.ensure_account("a1", 0, 0);
        let err = ledger
            .debit_and_place(&store, "a1", 1, |_| Ok(primitive("p1", "a1")))
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientCredits {
                balance: 0,
                required: 1
            }
        );
        assert_eq!(store.get_world_primitive_count(), 0);
    }

    #[test]
    fn debit_and_place_commits_both_sides_together() {
        let store = WorldStore::new();
        let ledger = CreditLedger::new();
        ledger.ensure_account("a1", 5, 0);
        ledger
            .debit_and_place(&store, "a1", 1, |_| Ok(primitive("p1", "a1")))
            .unwrap();
        assert_eq!(ledger.get_credits("a1"), 4);
        assert_eq!(store.get_world_primitive_count(), 1);
    }

    #[test]
    fn debit_and_place_refunds_nothing_on_build_rejection() {
        let store = WorldStore::new();
        let ledger = CreditLedger::new();
        ledger.ensure_account("a1", 5, 0);
        let err = ledger
            .debit_and_place(&store, "a1", 1, |_| Err(PlaceRejection::Overlap))
            .unwrap_err();
        assert_eq!(err, LedgerError::Overlap);
        assert_eq!(ledger.get_credits("a1"), 5);
        assert_eq!(store.get_world_primitive_count(), 0);
    }

    #[test]
    fn reward_directive_voters_is_idempotent() {
        let ledger = CreditLedger::new();
        ledger.ensure_account("a1", 0, 0);
        let voters = vec!["a1".to_string()];
        ledger.reward_directive_voters("d1", &voters, 10);
        ledger.reward_directive_voters("d1", &voters, 10);
        assert_eq!(ledger.get_credits("a1"), 10);
    }

    #[test]
    fn transfer_requires_distinct_existing_accounts() {
        let ledger = CreditLedger::new();
        ledger.ensure_account("a1", 10, 0);
        ledger.ensure_account("a2", 0, 0);
        assert_eq!(ledger.transfer("a1", "a1", 1), Err(LedgerError::SelfTransfer));
        assert!(ledger.transfer("a1", "a2", 3).is_ok());
        assert_eq!(ledger.get_credits("a1"), 7);
        assert_eq!(ledger.get_credits("a2"), 3);
    }

    #[test]
    fn refill_respects_the_rolling_24h_window() {
        let ledger = CreditLedger::new();
        let day = REFILL_INTERVAL_MS;
        ledger.ensure_account("a1", 0, 0);
        assert!(!ledger.apply_daily_refill("a1", day - 1, 500));
        assert!(ledger.apply_daily_refill("a1", day, 500));
        assert_eq!(ledger.get_credits("a1"), 500);
        assert!(!ledger.apply_daily_refill("a1", day + 1, 500));
        assert!(ledger.apply_daily_refill("a1", 2 * day, 500));
        assert_eq!(ledger.get_credits("a1"), 1000);
    }
}
