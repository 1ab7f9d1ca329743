//! Directive lifecycle: a minimal companion to [`grid_ledger::CreditLedger`]'s
//! `reward_directive_voters`, whose own caller is otherwise unspecified.
//! Keeps per-directive voter sets behind the same coarse-lock-over-a-plain-
//! struct shape `MessageLog` uses for its own append-only state.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use grid_ledger::CreditLedger;

/// Errors raised by directive lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    /// No directive is registered under this id.
    #[error("[DIRECTIVE_NOT_FOUND] directive {0} does not exist")]
    NotFound(String),
    /// A directive with this id has already been created.
    #[error("[DIRECTIVE_ALREADY_EXISTS] directive {0} already exists")]
    AlreadyExists(String),
    /// The directive has already been completed.
    #[error("[DIRECTIVE_ALREADY_COMPLETE] directive {0} is already complete")]
    AlreadyComplete(String),
}

#[derive(Debug, Default)]
struct Directive {
    voters: HashSet<String>,
    completed: bool,
}

/// Tracks open directives and the agents who have voted for each, and
/// drives the credit reward on completion.
#[derive(Debug, Default)]
pub struct DirectiveRegistry {
    inner: Mutex<HashMap<String, Directive>>,
}

impl DirectiveRegistry {
    /// Builds an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Directive>> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Opens a new directive. Fails if `directive_id` is already in use.
    pub fn create_directive(&self, directive_id: &str) -> Result<(), DirectiveError> {
        let mut inner = self.lock();
        if inner.contains_key(directive_id) {
            return Err(DirectiveError::AlreadyExists(directive_id.to_string()));
        }
        inner.insert(directive_id.to_string(), Directive::default());
        Ok(())
    }

    /// Records `agent_id`'s vote for `directive_id`. Voting twice for the
    /// same directive is a no-op, not an error (the voter set is a
    /// `HashSet`).
    pub fn cast_vote(&self, directive_id: &str, agent_id: &str) -> Result<(), DirectiveError> {
        let mut inner = self.lock();
        let directive = inner
            .get_mut(directive_id)
            .ok_or_else(|| DirectiveError::NotFound(directive_id.to_string()))?;
        if directive.completed {
            return Err(DirectiveError::AlreadyComplete(directive_id.to_string()));
        }
        directive.voters.insert(agent_id.to_string());
        Ok(())
    }

    /// The current voter count for `directive_id`.
    pub fn voter_count(&self, directive_id: &str) -> Result<usize, DirectiveError> {
        let inner = self.lock();
        inner
            .get(directive_id)
            .map(|d| d.voters.len())
            .ok_or_else(|| DirectiveError::NotFound(directive_id.to_string()))
    }

    /// Marks `directive_id` complete and rewards every voter `amount`
    /// credits through `ledger`, once. Calling this again for the same
    /// directive returns `AlreadyComplete` and pays out nothing, matching
    /// `reward_directive_voters`'s own idempotence.
    pub fn complete_directive(
        &self,
        directive_id: &str,
        ledger: &CreditLedger,
        amount: u64,
    ) -> Result<Vec<String>, DirectiveError> {
        let mut inner = self.lock();
        let directive = inner
            .get_mut(directive_id)
            .ok_or_else(|| DirectiveError::NotFound(directive_id.to_string()))?;
        if directive.completed {
            return Err(DirectiveError::AlreadyComplete(directive_id.to_string()));
        }
        directive.completed = true;
        let voters: Vec<String> = directive.voters.iter().cloned().collect();
        drop(inner);
        ledger.reward_directive_voters(directive_id, &voters, amount);
        Ok(voters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_directive_rewards_each_distinct_voter_once() {
        let registry = DirectiveRegistry::new();
        let ledger = CreditLedger::new();
        ledger.ensure_account("a1", 0, 0);
        ledger.ensure_account("a2", 0, 0);

        registry.create_directive("d1").unwrap();
        registry.cast_vote("d1", "a1").unwrap();
        registry.cast_vote("d1", "a2").unwrap();
        registry.cast_vote("d1", "a1").unwrap();

        assert_eq!(registry.voter_count("d1").unwrap(), 2);

        let voters = registry.complete_directive("d1", &ledger, 10).unwrap();
        assert_eq!(voters.len(), 2);
        assert_eq!(ledger.get_credits("a1"), 10);
        assert_eq!(ledger.get_credits("a2"), 10);
    }

    #[test]
    fn completing_twice_is_rejected_and_does_not_double_pay() {
        let registry = DirectiveRegistry::new();
        let ledger = CreditLedger::new();
        ledger.ensure_account("a1", 0, 0);
        registry.create_directive("d1").unwrap();
        registry.cast_vote("d1", "a1").unwrap();

        registry.complete_directive("d1", &ledger, 10).unwrap();
        let err = registry.complete_directive("d1", &ledger, 10).unwrap_err();
        assert_eq!(err, DirectiveError::AlreadyComplete("d1".to_string()));
        assert_eq!(ledger.get_credits("a1"), 10);
    }

    #[test]
    fn voting_after_completion_is_rejected() {
        let registry = DirectiveRegistry::new();
        let ledger = CreditLedger::new();
        ledger.ensure_account("a1", 0, 0);
        registry.create_directive("d1").unwrap();
        registry.complete_directive("d1", &ledger, 10).unwrap();
        let err = registry.cast_vote("d1", "a1").unwrap_err();
        assert_eq!(err, DirectiveError::AlreadyComplete("d1".to_string()));
    }

    #[test]
    fn unknown_directive_operations_report_not_found() {
        let registry = DirectiveRegistry::new();
        let ledger = CreditLedger::new();
        assert_eq!(
            registry.cast_vote("missing", "a1").unwrap_err(),
            DirectiveError::NotFound("missing".to_string())
        );
        assert_eq!(
            registry.complete_directive("missing", &ledger, 1).unwrap_err(),
            DirectiveError::NotFound("missing".to_string())
        );
    }
}
