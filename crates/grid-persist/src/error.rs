//! Persistence error kinds, mirroring `echo-cas::CasError`'s flat
//! `thiserror` enum shape.

/// Errors raised by a [`crate::WorldRepository`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistError {
    /// No agent is registered under this id.
    #[error("[PERSIST_AGENT_NOT_FOUND] agent {0} has no persisted record")]
    AgentNotFound(String),
    /// No blueprint plan is registered for this agent.
    #[error("[PERSIST_PLAN_NOT_FOUND] agent {0} has no persisted blueprint plan")]
    PlanNotFound(String),
    /// The backing store is unreachable or returned a transient failure.
    #[error("[PERSIST_UNAVAILABLE] {0}")]
    Unavailable(String),
}
