//! World store error kinds.

/// Errors raised by [`crate::WorldStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No agent is registered under this id.
    #[error("[WORLD_AGENT_NOT_FOUND] agent {0} is not online")]
    AgentNotFound(String),
    /// No primitive is registered under this id.
    #[error("[WORLD_PRIMITIVE_NOT_FOUND] primitive {0} does not exist")]
    PrimitiveNotFound(String),
    /// The caller does not own the primitive it tried to remove.
    #[error("[WORLD_NOT_OWNER] agent {agent} does not own primitive {primitive}")]
    NotOwner {
        /// Agent that attempted the operation.
        agent: String,
        /// Primitive the agent does not own.
        primitive: String,
    },
    /// The agent already has an active blueprint plan.
    #[error("[WORLD_BLUEPRINT_ALREADY_ACTIVE] agent {0} already has an active blueprint plan")]
    BlueprintAlreadyActive(String),
    /// The agent has no active blueprint plan.
    #[error("[WORLD_BLUEPRINT_NOT_ACTIVE] agent {0} has no active blueprint plan")]
    BlueprintNotActive(String),
}
