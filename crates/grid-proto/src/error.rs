//! Stable error tags surfaced to agents, per the error handling design.

use serde::{Deserialize, Serialize};

/// An action-pipeline failure. Every variant carries a stable machine tag
/// (see [`ActionError::tag`]) in addition to its human-readable `Display`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    /// No verified identity token on the request.
    #[error("authentication required")]
    Unauthorized,
    /// The identity token doesn't rebind to the stored agent.
    #[error("session token does not match the stored agent")]
    TokenMismatch,
    /// One-time entry fee has not been paid.
    #[error("entry fee payment is required")]
    FeeRequired,
    /// Entry fee transaction failed verification or was already used.
    #[error("entry fee payment is invalid")]
    FeeInvalid,
    /// Request body is structurally invalid.
    #[error("request body failed validation")]
    InvalidBody,
    /// Shape tag is not one of the closed set.
    #[error("unknown shape")]
    InvalidShape,
    /// A coordinate is non-finite.
    #[error("coordinates must be finite")]
    InvalidCoords,
    /// Target is nearer than `MIN_BUILD_RANGE` or farther than
    /// `MAX_BUILD_RANGE` from the acting agent.
    #[error("target is outside build range")]
    OutOfRange,
    /// Target is within `MIN_ORIGIN_EXCLUSION` of the world origin.
    #[error("target is within the origin exclusion radius")]
    OriginExcluded,
    /// No existing primitive is within `SETTLEMENT_MAX` of the target.
    #[error("no settlement is close enough to build here")]
    SettlementTooFar,
    /// Target is at frontier distance and the nearest node hasn't reached
    /// the expansion-gate density.
    #[error("nearest node {node_name} has only {structure_count} structures; expansion gate is active")]
    ExpansionGateActive {
        /// Name of the nearest settlement node.
        node_name: String,
        /// Its current structure count.
        structure_count: u32,
    },
    /// Candidate is airborne or submerged; `corrected_y` is the resting
    /// height the caller should retry with.
    #[error("primitive is floating; retry at corrected_y")]
    Floating {
        /// The resting `y` the caller should snap to and retry.
        corrected_y: f64,
    },
    /// Candidate overlaps existing geometry after any `correctedY` snap.
    #[error("candidate overlaps existing geometry")]
    Overlap,
    /// A `BUILD_MULTI` batch fails the mutual-contiguity rule.
    #[error("batch is not mutually connected")]
    MultiDisconnected,
    /// Balance is below the action's credit cost.
    #[error("insufficient credits")]
    InsufficientCredits,
    /// No blueprint recipe by that name.
    #[error("blueprint not found")]
    BlueprintNotFound,
    /// Agent already has an active plan.
    #[error("agent already has an active blueprint plan")]
    BlueprintAlreadyActive,
    /// Agent has no active plan.
    #[error("agent has no active blueprint plan")]
    BlueprintNotActive,
    /// Agent is too far from the plan's anchor to `START`.
    #[error("agent is too far from the blueprint anchor")]
    BlueprintAnchorTooFar,
    /// Agent is too far from the plan's anchor to `CONTINUE`.
    #[error("agent is out of range of the blueprint anchor")]
    BlueprintAnchorOutOfRange,
    /// Plan footprint overlaps existing geometry or another agent's
    /// reservation.
    #[error("blueprint footprint overlaps existing geometry or another reservation")]
    BlueprintFootprintOverlap,
    /// Per-`(actionClass, agentId)` token bucket refused the action.
    #[error("rate limited; retry after {retry_after_ms}ms")]
    RateLimited {
        /// Milliseconds the caller should wait before retrying.
        retry_after_ms: u64,
    },
    /// Persistence collaborator timed out or is unreachable; retriable.
    #[error("persistence collaborator unavailable")]
    PersistenceUnavailable,
    /// A concurrent action invalidated a pre-check; retriable.
    #[error("a concurrent action invalidated this request")]
    ConcurrencyConflict,
}

impl ActionError {
    /// The stable, slash-namespaced tag for this error, as specified in the
    /// error handling design.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Unauthorized => "auth/unauthorized",
            Self::TokenMismatch => "auth/token-mismatch",
            Self::FeeRequired => "auth/fee-required",
            Self::FeeInvalid => "auth/fee-invalid",
            Self::InvalidBody => "validation/invalid-body",
            Self::InvalidShape => "validation/invalid-shape",
            Self::InvalidCoords => "validation/invalid-coords",
            Self::OutOfRange => "build/out-of-range",
            Self::OriginExcluded => "build/origin-excluded",
            Self::SettlementTooFar => "build/settlement-too-far",
            Self::ExpansionGateActive { .. } => "build/expansion-gate-active",
            Self::Floating { .. } => "build/floating",
            Self::Overlap => "build/overlap",
            Self::MultiDisconnected => "build/multi-disconnected",
            Self::InsufficientCredits => "credits/insufficient",
            Self::BlueprintNotFound => "blueprint/not-found",
            Self::BlueprintAlreadyActive => "blueprint/already-active",
            Self::BlueprintNotActive => "blueprint/not-active",
            Self::BlueprintAnchorTooFar => "blueprint/anchor-too-far",
            Self::BlueprintAnchorOutOfRange => "blueprint/anchor-out-of-range",
            Self::BlueprintFootprintOverlap => "blueprint/footprint-overlap",
            Self::RateLimited { .. } => "throttle/rate-limited",
            Self::PersistenceUnavailable => "persistence/unavailable",
            Self::ConcurrencyConflict => "concurrency/conflict",
        }
    }

    /// True for errors the agent may usefully retry without changing the
    /// request (persistence hiccups, lost races, throttling).
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::PersistenceUnavailable | Self::ConcurrencyConflict | Self::RateLimited { .. })
    }
}

/// Serialized form of an [`ActionError`] carried in a response payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Stable machine tag, e.g. `"build/out-of-range"`.
    pub tag: String,
    /// Human-readable reason.
    pub message: String,
    /// Name of the nearest settlement node, set only for
    /// `build/expansion-gate-active`.
    pub node_name: Option<String>,
    /// Structure count of the nearest node, set only for
    /// `build/expansion-gate-active`.
    pub structure_count: Option<u32>,
    /// Resting height suggestion, set only for `build/floating`.
    pub corrected_y: Option<f64>,
    /// Retry hint, set only for `throttle/rate-limited`.
    pub retry_after_ms: Option<u64>,
}

impl From<&ActionError> for ErrorPayload {
    fn from(err: &ActionError) -> Self {
        let mut payload = Self {
            tag: err.tag().to_string(),
            message: err.to_string(),
            node_name: None,
            structure_count: None,
            corrected_y: None,
            retry_after_ms: None,
        };
        match err {
            ActionError::ExpansionGateActive { node_name, structure_count } => {
                payload.node_name = Some(node_name.clone());
                payload.structure_count = Some(*structure_count);
            }
            ActionError::Floating { corrected_y } => payload.corrected_y = Some(*corrected_y),
            ActionError::RateLimited { retry_after_ms } => payload.retry_after_ms = Some(*retry_after_ms),
            _ => {}
        }
        payload
    }
}
