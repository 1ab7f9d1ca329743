//! Per-action response payloads.

use grid_world::{BlueprintPhase, Primitive};
use serde::{Deserialize, Serialize};

use crate::error::ErrorPayload;

/// Status returned by actions that never fail on geometry grounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptedStatus {
    /// Accepted; the simulation clock will act on it (`MOVE`).
    Queued,
    /// Applied immediately (`CHAT`).
    Executed,
}

/// Response to `MOVE` and `CHAT`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedResponse {
    /// Which of the two non-failing statuses applies.
    pub status: AcceptedStatus,
    /// Tick at the time of acceptance.
    pub tick: u64,
}

/// Outcome of a single item within a `BUILD_MULTI` batch or a blueprint
/// `CONTINUE` step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResult {
    /// Index within the batch (or, for blueprints, the plan's primitive
    /// index).
    pub index: u32,
    /// The placed primitive, if this item succeeded.
    pub primitive: Option<Primitive>,
    /// The failure, if this item did not succeed.
    pub error: Option<ErrorPayload>,
}

impl ItemResult {
    /// Builds a success result.
    pub fn ok(index: u32, primitive: Primitive) -> Self {
        Self {
            index,
            primitive: Some(primitive),
            error: None,
        }
    }

    /// Builds a failure result.
    pub fn err(index: u32, error: ErrorPayload) -> Self {
        Self {
            index,
            primitive: None,
            error: Some(error),
        }
    }

    /// True if this item placed successfully.
    pub fn is_ok(&self) -> bool {
        self.primitive.is_some()
    }
}

/// Response to `BUILD_MULTI`: pre-validation failures reject the whole call
/// (surfaced as an `ActionError`, not this type); once pre-validation
/// passes, this carries one entry per item, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildMultiResponse {
    /// Per-item outcomes, in request order.
    pub results: Vec<ItemResult>,
}

/// Response to `BUILD_BLUEPRINT_START`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintStartResponse {
    /// Recipe name.
    pub blueprint_name: String,
    /// Total primitive count across every phase.
    pub total_primitives: u32,
    /// Phase breakdown.
    pub phases: Vec<BlueprintPhase>,
    /// Resolved anchor X.
    pub anchor_x: f64,
    /// Resolved anchor Z.
    pub anchor_z: f64,
}

/// Terminal or in-progress status of a blueprint plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlueprintRunStatus {
    /// More batches remain.
    Building,
    /// Every primitive placed with no per-item failures.
    Complete,
    /// Every primitive attempted, but at least one item failed.
    CompleteWithFailures,
}

/// Response to `BUILD_BLUEPRINT_CONTINUE`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintContinueResponse {
    /// Current run status.
    pub status: BlueprintRunStatus,
    /// Total primitives placed so far (cumulative, across all calls).
    pub placed: u32,
    /// Total primitives in the plan.
    pub total: u32,
    /// Name of the phase `nextIndex` falls into, if the plan is still
    /// active.
    pub current_phase: Option<String>,
    /// Size of the next batch, if the plan is still active.
    pub next_batch_size: Option<u32>,
    /// Per-item outcomes for this call's batch.
    pub results: Vec<ItemResult>,
}

/// Response to `BUILD_BLUEPRINT_CANCEL`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintCancelResponse {
    /// Always `true`; cancellation cannot fail once a plan is active.
    pub cancelled: bool,
    /// Primitives placed before cancellation (left in the world).
    pub pieces_placed: u32,
}
