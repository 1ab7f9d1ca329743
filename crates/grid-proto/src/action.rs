//! The action request surface: one variant per authenticated action.

use grid_geom::{Shape, Vec3};
use serde::{Deserialize, Serialize};

/// A single candidate in a `BUILD_MULTI` batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPrimitiveRequest {
    /// Shape tag.
    pub shape: Shape,
    /// World-space position.
    pub position: Vec3,
    /// Rotation, in degrees per axis.
    pub rotation: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
    /// Hex or named color.
    pub color: String,
}

/// One authenticated action request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Sets the agent's target position; the simulation clock interpolates.
    Move {
        /// Target X.
        x: f64,
        /// Target Z.
        z: f64,
    },
    /// Appends a chat entry and broadcasts it.
    Chat {
        /// Message body (trimmed and size-bounded by the pipeline).
        message: String,
    },
    /// Places a single primitive.
    BuildPrimitive(BuildPrimitiveRequest),
    /// Places 1-5 mutually-connected primitives atomically.
    BuildMulti {
        /// The candidate batch.
        primitives: Vec<BuildPrimitiveRequest>,
    },
    /// Starts a blueprint plan anchored at `(anchor_x, anchor_z)`.
    BuildBlueprintStart {
        /// Blueprint recipe name.
        name: String,
        /// Anchor X.
        #[serde(rename = "anchorX")]
        anchor_x: f64,
        /// Anchor Z.
        #[serde(rename = "anchorZ")]
        anchor_z: f64,
    },
    /// Places the next batch of an active blueprint plan.
    BuildBlueprintContinue,
    /// Cancels the agent's active blueprint plan.
    BuildBlueprintCancel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_action_round_trips_through_json() {
        let action = Action::Move { x: 1.0, z: 2.0 };
        let encoded = serde_json::to_string(&action).expect("serialize");
        assert!(encoded.contains("\"type\":\"MOVE\""));
        let decoded: Action = serde_json::from_str(&encoded).expect("deserialize");
        assert!(matches!(decoded, Action::Move { .. }));
    }
}
