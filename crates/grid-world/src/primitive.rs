//! Placed geometric primitives.

use grid_geom::{Shape, Solid, Vec3};
use serde::{Deserialize, Serialize};

/// A single placed shape, immutable after creation except by owner delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    /// Server-minted identifier.
    pub id: String,
    /// Id of the agent that placed it (delete authority).
    pub owner_agent_id: String,
    /// Name of the owning agent at creation time (display snapshot; does not
    /// track renames).
    pub owner_agent_name: String,
    /// Shape tag.
    pub shape: Shape,
    /// World-space center position.
    pub position: Vec3,
    /// Orientation, in radians per axis.
    pub rotation: Vec3,
    /// Per-axis scale; every component is `> 0`.
    pub scale: Vec3,
    /// Display color.
    pub color: String,
    /// Unix milliseconds at creation.
    pub created_at: u64,
}

impl Solid for Primitive {
    fn shape(&self) -> Shape {
        self.shape
    }
    fn position(&self) -> Vec3 {
        self.position
    }
    fn scale(&self) -> Vec3 {
        self.scale
    }
}
