//! Blueprint build plans: a named recipe of relatively-positioned
//! primitives, resolved to absolute coordinates at `START`.

use grid_geom::{Aabb, Shape, Vec2Xz, Vec3};
use serde::{Deserialize, Serialize};

/// One primitive within a blueprint, resolved to an absolute world
/// position but not yet placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPrimitive {
    /// Shape tag.
    pub shape: Shape,
    /// Absolute world-space position.
    pub position: Vec3,
    /// Orientation, in radians per axis.
    pub rotation: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
    /// Display color.
    pub color: String,
}

/// A named group of consecutive primitives within a blueprint, used only
/// for progress reporting (`currentPhase`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintPhase {
    /// Phase label.
    pub name: String,
    /// Number of primitives in this phase.
    pub count: usize,
}

/// The single active blueprint build plan for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintPlan {
    /// Agent this plan belongs to.
    pub agent_id: String,
    /// Blueprint template name.
    pub blueprint_name: String,
    /// Anchor the blueprint was resolved against.
    pub anchor: Vec2Xz,
    /// Every primitive in the plan, in placement order, at absolute
    /// coordinates.
    pub all_primitives: Vec<ResolvedPrimitive>,
    /// Named sub-groups of `all_primitives`, summing to its length.
    pub phases: Vec<BlueprintPhase>,
    /// `all_primitives.len()`.
    pub total_primitives: usize,
    /// Count of primitives successfully placed so far.
    pub placed_count: usize,
    /// Count of per-item placement failures so far (cursor still advances
    /// past them; tracked to distinguish `complete` from
    /// `complete_with_failures` at the end of the run).
    pub failed_count: usize,
    /// Index of the next primitive to attempt.
    pub next_index: usize,
    /// Unix milliseconds at `START`.
    pub started_at: u64,
}

impl BlueprintPlan {
    /// The plan's XZ footprint, covering every resolved primitive.
    pub fn footprint(&self) -> Option<Aabb> {
        grid_geom::bounding_box(
            &self
                .all_primitives
                .iter()
                .map(|p| FootprintSolid {
                    shape: p.shape,
                    position: p.position,
                    scale: p.scale,
                })
                .collect::<Vec<_>>(),
        )
    }

    /// True once every primitive has been attempted.
    pub fn is_complete(&self) -> bool {
        self.next_index >= self.total_primitives
    }

    /// Name of the phase containing `next_index`, if any.
    pub fn current_phase(&self) -> Option<&str> {
        let mut offset = 0usize;
        for phase in &self.phases {
            if self.next_index < offset + phase.count {
                return Some(phase.name.as_str());
            }
            offset += phase.count;
        }
        None
    }
}

struct FootprintSolid {
    shape: Shape,
    position: Vec3,
    scale: Vec3,
}

impl grid_geom::Solid for FootprintSolid {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> BlueprintPlan {
        BlueprintPlan {
            agent_id: "a1".into(),
            blueprint_name: "BRIDGE".into(),
            anchor: Vec2Xz::new(120.0, 120.0),
            all_primitives: (0..11)
                .map(|i| ResolvedPrimitive {
                    shape: Shape::Box,
                    position: Vec3::new(120.0 + i as f64, 0.5, 120.0),
                    rotation: Vec3::ZERO,
                    scale: Vec3::new(1.0, 1.0, 1.0),
                    color: "#fff".into(),
                })
                .collect(),
            phases: vec![
                BlueprintPhase {
                    name: "deck".into(),
                    count: 6,
                },
                BlueprintPhase {
                    name: "rails".into(),
                    count: 5,
                },
            ],
            total_primitives: 11,
            placed_count: 0,
            failed_count: 0,
            next_index: 0,
            started_at: 0,
        }
    }

    #[test]
    fn current_phase_tracks_next_index() {
        let mut p = plan();
        assert_eq!(p.current_phase(), Some("deck"));
        p.next_index = 6;
        assert_eq!(p.current_phase(), Some("rails"));
        p.next_index = 11;
        assert_eq!(p.current_phase(), None);
    }

    #[test]
    fn completion_follows_total_primitives() {
        let mut p = plan();
        assert!(!p.is_complete());
        p.next_index = 11;
        assert!(p.is_complete());
    }

    #[test]
    fn footprint_spans_every_resolved_primitive() {
        let p = plan();
        let bbox = p.footprint().expect("non-empty plan has a footprint");
        assert!(bbox.max.x - bbox.min.x >= 10.0);
    }
}
