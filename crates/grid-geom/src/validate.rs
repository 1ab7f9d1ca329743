//! Placement validation: ground/stack physics, origin exclusion, settlement
//! proximity (with expansion gate), and build range.

use crate::aabb::{distance_xz, overlaps_xz, Aabb, Solid};
use crate::constants::{FRONTIER_MIN, NODE_EXPANSION_GATE, SETTLEMENT_MAX, SETTLEMENT_THRESHOLD, Y_SNAP_TOLERANCE};
use crate::vec::Vec2Xz;

/// Outcome of [`validate_placement`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementOutcome {
    /// Whether the placement may proceed (after applying `corrected_y`, if
    /// any).
    pub valid: bool,
    /// A ground/stack snap the caller should apply once and re-validate.
    pub corrected_y: Option<f64>,
    /// Set when `valid` is false because of a 3D overlap with existing
    /// geometry (as opposed to floating, which is surfaced via
    /// `corrected_y` on the first pass and only fails if the snap doesn't
    /// resolve it).
    pub overlap: bool,
}

impl PlacementOutcome {
    fn ok(corrected_y: Option<f64>) -> Self {
        Self {
            valid: true,
            corrected_y,
            overlap: false,
        }
    }

    fn overlap(corrected_y: Option<f64>) -> Self {
        Self {
            valid: false,
            corrected_y,
            overlap: true,
        }
    }
}

/// Required resting `y` for a non-exempt primitive: either the ground plane
/// or the top of the highest supporting primitive directly below it.
fn resting_y(position: crate::vec::Vec3, scale: crate::vec::Vec3, nearby: &[impl Solid]) -> f64 {
    let half_h = scale.y / 2.0;
    let candidate = Stub3 { position, scale };
    let mut best_top: f64 = 0.0;
    for other in nearby {
        if other.shape().is_exempt() {
            continue;
        }
        if !overlaps_xz(&candidate, other, 0.0) {
            continue;
        }
        let top = Aabb::of(other).top();
        if top <= position.y + Y_SNAP_TOLERANCE && top > best_top {
            best_top = top;
        }
    }
    best_top + half_h
}

/// Minimal [`Solid`] stand-in used internally to probe a not-yet-placed
/// candidate against existing geometry.
struct Stub3 {
    position: crate::vec::Vec3,
    scale: crate::vec::Vec3,
}

impl Solid for Stub3 {
    fn shape(&self) -> crate::shape::Shape {
        // Never exempt: used only for overlap probing of non-exempt
        // candidates, where the concrete shape doesn't affect the AABB test.
        crate::shape::Shape::Box
    }
    fn position(&self) -> crate::vec::Vec3 {
        self.position
    }
    fn scale(&self) -> crate::vec::Vec3 {
        self.scale
    }
}

/// Validates a candidate placement against existing geometry.
///
/// Exempt shapes (`plane`, `circle`) always pass. Non-exempt shapes are
/// checked against ground/stack physics (producing `corrected_y` when the
/// supplied `y` doesn't match) and against 3D overlap with `nearby`. Callers
/// should apply `corrected_y` once and call this again (a second pass) to
/// confirm the snapped position doesn't overlap.
pub fn validate_placement(
    shape: crate::shape::Shape,
    position: crate::vec::Vec3,
    scale: crate::vec::Vec3,
    nearby: &[impl Solid],
) -> PlacementOutcome {
    if shape.is_exempt() {
        return PlacementOutcome::ok(None);
    }

    let required_y = resting_y(position, scale, nearby);
    let corrected_y = if (position.y - required_y).abs() > Y_SNAP_TOLERANCE {
        Some(required_y)
    } else {
        None
    };
    let settled_y = corrected_y.unwrap_or(position.y);
    let candidate = Stub3 {
        position: crate::vec::Vec3::new(position.x, settled_y, position.z),
        scale,
    };

    for other in nearby {
        if other.shape().is_exempt() {
            continue;
        }
        if Aabb::of(&candidate).overlaps_3d(Aabb::of(other)) {
            return PlacementOutcome::overlap(corrected_y);
        }
    }

    PlacementOutcome::ok(corrected_y)
}

/// Rejects placements too close to the world origin.
pub fn check_origin_exclusion(point: Vec2Xz, min_dist: f64) -> bool {
    point.length() >= min_dist
}

/// Rejects build targets outside the agent's reach.
pub fn check_build_range_from_agent(
    agent_position: Vec2Xz,
    target: Vec2Xz,
    min_range: f64,
    max_range: f64,
) -> bool {
    let d = distance_xz_points(agent_position, target);
    d >= min_range && d <= max_range
}

fn distance_xz_points(a: Vec2Xz, b: Vec2Xz) -> f64 {
    crate::vec::distance_xz(a, b)
}

/// Outcome of [`check_settlement_proximity`].
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementProximity {
    /// World is still bootstrapping, or the point is within range.
    Ok,
    /// No existing primitive is close enough.
    TooFar,
    /// The point is in frontier range and the nearest node hasn't reached
    /// the expansion-gate density yet.
    ExpansionGateActive {
        /// Name of the nearest settlement node.
        node_name: String,
        /// Its current structure count.
        structure_count: u32,
    },
}

/// Read-only view the expansion gate consults for the nearest node's
/// density. Implemented by the spatial analyzer (`grid-graph`); kept as a
/// trait here so `grid-geom` remains a leaf crate (spec.md §2 dependency
/// order: geometry has no dependents among the other components).
pub trait NodeDensityOracle {
    /// Returns `(node_name, structure_count)` for the settlement node
    /// nearest to `point`, if any node exists yet.
    fn nearest_node_density(&self, point: Vec2Xz) -> Option<(String, u32)>;
}

/// Checks settlement proximity: the candidate point must be near existing
/// geometry once the world has grown past the bootstrap threshold, and
/// frontier-distance placements additionally require the nearest node to
/// have reached the expansion-gate density.
pub fn check_settlement_proximity(
    point: Vec2Xz,
    nearest_primitive_distance: Option<f64>,
    total_primitive_count: usize,
    oracle: &dyn NodeDensityOracle,
) -> SettlementProximity {
    if total_primitive_count < SETTLEMENT_THRESHOLD {
        return SettlementProximity::Ok;
    }

    let Some(dist) = nearest_primitive_distance else {
        return SettlementProximity::Ok;
    };

    if dist > SETTLEMENT_MAX {
        return SettlementProximity::TooFar;
    }

    if dist >= FRONTIER_MIN {
        if let Some((node_name, structure_count)) = oracle.nearest_node_density(point) {
            if structure_count < NODE_EXPANSION_GATE {
                return SettlementProximity::ExpansionGateActive {
                    node_name,
                    structure_count,
                };
            }
        }
    }

    SettlementProximity::Ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;
    use crate::vec::Vec3;

    struct Stub {
        shape: Shape,
        position: Vec3,
        scale: Vec3,
    }

    impl Solid for Stub {
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

    struct NoNodes;
    impl NodeDensityOracle for NoNodes {
        fn nearest_node_density(&self, _point: Vec2Xz) -> Option<(String, u32)> {
            None
        }
    }

    struct OneNode(u32);
    impl NodeDensityOracle for OneNode {
        fn nearest_node_density(&self, _point: Vec2Xz) -> Option<(String, u32)> {
            Some(("north-settlement-1".to_string(), self.0))
        }
    }

    #[test]
    fn s1_ground_snap_suggests_half_scale_y() {
        let nearby: Vec<Stub> = vec![];
        let outcome = validate_placement(
            Shape::Box,
            Vec3::new(105.0, 0.0, 100.0),
            Vec3::new(1.0, 1.0, 1.0),
            &nearby,
        );
        assert_eq!(outcome.corrected_y, Some(0.5));
        assert!(!outcome.overlap);
    }

    #[test]
    fn exempt_shapes_always_pass() {
        let nearby: Vec<Stub> = vec![];
        let outcome = validate_placement(
            Shape::Plane,
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(10.0, 0.01, 10.0),
            &nearby,
        );
        assert!(outcome.valid);
        assert_eq!(outcome.corrected_y, None);
    }

    #[test]
    fn stacking_snaps_to_top_of_supporting_primitive() {
        let base = Stub {
            shape: Shape::Box,
            position: Vec3::new(0.0, 0.5, 0.0),
            scale: Vec3::new(1.0, 1.0, 1.0),
        };
        let outcome = validate_placement(
            Shape::Box,
            Vec3::new(0.0, 1.4, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            &[base],
        );
        assert_eq!(outcome.corrected_y, Some(1.5));
    }

    #[test]
    fn overlap_with_existing_geometry_is_rejected() {
        let base = Stub {
            shape: Shape::Box,
            position: Vec3::new(0.0, 0.5, 0.0),
            scale: Vec3::new(2.0, 1.0, 2.0),
        };
        let outcome = validate_placement(
            Shape::Box,
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(2.0, 1.0, 2.0),
            &[base],
        );
        assert!(!outcome.valid);
        assert!(outcome.overlap);
    }

    #[test]
    fn origin_exclusion_rejects_close_points() {
        assert!(!check_origin_exclusion(Vec2Xz::new(10.0, 10.0), 50.0));
        assert!(check_origin_exclusion(Vec2Xz::new(40.0, 40.0), 50.0));
    }

    #[test]
    fn build_range_enforces_min_and_max() {
        let agent = Vec2Xz::new(0.0, 0.0);
        assert!(!check_build_range_from_agent(agent, Vec2Xz::new(1.0, 0.0), 2.0, 20.0));
        assert!(check_build_range_from_agent(agent, Vec2Xz::new(10.0, 0.0), 2.0, 20.0));
        assert!(!check_build_range_from_agent(agent, Vec2Xz::new(30.0, 0.0), 2.0, 20.0));
    }

    #[test]
    fn settlement_bootstrap_bypasses_the_check() {
        let outcome = check_settlement_proximity(Vec2Xz::new(700.0, 700.0), None, 2, &NoNodes);
        assert_eq!(outcome, SettlementProximity::Ok);
    }

    #[test]
    fn s3_settlement_too_far_rejects() {
        let outcome =
            check_settlement_proximity(Vec2Xz::new(705.0, 705.0), Some(700.0), 10, &NoNodes);
        assert_eq!(outcome, SettlementProximity::TooFar);
    }

    #[test]
    fn s4_expansion_gate_blocks_under_dense_frontier_build() {
        let outcome =
            check_settlement_proximity(Vec2Xz::new(310.0, 310.0), Some(210.0), 10, &OneNode(10));
        assert_eq!(
            outcome,
            SettlementProximity::ExpansionGateActive {
                node_name: "north-settlement-1".to_string(),
                structure_count: 10,
            }
        );
    }

    #[test]
    fn s4_expansion_gate_opens_once_node_is_dense_enough() {
        let outcome =
            check_settlement_proximity(Vec2Xz::new(310.0, 310.0), Some(210.0), 10, &OneNode(25));
        assert_eq!(outcome, SettlementProximity::Ok);
    }
}
