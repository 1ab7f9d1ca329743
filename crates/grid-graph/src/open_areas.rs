//! Open-area sampling: candidate expansion sites classified by distance to
//! the nearest built primitive and scored against a type-specific target
//! distance.

use grid_geom::constants::{FRONTIER_MAX, FRONTIER_MIN, MIN_ORIGIN_EXCLUSION, SETTLEMENT_MAX, SETTLEMENT_THRESHOLD};
use grid_geom::{distance_xz, position_xz, Vec2Xz};
use grid_world::Primitive;

use crate::types::{OpenArea, OpenAreaKind, SettlementNode};

const SAMPLE_STEP: f64 = 20.0;
const SAMPLE_PAD: f64 = 120.0;
const GROWTH_MIN: f64 = 12.0;
const GROWTH_MAX: f64 = 34.0;
const GROWTH_TARGET: f64 = 23.0;
const CONNECTOR_TARGET: f64 = (GROWTH_MAX + FRONTIER_MIN) / 2.0;
const FRONTIER_TARGET: f64 = (FRONTIER_MIN + FRONTIER_MAX) / 2.0;
const GROWTH_KEEP: usize = 5;
const CONNECTOR_KEEP: usize = 4;
const FRONTIER_KEEP: usize = 5;
const TOTAL_CAP: usize = 12;
const RING_COUNT: u32 = 6;
const RING_STEP: f64 = 60.0;
const RING_SAMPLES_PER_RING: u32 = 12;

fn classify(nearest_build: f64) -> Option<OpenAreaKind> {
    if (GROWTH_MIN..GROWTH_MAX).contains(&nearest_build) {
        Some(OpenAreaKind::Growth)
    } else if (GROWTH_MAX..FRONTIER_MIN).contains(&nearest_build) {
        Some(OpenAreaKind::Connector)
    } else if (FRONTIER_MIN..=FRONTIER_MAX.min(SETTLEMENT_MAX - 1.0)).contains(&nearest_build) {
        Some(OpenAreaKind::Frontier)
    } else {
        None
    }
}

fn target_for(kind: OpenAreaKind) -> f64 {
    match kind {
        OpenAreaKind::Growth => GROWTH_TARGET,
        OpenAreaKind::Connector => CONNECTOR_TARGET,
        OpenAreaKind::Frontier => FRONTIER_TARGET,
    }
}

fn nearest_primitive_distance(point: Vec2Xz, primitives: &[Primitive]) -> Option<f64> {
    primitives
        .iter()
        .map(|p| distance_xz(point, position_xz(p)))
        .fold(None, |acc, d| Some(acc.map_or(d, |a: f64| a.min(d))))
}

fn candidate_points(primitives: &[Primitive]) -> Vec<Vec2Xz> {
    if primitives.len() < SETTLEMENT_THRESHOLD {
        return ring_points();
    }

    let (mut min, mut max) = (Vec2Xz::new(f64::MAX, f64::MAX), Vec2Xz::new(f64::MIN, f64::MIN));
    for p in primitives {
        let pos = position_xz(p);
        min = Vec2Xz::new(min.x.min(pos.x), min.z.min(pos.z));
        max = Vec2Xz::new(max.x.max(pos.x), max.z.max(pos.z));
    }
    min = Vec2Xz::new(min.x - SAMPLE_PAD, min.z - SAMPLE_PAD);
    max = Vec2Xz::new(max.x + SAMPLE_PAD, max.z + SAMPLE_PAD);

    let mut points = Vec::new();
    let mut x = min.x;
    while x <= max.x {
        let mut z = min.z;
        while z <= max.z {
            points.push(Vec2Xz::new(x, z));
            z += SAMPLE_STEP;
        }
        x += SAMPLE_STEP;
    }
    points
}

/// Concentric-ring fallback used when too few primitives exist for any
/// settlement node to have formed yet, so a bounding-box grid would just
/// sample empty space around a single point.
fn ring_points() -> Vec<Vec2Xz> {
    let mut points = Vec::new();
    for ring in 1..=RING_COUNT {
        let radius = f64::from(ring) * RING_STEP;
        for i in 0..RING_SAMPLES_PER_RING {
            let angle = (f64::from(i) / f64::from(RING_SAMPLES_PER_RING)) * std::f64::consts::TAU;
            points.push(Vec2Xz::new(radius * angle.cos(), radius * angle.sin()));
        }
    }
    points
}

fn nearest_node(point: Vec2Xz, nodes: &[SettlementNode]) -> Option<(u32, &SettlementNode)> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (i as u32, n, distance_xz(point, n.centroid)))
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(i, n, _)| (i, n))
}

/// Samples, classifies, scores, and selects open-area candidates.
pub fn sample_open_areas(primitives: &[Primitive], nodes: &[SettlementNode]) -> Vec<OpenArea> {
    let mut by_kind: std::collections::HashMap<OpenAreaKind, Vec<(f64, OpenArea)>> = std::collections::HashMap::new();
    let mut seen: std::collections::HashSet<(i64, i64)> = std::collections::HashSet::new();

    for point in candidate_points(primitives) {
        if !(point.length() >= MIN_ORIGIN_EXCLUSION) {
            continue;
        }
        let key = (point.x.round() as i64, point.z.round() as i64);
        if !seen.insert(key) {
            continue;
        }
        let Some(nearest_build) = nearest_primitive_distance(point, primitives) else {
            continue;
        };
        let Some(kind) = classify(nearest_build) else {
            continue;
        };

        let (nearest_node_index, nearest_node_name, nearest_node_tier) = nearest_node(point, nodes)
            .map_or((None, None, None), |(i, n)| (Some(i), Some(n.name.clone()), Some(n.tier)));

        let score = -(nearest_build - target_for(kind)).abs();
        let area = OpenArea {
            x: point.x,
            z: point.z,
            nearest_build,
            kind,
            nearest_node_index,
            nearest_node_name,
            nearest_node_tier,
        };
        by_kind.entry(kind).or_default().push((score, area));
    }

    let mut result = Vec::new();
    for (kind, keep) in [
        (OpenAreaKind::Frontier, FRONTIER_KEEP),
        (OpenAreaKind::Connector, CONNECTOR_KEEP),
        (OpenAreaKind::Growth, GROWTH_KEEP),
    ] {
        if let Some(mut candidates) = by_kind.remove(&kind) {
            candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
            result.extend(candidates.into_iter().take(keep).map(|(_, area)| area));
        }
    }

    result.truncate(TOTAL_CAP);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_geom::{Shape, Vec3};

    fn prim(x: f64, z: f64) -> Primitive {
        Primitive {
            id: "p".into(),
            owner_agent_id: "a1".into(),
            owner_agent_name: "a1".into(),
            shape: Shape::Box,
            position: Vec3::new(x, 0.5, z),
            rotation: Vec3::ZERO,
            scale: Vec3::new(1.0, 1.0, 1.0),
            color: "#fff".into(),
            created_at: 0,
        }
    }

    #[test]
    fn sparse_worlds_fall_back_to_ring_sampling() {
        let primitives = vec![prim(0.0, 0.0)];
        let areas = sample_open_areas(&primitives, &[]);
        assert!(!areas.is_empty());
    }

    #[test]
    fn results_respect_the_total_cap() {
        let primitives: Vec<Primitive> = (0..20).map(|i| prim(f64::from(i) * 3.0, 0.0)).collect();
        let areas = sample_open_areas(&primitives, &[]);
        assert!(areas.len() <= TOTAL_CAP);
    }

    #[test]
    fn areas_within_origin_exclusion_are_dropped() {
        let primitives: Vec<Primitive> = (0..20).map(|i| prim(f64::from(i) * 3.0, 0.0)).collect();
        let areas = sample_open_areas(&primitives, &[]);
        assert!(areas.iter().all(|a| Vec2Xz::new(a.x, a.z).length() >= MIN_ORIGIN_EXCLUSION));
    }
}
