//! Checks shared by `BUILD_PRIMITIVE`, `BUILD_MULTI`, and the blueprint
//! actions: origin exclusion, settlement proximity, and the expansion gate.

use grid_geom::constants::MIN_ORIGIN_EXCLUSION;
use grid_geom::{check_origin_exclusion, check_settlement_proximity, distance_xz, Vec2Xz};
use grid_graph::AnalysisCache;
use grid_proto::ActionError;
use grid_world::Primitive;

/// Distance from `point` to the nearest primitive, or `None` if there are
/// none yet.
pub fn nearest_primitive_distance(point: Vec2Xz, primitives: &[Primitive]) -> Option<f64> {
    primitives
        .iter()
        .map(|p| distance_xz(point, grid_geom::position_xz(p)))
        .fold(None, |acc, d| Some(acc.map_or(d, |a: f64| a.min(d))))
}

/// Rejects `point` for origin exclusion, settlement-too-far, or an active
/// expansion gate. `cache` must already reflect `revision` (the caller calls
/// [`AnalysisCache::get_or_compute`] first since the check needs both the
/// node-density oracle and the plain nearest-primitive distance).
pub fn gate_point(point: Vec2Xz, primitives: &[Primitive], cache: &AnalysisCache) -> Result<(), ActionError> {
    if !check_origin_exclusion(point, MIN_ORIGIN_EXCLUSION) {
        return Err(ActionError::OriginExcluded);
    }

    let nearest = nearest_primitive_distance(point, primitives);
    match check_settlement_proximity(point, nearest, primitives.len(), cache) {
        grid_geom::SettlementProximity::Ok => Ok(()),
        grid_geom::SettlementProximity::TooFar => Err(ActionError::SettlementTooFar),
        grid_geom::SettlementProximity::ExpansionGateActive {
            node_name,
            structure_count,
        } => Err(ActionError::ExpansionGateActive { node_name, structure_count }),
    }
}
