//! Top-level orchestration: structures, then settlement nodes, then edges,
//! then open areas.

use grid_world::Primitive;

use crate::edges::compute_edges;
use crate::nodes::cluster_nodes;
use crate::open_areas::sample_open_areas;
use crate::structures::cluster_structures;
use crate::types::SpatialSummary;

/// Runs the full analysis pipeline over `primitives`, tagging the result
/// with `primitive_revision` for cache keying by the caller.
pub fn analyze(primitives: &[Primitive], primitive_revision: u64) -> SpatialSummary {
    let structures = cluster_structures(primitives);
    let mut nodes = cluster_nodes(&structures);
    let edges = compute_edges(&mut nodes, primitives);
    let open_areas = sample_open_areas(primitives, &nodes);

    SpatialSummary {
        primitive_revision,
        structures,
        nodes,
        edges,
        open_areas,
    }
}
