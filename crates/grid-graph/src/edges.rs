//! Node-to-node edges: auto-connected dense neighbors, plus connector
//! detection along the segment between node centers.

use grid_geom::{is_connector, position_xz, xz_radius, Vec2Xz};
use grid_world::Primitive;

use crate::types::{NodeEdge, SettlementNode};

const MAX_EDGE_DISTANCE: f64 = 220.0;
const AUTO_CONNECT_GAP: f64 = 65.0;
const MAX_CONNECTIONS_PER_NODE: usize = 5;

fn edge_gap(a: &SettlementNode, b: &SettlementNode) -> f64 {
    grid_geom::distance_xz(a.centroid, b.centroid) - (a.radius + b.radius)
}

/// Does a connector primitive lie along the segment `from -> to`, with its
/// projection strictly inside the `(0.1, 0.9)` span and within a
/// size-aware tolerance of the line?
fn connector_along_segment(from: Vec2Xz, to: Vec2Xz, primitives: &[Primitive]) -> bool {
    let dx = to.x - from.x;
    let dz = to.z - from.z;
    let len_sq = dx * dx + dz * dz;
    if len_sq == 0.0 {
        return false;
    }

    primitives.iter().filter(|p| is_connector(*p)).any(|p| {
        let pos = position_xz(p);
        let t = ((pos.x - from.x) * dx + (pos.z - from.z) * dz) / len_sq;
        if !(0.1..=0.9).contains(&t) {
            return false;
        }
        let closest = Vec2Xz::new(from.x + dx * t, from.z + dz * t);
        let perp_dist = grid_geom::distance_xz(pos, closest);
        let tolerance = (xz_radius(p) * 1.5).max(2.0);
        perp_dist <= tolerance
    })
}

/// Computes every node-to-node edge and fills in each node's capped
/// connection list.
pub fn compute_edges(nodes: &mut [SettlementNode], primitives: &[Primitive]) -> Vec<NodeEdge> {
    let mut edges = Vec::new();
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let distance = grid_geom::distance_xz(nodes[i].centroid, nodes[j].centroid);
            if distance > MAX_EDGE_DISTANCE {
                continue;
            }
            let has_connector = connector_along_segment(nodes[i].centroid, nodes[j].centroid, primitives);
            if has_connector || edge_gap(&nodes[i], &nodes[j]) <= AUTO_CONNECT_GAP {
                edges.push(NodeEdge {
                    a: i as u32,
                    b: j as u32,
                    has_connector,
                    distance,
                });
            }
        }
    }

    for (i, node) in nodes.iter_mut().enumerate() {
        let mut incident: Vec<(u32, f64)> = edges
            .iter()
            .filter_map(|e| {
                if e.a == i as u32 {
                    Some((e.b, e.distance))
                } else if e.b == i as u32 {
                    Some((e.a, e.distance))
                } else {
                    None
                }
            })
            .collect();
        incident.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        incident.truncate(MAX_CONNECTIONS_PER_NODE);
        node.connections = incident.into_iter().map(|(id, _)| id).collect();
    }

    edges
}
