//! Settlement node clustering: groups of structures with a tier, dominant
//! category, and a deterministic generated name.

use grid_geom::Vec2Xz;

use crate::types::{CategoryCounts, SettlementNode, Structure, Tier};
use crate::union_find::UnionFind;

const EDGE_GAP_MAX: f64 = 24.0;
const EXPANDED_OVERLAP_PAD: f64 = 16.0;

/// Eight-sector compass table, one name per 45-degree wedge centered on
/// that direction.
const COMPASS: [&str; 8] = ["north", "northeast", "east", "southeast", "south", "southwest", "west", "northwest"];

fn compass_direction(from: Vec2Xz, to: Vec2Xz) -> &'static str {
    let dx = to.x - from.x;
    let dz = to.z - from.z;
    if dx == 0.0 && dz == 0.0 {
        return COMPASS[0];
    }
    // Angle measured from +Z (north), clockwise toward +X (east), matching
    // a top-down map convention.
    let angle = dz.atan2(dx).to_degrees();
    let compass_angle = (90.0 - angle).rem_euclid(360.0);
    let sector = ((compass_angle / 45.0).round() as usize) % 8;
    COMPASS[sector]
}

fn edge_gap(a: &Structure, b: &Structure) -> f64 {
    grid_geom::distance_xz(a.centroid, b.centroid) - (a.radius + b.radius)
}

fn expanded_bboxes_overlap(a: &Structure, b: &Structure) -> bool {
    a.bbox.padded(EXPANDED_OVERLAP_PAD).overlaps_xz(b.bbox)
}

fn same_node(a: &Structure, b: &Structure) -> bool {
    edge_gap(a, b) <= EDGE_GAP_MAX || expanded_bboxes_overlap(a, b)
}

/// Clusters structures into settlement nodes and assigns deterministic
/// names.
pub fn cluster_nodes(structures: &[Structure]) -> Vec<SettlementNode> {
    if structures.is_empty() {
        return Vec::new();
    }

    let mut uf = UnionFind::new(structures.len());
    for i in 0..structures.len() {
        for j in (i + 1)..structures.len() {
            if same_node(&structures[i], &structures[j]) {
                uf.union(i, j);
            }
        }
    }

    let mut nodes: Vec<SettlementNode> = uf
        .groups()
        .into_iter()
        .map(|group| build_node(structures, &group))
        .collect();

    name_nodes(&mut nodes);
    for (i, node) in nodes.iter_mut().enumerate() {
        node.index = i as u32;
    }
    nodes
}

fn build_node(structures: &[Structure], member_indices: &[usize]) -> SettlementNode {
    let members: Vec<&Structure> = member_indices.iter().map(|&i| &structures[i]).collect();
    let total_primitives: f64 = members.iter().map(|s| f64::from(s.primitive_count)).sum();

    let weighted = members.iter().fold(Vec2Xz::ORIGIN, |acc, s| {
        let w = f64::from(s.primitive_count);
        Vec2Xz::new(acc.x + s.centroid.x * w, acc.z + s.centroid.z * w)
    });
    let centroid = if total_primitives > 0.0 {
        Vec2Xz::new(weighted.x / total_primitives, weighted.z / total_primitives)
    } else {
        Vec2Xz::ORIGIN
    };

    let radius = members
        .iter()
        .map(|s| grid_geom::distance_xz(centroid, s.centroid) + s.radius)
        .fold(0.0, f64::max);

    let mut categories = CategoryCounts::default();
    for s in &members {
        for (cat, n) in &s.categories.0 {
            for _ in 0..*n {
                categories.increment(*cat);
            }
        }
    }

    let mut builders: Vec<String> = members.iter().flat_map(|s| s.builders.clone()).collect();
    builders.sort();
    builders.dedup();

    SettlementNode {
        index: 0,
        name: String::new(),
        tier: Tier::from_structure_count(member_indices.len() as u32),
        centroid,
        radius,
        structure_count: member_indices.len() as u32,
        dominant_category: categories.dominant(),
        missing_categories: categories.missing(),
        builders,
        structure_indices: member_indices.iter().map(|&i| i as u32).collect(),
        connections: Vec::new(),
    }
}

fn name_nodes(nodes: &mut [SettlementNode]) {
    if nodes.is_empty() {
        return;
    }
    let world_centroid = {
        let sum = nodes.iter().fold(Vec2Xz::ORIGIN, |acc, n| Vec2Xz::new(acc.x + n.centroid.x, acc.z + n.centroid.z));
        let n = nodes.len() as f64;
        Vec2Xz::new(sum.x / n, sum.z / n)
    };

    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&a, &b| {
        nodes[b]
            .tier
            .rank()
            .cmp(&nodes[a].tier.rank())
            .then(nodes[b].structure_count.cmp(&nodes[a].structure_count))
    });

    let mut sequence: std::collections::HashMap<&'static str, u32> = std::collections::HashMap::new();
    for &i in &order {
        let direction = compass_direction(world_centroid, nodes[i].centroid);
        let seq = sequence.entry(direction).or_insert(0);
        *seq += 1;
        nodes[i].name = format!("{}-{}-{}", direction, nodes[i].tier.label(), seq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_geom::{Aabb, Category, Vec3};

    fn structure(x: f64, z: f64, radius: f64, count: u32) -> Structure {
        Structure {
            index: 0,
            centroid: Vec2Xz::new(x, z),
            radius,
            primitive_count: count,
            bbox: Aabb {
                min: Vec3::new(x - radius, 0.0, z - radius),
                max: Vec3::new(x + radius, 1.0, z + radius),
            },
            footprint_area: (radius * 2.0).powi(2),
            builders: vec!["a1".to_string()],
            categories: {
                let mut c = CategoryCounts::default();
                for _ in 0..count {
                    c.increment(Category::Architecture);
                }
                c
            },
            dominant_category: Category::Architecture,
            primitive_indices: vec![0],
        }
    }

    #[test]
    fn nearby_structures_cluster_into_one_node() {
        let structures = vec![structure(0.0, 0.0, 2.0, 3), structure(5.0, 0.0, 2.0, 3)];
        let nodes = cluster_nodes(&structures);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].structure_count, 2);
    }

    #[test]
    fn far_structures_form_separate_nodes_with_distinct_names() {
        let structures = vec![structure(0.0, 0.0, 1.0, 2), structure(1000.0, 1000.0, 1.0, 2)];
        let nodes = cluster_nodes(&structures);
        assert_eq!(nodes.len(), 2);
        assert_ne!(nodes[0].name, nodes[1].name);
    }

    #[test]
    fn tier_breakpoints_match_structure_count() {
        assert_eq!(Tier::from_structure_count(5), Tier::Settlement);
        assert_eq!(Tier::from_structure_count(6), Tier::Server);
        assert_eq!(Tier::from_structure_count(15), Tier::Forest);
        assert_eq!(Tier::from_structure_count(25), Tier::City);
        assert_eq!(Tier::from_structure_count(50), Tier::Metropolis);
        assert_eq!(Tier::from_structure_count(100), Tier::Megaopolis);
    }
}
