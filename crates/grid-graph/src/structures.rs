//! Structure clustering: connected components of non-connector primitives.

use grid_geom::{bounding_box, infer_category, is_connector, overlaps_xz, position_xz, solid_distance_xz, xz_radius, Vec2Xz};
use grid_world::Primitive;

use crate::types::{CategoryCounts, Structure};
use crate::union_find::UnionFind;

fn max_xz_dimension(a: &Primitive, b: &Primitive) -> f64 {
    [a.scale.x, a.scale.z, b.scale.x, b.scale.z]
        .into_iter()
        .fold(0.0, f64::max)
}

fn connected(a: &Primitive, b: &Primitive) -> bool {
    if overlaps_xz(a, b, 1.5) {
        return true;
    }
    let tolerance = (1.5 * max_xz_dimension(a, b)).min(12.0).max(3.5);
    solid_distance_xz(a, b) <= tolerance
}

/// Partitions `primitives` into connected components, preferring to
/// cluster only the non-connector subset (connectors are roads, not
/// buildings; clustering them in would merge unrelated structures).
pub fn cluster_structures(primitives: &[Primitive]) -> Vec<Structure> {
    let non_connector_indices: Vec<usize> = primitives
        .iter()
        .enumerate()
        .filter(|(_, p)| !is_connector(*p))
        .map(|(i, _)| i)
        .collect();

    let subset: Vec<usize> = if non_connector_indices.is_empty() {
        (0..primitives.len()).collect()
    } else {
        non_connector_indices
    };

    if subset.is_empty() {
        return Vec::new();
    }

    let mut uf = UnionFind::new(subset.len());
    for i in 0..subset.len() {
        for j in (i + 1)..subset.len() {
            if connected(&primitives[subset[i]], &primitives[subset[j]]) {
                uf.union(i, j);
            }
        }
    }

    let mut structures: Vec<Structure> = uf
        .groups()
        .into_iter()
        .map(|group| {
            let member_indices: Vec<u32> = group.iter().map(|&i| subset[i] as u32).collect();
            build_structure(primitives, &member_indices)
        })
        .collect();

    for (i, s) in structures.iter_mut().enumerate() {
        s.index = i as u32;
    }
    structures
}

fn build_structure(primitives: &[Primitive], member_indices: &[u32]) -> Structure {
    let members: Vec<&Primitive> = member_indices.iter().map(|&i| &primitives[i as usize]).collect();

    let sum = members.iter().fold(Vec2Xz::ORIGIN, |acc, p| {
        let pos = position_xz(*p);
        Vec2Xz::new(acc.x + pos.x, acc.z + pos.z)
    });
    let n = members.len() as f64;
    let centroid = Vec2Xz::new(sum.x / n, sum.z / n);

    let radius = members
        .iter()
        .map(|p| grid_geom::distance_xz(centroid, position_xz(*p)) + xz_radius(*p))
        .fold(0.0, f64::max);

    let bbox = bounding_box(&members.iter().map(|p| (*p).clone()).collect::<Vec<_>>())
        .unwrap_or(grid_geom::Aabb {
            min: grid_geom::Vec3::ZERO,
            max: grid_geom::Vec3::ZERO,
        });
    let footprint_area = (bbox.max.x - bbox.min.x) * (bbox.max.z - bbox.min.z);

    let mut builders: Vec<String> = members.iter().map(|p| p.owner_agent_id.clone()).collect();
    builders.sort();
    builders.dedup();

    let mut categories = CategoryCounts::default();
    for p in &members {
        categories.increment(infer_category(*p));
    }
    let dominant_category = categories.dominant();

    Structure {
        index: 0,
        centroid,
        radius,
        primitive_count: members.len() as u32,
        bbox,
        footprint_area,
        builders,
        categories,
        dominant_category,
        primitive_indices: member_indices.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_geom::{Shape, Vec3};

    fn prim(id: &str, owner: &str, x: f64, z: f64, shape: Shape, scale: Vec3) -> Primitive {
        Primitive {
            id: id.into(),
            owner_agent_id: owner.into(),
            owner_agent_name: owner.into(),
            shape,
            position: Vec3::new(x, 0.5, z),
            rotation: Vec3::ZERO,
            scale,
            color: "#fff".into(),
            created_at: 0,
        }
    }

    #[test]
    fn adjacent_boxes_form_one_structure() {
        let primitives = vec![
            prim("p1", "a1", 0.0, 0.0, Shape::Box, Vec3::new(1.0, 1.0, 1.0)),
            prim("p2", "a1", 1.2, 0.0, Shape::Box, Vec3::new(1.0, 1.0, 1.0)),
        ];
        let structures = cluster_structures(&primitives);
        assert_eq!(structures.len(), 1);
        assert_eq!(structures[0].primitive_count, 2);
    }

    #[test]
    fn distant_boxes_form_separate_structures() {
        let primitives = vec![
            prim("p1", "a1", 0.0, 0.0, Shape::Box, Vec3::new(1.0, 1.0, 1.0)),
            prim("p2", "a1", 500.0, 500.0, Shape::Box, Vec3::new(1.0, 1.0, 1.0)),
        ];
        let structures = cluster_structures(&primitives);
        assert_eq!(structures.len(), 2);
    }

    #[test]
    fn connectors_are_excluded_when_buildings_exist() {
        let primitives = vec![
            prim("p1", "a1", 0.0, 0.0, Shape::Box, Vec3::new(1.0, 1.0, 1.0)),
            prim("road", "a1", 50.0, 0.0, Shape::Plane, Vec3::new(10.0, 0.01, 2.0)),
        ];
        let structures = cluster_structures(&primitives);
        assert_eq!(structures.len(), 1);
        assert_eq!(structures[0].primitive_count, 1);
    }
}
