//! The `BUILD_MULTI` mutual-contiguity rule: the same expanded-AABB-overlap-
//! or-tolerance test `grid-graph` uses to cluster structures, applied here to
//! a not-yet-placed candidate batch.

use grid_geom::{overlaps_xz, solid_distance_xz, Shape, Solid, Vec3};
use grid_proto::BuildPrimitiveRequest;

struct Candidate {
    shape: Shape,
    position: Vec3,
    scale: Vec3,
}

impl Solid for Candidate {
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

fn max_xz_dimension(a: &Candidate, b: &Candidate) -> f64 {
    [a.scale.x, a.scale.z, b.scale.x, b.scale.z].into_iter().fold(0.0, f64::max)
}

fn connected(a: &Candidate, b: &Candidate) -> bool {
    if overlaps_xz(a, b, 1.5) {
        return true;
    }
    let tolerance = (1.5 * max_xz_dimension(a, b)).min(12.0).max(3.5);
    solid_distance_xz(a, b) <= tolerance
}

/// True if every item in `items` is directly or transitively connected to
/// every other item under the contiguity rule. A single-item batch is
/// trivially contiguous.
pub fn mutually_contiguous(items: &[BuildPrimitiveRequest]) -> bool {
    if items.len() <= 1 {
        return true;
    }
    let candidates: Vec<Candidate> = items
        .iter()
        .map(|i| Candidate {
            shape: i.shape,
            position: i.position,
            scale: i.scale,
        })
        .collect();

    let mut visited = vec![false; candidates.len()];
    let mut stack = vec![0usize];
    visited[0] = true;
    let mut count = 1;
    while let Some(i) = stack.pop() {
        for (j, candidate) in candidates.iter().enumerate() {
            if visited[j] {
                continue;
            }
            if connected(&candidates[i], candidate) {
                visited[j] = true;
                count += 1;
                stack.push(j);
            }
        }
    }
    count == candidates.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_geom::Vec3;

    fn req(x: f64, z: f64) -> BuildPrimitiveRequest {
        BuildPrimitiveRequest {
            shape: Shape::Box,
            position: Vec3::new(x, 0.5, z),
            rotation: Vec3::ZERO,
            scale: Vec3::new(1.0, 1.0, 1.0),
            color: "#fff".into(),
        }
    }

    #[test]
    fn a_single_item_batch_is_always_contiguous() {
        assert!(mutually_contiguous(&[req(0.0, 0.0)]));
    }

    #[test]
    fn s5_multi_contiguity_rejects_a_distant_outlier() {
        let items = vec![req(110.0, 110.0), req(113.0, 110.0), req(140.0, 110.0)];
        assert!(!mutually_contiguous(&items));
    }

    #[test]
    fn adjacent_items_are_accepted() {
        let items = vec![req(110.0, 110.0), req(111.2, 110.0), req(112.4, 110.0)];
        assert!(mutually_contiguous(&items));
    }
}
