//! Bounding boxes, overlap tests, and connector/category inference.

use crate::shape::{Category, Shape};
use crate::vec::{Vec2Xz, Vec3};

/// Anything with a shape, a world position, and a non-degenerate scale —
/// the minimal surface geometry needs from a buildable primitive. Kept
/// generic so `grid-geom` stays a leaf crate: `grid-world::Primitive`
/// implements this rather than `grid-geom` depending back on it.
pub trait Solid {
    /// The shape tag.
    fn shape(&self) -> Shape;
    /// World-space center position.
    fn position(&self) -> Vec3;
    /// Per-axis scale; every component is `> 0`.
    fn scale(&self) -> Vec3;
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// The bounding box of a single solid, using `position ± scale / 2`.
    pub fn of(solid: &impl Solid) -> Self {
        let p = solid.position();
        let half = solid.scale().scale(0.5);
        Self {
            min: p.sub(half),
            max: p.add(half),
        }
    }

    /// Expands the box uniformly by `pad` on every side.
    pub fn padded(self, pad: f64) -> Self {
        let d = Vec3::new(pad, pad, pad);
        Self {
            min: self.min.sub(d),
            max: self.max.add(d),
        }
    }

    /// Full 3D overlap test (inclusive of touching faces).
    pub fn overlaps_3d(self, other: Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// XZ-only overlap test, ignoring height.
    pub fn overlaps_xz(self, other: Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Center of the box.
    pub fn center(self) -> Vec3 {
        Vec3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    /// Top face height (max Y).
    pub fn top(self) -> f64 {
        self.max.y
    }
}

/// Computes the combined bounding box of a set of primitives. Returns
/// `None` for an empty slice.
pub fn bounding_box(primitives: &[impl Solid]) -> Option<Aabb> {
    let mut iter = primitives.iter();
    let first = Aabb::of(iter.next()?);
    Some(iter.fold(first, |acc, p| {
        let b = Aabb::of(p);
        Aabb {
            min: Vec3::new(
                acc.min.x.min(b.min.x),
                acc.min.y.min(b.min.y),
                acc.min.z.min(b.min.z),
            ),
            max: Vec3::new(
                acc.max.x.max(b.max.x),
                acc.max.y.max(b.max.y),
                acc.max.z.max(b.max.z),
            ),
        }
    }))
}

/// XZ AABB overlap test between two solids, with optional symmetric padding.
pub fn overlaps_xz(a: &impl Solid, b: &impl Solid, pad: f64) -> bool {
    let pad_vec3 = |s: &dyn Solid| Aabb::of_padded_xz(s, pad);
    pad_vec3(a).overlaps_xz(pad_vec3(b))
}

impl Aabb {
    fn of_padded_xz(solid: &dyn Solid, pad: f64) -> Self {
        let p = solid.position();
        let half = solid.scale().scale(0.5);
        Self {
            min: Vec3::new(p.x - half.x - pad, p.y - half.y, p.z - half.z - pad),
            max: Vec3::new(p.x + half.x + pad, p.y + half.y, p.z + half.z + pad),
        }
    }
}

/// Euclidean center-to-center distance in the XZ plane.
pub fn distance_xz(a: &impl Solid, b: &impl Solid) -> f64 {
    crate::vec::distance_xz(a.position().to_xz(), b.position().to_xz())
}

/// A connector is a flat primitive that can register a visible road between
/// nodes: any `plane`, or a `box`/`cylinder` that is thin (`scale.y <= 0.25`)
/// and wide (`max(scale.x, scale.z) >= 1.5`).
pub fn is_connector(solid: &impl Solid) -> bool {
    match solid.shape() {
        Shape::Plane => true,
        Shape::Box | Shape::Cylinder => {
            let s = solid.scale();
            s.y <= 0.25 && s.x.max(s.z) >= 1.5
        }
        _ => false,
    }
}

/// Infers the semantic category of a primitive from its shape and, for the
/// connector-eligible shapes, its flatness.
pub fn infer_category(solid: &impl Solid) -> Category {
    if is_connector(solid) {
        return Category::Infrastructure;
    }
    solid.shape().base_category()
}

/// Helper used by validators and the analyzer: the XZ radius of a solid's
/// bounding box (half the diagonal of the footprint).
pub fn xz_radius(solid: &impl Solid) -> f64 {
    let s = solid.scale();
    ((s.x * 0.5).powi(2) + (s.z * 0.5).powi(2)).sqrt()
}

/// Convenience point accessor in the XZ plane.
pub fn position_xz(solid: &impl Solid) -> Vec2Xz {
    solid.position().to_xz()
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn stub(shape: Shape, position: Vec3, scale: Vec3) -> Stub {
        Stub {
            shape,
            position,
            scale,
        }
    }

    #[test]
    fn thin_wide_box_is_a_connector() {
        let plank = stub(Shape::Box, Vec3::new(0.0, 0.1, 0.0), Vec3::new(4.0, 0.2, 1.0));
        assert!(is_connector(&plank));
        let crate_box = stub(Shape::Box, Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0));
        assert!(!is_connector(&crate_box));
    }

    #[test]
    fn plane_is_always_a_connector() {
        let plane = stub(Shape::Plane, Vec3::ZERO, Vec3::new(10.0, 0.01, 10.0));
        assert!(is_connector(&plane));
    }

    #[test]
    fn overlapping_boxes_are_detected_in_xz() {
        let a = stub(Shape::Box, Vec3::new(0.0, 0.5, 0.0), Vec3::new(2.0, 1.0, 2.0));
        let b = stub(Shape::Box, Vec3::new(1.5, 0.5, 0.0), Vec3::new(2.0, 1.0, 2.0));
        let c = stub(Shape::Box, Vec3::new(10.0, 0.5, 0.0), Vec3::new(2.0, 1.0, 2.0));
        assert!(overlaps_xz(&a, &b, 0.0));
        assert!(!overlaps_xz(&a, &c, 0.0));
    }

    #[test]
    fn connector_overrides_base_category() {
        let plank = stub(Shape::Box, Vec3::ZERO, Vec3::new(4.0, 0.1, 1.0));
        assert_eq!(infer_category(&plank), Category::Infrastructure);
        let crate_box = stub(Shape::Box, Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(infer_category(&crate_box), Category::Architecture);
    }
}
