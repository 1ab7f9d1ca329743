//! Closed shape taxonomy for buildable primitives.
//!
//! Spec REDESIGN FLAGS calls for string-typed shapes to become a closed sum
//! type with category and physics-exempt flags as static attributes; this is
//! that type. Validators branch on the tag, never on string matches.

use serde::{Deserialize, Serialize};

/// One of the fourteen buildable primitive shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Shape {
    /// Axis-aligned box.
    Box,
    /// Sphere.
    Sphere,
    /// Cone.
    Cone,
    /// Cylinder.
    Cylinder,
    /// Flat plane (ground/physics exempt).
    Plane,
    /// Torus.
    Torus,
    /// Flat circle (ground/physics exempt).
    Circle,
    /// Dodecahedron.
    Dodecahedron,
    /// Icosahedron.
    Icosahedron,
    /// Octahedron.
    Octahedron,
    /// Ring.
    Ring,
    /// Tetrahedron.
    Tetrahedron,
    /// Knotted torus.
    TorusKnot,
    /// Capsule.
    Capsule,
}

/// Coarse semantic category a shape contributes to a structure/node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// Walls, boxes, enclosed forms.
    Architecture,
    /// Connectors and flat infrastructure.
    Infrastructure,
    /// Geometric/mechanical forms.
    Technology,
    /// Decorative, non-functional forms.
    Art,
    /// Organic forms.
    Nature,
    /// No category holds a clear majority.
    Mixed,
}

impl Shape {
    /// All shape variants, in a stable declaration order.
    pub const ALL: [Shape; 14] = [
        Shape::Box,
        Shape::Sphere,
        Shape::Cone,
        Shape::Cylinder,
        Shape::Plane,
        Shape::Torus,
        Shape::Circle,
        Shape::Dodecahedron,
        Shape::Icosahedron,
        Shape::Octahedron,
        Shape::Ring,
        Shape::Tetrahedron,
        Shape::TorusKnot,
        Shape::Capsule,
    ];

    /// `plane` and `circle` are exempt from ground/stack physics.
    pub fn is_exempt(self) -> bool {
        matches!(self, Shape::Plane | Shape::Circle)
    }

    /// The category a shape falls into independent of its scale. Flat,
    /// wide, thin shapes (the connector family) additionally depend on
    /// scale — see [`crate::is_connector`].
    pub fn base_category(self) -> Category {
        match self {
            Shape::Box | Shape::Dodecahedron | Shape::Icosahedron | Shape::Octahedron => {
                Category::Architecture
            }
            Shape::Plane | Shape::Ring | Shape::Circle => Category::Infrastructure,
            Shape::Cone | Shape::Cylinder | Shape::Tetrahedron => Category::Technology,
            Shape::Torus | Shape::TorusKnot | Shape::Capsule => Category::Art,
            Shape::Sphere => Category::Nature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_plane_and_circle_are_exempt() {
        for shape in Shape::ALL {
            let expected = matches!(shape, Shape::Plane | Shape::Circle);
            assert_eq!(shape.is_exempt(), expected, "{shape:?}");
        }
    }
}
