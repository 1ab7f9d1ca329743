//! World-space vector types shared across the engine.

use serde::{Deserialize, Serialize};

/// A point or direction in world space. Y is up; the ground plane is `y = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// East/west world coordinate.
    pub x: f64,
    /// Height above the ground plane.
    pub y: f64,
    /// North/south world coordinate.
    pub z: f64,
}

impl Vec3 {
    /// Builds a vector from components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Projects onto the XZ ground plane.
    pub fn to_xz(self) -> Vec2Xz {
        Vec2Xz::new(self.x, self.z)
    }

    /// True if every component is finite (not NaN or infinite).
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Component-wise addition.
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Component-wise subtraction.
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Component-wise scale.
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

/// A point in the XZ ground plane (no height).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2Xz {
    /// East/west world coordinate.
    pub x: f64,
    /// North/south world coordinate.
    pub z: f64,
}

impl Vec2Xz {
    /// Builds a point from components.
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// The origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Euclidean distance from the origin.
    pub fn length(self) -> f64 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    /// True if both components are finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.z.is_finite()
    }
}

/// Euclidean distance between two XZ points.
pub fn distance_xz(a: Vec2Xz, b: Vec2Xz) -> f64 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}
