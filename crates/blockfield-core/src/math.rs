//! Math utilities and helpers.

use glam::Vec3;

use crate::coords::BlockPos;

/// Ray for picking and raycasting.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    /// Ray origin
    pub origin: Vec3,
    /// Ray direction (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Axis-Aligned Bounding Box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max corners
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB for the unit cube occupied by a block
    #[inline]
    pub fn block(pos: BlockPos) -> Self {
        let min = pos.to_vec3();
        Self {
            min,
            max: min + Vec3::ONE,
        }
    }

    /// Vertical column footprint of `half_width` around `(x, z)`, spanning `min_y..max_y`.
    #[inline]
    pub fn column(x: f32, z: f32, half_width: f32, min_y: f32, max_y: f32) -> Self {
        Self {
            min: Vec3::new(x - half_width, min_y, z - half_width),
            max: Vec3::new(x + half_width, max_y, z + half_width),
        }
    }

    /// Check if the XZ projections overlap with positive area.
    ///
    /// Touching edges do not count, so a player standing exactly on a block
    /// boundary is only over the blocks it actually covers.
    #[inline]
    pub fn overlaps_xz(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }
}
