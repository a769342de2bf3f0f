//! Coordinate systems for the block world.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Chunk column position in chunk coordinates.
///
/// Chunks span the full world height, so only the horizontal axes are keyed.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Create a new chunk coordinate
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing the given world XZ position.
    ///
    /// Returns `None` for NaN or infinite input; such positions must never
    /// reach the streamer.
    #[inline]
    pub fn containing(world_x: f32, world_z: f32, chunk_size: u32) -> Option<Self> {
        if !world_x.is_finite() || !world_z.is_finite() {
            return None;
        }
        let size = chunk_size as f32;
        Some(Self::new(
            (world_x / size).floor() as i32,
            (world_z / size).floor() as i32,
        ))
    }

    /// Chunk containing the given integer world column.
    #[inline]
    pub const fn of_column(world_x: i64, world_z: i64, chunk_size: u32) -> Self {
        let size = chunk_size as i64;
        Self::new(
            world_x.div_euclid(size) as i32,
            world_z.div_euclid(size) as i32,
        )
    }

    /// World column of this chunk's minimum corner.
    #[inline]
    pub const fn origin(self, chunk_size: u32) -> (i64, i64) {
        (
            self.x as i64 * chunk_size as i64,
            self.z as i64 * chunk_size as i64,
        )
    }

    /// Max-axis distance to another chunk coordinate.
    #[inline]
    pub const fn chebyshev(self, other: Self) -> i32 {
        let dx = (self.x - other.x).abs();
        let dz = (self.z - other.z).abs();
        if dx > dz {
            dx
        } else {
            dz
        }
    }

    /// Every coordinate within `radius` (Chebyshev) of this one, one z row at
    /// a time with x increasing inside each row.
    pub fn square(self, radius: i32) -> impl Iterator<Item = ChunkCoord> {
        (-radius..=radius).flat_map(move |dz| {
            (-radius..=radius).map(move |dx| ChunkCoord::new(self.x + dx, self.z + dz))
        })
    }
}

/// Integer position of a single block in world space.
///
/// The block at `(x, y, z)` fills the unit cube from `(x, y, z)` to
/// `(x + 1, y + 1, z + 1)`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BlockPos {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl BlockPos {
    /// Create a new block position
    #[inline]
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Block whose cube contains the given point.
    #[inline]
    pub fn containing(point: Vec3) -> Self {
        Self::new(
            point.x.floor() as i64,
            point.y.floor() as i64,
            point.z.floor() as i64,
        )
    }

    /// Chunk column this block belongs to.
    #[inline]
    pub const fn chunk(self, chunk_size: u32) -> ChunkCoord {
        ChunkCoord::of_column(self.x, self.z, chunk_size)
    }

    /// Y coordinate of the block's top face.
    #[inline]
    pub const fn top(self) -> i64 {
        self.y + 1
    }

    /// Minimum corner as a float vector.
    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}
