//! Core types, math, and errors for the blockfield runtime.
//!
//! This crate provides the foundational types shared by every other crate:
//! - Coordinate systems (chunk columns, world voxels)
//! - Block identifiers
//! - Axis-aligned boxes and rays
//! - The runtime error type

pub mod coords;
pub mod error;
pub mod math;
pub mod types;

pub use coords::{BlockPos, ChunkCoord};
pub use error::{Error, Result};
pub use types::BlockId;

/// Runtime-wide defaults.
pub mod constants {
    /// Default chunk edge length in blocks.
    pub const DEFAULT_CHUNK_SIZE: u32 = 16;
    /// Default Chebyshev radius of the active chunk square.
    pub const DEFAULT_RENDER_DISTANCE: i32 = 4;
    /// Default distance from the feet to the eye.
    pub const DEFAULT_EYE_OFFSET: f32 = 1.5;
}
