//! The set of currently materialized chunks.

use blockfield_core::math::Aabb;
use blockfield_core::{BlockId, BlockPos, ChunkCoord};
use hashbrown::HashMap;

use crate::chunk::Chunk;
use crate::scene::SceneHandle;

/// Scene geometry created for a loaded chunk.
#[derive(Debug, Clone)]
pub enum ChunkGeometry {
    /// One handle for the whole chunk.
    Chunk(SceneHandle),
    /// One handle per block.
    Blocks(HashMap<BlockPos, SceneHandle>),
}

impl ChunkGeometry {
    /// Number of scene handles held.
    pub fn handle_count(&self) -> usize {
        match self {
            Self::Chunk(_) => 1,
            Self::Blocks(handles) => handles.len(),
        }
    }
}

/// A chunk together with the scene geometry built for it.
#[derive(Debug, Clone)]
pub struct LoadedChunk {
    pub chunk: Chunk,
    pub geometry: ChunkGeometry,
}

/// All loaded chunks keyed by chunk coordinate.
///
/// Only the thread driving the frame loop mutates this set.
#[derive(Debug, Default)]
pub struct ActiveChunkSet {
    chunks: HashMap<ChunkCoord, LoadedChunk>,
}

impl ActiveChunkSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a chunk exists at the given coordinate.
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Get the number of loaded chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Check if no chunks are loaded.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Insert a chunk, returning whatever was stored under its coordinate.
    pub fn insert(&mut self, loaded: LoadedChunk) -> Option<LoadedChunk> {
        self.chunks.insert(loaded.chunk.coord(), loaded)
    }

    /// Remove a chunk at the given coordinate.
    pub fn remove(&mut self, coord: ChunkCoord) -> Option<LoadedChunk> {
        self.chunks.remove(&coord)
    }

    /// Remove every chunk.
    pub fn drain(&mut self) -> impl Iterator<Item = LoadedChunk> + '_ {
        self.chunks.drain().map(|(_, loaded)| loaded)
    }

    /// Chunk at the given coordinate.
    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord).map(|loaded| &loaded.chunk)
    }

    /// Chunk and geometry at the given coordinate.
    pub fn get_loaded(&self, coord: ChunkCoord) -> Option<&LoadedChunk> {
        self.chunks.get(&coord)
    }

    /// Mutable chunk and geometry at the given coordinate.
    pub fn get_loaded_mut(&mut self, coord: ChunkCoord) -> Option<&mut LoadedChunk> {
        self.chunks.get_mut(&coord)
    }

    /// All loaded coordinates, sorted.
    pub fn coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self.chunks.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Iterate over loaded chunks in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values().map(|loaded| &loaded.chunk)
    }

    /// Loaded coordinates farther than a Chebyshev radius from a center.
    pub fn outside_radius(&self, center: ChunkCoord, radius: i32) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self
            .chunks
            .keys()
            .filter(|coord| coord.chebyshev(center) > radius)
            .copied()
            .collect();
        coords.sort_unstable();
        coords
    }

    /// Block at a world position, if its chunk is loaded and holds one.
    pub fn block_at(&self, pos: BlockPos, chunk_size: u32) -> Option<BlockId> {
        self.get(pos.chunk(chunk_size))?.block_at(pos)
    }

    /// Loaded chunks touched by the XZ footprint of a box, in coordinate order.
    pub fn chunks_under(&self, footprint: &Aabb, chunk_size: u32) -> Vec<&Chunk> {
        let size = chunk_size as f32;
        let min_x = (footprint.min.x / size).floor() as i32;
        let max_x = (footprint.max.x / size).floor() as i32;
        let min_z = (footprint.min.z / size).floor() as i32;
        let max_z = (footprint.max.z / size).floor() as i32;

        let mut chunks = Vec::new();
        for x in min_x..=max_x {
            for z in min_z..=max_z {
                if let Some(chunk) = self.get(ChunkCoord::new(x, z)) {
                    chunks.push(chunk);
                }
            }
        }
        chunks
    }

    /// Total scene handles held by all chunks.
    pub fn handle_count(&self) -> usize {
        self.chunks.values().map(|l| l.geometry.handle_count()).sum()
    }
}
