//! Chunk data structure for terrain columns.

use blockfield_core::{BlockId, BlockPos, ChunkCoord};
use hashbrown::HashMap;

use crate::terrain::TerrainField;

/// A single block owned by a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    pub pos: BlockPos,
    pub id: BlockId,
}

/// A square column of terrain, `size x size` blocks wide.
///
/// A column of height `h` holds the blocks `0..h`, so its top surface is at
/// `h`, the same height the field reports for collision.
///
/// Heights are a pure function of the coordinate and the terrain field, so a
/// chunk evicted and generated again is identical to the first one (minus any
/// blocks removed in between, which are not persisted).
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Position in chunk coordinates.
    coord: ChunkCoord,
    /// Edge length in blocks.
    size: u32,
    /// Column heights, row-major by local z then x.
    heights: Vec<i32>,
    /// Blocks in generation order: column by column, bottom to top.
    blocks: Vec<Block>,
    /// Occupancy index for point queries.
    lookup: HashMap<BlockPos, BlockId>,
}

impl Chunk {
    /// Sample the terrain field over every local column and build the blocks.
    pub fn generate(coord: ChunkCoord, size: u32, terrain: &TerrainField) -> Self {
        let (base_x, base_z) = coord.origin(size);
        let columns = size as usize * size as usize;
        let mut heights = Vec::with_capacity(columns);
        let mut blocks = Vec::new();

        for lz in 0..i64::from(size) {
            for lx in 0..i64::from(size) {
                let world_x = base_x + lx;
                let world_z = base_z + lz;
                let surface_height = terrain.column_height(world_x, world_z);
                heights.push(surface_height);

                for world_y in 0..i64::from(surface_height) {
                    let id = terrain.block_at_depth(world_y, surface_height);
                    if id.is_solid() {
                        blocks.push(Block {
                            pos: BlockPos::new(world_x, world_y, world_z),
                            id,
                        });
                    }
                }
            }
        }

        let lookup = blocks.iter().map(|b| (b.pos, b.id)).collect();

        Self {
            coord,
            size,
            heights,
            blocks,
            lookup,
        }
    }

    /// Build a chunk from explicit column heights, without a noise field.
    ///
    /// `heights` is row-major by local z then x and must hold `size * size`
    /// entries. Every block is grass; used for hand-built terrain.
    pub fn from_heights(coord: ChunkCoord, size: u32, heights: Vec<i32>) -> Self {
        assert_eq!(heights.len(), size as usize * size as usize, "height grid size mismatch");
        let (base_x, base_z) = coord.origin(size);
        let mut blocks = Vec::new();
        for (i, &h) in heights.iter().enumerate() {
            let lx = (i % size as usize) as i64;
            let lz = (i / size as usize) as i64;
            for y in 0..i64::from(h) {
                blocks.push(Block {
                    pos: BlockPos::new(base_x + lx, y, base_z + lz),
                    id: BlockId::GRASS,
                });
            }
        }
        let lookup = blocks.iter().map(|b| (b.pos, b.id)).collect();
        Self {
            coord,
            size,
            heights,
            blocks,
            lookup,
        }
    }

    /// Position in chunk coordinates.
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Edge length in blocks.
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Column height grid, row-major by local z then x.
    pub fn heights(&self) -> &[i32] {
        &self.heights
    }

    /// Generated height of a local column.
    pub fn column_height(&self, local_x: u32, local_z: u32) -> i32 {
        debug_assert!(local_x < self.size && local_z < self.size);
        self.heights[(local_z * self.size + local_x) as usize]
    }

    /// Blocks in enumeration order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Block at a world position, if this chunk holds one there.
    pub fn block_at(&self, pos: BlockPos) -> Option<BlockId> {
        self.lookup.get(&pos).copied()
    }

    /// Remove a block. The edit lives only as long as the chunk does.
    pub fn remove_block(&mut self, pos: BlockPos) -> Option<Block> {
        let id = self.lookup.remove(&pos)?;
        self.blocks.retain(|b| b.pos != pos);
        Some(Block { pos, id })
    }

    /// Number of blocks currently in the chunk.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if this chunk holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
