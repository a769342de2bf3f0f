//! Boundary to the rendering/scene collaborator.
//!
//! The runtime never touches graphics primitives. It asks the scene to create
//! or release geometry and keeps the returned handles, tagged with what they
//! stand for so lookups switch on an explicit discriminant.

use blockfield_core::{BlockId, BlockPos, ChunkCoord};
use hashbrown::HashMap;

use crate::chunk::Chunk;

/// Opaque handle to geometry owned by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneHandle(pub u64);

/// What a scene handle represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEntity {
    /// A single block.
    Block { pos: BlockPos, block: BlockId },
    /// All geometry of one chunk.
    Chunk { coord: ChunkCoord },
    /// Anything the runtime did not create.
    Other,
}

/// Rendering collaborator.
pub trait SceneCollaborator {
    /// Build geometry for a whole chunk.
    fn instantiate_chunk_geometry(&mut self, chunk: &Chunk) -> SceneHandle;
    /// Drop geometry previously built for a chunk.
    fn release_chunk_geometry(&mut self, handle: SceneHandle);
    /// Build a single block.
    fn instantiate_block(&mut self, pos: BlockPos, material: BlockId) -> SceneHandle;
    /// Drop a single block.
    fn remove_block(&mut self, handle: SceneHandle);
}

/// Scene that renders nothing and hands out sequential handles.
#[derive(Debug, Default)]
pub struct NullScene {
    next: u64,
}

impl NullScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_handle(&mut self) -> SceneHandle {
        self.next += 1;
        SceneHandle(self.next)
    }
}

impl SceneCollaborator for NullScene {
    fn instantiate_chunk_geometry(&mut self, _chunk: &Chunk) -> SceneHandle {
        self.next_handle()
    }

    fn release_chunk_geometry(&mut self, _handle: SceneHandle) {}

    fn instantiate_block(&mut self, _pos: BlockPos, _material: BlockId) -> SceneHandle {
        self.next_handle()
    }

    fn remove_block(&mut self, _handle: SceneHandle) {}
}

/// A call the runtime made into the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCall {
    InstantiateChunk { coord: ChunkCoord, handle: SceneHandle },
    ReleaseChunk { handle: SceneHandle },
    InstantiateBlock { pos: BlockPos, material: BlockId, handle: SceneHandle },
    RemoveBlock { handle: SceneHandle },
}

/// Scene that records every call and tracks which handles are live.
///
/// Useful for headless runs and for checking that the runtime never leaks or
/// double-frees geometry.
#[derive(Debug, Default)]
pub struct RecordingScene {
    next: u64,
    calls: Vec<SceneCall>,
    live: HashMap<SceneHandle, SceneEntity>,
}

impl RecordingScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, oldest first.
    pub fn calls(&self) -> &[SceneCall] {
        &self.calls
    }

    /// Forget recorded calls but keep live handles.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of handles created and not yet released.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Whether a handle is still live.
    pub fn is_live(&self, handle: SceneHandle) -> bool {
        self.live.contains_key(&handle)
    }

    /// Number of live chunk geometries.
    pub fn live_chunks(&self) -> usize {
        self.live
            .values()
            .filter(|e| matches!(e, SceneEntity::Chunk { .. }))
            .count()
    }

    fn next_handle(&mut self) -> SceneHandle {
        self.next += 1;
        SceneHandle(self.next)
    }

    fn release(&mut self, handle: SceneHandle) {
        let released = self.live.remove(&handle);
        debug_assert!(released.is_some(), "released unknown handle {handle:?}");
    }
}

impl SceneCollaborator for RecordingScene {
    fn instantiate_chunk_geometry(&mut self, chunk: &Chunk) -> SceneHandle {
        let handle = self.next_handle();
        let coord = chunk.coord();
        self.live.insert(handle, SceneEntity::Chunk { coord });
        self.calls.push(SceneCall::InstantiateChunk { coord, handle });
        handle
    }

    fn release_chunk_geometry(&mut self, handle: SceneHandle) {
        self.release(handle);
        self.calls.push(SceneCall::ReleaseChunk { handle });
    }

    fn instantiate_block(&mut self, pos: BlockPos, material: BlockId) -> SceneHandle {
        let handle = self.next_handle();
        self.live.insert(handle, SceneEntity::Block { pos, block: material });
        self.calls.push(SceneCall::InstantiateBlock {
            pos,
            material,
            handle,
        });
        handle
    }

    fn remove_block(&mut self, handle: SceneHandle) {
        self.release(handle);
        self.calls.push(SceneCall::RemoveBlock { handle });
    }
}

/// Maps live scene handles back to what they represent.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: HashMap<SceneHandle, SceneEntity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a handle the runtime just created.
    pub fn register(&mut self, handle: SceneHandle, entity: SceneEntity) {
        self.entities.insert(handle, entity);
    }

    /// Forget a handle the runtime just released.
    pub fn unregister(&mut self, handle: SceneHandle) -> Option<SceneEntity> {
        self.entities.remove(&handle)
    }

    /// Look up a handle. Handles the runtime never created are `Other`.
    pub fn get(&self, handle: SceneHandle) -> SceneEntity {
        self.entities
            .get(&handle)
            .copied()
            .unwrap_or(SceneEntity::Other)
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
