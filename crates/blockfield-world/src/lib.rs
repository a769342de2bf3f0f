//! Terrain generation and chunk streaming for the blockfield runtime.

pub mod chunk;
pub mod chunk_manager;
pub mod scene;
pub mod streaming;
pub mod terrain;

pub use chunk::{Block, Chunk};
pub use chunk_manager::{ActiveChunkSet, ChunkGeometry, LoadedChunk};
pub use scene::{
    EntityRegistry, NullScene, RecordingScene, SceneCall, SceneCollaborator, SceneEntity,
    SceneHandle,
};
pub use streaming::{ChunkStreamer, GeometryMode, StreamUpdate, StreamingConfig};
pub use terrain::{HeightSource, TerrainConfig, TerrainField};

/// World seed for procedural generation.
pub type WorldSeed = u64;
