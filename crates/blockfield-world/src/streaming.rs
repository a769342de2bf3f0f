//! Chunk streaming around the player.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use blockfield_core::{BlockPos, ChunkCoord, Error, Result};
use crossbeam::channel::{self, Receiver, Sender};
use hashbrown::{HashMap, HashSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::chunk::{Block, Chunk};
use crate::chunk_manager::{ActiveChunkSet, ChunkGeometry, LoadedChunk};
use crate::scene::{EntityRegistry, SceneCollaborator, SceneEntity};
use crate::terrain::TerrainField;

/// Priority entry for the async request queue.
#[derive(Debug, Clone, Copy)]
struct LoadPriority {
    coord: ChunkCoord,
    /// Squared distance to the player chunk (lower = higher priority).
    distance_sq: i32,
}

impl PartialEq for LoadPriority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LoadPriority {}

impl PartialOrd for LoadPriority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LoadPriority {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (closer chunks have higher priority),
        // coordinate as tie-break so submission order is reproducible.
        other
            .distance_sq
            .cmp(&self.distance_sq)
            .then_with(|| other.coord.cmp(&self.coord))
    }
}

/// How chunk geometry is handed to the scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryMode {
    /// One `instantiate_chunk_geometry` call per chunk.
    #[default]
    PerChunk,
    /// One `instantiate_block` call per generated block.
    PerBlock,
}

/// Configuration for chunk streaming behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Chunk edge length in blocks.
    pub chunk_size: u32,
    /// Chebyshev radius, in chunks, of the active square.
    pub render_distance: i32,
    /// Per-chunk or per-block scene geometry.
    pub geometry: GeometryMode,
    /// Maximum chunks submitted to the worker per async update.
    pub max_requests_per_update: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: blockfield_core::constants::DEFAULT_CHUNK_SIZE,
            render_distance: blockfield_core::constants::DEFAULT_RENDER_DISTANCE,
            geometry: GeometryMode::PerChunk,
            max_requests_per_update: 32,
        }
    }
}

impl StreamingConfig {
    /// Largest accepted chunk edge, in blocks.
    pub const MAX_CHUNK_SIZE: u32 = 256;
    /// Largest accepted render distance, in chunks.
    pub const MAX_RENDER_DISTANCE: i32 = 64;

    /// Check that the configuration describes a usable streamer.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_size > Self::MAX_CHUNK_SIZE {
            return Err(Error::InvalidConfig(format!(
                "chunk_size must be in 1..={}, got {}",
                Self::MAX_CHUNK_SIZE,
                self.chunk_size
            )));
        }
        if !(0..=Self::MAX_RENDER_DISTANCE).contains(&self.render_distance) {
            return Err(Error::InvalidConfig(format!(
                "render_distance must be in 0..={}, got {}",
                Self::MAX_RENDER_DISTANCE,
                self.render_distance
            )));
        }
        if self.max_requests_per_update == 0 {
            return Err(Error::InvalidConfig(
                "max_requests_per_update must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Number of chunks in the active square.
    pub const fn target_count(&self) -> usize {
        let side = (2 * self.render_distance + 1) as usize;
        side * side
    }
}

/// What one streaming update changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamUpdate {
    /// Chunks that became active, in commit order.
    pub generated: Vec<ChunkCoord>,
    /// Chunks that were evicted, sorted.
    pub evicted: Vec<ChunkCoord>,
}

impl StreamUpdate {
    /// Check if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.generated.is_empty() && self.evicted.is_empty()
    }
}

/// Work request sent to the background worker thread.
enum ChunkWorkRequest {
    /// Generate chunks at the given coordinates.
    Generate {
        epoch: u64,
        terrain: Arc<TerrainField>,
        chunk_size: u32,
        coords: Vec<ChunkCoord>,
    },
    /// Signal worker thread to shut down.
    Shutdown,
}

/// Result returned by the worker thread.
struct ChunkWorkResult {
    /// Terrain epoch the chunk was generated for.
    epoch: u64,
    chunk: Chunk,
}

/// Handle to the background chunk worker thread.
struct ChunkWorkerHandle {
    /// Channel to send work requests to the worker.
    request_tx: Sender<ChunkWorkRequest>,
    /// Channel to receive completed results from the worker.
    result_rx: Receiver<ChunkWorkResult>,
    /// Worker thread handle for joining on shutdown.
    thread: Option<JoinHandle<()>>,
}

impl ChunkWorkerHandle {
    /// Spawn a new worker thread.
    fn spawn() -> Self {
        let (request_tx, request_rx) = channel::bounded::<ChunkWorkRequest>(16);
        let (result_tx, result_rx) = channel::unbounded::<ChunkWorkResult>();

        let thread = thread::Builder::new()
            .name("chunk-worker".to_string())
            .spawn(move || {
                Self::worker_loop(&request_rx, &result_tx);
            })
            .expect("Failed to spawn chunk worker thread");

        Self {
            request_tx,
            result_rx,
            thread: Some(thread),
        }
    }

    /// Main worker loop - blocks waiting for requests and processes them.
    fn worker_loop(request_rx: &Receiver<ChunkWorkRequest>, result_tx: &Sender<ChunkWorkResult>) {
        loop {
            match request_rx.recv() {
                Ok(ChunkWorkRequest::Generate {
                    epoch,
                    terrain,
                    chunk_size,
                    coords,
                }) => {
                    let generated = generate_chunks(&terrain, chunk_size, &coords);
                    for chunk in generated {
                        if result_tx.send(ChunkWorkResult { epoch, chunk }).is_err() {
                            // Receiver dropped, exit loop
                            return;
                        }
                    }
                }
                Ok(ChunkWorkRequest::Shutdown) | Err(_) => return,
            }
        }
    }

    /// Send a batch to generate (non-blocking). Gives the batch back if the queue is full.
    fn send_work(&self, request: ChunkWorkRequest) -> std::result::Result<(), ChunkWorkRequest> {
        self.request_tx.try_send(request).map_err(|e| e.into_inner())
    }

    /// Drain every completed result without blocking.
    fn drain_results(&self) -> Vec<ChunkWorkResult> {
        self.result_rx.try_iter().collect()
    }

    /// Shutdown the worker thread and wait for it to finish.
    fn shutdown(&mut self) {
        // Channel might already be closed
        let _ = self.request_tx.send(ChunkWorkRequest::Shutdown);

        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for ChunkWorkerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Generate chunks in parallel, preserving the order of `coords`.
fn generate_chunks(terrain: &TerrainField, chunk_size: u32, coords: &[ChunkCoord]) -> Vec<Chunk> {
    coords
        .par_iter()
        .map(|&coord| Chunk::generate(coord, chunk_size, terrain))
        .collect()
}

/// Hand a chunk's geometry back to the scene.
fn release_geometry(
    geometry: ChunkGeometry,
    scene: &mut dyn SceneCollaborator,
    entities: &mut EntityRegistry,
) {
    match geometry {
        ChunkGeometry::Chunk(handle) => {
            scene.release_chunk_geometry(handle);
            entities.unregister(handle);
        }
        ChunkGeometry::Blocks(handles) => {
            for handle in handles.into_values() {
                scene.remove_block(handle);
                entities.unregister(handle);
            }
        }
    }
}

/// Keeps exactly the chunks within render distance of the player loaded.
///
/// Owns the single [`TerrainField`] shared with collision; callers borrow it
/// through [`ChunkStreamer::terrain`] rather than building their own.
pub struct ChunkStreamer {
    config: StreamingConfig,
    terrain: Arc<TerrainField>,
    chunks: ActiveChunkSet,
    entities: EntityRegistry,
    last_center: Option<ChunkCoord>,
    /// Bumped on reseed so stale worker results are dropped.
    epoch: u64,
    /// Background worker thread handle (None for sync mode).
    worker: Option<ChunkWorkerHandle>,
    /// Coordinates currently being generated by the worker.
    in_flight: HashSet<ChunkCoord>,
}

impl ChunkStreamer {
    /// Create a synchronous streamer; generation finishes inside `update`.
    pub fn new(config: StreamingConfig, terrain: Arc<TerrainField>) -> Self {
        Self {
            config,
            terrain,
            chunks: ActiveChunkSet::new(),
            entities: EntityRegistry::new(),
            last_center: None,
            epoch: 0,
            worker: None,
            in_flight: HashSet::new(),
        }
    }

    /// Create a streamer that generates on a background worker thread.
    ///
    /// Generated chunks are only ever committed by [`Self::update_async`] on
    /// the calling thread.
    pub fn new_async(config: StreamingConfig, terrain: Arc<TerrainField>) -> Self {
        Self {
            worker: Some(ChunkWorkerHandle::spawn()),
            ..Self::new(config, terrain)
        }
    }

    /// Check if this streamer is running in async mode.
    pub fn is_async(&self) -> bool {
        self.worker.is_some()
    }

    /// Get the streaming configuration.
    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// The terrain field used for generation.
    pub fn terrain(&self) -> &Arc<TerrainField> {
        &self.terrain
    }

    /// Currently loaded chunks.
    pub fn chunks(&self) -> &ActiveChunkSet {
        &self.chunks
    }

    /// Live scene handles created by this streamer.
    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    /// Player chunk of the last update.
    pub fn last_center(&self) -> Option<ChunkCoord> {
        self.last_center
    }

    /// Get the number of chunks currently being generated by the worker.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Bring the active set to exactly the square around `center`.
    ///
    /// Missing chunks are generated (in parallel) and committed in row order,
    /// then chunks outside the square are evicted. A repeated call with the
    /// same center changes nothing and makes no scene calls.
    pub fn update(
        &mut self,
        center: ChunkCoord,
        scene: &mut dyn SceneCollaborator,
    ) -> StreamUpdate {
        let missing: Vec<ChunkCoord> = center
            .square(self.config.render_distance)
            .filter(|coord| !self.chunks.contains(*coord))
            .collect();

        let generated_chunks = generate_chunks(&self.terrain, self.config.chunk_size, &missing);
        for chunk in generated_chunks {
            self.commit(chunk, scene);
        }

        let evicted = self.evict_outside(center, scene);
        self.last_center = Some(center);

        let update = StreamUpdate {
            generated: missing,
            evicted,
        };
        if !update.is_empty() {
            debug!(
                "Streamed around ({}, {}): +{} -{} ({} active)",
                center.x,
                center.z,
                update.generated.len(),
                update.evicted.len(),
                self.chunks.len()
            );
        }
        update
    }

    /// Non-blocking update: commit finished chunks, evict, request missing ones.
    ///
    /// Falls back to [`Self::update`] on a synchronous streamer.
    pub fn update_async(
        &mut self,
        center: ChunkCoord,
        scene: &mut dyn SceneCollaborator,
    ) -> StreamUpdate {
        let Some(worker) = &self.worker else {
            return self.update(center, scene);
        };
        let results = worker.drain_results();
        let radius = self.config.render_distance;

        // Step 1: commit results that are still wanted
        let mut generated = Vec::new();
        for result in results {
            let coord = result.chunk.coord();
            if result.epoch != self.epoch {
                trace!("Dropping chunk ({}, {}) from an old seed", coord.x, coord.z);
                continue;
            }
            self.in_flight.remove(&coord);
            if coord.chebyshev(center) > radius || self.chunks.contains(coord) {
                trace!("Dropping stale chunk ({}, {})", coord.x, coord.z);
                continue;
            }
            self.commit(result.chunk, scene);
            generated.push(coord);
        }

        // Step 2: evict and forget requests that left the radius
        let evicted = self.evict_outside(center, scene);
        self.in_flight
            .retain(|coord| coord.chebyshev(center) <= radius);
        self.last_center = Some(center);

        // Step 3: submit missing chunks, closest first
        self.submit_missing(center);

        let update = StreamUpdate { generated, evicted };
        if !update.is_empty() {
            debug!(
                "Async stream around ({}, {}): +{} -{} ({} active, {} in flight)",
                center.x,
                center.z,
                update.generated.len(),
                update.evicted.len(),
                self.chunks.len(),
                self.in_flight.len()
            );
        }
        update
    }

    /// Queue every missing, not yet requested chunk with the worker.
    fn submit_missing(&mut self, center: ChunkCoord) {
        let Some(worker) = &self.worker else {
            return;
        };

        let mut queue: BinaryHeap<LoadPriority> = center
            .square(self.config.render_distance)
            .filter(|coord| !self.chunks.contains(*coord) && !self.in_flight.contains(coord))
            .map(|coord| {
                let dx = coord.x - center.x;
                let dz = coord.z - center.z;
                LoadPriority {
                    coord,
                    distance_sq: dx * dx + dz * dz,
                }
            })
            .collect();

        let mut batch = Vec::with_capacity(self.config.max_requests_per_update);
        while batch.len() < self.config.max_requests_per_update {
            match queue.pop() {
                Some(entry) => batch.push(entry.coord),
                None => break,
            }
        }
        if batch.is_empty() {
            return;
        }

        let request = ChunkWorkRequest::Generate {
            epoch: self.epoch,
            terrain: Arc::clone(&self.terrain),
            chunk_size: self.config.chunk_size,
            coords: batch.clone(),
        };
        if worker.send_work(request).is_ok() {
            self.in_flight.extend(batch);
        } else {
            // Queue full; the same coordinates are picked up next update
            trace!("Chunk worker queue full, deferring {} chunks", batch.len());
        }
    }

    /// Insert a generated chunk and build its scene geometry.
    fn commit(&mut self, chunk: Chunk, scene: &mut dyn SceneCollaborator) {
        let coord = chunk.coord();
        let geometry = match self.config.geometry {
            GeometryMode::PerChunk => {
                let handle = scene.instantiate_chunk_geometry(&chunk);
                self.entities.register(handle, SceneEntity::Chunk { coord });
                ChunkGeometry::Chunk(handle)
            }
            GeometryMode::PerBlock => {
                let mut handles = HashMap::with_capacity(chunk.block_count());
                for block in chunk.blocks() {
                    let handle = scene.instantiate_block(block.pos, block.id);
                    self.entities.register(
                        handle,
                        SceneEntity::Block {
                            pos: block.pos,
                            block: block.id,
                        },
                    );
                    handles.insert(block.pos, handle);
                }
                ChunkGeometry::Blocks(handles)
            }
        };
        trace!(
            "Generated chunk ({}, {}) with {} blocks",
            coord.x,
            coord.z,
            chunk.block_count()
        );
        self.chunks.insert(LoadedChunk { chunk, geometry });
    }

    /// Evict every chunk outside the active square.
    fn evict_outside(
        &mut self,
        center: ChunkCoord,
        scene: &mut dyn SceneCollaborator,
    ) -> Vec<ChunkCoord> {
        let evicted = self
            .chunks
            .outside_radius(center, self.config.render_distance);
        for &coord in &evicted {
            if let Some(loaded) = self.chunks.remove(coord) {
                trace!("Evicted chunk ({}, {})", coord.x, coord.z);
                release_geometry(loaded.geometry, scene, &mut self.entities);
            }
        }
        evicted
    }

    /// Unload every chunk and release all geometry.
    pub fn clear(&mut self, scene: &mut dyn SceneCollaborator) -> Vec<ChunkCoord> {
        let drained: Vec<LoadedChunk> = self.chunks.drain().collect();
        let mut cleared = Vec::with_capacity(drained.len());
        for loaded in drained {
            cleared.push(loaded.chunk.coord());
            release_geometry(loaded.geometry, scene, &mut self.entities);
        }
        cleared.sort_unstable();
        self.in_flight.clear();
        self.last_center = None;
        cleared
    }

    /// Swap in a new terrain field and drop everything generated from the old one.
    ///
    /// The next update regenerates the square around the player.
    pub fn reseed(&mut self, terrain: Arc<TerrainField>, scene: &mut dyn SceneCollaborator) {
        let cleared = self.clear(scene);
        self.terrain = terrain;
        self.epoch += 1;
        info!(
            "Terrain reseeded to {} ({} chunks released)",
            self.terrain.config().seed,
            cleared.len()
        );
    }

    /// Remove one block from a loaded chunk and update its scene geometry.
    ///
    /// The edit is dropped when the chunk is evicted.
    pub fn remove_block(
        &mut self,
        pos: BlockPos,
        scene: &mut dyn SceneCollaborator,
    ) -> Option<Block> {
        let coord = pos.chunk(self.config.chunk_size);
        let loaded = self.chunks.get_loaded_mut(coord)?;
        let block = loaded.chunk.remove_block(pos)?;

        match &mut loaded.geometry {
            ChunkGeometry::Blocks(handles) => {
                if let Some(handle) = handles.remove(&pos) {
                    scene.remove_block(handle);
                    self.entities.unregister(handle);
                }
            }
            ChunkGeometry::Chunk(handle) => {
                // Chunk geometry is rebuilt wholesale
                scene.release_chunk_geometry(*handle);
                self.entities.unregister(*handle);
                let rebuilt = scene.instantiate_chunk_geometry(&loaded.chunk);
                self.entities.register(rebuilt, SceneEntity::Chunk { coord });
                *handle = rebuilt;
            }
        }
        debug!(
            "Removed {} block at ({}, {}, {})",
            block.id.name(),
            pos.x,
            pos.y,
            pos.z
        );
        Some(block)
    }
}

impl std::fmt::Debug for ChunkStreamer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStreamer")
            .field("config", &self.config)
            .field("active", &self.chunks.len())
            .field("last_center", &self.last_center)
            .field("in_flight", &self.in_flight.len())
            .field("async", &self.is_async())
            .finish_non_exhaustive()
    }
}
