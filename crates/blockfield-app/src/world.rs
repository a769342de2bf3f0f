//! The world root.

use std::sync::Arc;

use blockfield_core::{ChunkCoord, Error, Result};
use blockfield_input::InputSnapshot;
use blockfield_physics::{raycast_blocks, CollisionPolicyKind, RaycastHit};
use blockfield_player::{CameraSink, PlayerController};
use blockfield_world::{
    ActiveChunkSet, Block, ChunkStreamer, SceneCollaborator, SceneEntity, SceneHandle,
    StreamUpdate, TerrainField, WorldSeed,
};
use glam::Vec3;
use tracing::{info, warn};

use crate::config::WorldConfig;

/// What happened during one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Chunk the player ended the frame in.
    pub player_chunk: ChunkCoord,
    /// Eye position after the tick.
    pub position: Vec3,
    pub grounded: bool,
    /// Chunks streamed in and out this frame.
    pub stream: StreamUpdate,
}

/// Root of a running world. Owns the streamer (and through it the terrain
/// field and entity registry) and the player.
#[derive(Debug)]
pub struct BlockWorld {
    config: WorldConfig,
    streamer: ChunkStreamer,
    player: PlayerController,
}

impl BlockWorld {
    /// Validate the configuration, spawn the player and stream in the first chunks.
    pub fn new(config: WorldConfig, scene: &mut dyn SceneCollaborator) -> Result<Self> {
        config.validate()?;

        let terrain = Arc::new(TerrainField::new(config.terrain.clone()));
        let streamer = if config.async_streaming {
            ChunkStreamer::new_async(config.streaming.clone(), terrain)
        } else {
            ChunkStreamer::new(config.streaming.clone(), terrain)
        };
        let player = PlayerController::new(config.player.clone(), config.spawn);

        let mut world = Self {
            config,
            streamer,
            player,
        };
        let center = world.player_chunk()?;
        let initial = world.stream(center, scene);

        info!(
            "World created: seed {}, chunk size {}, render distance {}, {} chunks",
            world.config.terrain.seed,
            world.config.streaming.chunk_size,
            world.config.streaming.render_distance,
            initial.generated.len()
        );
        Ok(world)
    }

    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub const fn player(&self) -> &PlayerController {
        &self.player
    }

    pub const fn streamer(&self) -> &ChunkStreamer {
        &self.streamer
    }

    /// Loaded chunks.
    pub fn chunks(&self) -> &ActiveChunkSet {
        self.streamer.chunks()
    }

    /// The terrain field shared by generation and collision.
    pub fn terrain(&self) -> &TerrainField {
        self.streamer.terrain()
    }

    /// Chunk containing the player's eye position.
    pub fn player_chunk(&self) -> Result<ChunkCoord> {
        let position = self.player.position();
        ChunkCoord::containing(position.x, position.z, self.config.streaming.chunk_size).ok_or_else(
            || {
                warn!("Rejecting non-finite player position {position}");
                Error::NonFinitePosition {
                    x: position.x,
                    z: position.z,
                }
            },
        )
    }

    fn stream(&mut self, center: ChunkCoord, scene: &mut dyn SceneCollaborator) -> StreamUpdate {
        if self.streamer.is_async() {
            self.streamer.update_async(center, scene)
        } else {
            self.streamer.update(center, scene)
        }
    }

    /// Run one frame: player tick, chunk streaming, camera update, in that order.
    ///
    /// Fails with [`Error::NonFinitePosition`] if the tick left the player at a
    /// NaN or infinite position; chunks and camera are left untouched then.
    pub fn frame(
        &mut self,
        input: &InputSnapshot,
        scene: &mut dyn SceneCollaborator,
        camera: &mut dyn CameraSink,
    ) -> Result<FrameReport> {
        let resolution = self.player.tick(
            input,
            self.streamer.terrain().as_ref(),
            self.streamer.chunks(),
            self.config.streaming.chunk_size,
        );

        let player_chunk = self.player_chunk()?;
        let stream = self.stream(player_chunk, scene);
        camera.apply_view(&self.player.camera_view());

        Ok(FrameReport {
            player_chunk,
            position: resolution.position,
            grounded: resolution.grounded,
            stream,
        })
    }

    /// First solid block along the view ray within reach.
    pub fn pick_block(&self) -> Option<RaycastHit> {
        let chunks = self.streamer.chunks();
        let chunk_size = self.config.streaming.chunk_size;
        raycast_blocks(&self.player.eye_ray(), self.config.player.reach, |pos| {
            chunks.block_at(pos, chunk_size).is_some_and(|id| id.is_solid())
        })
    }

    /// Remove the targeted block from its chunk and from the scene.
    pub fn remove_targeted_block(&mut self, scene: &mut dyn SceneCollaborator) -> Option<Block> {
        let hit = self.pick_block()?;
        self.streamer.remove_block(hit.block, scene)
    }

    /// Throw away every chunk and regenerate around the player with a new seed.
    ///
    /// The player keeps its position.
    pub fn new_world(
        &mut self,
        seed: WorldSeed,
        scene: &mut dyn SceneCollaborator,
    ) -> Result<StreamUpdate> {
        let terrain = Arc::new(self.streamer.terrain().reseeded(seed));
        self.streamer.reseed(terrain, scene);
        self.config.terrain.seed = seed;

        let center = self.player_chunk()?;
        let update = self.stream(center, scene);
        info!("New world created with seed {seed}");
        Ok(update)
    }

    /// Switch the collision policy.
    pub fn set_collision(&mut self, collision: CollisionPolicyKind) {
        self.config.player.collision = collision;
        self.player.set_collision(collision);
    }

    /// What a scene handle stands for.
    pub fn entity(&self, handle: SceneHandle) -> SceneEntity {
        self.streamer.entities().get(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use blockfield_core::BlockPos;
    use blockfield_input::{MovementKey, MovementKeys};
    use blockfield_player::{NullCamera, RecordingCamera};
    use blockfield_world::{GeometryMode, RecordingScene, SceneCall};
    use glam::Vec2;
    use std::time::Duration;

    fn small_world(config: WorldConfig, scene: &mut RecordingScene) -> BlockWorld {
        BlockWorld::new(config.with_render_distance(1), scene).expect("valid config")
    }

    /// An integer column near the origin that holds at least one block and
    /// whose field height at the column center matches it.
    fn solid_column(seed: WorldSeed) -> (i64, i32) {
        let field = TerrainField::with_seed(seed);
        (0..500)
            .map(|x| (x, field.column_height(x, 0)))
            .find(|&(x, h)| h >= 1 && field.height_at(x as f64 + 0.5, 0.5) == h)
            .expect("some column near the origin is above ground")
    }

    /// World with the stepping policy and the player standing on `solid_column`.
    fn standing_world(scene: &mut RecordingScene) -> (BlockWorld, i64, i32) {
        let (x, h) = solid_column(42);
        let spawn = Vec3::new(x as f32 + 0.5, h as f32 + 1.5, 0.5);
        let config = WorldConfig::new(42)
            .with_collision(CollisionPolicyKind::Stepping)
            .with_spawn(spawn);
        let mut world = small_world(config, scene);
        let report = world
            .frame(&InputSnapshot::idle(), scene, &mut NullCamera)
            .expect("finite");
        assert!(report.grounded);
        (world, x, h)
    }

    #[test]
    fn creation_streams_initial_square() {
        let mut scene = RecordingScene::new();
        let world = small_world(WorldConfig::new(42), &mut scene);

        // Spawn (25, 1.5, 25) lies in chunk (1, 1)
        assert_eq!(world.player_chunk(), Ok(ChunkCoord::new(1, 1)));
        assert_eq!(world.chunks().len(), 9);
        assert_eq!(scene.live_chunks(), 9);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut scene = RecordingScene::new();
        let result = BlockWorld::new(WorldConfig::new(1).with_chunk_size(0), &mut scene);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
        assert!(scene.calls().is_empty());
    }

    #[test]
    fn frame_streams_around_post_tick_position() {
        let mut scene = RecordingScene::new();
        let config = WorldConfig::new(42).with_spawn(Vec3::new(8.0, 20.0, 0.05));
        let mut world = small_world(config, &mut scene);
        assert_eq!(world.player_chunk(), Ok(ChunkCoord::new(0, 0)));

        let mut camera = RecordingCamera::new();
        let report = world
            .frame(
                &InputSnapshot::holding(MovementKey::Forward),
                &mut scene,
                &mut camera,
            )
            .expect("finite");

        // Forward at zero yaw is -Z, so one tick crosses into chunk z = -1
        assert_eq!(report.player_chunk, ChunkCoord::new(0, -1));
        assert_eq!(report.stream.generated.len(), 3);
        assert_eq!(report.stream.evicted.len(), 3);
        assert!(world.chunks().contains(ChunkCoord::new(0, -2)));

        let view = camera.last().expect("camera updated");
        assert_eq!(view.position, world.player().position());
        assert_eq!(view.position, report.position);
    }

    #[test]
    fn idle_frames_make_no_scene_calls() {
        let mut scene = RecordingScene::new();
        let mut world = small_world(WorldConfig::new(3), &mut scene);
        scene.clear_calls();

        for _ in 0..5 {
            world
                .frame(&InputSnapshot::idle(), &mut scene, &mut NullCamera)
                .expect("finite");
        }
        assert!(scene.calls().is_empty());
    }

    #[test]
    fn nan_pointer_frame_does_not_stall_walking() {
        let mut scene = RecordingScene::new();
        let mut world = small_world(WorldConfig::new(42), &mut scene);

        let poisoned = InputSnapshot::holding(MovementKey::Forward)
            .with_pointer_delta(Vec2::new(f32::NAN, 0.0));
        world
            .frame(&poisoned, &mut scene, &mut NullCamera)
            .expect("non-finite look is ignored");
        assert!(world.player().state().yaw.is_finite());

        let start = world.player().position();
        for _ in 0..10 {
            let report = world
                .frame(
                    &InputSnapshot::holding(MovementKey::Forward),
                    &mut scene,
                    &mut NullCamera,
                )
                .expect("walking after a bad look frame");
            assert!(report.position.is_finite());
        }
        assert!(world.player().position().z < start.z - 0.9);
    }

    #[test]
    fn non_finite_position_is_rejected() {
        let mut scene = RecordingScene::new();
        let mut world = small_world(WorldConfig::new(42), &mut scene);
        scene.clear_calls();

        world.player.teleport(Vec3::new(f32::NAN, 5.0, 0.0));
        let mut camera = RecordingCamera::new();
        let result = world.frame(
            &InputSnapshot::holding(MovementKey::Forward),
            &mut scene,
            &mut camera,
        );

        assert!(matches!(result, Err(Error::NonFinitePosition { .. })));
        assert!(scene.calls().is_empty());
        assert!(camera.views().is_empty());
        assert_eq!(world.chunks().len(), 9);
    }

    #[test]
    fn lands_on_field_surface() {
        let mut scene = RecordingScene::new();
        let config = WorldConfig::new(42).with_spawn(Vec3::new(3.0, 12.0, -7.0));
        let mut world = small_world(config, &mut scene);

        let mut grounded = false;
        for _ in 0..500 {
            let report = world
                .frame(&InputSnapshot::idle(), &mut scene, &mut NullCamera)
                .expect("finite");
            if report.grounded {
                grounded = true;
                break;
            }
        }
        assert!(grounded);
        let expected = world.terrain().height_at(3.0, -7.0) as f32 + 1.5;
        assert_relative_eq!(world.player().position().y, expected);
    }

    #[test]
    fn picks_and_removes_block_underfoot() {
        let mut scene = RecordingScene::new();
        let (mut world, x, h) = standing_world(&mut scene);

        // Look straight down
        let look_down = InputSnapshot::idle().with_pointer_delta(Vec2::new(0.0, 1.0e6));
        world.frame(&look_down, &mut scene, &mut NullCamera).expect("finite");

        let hit = world.pick_block().expect("block underfoot");
        let target = BlockPos::new(x, i64::from(h) - 1, 0);
        assert_eq!(hit.block, target);
        assert_eq!(hit.normal, Vec3::Y);
        assert_relative_eq!(hit.distance, 1.5, epsilon = 1e-4);

        scene.clear_calls();
        let removed = world.remove_targeted_block(&mut scene).expect("removed");
        assert_eq!(removed.pos, target);
        assert!(world.chunks().block_at(target, 16).is_none());
        assert!(matches!(
            scene.calls(),
            [SceneCall::ReleaseChunk { .. }, SceneCall::InstantiateChunk { .. }]
        ));

        // Nothing holds the player up any more; it drops onto the next block
        for _ in 0..200 {
            world
                .frame(&InputSnapshot::idle(), &mut scene, &mut NullCamera)
                .expect("finite");
        }
        assert_relative_eq!(world.player().position().y, h as f32 + 0.5);
    }

    #[test]
    fn policies_agree_on_standing_height() {
        let (x, h) = solid_column(42);
        let spawn = Vec3::new(x as f32 + 0.5, h as f32 + 4.0, 0.5);

        let rest = |collision| {
            let mut scene = RecordingScene::new();
            let config = WorldConfig::new(42)
                .with_collision(collision)
                .with_spawn(spawn);
            let mut world = small_world(config, &mut scene);
            for _ in 0..300 {
                world
                    .frame(&InputSnapshot::idle(), &mut scene, &mut NullCamera)
                    .expect("finite");
            }
            let feet = world.player().position() - Vec3::new(0.0, 1.5, 0.0);
            let inside = world
                .chunks()
                .block_at(BlockPos::containing(feet + Vec3::new(0.0, 0.01, 0.0)), 16);
            (world.player().position().y, inside)
        };

        let clamped = rest(CollisionPolicyKind::FieldClamp);
        let stepped = rest(CollisionPolicyKind::Stepping);
        assert_relative_eq!(clamped.0, h as f32 + 1.5);
        assert_relative_eq!(stepped.0, h as f32 + 1.5);
        assert_eq!(clamped.1, None);
        assert_eq!(stepped.1, None);
    }

    #[test]
    fn per_block_removal_releases_one_handle() {
        let mut scene = RecordingScene::new();
        let (x, h) = solid_column(42);
        let config = WorldConfig::new(42)
            .with_geometry(GeometryMode::PerBlock)
            .with_collision(CollisionPolicyKind::Stepping)
            .with_spawn(Vec3::new(x as f32 + 0.5, h as f32 + 1.5, 0.5));
        let mut world = small_world(config, &mut scene);
        let look_down = InputSnapshot::idle().with_pointer_delta(Vec2::new(0.0, 1.0e6));
        world.frame(&look_down, &mut scene, &mut NullCamera).expect("finite");

        let live = scene.live_count();
        scene.clear_calls();
        assert!(world.remove_targeted_block(&mut scene).is_some());
        assert_eq!(scene.live_count(), live - 1);
        let [SceneCall::RemoveBlock { handle }] = scene.calls() else {
            panic!("expected a single remove call, got {:?}", scene.calls());
        };
        assert_eq!(world.entity(*handle), SceneEntity::Other);
    }

    #[test]
    fn entities_resolve_scene_handles() {
        let mut scene = RecordingScene::new();
        let world = small_world(WorldConfig::new(5), &mut scene);

        for call in scene.calls() {
            if let SceneCall::InstantiateChunk { coord, handle } = call {
                assert_eq!(world.entity(*handle), SceneEntity::Chunk { coord: *coord });
            }
        }
        assert_eq!(world.entity(SceneHandle(u64::MAX)), SceneEntity::Other);
    }

    #[test]
    fn new_world_regenerates_with_new_seed() {
        let mut scene = RecordingScene::new();
        let mut world = small_world(WorldConfig::new(42), &mut scene);
        let center = world.player_chunk().expect("finite");
        let old_heights = world.chunks().get(center).map(|c| c.heights().to_vec());
        let position = world.player().position();

        let update = world.new_world(7, &mut scene).expect("finite");

        assert_eq!(update.generated.len(), 9);
        assert_eq!(world.config().terrain.seed, 7);
        assert_eq!(world.terrain().config().seed, 7);
        assert_eq!(world.chunks().len(), 9);
        assert_eq!(scene.live_chunks(), 9);
        assert_eq!(world.player().position(), position);
        let new_heights = world.chunks().get(center).map(|c| c.heights().to_vec());
        assert_ne!(old_heights, new_heights);
    }

    #[test]
    fn collision_policy_can_switch() {
        let mut scene = RecordingScene::new();
        let mut world = small_world(WorldConfig::new(1), &mut scene);
        world.set_collision(CollisionPolicyKind::Stepping);
        assert_eq!(world.player().config().collision, CollisionPolicyKind::Stepping);
        assert_eq!(world.config().player.collision, CollisionPolicyKind::Stepping);
    }

    #[test]
    fn async_world_converges() {
        let mut scene = RecordingScene::new();
        let config = WorldConfig::new(42).with_async_streaming(true);
        let mut world = small_world(config, &mut scene);
        let keys = MovementKeys::empty();

        for _ in 0..500 {
            world
                .frame(&InputSnapshot::holding(keys), &mut scene, &mut NullCamera)
                .expect("finite");
            if world.chunks().len() == 9 && world.streamer().in_flight_count() == 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(world.chunks().len(), 9);
        assert_eq!(scene.live_chunks(), 9);
    }
}
