//! Aggregate world configuration.

use blockfield_core::Result;
use blockfield_physics::CollisionPolicyKind;
use blockfield_player::PlayerConfig;
use blockfield_world::{GeometryMode, StreamingConfig, TerrainConfig, WorldSeed};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Everything needed to build a [`crate::BlockWorld`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub terrain: TerrainConfig,
    pub streaming: StreamingConfig,
    pub player: PlayerConfig,
    /// Initial eye position.
    pub spawn: Vec3,
    /// Generate chunks on a background worker.
    pub async_streaming: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            terrain: TerrainConfig::default(),
            streaming: StreamingConfig::default(),
            player: PlayerConfig::default(),
            spawn: Vec3::new(25.0, 1.5, 25.0),
            async_streaming: false,
        }
    }
}

impl WorldConfig {
    /// Default world with the given seed.
    pub fn new(seed: WorldSeed) -> Self {
        Self::default().with_seed(seed)
    }

    pub fn with_seed(mut self, seed: WorldSeed) -> Self {
        self.terrain.seed = seed;
        self
    }

    pub fn with_render_distance(mut self, render_distance: i32) -> Self {
        self.streaming.render_distance = render_distance;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: u32) -> Self {
        self.streaming.chunk_size = chunk_size;
        self
    }

    pub fn with_geometry(mut self, geometry: GeometryMode) -> Self {
        self.streaming.geometry = geometry;
        self
    }

    pub fn with_collision(mut self, collision: CollisionPolicyKind) -> Self {
        self.player.collision = collision;
        self
    }

    pub fn with_spawn(mut self, spawn: Vec3) -> Self {
        self.spawn = spawn;
        self
    }

    pub fn with_async_streaming(mut self, enabled: bool) -> Self {
        self.async_streaming = enabled;
        self
    }

    /// Validate every section and the spawn point.
    pub fn validate(&self) -> Result<()> {
        self.terrain.validate()?;
        self.streaming.validate()?;
        self.player.validate()?;
        if !self.spawn.is_finite() {
            return Err(blockfield_core::Error::InvalidConfig(format!(
                "spawn must be finite, got {}",
                self.spawn
            )));
        }
        Ok(())
    }
}
