//! Procedural height field.

use blockfield_core::{BlockId, Error, Result};
use noise::{Fbm, MultiFractal, NoiseFn, Simplex};
use serde::{Deserialize, Serialize};

use crate::WorldSeed;

/// Anything that can answer "how high is the ground here".
///
/// Collision code only ever sees this trait, so chunk generation and player
/// collision share one field instance instead of duplicated constants.
pub trait HeightSource {
    /// Column height at a world XZ position.
    fn height_at(&self, world_x: f64, world_z: f64) -> i32;
}

/// Terrain field configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Seed for noise generation.
    pub seed: WorldSeed,
    /// Multiplier applied to world coordinates before sampling noise.
    pub noise_scale: f64,
    /// Height of a column where the noise reaches 1.0.
    pub max_column_height: i32,
    /// Number of noise octaves (1 is plain simplex noise).
    pub octaves: usize,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Number of dirt layers under the grass.
    pub dirt_depth: u32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            noise_scale: 0.1,
            max_column_height: 5,
            octaves: 1,
            lacunarity: 2.0,
            persistence: 0.5,
            dirt_depth: 1,
        }
    }
}

impl TerrainConfig {
    /// Check that the field can be built from this configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.noise_scale.is_finite() || self.noise_scale <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "noise_scale must be finite and positive, got {}",
                self.noise_scale
            )));
        }
        if self.max_column_height < 0 {
            return Err(Error::InvalidConfig(format!(
                "max_column_height must not be negative, got {}",
                self.max_column_height
            )));
        }
        if self.octaves == 0 {
            return Err(Error::InvalidConfig("octaves must be at least 1".into()));
        }
        Ok(())
    }
}

/// Deterministic height field driven by seeded coherent noise.
pub struct TerrainField {
    config: TerrainConfig,
    height_noise: Fbm<Simplex>,
}

impl TerrainField {
    /// Create a new terrain field with the given configuration.
    pub fn new(config: TerrainConfig) -> Self {
        let height_noise = Fbm::<Simplex>::new(config.seed as u32)
            .set_octaves(config.octaves)
            .set_lacunarity(config.lacunarity)
            .set_persistence(config.persistence);

        Self {
            config,
            height_noise,
        }
    }

    /// Create a terrain field with default configuration.
    pub fn with_seed(seed: WorldSeed) -> Self {
        Self::new(TerrainConfig {
            seed,
            ..Default::default()
        })
    }

    /// Same parameters, different seed.
    pub fn reseeded(&self, seed: WorldSeed) -> Self {
        Self::new(TerrainConfig {
            seed,
            ..self.config.clone()
        })
    }

    /// Get the terrain configuration.
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Seeded coherent noise in `[-1, 1]`, sampled at already-scaled coordinates.
    pub fn noise_2d(&self, x: f64, z: f64) -> f64 {
        self.height_noise.get([x, z]).clamp(-1.0, 1.0)
    }

    /// Column height at a world XZ position.
    ///
    /// `floor(noise(x * scale, z * scale) * max_column_height)`; may be
    /// negative, in which case the column holds no blocks.
    pub fn height_at(&self, world_x: f64, world_z: f64) -> i32 {
        let n = self.noise_2d(
            world_x * self.config.noise_scale,
            world_z * self.config.noise_scale,
        );
        (n * f64::from(self.config.max_column_height)).floor() as i32
    }

    /// Height of an integer world column; what chunk generation samples.
    pub fn column_height(&self, world_x: i64, world_z: i64) -> i32 {
        self.height_at(world_x as f64, world_z as f64)
    }

    /// Determine block type at a given world Y relative to surface height.
    pub fn block_at_depth(&self, world_y: i64, surface_height: i32) -> BlockId {
        let surface = i64::from(surface_height);
        if world_y >= surface {
            BlockId::AIR
        } else if world_y == surface - 1 {
            BlockId::GRASS
        } else if world_y >= surface - 1 - i64::from(self.config.dirt_depth) {
            BlockId::DIRT
        } else {
            BlockId::STONE
        }
    }
}

impl HeightSource for TerrainField {
    fn height_at(&self, world_x: f64, world_z: f64) -> i32 {
        Self::height_at(self, world_x, world_z)
    }
}

impl std::fmt::Debug for TerrainField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerrainField")
            .field("config", &self.config)
            .field("height_noise", &"<Fbm<Simplex>>")
            .finish()
    }
}
