//! Logging setup and a headless frame loop.

use std::fmt;
use std::time::Instant;

use anyhow::Context;
use blockfield_input::{InputState, MovementKey};
use blockfield_player::RecordingCamera;
use blockfield_world::{RecordingScene, WorldSeed};
use glam::Vec3;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::WorldConfig;
use crate::world::BlockWorld;

/// Install the global `tracing` subscriber.
///
/// Honors `RUST_LOG`, defaulting to `info`. Calling it again is a no-op.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

/// Deterministic stand-in for a human at the keyboard.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedInput {
    /// Hold forward every frame.
    pub walk: bool,
    /// Horizontal pointer motion per frame, in pixels.
    pub turn_per_frame: f32,
    /// Press jump every N frames (0 = never).
    pub jump_every: u32,
    /// Remove the targeted block every N frames (0 = never).
    pub dig_every: u32,
}

impl Default for ScriptedInput {
    fn default() -> Self {
        Self {
            walk: true,
            turn_per_frame: 2.0,
            jump_every: 45,
            dig_every: 0,
        }
    }
}

impl ScriptedInput {
    /// Feed this frame's key and pointer events.
    pub fn drive(&self, frame: u32, input: &mut InputState) {
        if self.walk {
            input.press(MovementKey::Forward);
        } else {
            input.release(MovementKey::Forward);
        }

        if self.jump_every > 0 && frame % self.jump_every == 0 {
            input.press(MovementKey::Jump);
        } else {
            input.release(MovementKey::Jump);
        }

        input.add_pointer_motion(self.turn_per_frame, 0.0);
    }

    /// Whether to dig after this frame.
    pub const fn digs_on(&self, frame: u32) -> bool {
        self.dig_every > 0 && frame % self.dig_every == self.dig_every - 1
    }
}

/// Options for [`run_headless`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeadlessOptions {
    /// Frames to simulate.
    pub frames: u32,
    pub script: ScriptedInput,
    /// Start a new world with this seed after this many frames.
    pub new_world_at: Option<(u32, WorldSeed)>,
}

/// Totals from a headless run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub frames: u32,
    pub chunks_generated: usize,
    pub chunks_evicted: usize,
    pub blocks_removed: usize,
    pub grounded_frames: u32,
    pub final_position: Vec3,
    pub active_chunks: usize,
    pub live_handles: usize,
    pub elapsed_ms: f64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "frames:           {}", self.frames)?;
        writeln!(f, "chunks generated: {}", self.chunks_generated)?;
        writeln!(f, "chunks evicted:   {}", self.chunks_evicted)?;
        writeln!(f, "blocks removed:   {}", self.blocks_removed)?;
        writeln!(f, "grounded frames:  {}", self.grounded_frames)?;
        writeln!(
            f,
            "final position:   ({:.2}, {:.2}, {:.2})",
            self.final_position.x, self.final_position.y, self.final_position.z
        )?;
        writeln!(f, "active chunks:    {}", self.active_chunks)?;
        writeln!(f, "live handles:     {}", self.live_handles)?;
        write!(f, "elapsed:          {:.1} ms", self.elapsed_ms)
    }
}

/// Build a world and drive it with scripted input against a recording scene.
pub fn run_headless(
    config: WorldConfig,
    options: &HeadlessOptions,
) -> anyhow::Result<RunSummary> {
    let start = Instant::now();
    let mut scene = RecordingScene::new();
    let mut camera = RecordingCamera::new();
    let mut world = BlockWorld::new(config, &mut scene).context("Failed to create world")?;
    let mut input = InputState::new();

    let mut summary = RunSummary {
        chunks_generated: world.chunks().len(),
        ..Default::default()
    };

    for frame in 0..options.frames {
        options.script.drive(frame, &mut input);
        let snapshot = input.snapshot();
        let report = world
            .frame(&snapshot, &mut scene, &mut camera)
            .with_context(|| format!("Frame {frame} failed"))?;
        input.end_frame();

        summary.chunks_generated += report.stream.generated.len();
        summary.chunks_evicted += report.stream.evicted.len();
        if report.grounded {
            summary.grounded_frames += 1;
        }
        if !report.stream.is_empty() {
            debug!(
                "Frame {frame}: player in ({}, {}), +{} -{}",
                report.player_chunk.x,
                report.player_chunk.z,
                report.stream.generated.len(),
                report.stream.evicted.len()
            );
        }

        if options.script.digs_on(frame) {
            if let Some(block) = world.remove_targeted_block(&mut scene) {
                summary.blocks_removed += 1;
                debug!("Frame {frame}: dug {} at {:?}", block.id.name(), block.pos);
            }
        }

        if let Some((at, seed)) = options.new_world_at {
            if frame + 1 == at {
                let update = world.new_world(seed, &mut scene)?;
                summary.chunks_generated += update.generated.len();
            }
        }

        // Only live handles matter for the summary
        scene.clear_calls();
        summary.frames += 1;
    }

    summary.final_position = world.player().position();
    summary.active_chunks = world.chunks().len();
    summary.live_handles = scene.live_count();
    summary.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    info!(
        "Headless run finished: {} frames, {} active chunks in {:.1} ms",
        summary.frames, summary.active_chunks, summary.elapsed_ms
    );
    Ok(summary)
}
