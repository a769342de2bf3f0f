//! World root and frame driver for the blockfield runtime.
//!
//! [`BlockWorld`] owns everything that lives for the duration of a world:
//! the streamer (which owns the terrain field), the player, and the entity
//! registry. The embedder calls [`BlockWorld::frame`] once per frame with an
//! input snapshot, a scene and a camera.
//!
//! ```no_run
//! use blockfield_app::{run_headless, HeadlessOptions, WorldConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     blockfield_app::init_logging();
//!     let summary = run_headless(WorldConfig::new(42), &HeadlessOptions::default())?;
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```

mod config;
mod runner;
mod world;

pub use config::WorldConfig;
pub use runner::{init_logging, run_headless, HeadlessOptions, RunSummary, ScriptedInput};
pub use world::{BlockWorld, FrameReport};

// Re-export the types embedders need to drive a world
pub use blockfield_input::{InputSnapshot, InputState, MovementKey, MovementKeys};
pub use blockfield_physics::CollisionPolicyKind;
pub use blockfield_player::{CameraSink, CameraView, NullCamera, RecordingCamera};
pub use blockfield_world::{
    GeometryMode, NullScene, RecordingScene, SceneCollaborator, SceneEntity, SceneHandle,
};
