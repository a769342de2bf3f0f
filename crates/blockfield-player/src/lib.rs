//! First-person player controller for the blockfield runtime.

pub mod camera;
pub mod controller;

pub use camera::{CameraSink, CameraView, NullCamera, RecordingCamera};
pub use controller::{MotionState, PlayerConfig, PlayerController, PlayerState};
