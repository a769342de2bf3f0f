//! Input handling for the blockfield runtime.
//!
//! The embedder feeds raw key and pointer events into an [`InputState`]. Once
//! per frame, before the player runs, the frame loop takes an immutable
//! [`InputSnapshot`] and hands only that to the simulation.
//!
//! ```ignore
//! use blockfield_input::{InputState, MovementKey};
//!
//! let mut input = InputState::new();
//! input.press_code("KeyW");
//! input.add_pointer_motion(4.0, -2.0);
//!
//! let snapshot = input.snapshot();
//! // ... tick the player with `snapshot` ...
//! input.end_frame();
//! ```

mod key_state;
mod keys;
mod snapshot;
mod state;

pub use key_state::KeyState;
pub use keys::{MovementKey, MovementKeys};
pub use snapshot::InputSnapshot;
pub use state::InputState;
