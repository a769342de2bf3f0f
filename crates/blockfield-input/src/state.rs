//! Mutable input state fed by the embedder.

use glam::Vec2;
use hashbrown::HashSet;
use tracing::trace;

use crate::key_state::KeyState;
use crate::keys::{MovementKey, MovementKeys};
use crate::snapshot::InputSnapshot;

/// Key and pointer state between frames.
#[derive(Debug, Default)]
pub struct InputState {
    /// One entry per [`MovementKey`], indexed by flag order.
    keys: [KeyState; 5],
    /// Pointer motion since the last `end_frame`.
    pointer_delta: Vec2,
    /// Codes the embedder reported that map to no movement key.
    unmapped: HashSet<String>,
}

impl InputState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Key-down event.
    pub fn press(&mut self, key: MovementKey) {
        self.keys[key.index()].key_down();
    }

    /// Key-up event.
    pub fn release(&mut self, key: MovementKey) {
        self.keys[key.index()].key_up();
    }

    /// Key-down by physical key code. Returns whether the code is bound.
    pub fn press_code(&mut self, code: &str) -> bool {
        match MovementKey::from_code(code) {
            Some(key) => {
                self.press(key);
                true
            }
            None => {
                if self.unmapped.insert(code.to_owned()) {
                    trace!("Ignoring unbound key code {code}");
                }
                false
            }
        }
    }

    /// Key-up by physical key code. Returns whether the code is bound.
    pub fn release_code(&mut self, code: &str) -> bool {
        MovementKey::from_code(code).is_some_and(|key| {
            self.release(key);
            true
        })
    }

    /// Accumulate relative pointer motion (only meaningful while the pointer is locked).
    pub fn add_pointer_motion(&mut self, dx: f32, dy: f32) {
        self.pointer_delta += Vec2::new(dx, dy);
    }

    /// Current state of one key.
    #[must_use]
    pub const fn key(&self, key: MovementKey) -> KeyState {
        self.keys[key.index()]
    }

    /// Pointer motion accumulated so far this frame.
    #[must_use]
    pub const fn pointer_delta(&self) -> Vec2 {
        self.pointer_delta
    }

    /// Freeze the current state for the simulation.
    #[must_use]
    pub fn snapshot(&self) -> InputSnapshot {
        let mut held = MovementKeys::empty();
        let mut just_pressed = MovementKeys::empty();
        for key in MovementKey::ALL {
            let state = self.keys[key.index()];
            if state.is_held() {
                held |= key.flag();
            }
            if state.went_down() {
                just_pressed |= key.flag();
            }
        }
        InputSnapshot {
            held,
            just_pressed,
            pointer_delta: self.pointer_delta,
        }
    }

    /// Settle key edges and drop consumed pointer motion.
    pub fn end_frame(&mut self) {
        for state in &mut self.keys {
            state.settle();
        }
        self.pointer_delta = Vec2::ZERO;
    }

    /// Release everything, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.keys = [KeyState::UP; 5];
        self.pointer_delta = Vec2::ZERO;
    }
}
