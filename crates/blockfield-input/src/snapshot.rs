//! Immutable per-frame view of the input.

use glam::Vec2;

use crate::keys::{MovementKey, MovementKeys};

/// What the player sees of the input for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    /// Keys down this frame.
    pub held: MovementKeys,
    /// Keys that went down this frame.
    pub just_pressed: MovementKeys,
    /// Pointer motion accumulated since the last frame, in pixels.
    pub pointer_delta: Vec2,
}

impl InputSnapshot {
    /// No keys, no motion.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// Snapshot with the given keys held (and just pressed) and no motion.
    #[must_use]
    pub fn holding(keys: impl Into<MovementKeys>) -> Self {
        let keys = keys.into();
        Self {
            held: keys,
            just_pressed: keys,
            pointer_delta: Vec2::ZERO,
        }
    }

    /// Replace the pointer motion.
    #[must_use]
    pub fn with_pointer_delta(mut self, delta: Vec2) -> Self {
        self.pointer_delta = delta;
        self
    }

    #[inline]
    #[must_use]
    pub const fn is_held(&self, key: MovementKey) -> bool {
        self.held.has(key)
    }

    #[inline]
    #[must_use]
    pub const fn is_just_pressed(&self, key: MovementKey) -> bool {
        self.just_pressed.has(key)
    }
}
