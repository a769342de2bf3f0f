//! Held flag plus a one-frame edge marker for a movement key.

/// Whether a key is down, and whether that changed during the current frame.
///
/// Edges live until [`KeyState::settle`] runs at the end of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyState {
    held: bool,
    changed: bool,
}

impl KeyState {
    pub const UP: Self = Self {
        held: false,
        changed: false,
    };

    #[inline]
    #[must_use]
    pub const fn is_held(self) -> bool {
        self.held
    }

    /// Went down since the last settle.
    #[inline]
    #[must_use]
    pub const fn went_down(self) -> bool {
        self.held && self.changed
    }

    /// Went up since the last settle.
    #[inline]
    #[must_use]
    pub const fn went_up(self) -> bool {
        !self.held && self.changed
    }

    /// Key-down event. Auto-repeat while held is not an edge.
    #[inline]
    pub fn key_down(&mut self) {
        if !self.held {
            self.held = true;
            self.changed = true;
        }
    }

    #[inline]
    pub fn key_up(&mut self) {
        if self.held {
            self.held = false;
            self.changed = true;
        }
    }

    /// Drop the edge once the frame has seen it.
    #[inline]
    pub fn settle(&mut self) {
        self.changed = false;
    }
}
