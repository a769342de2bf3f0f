//! The keys the player controller reacts to.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A movement intent bound to one physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementKey {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
}

impl MovementKey {
    /// Every key, in flag order.
    pub const ALL: [Self; 5] = [
        Self::Forward,
        Self::Backward,
        Self::Left,
        Self::Right,
        Self::Jump,
    ];

    /// Map a DOM-style physical key code (`"KeyW"`, `"Space"`, ...).
    ///
    /// Arrow keys alias the WASD cluster.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" | "ArrowUp" => Some(Self::Forward),
            "KeyS" | "ArrowDown" => Some(Self::Backward),
            "KeyA" | "ArrowLeft" => Some(Self::Left),
            "KeyD" | "ArrowRight" => Some(Self::Right),
            "Space" => Some(Self::Jump),
            _ => None,
        }
    }

    /// Single-bit flag for this key.
    #[inline]
    #[must_use]
    pub const fn flag(self) -> MovementKeys {
        match self {
            Self::Forward => MovementKeys::FORWARD,
            Self::Backward => MovementKeys::BACKWARD,
            Self::Left => MovementKeys::LEFT,
            Self::Right => MovementKeys::RIGHT,
            Self::Jump => MovementKeys::JUMP,
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

bitflags! {
    /// Set of movement keys.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MovementKeys: u8 {
        const FORWARD  = 0b0000_0001;
        const BACKWARD = 0b0000_0010;
        const LEFT     = 0b0000_0100;
        const RIGHT    = 0b0000_1000;
        const JUMP     = 0b0001_0000;
    }
}

impl MovementKeys {
    /// Whether the given key is in the set.
    #[inline]
    #[must_use]
    pub const fn has(self, key: MovementKey) -> bool {
        self.contains(key.flag())
    }
}

impl From<MovementKey> for MovementKeys {
    fn from(key: MovementKey) -> Self {
        key.flag()
    }
}

impl FromIterator<MovementKey> for MovementKeys {
    fn from_iter<I: IntoIterator<Item = MovementKey>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |keys, key| keys | key.flag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_keys() {
        assert_eq!(MovementKey::from_code("KeyW"), Some(MovementKey::Forward));
        assert_eq!(MovementKey::from_code("ArrowLeft"), Some(MovementKey::Left));
        assert_eq!(MovementKey::from_code("Space"), Some(MovementKey::Jump));
        assert_eq!(MovementKey::from_code("KeyQ"), None);
    }

    #[test]
    fn flags_are_distinct() {
        let all: MovementKeys = MovementKey::ALL.into_iter().collect();
        assert_eq!(all, MovementKeys::all());
        for (i, key) in MovementKey::ALL.into_iter().enumerate() {
            assert_eq!(key.index(), i);
            assert!(all.has(key));
        }
        let keys = MovementKeys::FORWARD | MovementKeys::JUMP;
        assert!(keys.has(MovementKey::Jump));
        assert!(!keys.has(MovementKey::Left));
    }
}
