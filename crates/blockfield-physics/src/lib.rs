//! Terrain collision and block picking for the blockfield runtime.

pub mod collision;
pub mod raycast;

pub use collision::{
    CollisionPolicy, CollisionPolicyKind, CollisionQuery, FieldClamp, Resolution, Stepping,
};
pub use raycast::{raycast_blocks, RaycastHit};
