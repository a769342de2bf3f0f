//! Walking first-person player.

use std::f32::consts::FRAC_PI_2;

use blockfield_core::math::{Aabb, Ray};
use blockfield_core::{Error, Result};
use blockfield_input::{InputSnapshot, MovementKey};
use blockfield_physics::{CollisionPolicy, CollisionPolicyKind, CollisionQuery, Resolution};
use blockfield_world::{ActiveChunkSet, HeightSource};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::camera::CameraView;

/// Per-tick movement constants.
///
/// Speeds and accelerations are in blocks per tick; there is no frame-time
/// scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Horizontal speed per held direction key.
    pub move_speed: f32,
    /// Upward velocity at takeoff.
    pub jump_force: f32,
    /// Downward acceleration while airborne.
    pub gravity: f32,
    /// Distance from the feet to the eye.
    pub eye_offset: f32,
    /// Radians of rotation per pixel of pointer motion.
    pub look_sensitivity: f32,
    /// Ledge height above the eye the stepping policy still climbs.
    pub step_height: f32,
    /// Half the edge of the player's square footprint.
    pub half_width: f32,
    /// Maximum block picking distance.
    pub reach: f32,
    /// World floor plane for the stepping policy.
    pub floor_y: f32,
    /// Terrain collision strategy.
    pub collision: CollisionPolicyKind,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 0.1,
            jump_force: 0.2,
            gravity: 0.01,
            eye_offset: blockfield_core::constants::DEFAULT_EYE_OFFSET,
            look_sensitivity: 0.002,
            step_height: 1.0,
            half_width: 0.3,
            reach: 5.0,
            floor_y: 0.0,
            collision: CollisionPolicyKind::FieldClamp,
        }
    }
}

impl PlayerConfig {
    /// Check that every constant is finite and has a usable sign.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("move_speed", self.move_speed),
            ("jump_force", self.jump_force),
            ("gravity", self.gravity),
            ("eye_offset", self.eye_offset),
            ("look_sensitivity", self.look_sensitivity),
            ("step_height", self.step_height),
            ("half_width", self.half_width),
            ("reach", self.reach),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if !self.floor_y.is_finite() {
            return Err(Error::InvalidConfig("floor_y must be finite".into()));
        }
        Ok(())
    }
}

/// Mutable player pose and motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    /// Eye position.
    pub position: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    /// Blocks per tick.
    pub velocity: Vec3,
    pub grounded: bool,
}

impl PlayerState {
    /// Airborne and motionless at a position.
    pub const fn at(position: Vec3) -> Self {
        Self {
            position,
            pitch: 0.0,
            yaw: 0.0,
            velocity: Vec3::ZERO,
            grounded: false,
        }
    }
}

/// Whether the player stands on terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Airborne,
    Grounded,
}

/// Applies input, gravity and collision to a [`PlayerState`] once per tick.
#[derive(Debug, Clone)]
pub struct PlayerController {
    config: PlayerConfig,
    state: PlayerState,
}

impl PlayerController {
    /// Spawn at an eye position, airborne.
    pub const fn new(config: PlayerConfig, spawn: Vec3) -> Self {
        Self {
            config,
            state: PlayerState::at(spawn),
        }
    }

    pub const fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub const fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Eye position.
    pub const fn position(&self) -> Vec3 {
        self.state.position
    }

    pub const fn motion_state(&self) -> MotionState {
        if self.state.grounded {
            MotionState::Grounded
        } else {
            MotionState::Airborne
        }
    }

    /// Switch the collision policy at runtime.
    pub fn set_collision(&mut self, collision: CollisionPolicyKind) {
        self.config.collision = collision;
    }

    /// Move to a position, keeping the view, dropping all velocity.
    pub fn teleport(&mut self, position: Vec3) {
        self.state = PlayerState {
            position,
            velocity: Vec3::ZERO,
            grounded: false,
            ..self.state
        };
    }

    /// Camera pose for the current state.
    pub const fn camera_view(&self) -> CameraView {
        CameraView {
            position: self.state.position,
            pitch: self.state.pitch,
            yaw: self.state.yaw,
        }
    }

    /// Ray from the eye along the view direction.
    pub fn eye_ray(&self) -> Ray {
        Ray::new(self.state.position, self.camera_view().look_direction())
    }

    /// Rotate the view by pointer motion.
    ///
    /// Moving the pointer right turns left-handed about +Y (yaw decreases),
    /// moving it down looks down. Pitch stops at straight up and down.
    /// Non-finite deltas are ignored.
    pub fn apply_look(&mut self, pointer_delta: Vec2) {
        if !pointer_delta.is_finite() {
            trace!("Ignoring non-finite pointer delta {pointer_delta}");
            return;
        }
        let sensitivity = self.config.look_sensitivity;
        self.state.yaw -= pointer_delta.x * sensitivity;
        self.state.pitch = (self.state.pitch - pointer_delta.y * sensitivity)
            .clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Sum of unit directions for the held movement keys.
    ///
    /// Not normalized: diagonals are faster, opposite keys cancel.
    pub fn movement_intent(&self, input: &InputSnapshot) -> Vec3 {
        let view = self.camera_view();
        let forward = view.forward();
        let right = view.right();

        let mut intent = Vec3::ZERO;
        if input.is_held(MovementKey::Forward) {
            intent += forward;
        }
        if input.is_held(MovementKey::Backward) {
            intent -= forward;
        }
        if input.is_held(MovementKey::Left) {
            intent -= right;
        }
        if input.is_held(MovementKey::Right) {
            intent += right;
        }
        intent
    }

    /// Advance one tick.
    ///
    /// Looks, sets horizontal velocity from the held keys, jumps or falls,
    /// then lets the configured collision policy place the player. A tick
    /// that would leave the player at a non-finite position is discarded.
    pub fn tick(
        &mut self,
        input: &InputSnapshot,
        terrain: &dyn HeightSource,
        chunks: &ActiveChunkSet,
        chunk_size: u32,
    ) -> Resolution {
        let before = self.state;
        self.apply_look(input.pointer_delta);

        let horizontal = self.movement_intent(input) * self.config.move_speed;
        self.state.velocity.x = horizontal.x;
        self.state.velocity.z = horizontal.z;

        if input.is_held(MovementKey::Jump) && self.state.grounded {
            self.state.velocity.y = self.config.jump_force;
            self.state.grounded = false;
            trace!("Jump at y={:.3}", self.state.position.y);
        } else if !self.state.grounded {
            self.state.velocity.y -= self.config.gravity;
        }

        let prior = self.state.position;
        let candidate = prior + self.state.velocity;

        let hw = self.config.half_width;
        let swept = Aabb::new(
            prior.min(candidate) - Vec3::new(hw, 0.0, hw),
            prior.max(candidate) + Vec3::new(hw, 0.0, hw),
        );
        let covering = chunks.chunks_under(&swept, chunk_size);

        let query = CollisionQuery {
            prior,
            candidate,
            eye_offset: self.config.eye_offset,
            step_height: self.config.step_height,
            half_width: hw,
            floor_y: self.config.floor_y,
            terrain,
            chunks: &covering,
        };
        let resolution = self.config.collision.resolve(&query);

        if !resolution.position.is_finite() {
            warn!("Discarding tick that resolved to {}", resolution.position);
            self.state = before;
            return Resolution {
                position: before.position,
                grounded: before.grounded,
            };
        }

        if resolution.grounded {
            if !self.state.grounded {
                trace!("Landed at y={:.3}", resolution.position.y);
            }
            self.state.velocity.y = 0.0;
        }
        self.state.position = resolution.position;
        self.state.grounded = resolution.grounded;
        resolution
    }
}
