//! Boundary to the camera collaborator.

use glam::Vec3;

/// Pose the camera should take this frame. Roll is always zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// Eye position.
    pub position: Vec3,
    /// Rotation about the local X axis, in `[-PI/2, PI/2]`.
    pub pitch: f32,
    /// Rotation about the world Y axis. Unbounded.
    pub yaw: f32,
}

impl CameraView {
    /// Horizontal forward direction (yaw only; looking up never changes it).
    #[inline]
    pub fn forward(&self) -> Vec3 {
        let (sin, cos) = self.yaw.sin_cos();
        Vec3::new(-sin, 0.0, -cos)
    }

    /// Horizontal right direction.
    #[inline]
    pub fn right(&self) -> Vec3 {
        let (sin, cos) = self.yaw.sin_cos();
        Vec3::new(cos, 0.0, -sin)
    }

    /// Full view direction including pitch.
    #[inline]
    pub fn look_direction(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let flat = self.forward();
        Vec3::new(flat.x * cos_pitch, sin_pitch, flat.z * cos_pitch)
    }
}

/// Receives the player's view once per tick.
pub trait CameraSink {
    fn apply_view(&mut self, view: &CameraView);
}

/// Camera that ignores every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCamera;

impl CameraSink for NullCamera {
    fn apply_view(&mut self, _view: &CameraView) {}
}

/// Camera that keeps every view it was given.
#[derive(Debug, Default, Clone)]
pub struct RecordingCamera {
    views: Vec<CameraView>,
}

impl RecordingCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views(&self) -> &[CameraView] {
        &self.views
    }

    /// Most recent view, if any.
    pub fn last(&self) -> Option<&CameraView> {
        self.views.last()
    }
}

impl CameraSink for RecordingCamera {
    fn apply_view(&mut self, view: &CameraView) {
        self.views.push(*view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn view(yaw: f32, pitch: f32) -> CameraView {
        CameraView {
            position: Vec3::ZERO,
            pitch,
            yaw,
        }
    }

    #[test]
    fn zero_yaw_looks_down_negative_z() {
        let v = view(0.0, 0.0);
        assert_relative_eq!(v.forward().z, -1.0);
        assert_relative_eq!(v.right().x, 1.0);
    }

    #[test]
    fn quarter_turn_left() {
        let v = view(FRAC_PI_2, 0.0);
        assert_relative_eq!(v.forward().x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(v.forward().z, 0.0, epsilon = 1e-6);
        assert_relative_eq!(v.right().z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn basis_ignores_pitch() {
        let level = view(0.7, 0.0);
        let up = view(0.7, 1.2);
        assert_eq!(level.forward(), up.forward());
        assert_eq!(level.right(), up.right());
        assert_relative_eq!(up.forward().y, 0.0);
        assert!(up.look_direction().y > 0.9);
        assert_relative_eq!(up.look_direction().length(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn recording_camera_keeps_views() {
        let mut camera = RecordingCamera::new();
        camera.apply_view(&view(0.0, 0.0));
        camera.apply_view(&view(1.0, 0.5));
        assert_eq!(camera.views().len(), 2);
        assert_eq!(camera.last().map(|v| v.yaw), Some(1.0));
    }
}
