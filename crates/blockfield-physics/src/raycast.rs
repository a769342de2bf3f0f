//! Voxel ray traversal for block picking.

use blockfield_core::math::Ray;
use blockfield_core::BlockPos;
use glam::Vec3;

/// Result of a raycast against blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Point where the ray enters the block.
    pub position: Vec3,
    /// Outward normal of the face that was hit; zero when the ray starts inside the block.
    pub normal: Vec3,
    /// Distance along the ray.
    pub distance: f32,
    /// The block that was hit.
    pub block: BlockPos,
}

/// Walk the voxels a ray passes through and return the first solid one.
///
/// Amanatides-Woo traversal: each step crosses exactly one cell boundary, so
/// no block on the ray is skipped regardless of the angle. Returns `None` if
/// nothing solid lies within `max_distance` or the ray is degenerate.
pub fn raycast_blocks(
    ray: &Ray,
    max_distance: f32,
    mut is_solid: impl FnMut(BlockPos) -> bool,
) -> Option<RaycastHit> {
    let origin = ray.origin;
    let dir = ray.direction;
    if !origin.is_finite() || !dir.is_finite() || dir == Vec3::ZERO || !max_distance.is_finite() {
        return None;
    }

    let start = BlockPos::containing(origin);
    if is_solid(start) {
        return Some(RaycastHit {
            position: origin,
            normal: Vec3::ZERO,
            distance: 0.0,
            block: start,
        });
    }

    let mut cell = [start.x, start.y, start.z];
    let origin = origin.to_array();
    let dir = dir.to_array();

    let mut step = [0i64; 3];
    let mut t_max = [f32::INFINITY; 3];
    let mut t_delta = [f32::INFINITY; 3];
    for axis in 0..3 {
        if dir[axis] > 0.0 {
            step[axis] = 1;
            t_delta[axis] = 1.0 / dir[axis];
            t_max[axis] = ((cell[axis] + 1) as f32 - origin[axis]) / dir[axis];
        } else if dir[axis] < 0.0 {
            step[axis] = -1;
            t_delta[axis] = -1.0 / dir[axis];
            t_max[axis] = (origin[axis] - cell[axis] as f32) / -dir[axis];
        }
    }

    loop {
        let axis = if t_max[0] < t_max[1] && t_max[0] < t_max[2] {
            0
        } else if t_max[1] < t_max[2] {
            1
        } else {
            2
        };

        let distance = t_max[axis];
        if distance > max_distance {
            return None;
        }
        cell[axis] += step[axis];
        t_max[axis] += t_delta[axis];

        let block = BlockPos::new(cell[0], cell[1], cell[2]);
        if is_solid(block) {
            let mut normal = Vec3::ZERO;
            normal[axis] = -step[axis] as f32;
            return Some(RaycastHit {
                position: ray.at(distance),
                normal,
                distance,
                block,
            });
        }
    }
}
