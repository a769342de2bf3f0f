//! Player-versus-terrain collision policies.
//!
//! A policy takes the player's prior and candidate eye positions and decides
//! where the player actually ends up and whether it is standing on something.
//! Two policies ship:
//!
//! - [`FieldClamp`] treats the terrain as the continuous height field and
//!   never blocks horizontal motion.
//! - [`Stepping`] tests the player's footprint against the generated blocks,
//!   climbs low ledges and stops at walls.

use blockfield_core::math::Aabb;
use blockfield_world::{Chunk, HeightSource};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Slack when comparing block tops against the feet.
const SUPPORT_EPSILON: f32 = 1e-4;

/// Everything a policy may look at for one resolution.
#[derive(Clone, Copy)]
pub struct CollisionQuery<'a> {
    /// Eye position at the start of the tick.
    pub prior: Vec3,
    /// Eye position after applying velocity.
    pub candidate: Vec3,
    /// Distance from the feet up to the eye.
    pub eye_offset: f32,
    /// Highest ledge above the prior eye height that can be stepped onto.
    pub step_height: f32,
    /// Half the edge of the player's square footprint.
    pub half_width: f32,
    /// World floor plane the player cannot fall through.
    pub floor_y: f32,
    /// The height field chunks were generated from.
    pub terrain: &'a dyn HeightSource,
    /// Loaded chunks under the prior and candidate footprints, in coordinate order.
    pub chunks: &'a [&'a Chunk],
}

impl CollisionQuery<'_> {
    /// Feet height at the prior position.
    #[inline]
    pub fn prior_feet(&self) -> f32 {
        self.prior.y - self.eye_offset
    }

    /// Footprint box around an XZ position (vertical extent unused).
    #[inline]
    pub fn footprint(&self, x: f32, z: f32) -> Aabb {
        Aabb::column(x, z, self.half_width, 0.0, 0.0)
    }
}

impl std::fmt::Debug for CollisionQuery<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionQuery")
            .field("prior", &self.prior)
            .field("candidate", &self.candidate)
            .field("eye_offset", &self.eye_offset)
            .field("chunks", &self.chunks.len())
            .finish_non_exhaustive()
    }
}

/// Where the player ends up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Resolved eye position.
    pub position: Vec3,
    /// Whether the player is standing on terrain.
    pub grounded: bool,
}

impl Resolution {
    const fn airborne(position: Vec3) -> Self {
        Self {
            position,
            grounded: false,
        }
    }

    const fn landed(position: Vec3) -> Self {
        Self {
            position,
            grounded: true,
        }
    }
}

/// Strategy that turns a candidate position into a resolved one.
pub trait CollisionPolicy {
    fn resolve(&self, query: &CollisionQuery<'_>) -> Resolution;
}

/// Clamp the eye to the height field plus the eye offset.
///
/// Non-finite candidates are passed through untouched for the caller to reject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldClamp;

impl CollisionPolicy for FieldClamp {
    fn resolve(&self, query: &CollisionQuery<'_>) -> Resolution {
        let candidate = query.candidate;
        if !candidate.is_finite() {
            return Resolution::airborne(candidate);
        }
        let surface = query
            .terrain
            .height_at(f64::from(candidate.x), f64::from(candidate.z));
        let ground = surface as f32 + query.eye_offset;

        if candidate.y <= ground {
            Resolution::landed(Vec3::new(candidate.x, ground, candidate.z))
        } else {
            Resolution::airborne(candidate)
        }
    }
}

/// Block-level collision with step-up.
///
/// Blocks under the candidate footprint whose top is at or below the prior
/// feet are support. Of the rest, a block whose top is within `step_height`
/// of the prior eye height is a step (the highest one wins); any other block
/// is a wall and reverts the horizontal move. Vertical support is then taken
/// from the highest supporting block under the resolved footprint, or the
/// floor plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stepping;

impl Stepping {
    /// Highest block top under a footprint that is at or below `max_top`.
    fn support_under(query: &CollisionQuery<'_>, footprint: &Aabb, max_top: f32) -> f32 {
        query
            .chunks
            .iter()
            .flat_map(|chunk| chunk.blocks())
            .filter(|block| footprint.overlaps_xz(&Aabb::block(block.pos)))
            .map(|block| block.pos.top() as f32)
            .filter(|&top| top <= max_top + SUPPORT_EPSILON)
            .fold(query.floor_y, f32::max)
    }
}

impl CollisionPolicy for Stepping {
    fn resolve(&self, query: &CollisionQuery<'_>) -> Resolution {
        if query.chunks.is_empty() || !query.candidate.is_finite() {
            return FieldClamp.resolve(query);
        }

        let prior_feet = query.prior_feet();
        let step_limit = query.prior.y + query.step_height;
        let candidate = query.candidate;
        let footprint = query.footprint(candidate.x, candidate.z);

        let mut step_top: Option<f32> = None;
        let mut blocked = false;
        'scan: for chunk in query.chunks {
            for block in chunk.blocks() {
                if !footprint.overlaps_xz(&Aabb::block(block.pos)) {
                    continue;
                }
                let top = block.pos.top() as f32;
                if top <= prior_feet + SUPPORT_EPSILON {
                    continue;
                }
                if top <= step_limit {
                    step_top = Some(step_top.map_or(top, |t| t.max(top)));
                } else {
                    blocked = true;
                    break 'scan;
                }
            }
        }

        if blocked {
            let position = Vec3::new(query.prior.x, candidate.y, query.prior.z);
            let support = Self::support_under(
                query,
                &query.footprint(position.x, position.z),
                prior_feet,
            );
            return settle(position, support, query.eye_offset);
        }

        if let Some(top) = step_top {
            let stand = top + query.eye_offset;
            if candidate.y <= stand {
                return Resolution::landed(Vec3::new(candidate.x, stand, candidate.z));
            }
            return Resolution::airborne(candidate);
        }

        let support = Self::support_under(query, &footprint, prior_feet);
        settle(candidate, support, query.eye_offset)
    }
}

/// Snap the feet onto `support` if they reached it.
fn settle(position: Vec3, support: f32, eye_offset: f32) -> Resolution {
    if position.y - eye_offset <= support {
        Resolution::landed(Vec3::new(position.x, support + eye_offset, position.z))
    } else {
        Resolution::airborne(position)
    }
}

/// Selectable collision policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicyKind {
    #[default]
    FieldClamp,
    Stepping,
}

impl CollisionPolicyKind {
    /// The policy this kind names.
    pub fn policy(self) -> &'static dyn CollisionPolicy {
        match self {
            Self::FieldClamp => &FieldClamp,
            Self::Stepping => &Stepping,
        }
    }
}

impl CollisionPolicy for CollisionPolicyKind {
    fn resolve(&self, query: &CollisionQuery<'_>) -> Resolution {
        self.policy().resolve(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use blockfield_core::ChunkCoord;

    /// Height field with a constant surface.
    struct Flat(i32);

    impl HeightSource for Flat {
        fn height_at(&self, _world_x: f64, _world_z: f64) -> i32 {
            self.0
        }
    }

    fn query<'a>(
        prior: Vec3,
        candidate: Vec3,
        terrain: &'a dyn HeightSource,
        chunks: &'a [&'a Chunk],
    ) -> CollisionQuery<'a> {
        CollisionQuery {
            prior,
            candidate,
            eye_offset: 1.5,
            step_height: 1.0,
            half_width: 0.3,
            floor_y: 0.0,
            terrain,
            chunks,
        }
    }

    /// 4x4 chunk at the origin: empty except for the column row at `x == 1`,
    /// whose top surface is at `top`.
    fn ledge(top: i32) -> Chunk {
        let heights = (0..16)
            .map(|i| if i % 4 == 1 { top } else { 0 })
            .collect();
        Chunk::from_heights(ChunkCoord::new(0, 0), 4, heights)
    }

    #[test]
    fn field_clamp_lands_on_surface() {
        let terrain = Flat(3);
        let q = query(
            Vec3::new(0.0, 4.6, 0.0),
            Vec3::new(0.0, 4.4, 0.0),
            &terrain,
            &[],
        );
        let res = FieldClamp.resolve(&q);
        assert!(res.grounded);
        assert_relative_eq!(res.position.y, 4.5);
    }

    #[test]
    fn field_clamp_leaves_airborne_player_alone() {
        let terrain = Flat(3);
        let candidate = Vec3::new(2.0, 9.99, -1.0);
        let res = FieldClamp.resolve(&query(Vec3::new(2.0, 10.0, -1.0), candidate, &terrain, &[]));
        assert!(!res.grounded);
        assert_eq!(res.position, candidate);
    }

    #[test]
    fn field_clamp_never_blocks_horizontally() {
        let terrain = Flat(40);
        let candidate = Vec3::new(7.0, 1.5, 3.0);
        let res = FieldClamp.resolve(&query(Vec3::new(6.9, 1.5, 3.0), candidate, &terrain, &[]));
        assert_relative_eq!(res.position.x, 7.0);
        assert_relative_eq!(res.position.y, 41.5);
    }

    #[test]
    fn stepping_climbs_low_ledge() {
        let chunk = ledge(2);
        let chunks = [&chunk];
        let terrain = Flat(0);
        let q = query(
            Vec3::new(0.5, 1.5, 0.5),
            Vec3::new(1.5, 1.5, 0.5),
            &terrain,
            &chunks,
        );
        let res = Stepping.resolve(&q);
        assert!(res.grounded);
        assert_relative_eq!(res.position.x, 1.5);
        assert_relative_eq!(res.position.z, 0.5);
        assert_relative_eq!(res.position.y, 3.5);
    }

    #[test]
    fn stepping_stops_at_wall() {
        let chunk = ledge(5);
        let chunks = [&chunk];
        let terrain = Flat(0);
        let q = query(
            Vec3::new(0.5, 1.5, 0.5),
            Vec3::new(1.5, 1.5, 0.6),
            &terrain,
            &chunks,
        );
        let res = Stepping.resolve(&q);
        assert_relative_eq!(res.position.x, 0.5);
        assert_relative_eq!(res.position.z, 0.5);
        assert_relative_eq!(res.position.y, 1.5);
        assert!(res.grounded);
    }

    #[test]
    fn stepping_stands_on_blocks_below() {
        let chunk = Chunk::from_heights(ChunkCoord::new(0, 0), 4, vec![3; 16]);
        let chunks = [&chunk];
        let terrain = Flat(0);
        let q = query(
            Vec3::new(1.5, 4.5, 1.5),
            Vec3::new(1.6, 4.49, 1.5),
            &terrain,
            &chunks,
        );
        let res = Stepping.resolve(&q);
        assert!(res.grounded);
        assert_relative_eq!(res.position.y, 4.5);
        assert_relative_eq!(res.position.x, 1.6);
    }

    #[test]
    fn stepping_falls_off_ledge() {
        let chunk = ledge(2);
        let chunks = [&chunk];
        let terrain = Flat(0);
        // Standing on top of the ledge, walking off towards x = 2.5
        let q = query(
            Vec3::new(1.5, 3.5, 0.5),
            Vec3::new(2.5, 3.5, 0.5),
            &terrain,
            &chunks,
        );
        let res = Stepping.resolve(&q);
        assert!(!res.grounded);
        assert_relative_eq!(res.position.x, 2.5);
        assert_relative_eq!(res.position.y, 3.5);
    }

    #[test]
    fn stepping_floor_plane_catches_player() {
        let chunk = Chunk::from_heights(ChunkCoord::new(0, 0), 4, vec![0; 16]);
        let chunks = [&chunk];
        let terrain = Flat(3);
        let q = query(
            Vec3::new(2.0, 1.55, 2.0),
            Vec3::new(2.0, 1.2, 2.0),
            &terrain,
            &chunks,
        );
        let res = Stepping.resolve(&q);
        assert!(res.grounded);
        assert_relative_eq!(res.position.y, 1.5);
    }

    #[test]
    fn both_policies_rest_on_the_same_surface() {
        let chunk = Chunk::from_heights(ChunkCoord::new(0, 0), 4, vec![2; 16]);
        let chunks = [&chunk];
        let terrain = Flat(2);
        let q = query(
            Vec3::new(1.5, 3.6, 1.5),
            Vec3::new(1.5, 3.4, 1.5),
            &terrain,
            &chunks,
        );

        let clamped = FieldClamp.resolve(&q);
        let stepped = Stepping.resolve(&q);
        assert!(clamped.grounded && stepped.grounded);
        assert_relative_eq!(clamped.position.y, 3.5);
        assert_eq!(clamped, stepped);
    }

    #[test]
    fn stepping_without_chunks_uses_field() {
        let terrain = Flat(3);
        let q = query(
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(0.0, 4.0, 0.0),
            &terrain,
            &[],
        );
        assert_eq!(Stepping.resolve(&q), FieldClamp.resolve(&q));
    }

    #[test]
    fn non_finite_candidate_passes_through() {
        let terrain = Flat(3);
        let candidate = Vec3::new(f32::NAN, 5.0, 0.0);
        let q = query(Vec3::new(0.0, 5.0, 0.0), candidate, &terrain, &[]);
        let res = FieldClamp.resolve(&q);
        assert!(!res.grounded);
        assert!(res.position.x.is_nan());
        assert!(!Stepping.resolve(&q).grounded);
    }

    #[test]
    fn kind_dispatches_to_policy() {
        let chunk = ledge(5);
        let chunks = [&chunk];
        let terrain = Flat(0);
        let q = query(
            Vec3::new(0.5, 1.5, 0.5),
            Vec3::new(1.5, 1.5, 0.5),
            &terrain,
            &chunks,
        );
        assert_eq!(CollisionPolicyKind::Stepping.resolve(&q), Stepping.resolve(&q));
        assert_eq!(CollisionPolicyKind::FieldClamp.resolve(&q), FieldClamp.resolve(&q));
        assert_eq!(CollisionPolicyKind::default(), CollisionPolicyKind::FieldClamp);
    }
}
