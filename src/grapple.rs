use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::{Aabb, Ray};
use crate::level::Platform;

/// Box used to pick which platform the grapple aims at.
pub const AIM_HALF_EXTENTS: Vec3 = Vec3::new(5.0, 50.0, 5.0);
/// Box the hook point is measured on once a platform is picked.
pub const HOOK_BOX_SIZE: Vec3 = Vec3::new(10.0, 150.0, 10.0);
/// The hook point stays within this distance of the platform's centre height.
pub const HOOK_HEIGHT_SLACK: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrappleTarget {
    pub platform: usize,
    pub point: Vec3,
}

/// Pseudo grappling hook: a velocity nudge towards a point on a platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grapple {
    target: Option<GrappleTarget>,
    velocity: Vec3,
    pulling: bool,
}

impl Grapple {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<GrappleTarget> {
        self.target
    }

    /// Per-frame pull computed by the last [`Grapple::pull`].
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn is_pulling(&self) -> bool {
        self.pulling
    }

    /// Aims along `ray`, skipping the platform the player stands on. A miss
    /// clears any previous target.
    pub fn fire(
        &mut self,
        ray: &Ray,
        platforms: &[Platform],
        current_ground: Option<usize>,
    ) -> Option<GrappleTarget> {
        self.target = platforms
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != current_ground)
            .find_map(|(index, platform)| {
                let center = platform.position();
                let aim = Aabb::around(center, -AIM_HALF_EXTENTS, AIM_HALF_EXTENTS);
                ray.cast(&aim)?;
                let hook = Aabb::from_center_size(center, HOOK_BOX_SIZE);
                let mut point = ray.cast(&hook)?.point;
                point.y = point
                    .y
                    .clamp(center.y - HOOK_HEIGHT_SLACK, center.y + HOOK_HEIGHT_SLACK);
                Some(GrappleTarget {
                    platform: index,
                    point,
                })
            });
        self.target
    }

    /// Recomputes the pull from `start` towards the target. Returns the new
    /// velocity; zero once there is nothing to pull towards.
    pub fn pull(&mut self, start: Vec3) -> Vec3 {
        let Some(target) = self.target else {
            self.release();
            return Vec3::ZERO;
        };
        let delta = target.point - start;
        self.velocity = Vec3::new(delta.x.atan(), delta.y.atan(), delta.z.atan());
        self.pulling = self.velocity != Vec3::ZERO;
        self.velocity
    }

    pub fn release(&mut self) {
        self.target = None;
        self.velocity = Vec3::ZERO;
        self.pulling = false;
    }
}
