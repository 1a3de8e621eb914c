//! Planar rigid bodies for the player and the platform underneath it.
//!
//! The simulation runs in the (lateral, height) plane: `x` is a sideways
//! offset that only matters while a platform wobbles, `y` is world height
//! with up positive.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// How far below the surface the previous bottom may sit and still land.
const LANDING_TOLERANCE: f32 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub force: Vec2,
    pub inverse_mass: f32,
    pub half_extents: Vec2,
    pub enabled: bool,
    pub use_gravity: bool,
    pub freeze_orient: bool,
    pub orient: f32,
    pub is_grounded: bool,
}

impl Body {
    /// Rectangle body whose mass is `density * width * height`.
    pub fn rectangle(center: Vec2, width: f32, height: f32, density: f32) -> Self {
        let mass = density * width * height;
        Self {
            position: center,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            inverse_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
            half_extents: Vec2::new(width, height) * 0.5,
            enabled: true,
            use_gravity: true,
            freeze_orient: false,
            orient: 0.0,
            is_grounded: false,
        }
    }

    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    pub fn apply_impulse(&mut self, delta_velocity: Vec2) {
        self.velocity += delta_velocity;
    }

    /// Back to the spawn point at rest.
    pub fn reset(&mut self) {
        self.position = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
        self.force = Vec2::ZERO;
        self.is_grounded = false;
    }

    pub fn bottom(&self) -> f32 {
        self.position.y - self.half_extents.y
    }
}

/// Player body resting on at most one ground body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsWorld {
    pub gravity: Vec2,
    pub player: Body,
    pub ground: Body,
    ground_surface: Option<f32>,
}

impl PhysicsWorld {
    pub fn new(gravity: f32) -> Self {
        let mut ground = Body::rectangle(Vec2::ZERO, 10.0, 1.0, 10.0);
        ground.enabled = false;
        ground.use_gravity = false;
        ground.freeze_orient = true;
        Self {
            gravity: Vec2::new(0.0, -gravity),
            player: Body::rectangle(Vec2::ZERO, 1.0, 2.0, 0.5),
            ground,
            ground_surface: None,
        }
    }

    /// Moves the ground body so its top face sits at `surface`; `None` means
    /// nothing is underneath the player.
    pub fn set_ground_surface(&mut self, surface: Option<f32>) {
        self.ground_surface = surface;
        if let Some(surface) = surface {
            self.ground.position.y = surface - self.ground.half_extents.y;
        }
    }

    pub fn step(&mut self, dt: f32) {
        if !self.player.enabled || dt <= 0.0 {
            return;
        }
        let previous_bottom = self.player.bottom();

        let mut acceleration = self.player.force * self.player.inverse_mass;
        if self.player.use_gravity {
            acceleration += self.gravity;
        }
        if self.ground.enabled && !self.ground.freeze_orient && self.player.is_grounded {
            // A tilted board pushes the player downhill.
            acceleration.x -= self.ground.orient.sin() * self.gravity.y.abs();
        }
        self.player.velocity += acceleration * dt;
        self.player.position += self.player.velocity * dt;
        self.player.force = Vec2::ZERO;

        self.player.is_grounded = false;
        let Some(surface) = self.ground_surface else {
            return;
        };
        let falling = self.player.velocity.y <= 0.0;
        let was_above = previous_bottom >= surface - LANDING_TOLERANCE;
        if falling && was_above && self.player.bottom() <= surface {
            self.player.position.y = surface + self.player.half_extents.y;
            self.player.velocity.y = 0.0;
            self.player.is_grounded = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn settle(world: &mut PhysicsWorld, frames: usize) {
        for _ in 0..frames {
            world.step(DT);
        }
    }

    #[test]
    fn player_lands_on_surface() {
        let mut world = PhysicsWorld::new(20.0);
        world.set_ground_surface(Some(-1.5));
        settle(&mut world, 60);
        assert!(world.player.is_grounded);
        assert!((world.player.bottom() + 1.5).abs() < 1e-5);
        assert_eq!(world.player.velocity.y, 0.0);
    }

    #[test]
    fn player_falls_without_ground() {
        let mut world = PhysicsWorld::new(20.0);
        world.set_ground_surface(None);
        settle(&mut world, 60);
        assert!(!world.player.is_grounded);
        assert!(world.player.position.y < -5.0);
    }

    #[test]
    fn surface_above_the_player_does_not_catch_it() {
        let mut world = PhysicsWorld::new(20.0);
        world.set_ground_surface(Some(5.0));
        settle(&mut world, 10);
        assert!(!world.player.is_grounded);
        assert!(world.player.position.y < 0.0);
    }

    #[test]
    fn jump_leaves_the_ground() {
        let mut world = PhysicsWorld::new(20.0);
        world.set_ground_surface(Some(-1.5));
        settle(&mut world, 30);
        world.player.apply_impulse(Vec2::new(0.0, 10.0));
        world.step(DT);
        assert!(!world.player.is_grounded);
        assert!(world.player.velocity.y > 0.0);
    }

    #[test]
    fn upward_force_counters_gravity() {
        let mut world = PhysicsWorld::new(20.0);
        world.player.add_force(Vec2::new(0.0, 40.0));
        world.step(DT);
        assert!(world.player.velocity.y > 0.0);
        assert_eq!(world.player.force, Vec2::ZERO);
    }

    #[test]
    fn tilted_ground_pushes_grounded_player_sideways() {
        let mut world = PhysicsWorld::new(20.0);
        world.set_ground_surface(Some(-1.5));
        settle(&mut world, 30);
        world.ground.enabled = true;
        world.ground.freeze_orient = false;
        world.ground.orient = -0.2;
        world.step(DT);
        assert!(world.player.velocity.x > 0.0);
    }

    #[test]
    fn ground_body_tracks_surface() {
        let mut world = PhysicsWorld::new(20.0);
        world.set_ground_surface(Some(-1.5));
        assert_eq!(world.ground.position.y, -2.0);
        world.set_ground_surface(None);
        assert_eq!(world.ground.position.y, -2.0);
    }
}
