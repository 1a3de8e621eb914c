use glam::{Vec2, Vec3};
use log::{debug, info};

use super::{Game, GameEvent, GameState, SHOWCASE_TARGET};
use crate::camera::OrbitCamera;
use crate::geometry::{Aabb, Ray};
use crate::input::FrameInput;

const PROBE_HEIGHT: f32 = 100.0;
const PLAYER_BOX_HALF: Vec3 = Vec3::new(2.5, 1.0, 2.5);
const MARKER_BOX_LOWER: Vec3 = Vec3::splat(-2.5);
const MARKER_BOX_UPPER: Vec3 = Vec3::new(2.5, 0.5, 2.5);
const DEATH_FALL_SPEED: f32 = 10.0;
const WOBBLE_SCALE: f32 = 100.0;
const LATERAL_INPUT_SCALE: f32 = 75.0;

impl Game {
    pub(super) fn update_playing(&mut self, input: &FrameInput) -> GameState {
        let dt = input.dt;
        let controls = self.config.controls;

        if self.camera.position.y < self.config.death_height {
            self.death.time_since_death = 0.0;
            self.death.target_at_death = self.view.target;
            self.death.fall_speed = DEATH_FALL_SPEED;
            self.camera.set_mouse_captured(false);
            self.grapple.release();
            info!("fell off at stage {}", self.stage);
            self.events.push(GameEvent::Died);
            return GameState::Respawn;
        }

        let surface = self.probe_ground();

        if input.is_key_pressed(controls.toggle_cursor) {
            let captured = self.camera.mouse_captured();
            self.camera.set_mouse_captured(!captured);
        }

        if input.is_key_pressed(controls.jump) && self.physics.player.is_grounded {
            self.physics
                .player
                .apply_impulse(Vec2::new(0.0, self.config.jump_speed));
            self.events.push(GameEvent::Jumped);
        }

        if self.is_unstable() {
            if let Some(index) = self.current_ground {
                self.destabilize(index, input);
            }
        }

        let player_box = Aabb::around(self.camera.position, -PLAYER_BOX_HALF, PLAYER_BOX_HALF);
        let marker_box = Aabb::around(self.marker, MARKER_BOX_LOWER, MARKER_BOX_UPPER);
        if player_box.overlaps(&marker_box) {
            return self.advance_stage();
        }

        if !self.physics.player.is_grounded {
            if self.is_unstable() {
                self.stabilize();
            }
            self.unstable_timer = 0.0;
        } else if self.current_ground.is_some() && self.last_ground == self.current_ground {
            self.unstable_timer += dt;
        }

        self.physics.set_ground_surface(surface);
        self.camera.update(input, &controls);
        if self.grapple.is_pulling() {
            let lift = self.grapple.velocity().y * self.config.grapple_lift;
            self.physics.player.add_force(Vec2::new(0.0, lift));
        }
        self.physics.step(dt);
        self.physics.ground.enabled = false;
        self.physics.ground.freeze_orient = true;
        if !self.is_unstable() {
            self.physics.ground.orient = 0.0;
            self.physics.player.position.x = 0.0;
            self.physics.player.velocity.x = 0.0;
        }
        self.camera.position.y = self.physics.player.position.y;
        self.camera.position.z += self.physics.player.position.x - self.last_lateral;

        self.update_grapple(input);

        self.last_ground = self.current_ground;
        self.last_lateral = self.physics.player.position.x;
        self.view = self.camera.view();
        GameState::Playing
    }

    fn is_unstable(&self) -> bool {
        self.unstable_timer >= self.config.unstable_after
    }

    /// Casts straight down from high above the player. The first platform
    /// hit becomes the current ground; returns its top surface.
    fn probe_ground(&mut self) -> Option<f32> {
        let ray = Ray::new(self.camera.position + Vec3::Y * PROBE_HEIGHT, Vec3::NEG_Y);
        let hit = self
            .platforms
            .iter()
            .enumerate()
            .find_map(|(index, platform)| ray.cast(&platform.bounds()).map(|hit| (index, hit)));
        self.current_ground = hit.map(|(index, _)| index);
        hit.map(|(_, hit)| hit.point.y)
    }

    fn destabilize(&mut self, index: usize, input: &FrameInput) {
        let t = self.unstable_timer;
        let tilt = (t * 2.0).sin() / WOBBLE_SCALE;
        if let Some(platform) = self.platforms.get_mut(index) {
            platform.wobble(t.sin() / WOBBLE_SCALE, tilt);
        }
        let ground = &mut self.physics.ground;
        ground.enabled = true;
        ground.freeze_orient = false;
        ground.orient -= tilt;

        let movement = self.camera.movement(input, &self.config.controls);
        self.physics.player.velocity.x += movement.z / LATERAL_INPUT_SCALE;
    }

    fn stabilize(&mut self) {
        self.physics.ground.freeze_orient = false;
        self.physics.ground.orient = 0.0;
        self.physics.player.position.x = 0.0;
        self.physics.player.velocity.x = 0.0;
        for platform in &mut self.platforms {
            platform.settle();
        }
    }

    pub(super) fn muzzle(&self) -> Vec3 {
        self.camera.local_to_world(self.config.gun_offset)
    }

    fn update_grapple(&mut self, input: &FrameInput) {
        if !self.grappling_unlocked {
            return;
        }
        if input.is_mouse_pressed(self.config.controls.grapple) {
            let ray = Ray::new(self.muzzle(), self.camera.forward());
            match self.grapple.fire(&ray, &self.platforms, self.current_ground) {
                Some(target) => {
                    debug!(
                        "grapple hooked platform {} at {:?}",
                        target.platform, target.point
                    );
                    self.events.push(GameEvent::GrappleAttached {
                        platform: target.platform,
                    });
                }
                None => debug!("grapple missed"),
            }
        }
        if input.is_mouse_down(self.config.controls.grapple) && self.grapple.target().is_some() {
            let velocity = self.grapple.pull(self.muzzle());
            let scale = self.config.grapple_pull_rate * input.dt;
            self.camera.position += Vec3::new(velocity.x, 0.0, velocity.z) * scale;
        } else {
            self.grapple.release();
        }
    }

    /// Called when the player touches the marker of the current level.
    pub(super) fn advance_stage(&mut self) -> GameState {
        self.stage += 1;
        self.reset_player();

        if self.stage == self.config.grapple_unlock_stage && !self.grappling_unlocked {
            self.grappling_unlocked = true;
            info!("grapple unlocked");
            self.events.push(GameEvent::GrappleUnlocked);
        }

        if self.load_stage() {
            self.events.push(GameEvent::LevelCompleted { stage: self.stage });
            self.view = self.camera.view();
            GameState::Playing
        } else {
            info!("campaign complete after {} stages", self.stage);
            self.camera.set_mouse_captured(false);
            self.orbit = OrbitCamera::around(SHOWCASE_TARGET, self.config.orbit_speed, self.config.fov);
            self.view = self.orbit.view();
            self.events.push(GameEvent::Finished);
            GameState::Finish
        }
    }
}
