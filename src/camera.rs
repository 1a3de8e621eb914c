use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::Controls;
use crate::input::FrameInput;

const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.017;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 1000.0;

/// What the renderer needs to build a view-projection matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewCamera {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
}

impl ViewCamera {
    pub fn new(eye: Vec3, target: Vec3, fov: f32) -> Self {
        Self { eye, target, fov }
    }

    pub fn view_matrix(&self) -> Mat4 {
        let direction = (self.target - self.eye).normalize_or_zero();
        // Straight up or down needs a different up vector.
        let up = if direction.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let target = if direction == Vec3::ZERO {
            self.eye + Vec3::X
        } else {
            self.target
        };
        Mat4::look_at_rh(self.eye, target, up)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let projection =
            Mat4::perspective_rh(self.fov.to_radians(), aspect.max(0.01), NEAR_PLANE, FAR_PLANE);
        projection * self.view_matrix()
    }
}

/// Mouse-look camera that walks on the horizontal plane. Yaw zero looks
/// along +x.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirstPersonCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub move_speed: f32,
    pub sprint_multiplier: f32,
    pub sensitivity: f32,
    mouse_captured: bool,
}

impl FirstPersonCamera {
    pub fn new(fov: f32, move_speed: f32, sprint_multiplier: f32, sensitivity: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            fov,
            move_speed,
            sprint_multiplier,
            sensitivity,
            mouse_captured: false,
        }
    }

    pub fn mouse_captured(&self) -> bool {
        self.mouse_captured
    }

    pub fn set_mouse_captured(&mut self, captured: bool) {
        self.mouse_captured = captured;
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.pitch.cos() * self.yaw.cos(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.sin(),
        )
    }

    /// Forward flattened onto the ground plane.
    pub fn planar_forward(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin())
    }

    pub fn right(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, self.yaw.cos())
    }

    /// Converts a camera-space offset (right, up, forward) to world space,
    /// following yaw only.
    pub fn local_to_world(&self, offset: Vec3) -> Vec3 {
        self.position + self.right() * offset.x + Vec3::Y * offset.y + self.planar_forward() * offset.z
    }

    pub fn view(&self) -> ViewCamera {
        ViewCamera::new(self.position, self.position + self.forward(), self.fov)
    }

    /// Applies mouse motion; ignored while the cursor is free.
    pub fn look(&mut self, mouse_delta: Vec2) {
        if !self.mouse_captured {
            return;
        }
        self.yaw += mouse_delta.x * self.sensitivity;
        self.pitch = (self.pitch - mouse_delta.y * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Planar displacement requested by the movement keys this frame.
    pub fn movement(&self, input: &FrameInput, controls: &Controls) -> Vec3 {
        let axis = |positive, negative| {
            let mut value = 0.0;
            if input.is_key_down(positive) {
                value += 1.0;
            }
            if input.is_key_down(negative) {
                value -= 1.0;
            }
            value
        };
        let speed = if input.is_key_down(controls.sprint) {
            self.move_speed * self.sprint_multiplier
        } else {
            self.move_speed
        };
        let step = speed * input.dt;
        self.planar_forward() * axis(controls.forward, controls.back) * step
            + self.right() * axis(controls.right, controls.left) * step
    }

    pub fn update(&mut self, input: &FrameInput, controls: &Controls) {
        self.look(input.mouse_delta);
        let displacement = self.movement(input, controls);
        self.position += displacement;
    }
}

/// Camera circling a fixed point, used on the menu and victory screens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    pub height: f32,
    pub angle: f32,
    pub speed: f32,
    pub fov: f32,
}

impl OrbitCamera {
    /// Starts at the origin looking at `target`.
    pub fn around(target: Vec3, speed: f32, fov: f32) -> Self {
        let offset = -target;
        Self {
            target,
            radius: Vec2::new(offset.x, offset.z).length().max(1.0),
            height: offset.y,
            angle: offset.z.atan2(offset.x),
            speed,
            fov,
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.target + Vec3::new(self.angle.cos() * self.radius, self.height, self.angle.sin() * self.radius)
    }

    pub fn update(&mut self, dt: f32) -> ViewCamera {
        self.angle += self.speed * dt;
        self.view()
    }

    pub fn view(&self) -> ViewCamera {
        ViewCamera::new(self.eye(), self.target, self.fov)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;

    fn camera() -> FirstPersonCamera {
        FirstPersonCamera::new(60.0, 10.0, 2.0, 0.01)
    }

    fn frame() -> FrameInput {
        FrameInput::idle(0.5, (800, 450))
    }

    #[test]
    fn yaw_zero_walks_along_positive_x() {
        let mut cam = camera();
        let controls = Controls::default();
        cam.update(&frame().with_key_held(controls.forward), &controls);
        assert!((cam.position - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn sprint_doubles_speed_and_strafe_uses_right() {
        let mut cam = camera();
        let controls = Controls::default();
        let input = frame()
            .with_key_held(controls.right)
            .with_key_held(KeyCode::LEFT_SHIFT);
        cam.update(&input, &controls);
        assert!((cam.position - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-5);
    }

    #[test]
    fn look_requires_captured_mouse_and_clamps_pitch() {
        let mut cam = camera();
        cam.look(Vec2::new(10.0, 0.0));
        assert_eq!(cam.yaw, 0.0);

        cam.set_mouse_captured(true);
        cam.look(Vec2::new(10.0, -1000.0));
        assert!((cam.yaw - 0.1).abs() < 1e-6);
        assert!((cam.pitch - PITCH_LIMIT).abs() < 1e-6);
    }

    #[test]
    fn local_offsets_follow_yaw() {
        let mut cam = camera();
        cam.yaw = FRAC_PI_2;
        let world = cam.local_to_world(Vec3::new(0.0, 0.0, 2.0));
        assert!((world - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn view_straight_down_is_finite() {
        let view = ViewCamera::new(Vec3::new(0.0, -90.0, 0.0), Vec3::new(0.0, -100.0, 0.0), 60.0);
        assert!(view.view_proj(16.0 / 9.0).is_finite());
    }

    #[test]
    fn orbit_starts_at_origin_and_keeps_distance() {
        let mut orbit = OrbitCamera::around(Vec3::new(15.0, 0.0, 0.0), 0.5, 60.0);
        assert!(orbit.eye().length() < 1e-4);
        let view = orbit.update(1.0);
        assert!(((view.eye - view.target).length() - 15.0).abs() < 1e-4);
        assert!(view.eye.length() > 1.0);
    }
}
