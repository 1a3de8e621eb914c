use glam::Vec3;
use log::info;

use super::{Game, GameEvent, GameState};
use crate::camera::ViewCamera;
use crate::input::{FrameInput, MouseButton};
use crate::scene::{colors, OverlayRect};

/// Frames per second the respawn animation was tuned for.
const REFERENCE_FPS: f32 = 60.0;
const DEATH_CAM_RATE: f32 = 0.01;
const RESPAWN_BUTTON_OFFSET: f32 = 100.0;

/// Centred button a tenth of the viewport in each dimension.
pub fn play_button(viewport: (u32, u32)) -> OverlayRect {
    let (width, height) = (viewport.0 as f32, viewport.1 as f32);
    OverlayRect::new(
        width / 2.0 - width / 20.0,
        height / 2.0 - height / 20.0,
        width / 10.0,
        height / 10.0,
        colors::BUTTON,
    )
}

/// The play button moved up and to the left.
pub fn respawn_button(viewport: (u32, u32)) -> OverlayRect {
    let mut rect = play_button(viewport);
    rect.x -= RESPAWN_BUTTON_OFFSET;
    rect.y -= RESPAWN_BUTTON_OFFSET;
    rect
}

fn clicked(button: &OverlayRect, input: &FrameInput) -> bool {
    input.is_mouse_pressed(MouseButton::LEFT) && button.contains(input.mouse_position)
}

impl Game {
    pub(super) fn update_intro(&mut self) -> GameState {
        if self.intro.is_done() {
            return GameState::Start;
        }
        self.intro.step();
        GameState::Intro
    }

    pub(super) fn update_start(&mut self, input: &FrameInput) -> GameState {
        self.camera.set_mouse_captured(false);
        self.view = self.orbit.update(input.dt);

        let confirmed = input.is_key_pressed(self.config.controls.confirm);
        if confirmed || clicked(&play_button(input.viewport), input) {
            info!("starting run at stage {}", self.stage);
            self.begin_run();
            return GameState::Playing;
        }
        GameState::Start
    }

    pub(super) fn update_respawn(&mut self, input: &FrameInput) -> GameState {
        let frames = input.dt * REFERENCE_FPS;
        self.death.time_since_death += DEATH_CAM_RATE * frames;
        self.death.fall_speed += frames;

        let floor = self.config.death_height;
        let eye = Vec3::new(0.0, floor, 0.0);
        let falling_body = Vec3::new(0.0, floor - self.death.fall_speed, 0.0);
        let target = if self.death.time_since_death < 1.0 {
            self.death
                .target_at_death
                .lerp(falling_body, self.death.time_since_death)
        } else {
            falling_body
        };
        self.camera.position = eye;
        self.view = ViewCamera::new(eye, target, self.config.fov);

        let confirmed = input.is_key_pressed(self.config.controls.confirm);
        if confirmed || clicked(&respawn_button(input.viewport), input) {
            info!("respawning at stage {}", self.stage);
            self.begin_run();
            self.events.push(GameEvent::Respawned);
            return GameState::Playing;
        }
        GameState::Respawn
    }

    pub(super) fn update_finish(&mut self, input: &FrameInput) -> GameState {
        self.view = self.orbit.update(input.dt);
        GameState::Finish
    }

    /// Spawns the player on the current level with the mouse captured.
    pub(super) fn begin_run(&mut self) {
        self.load_stage();
        self.reset_player();
        self.camera.set_mouse_captured(true);
        self.current_ground = None;
        self.view = self.camera.view();
    }
}
