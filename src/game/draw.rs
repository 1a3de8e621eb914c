use glam::{Quat, Vec3};

use super::{play_button, respawn_button, Game, GameState, SHOWCASE_TARGET};
use crate::level::{Hint, MARKER_SIZE, PLATFORM_SIZE};
use crate::scene::{colors, OverlayRect, Scene, SceneObject};

const PLAYER_SIZE: Vec3 = Vec3::new(1.0, 2.0, 1.0);
const HINT_POSITION: Vec3 = Vec3::new(5.0, 0.0, 0.0);
const HINT_SIZE: Vec3 = Vec3::new(0.1, 10.0, 10.0);
const GUN_SIZE: Vec3 = Vec3::new(0.8, 0.2, 0.2);
const CABLE_THICKNESS: f32 = 0.05;
const CROSSHAIR: f32 = 10.0;

impl Game {
    /// Snapshot of what to draw this frame.
    pub fn scene(&self, viewport: (u32, u32)) -> Scene {
        match self.state {
            GameState::Intro => self.intro_scene(viewport),
            GameState::Start => self.start_scene(viewport),
            GameState::Playing => self.playing_scene(viewport),
            GameState::Respawn => self.respawn_scene(viewport),
            GameState::Finish => self.finish_scene(),
        }
    }

    fn intro_scene(&self, viewport: (u32, u32)) -> Scene {
        let mut scene = Scene::new("ROCKY ROAD", colors::RAYWHITE);
        scene.overlay = self.intro.overlay(viewport);
        scene
    }

    fn start_scene(&self, viewport: (u32, u32)) -> Scene {
        let mut scene = Scene::new("Rocky Road", colors::SKY);
        scene.camera = Some(self.view);
        if let Some(platform) = self.platforms.get(1) {
            scene.push(platform_object(0, platform.position(), 0.0));
        }
        scene.push(player_figure(Vec3::new(15.0, -5.0, -5.0)));
        scene.overlay.push(self.hovered(play_button(viewport)));
        scene
    }

    fn playing_scene(&self, viewport: (u32, u32)) -> Scene {
        let title = match self.levels.level_for_stage(self.stage) {
            Some(level) => format!("Rocky Road - Level {} - {}", self.stage + 1, level.name),
            None => "Rocky Road".to_string(),
        };
        let mut scene = Scene::new(title, colors::SKY);
        scene.camera = Some(self.view);

        for (index, platform) in self.platforms.iter().enumerate() {
            scene.push(platform_object(index, platform.position(), platform.tilt()));
        }
        scene.push(SceneObject::new("marker", self.marker, MARKER_SIZE, colors::GOLD));

        if let Some(hint) = self.hint {
            let color = match hint {
                Hint::Controls => colors::PANEL,
                Hint::Grapple => colors::STEEL,
            };
            scene.push(SceneObject::new("hint", HINT_POSITION, HINT_SIZE, color));
        }

        if self.grappling_unlocked {
            let muzzle = self.muzzle();
            scene.push(
                SceneObject::new("grapple-gun", muzzle, GUN_SIZE, colors::STEEL)
                    .with_rotation(Quat::from_rotation_y(-self.camera.yaw)),
            );
            if let Some(target) = self.grapple.target().filter(|_| self.grapple.is_pulling()) {
                scene.push(cable(muzzle, target.point));
            }
        }

        let (width, height) = (viewport.0 as f32, viewport.1 as f32);
        let half = CROSSHAIR / 2.0;
        scene.overlay.push(OverlayRect::new(
            width / 2.0 - half,
            height / 2.0 - 1.0,
            CROSSHAIR,
            2.0,
            colors::WHITE,
        ));
        scene.overlay.push(OverlayRect::new(
            width / 2.0 - 1.0,
            height / 2.0 - half,
            2.0,
            CROSSHAIR,
            colors::WHITE,
        ));
        scene
    }

    fn respawn_scene(&self, viewport: (u32, u32)) -> Scene {
        let mut scene = Scene::new("Rocky Road - RESPAWN", colors::SKY);
        scene.camera = Some(self.view);
        let body = Vec3::new(0.0, self.config.death_height - self.death.fall_speed, 0.0);
        scene.push(player_figure(body));
        scene.overlay.push(self.hovered(respawn_button(viewport)));
        scene
    }

    fn hovered(&self, button: OverlayRect) -> OverlayRect {
        if button.contains(self.pointer) {
            button.with_color(colors::BUTTON_HOVER)
        } else {
            button
        }
    }

    fn finish_scene(&self) -> Scene {
        let mut scene = Scene::new("VICTORY", colors::SKY);
        scene.camera = Some(self.view);
        scene.push(platform_object(0, SHOWCASE_TARGET + Vec3::new(0.0, -2.0, 0.0), 0.0));
        scene.push(player_figure(SHOWCASE_TARGET + Vec3::new(0.0, 2.0, 0.0)));
        scene
    }
}

fn platform_object(index: usize, position: Vec3, tilt: f32) -> SceneObject {
    SceneObject::new(format!("platform-{index}"), position, PLATFORM_SIZE, colors::WOOD)
        .with_rotation(Quat::from_rotation_x(tilt))
}

fn player_figure(position: Vec3) -> SceneObject {
    SceneObject::new("player", position, PLAYER_SIZE, colors::RED)
}

/// Thin box stretched from `start` to `end`.
fn cable(start: Vec3, end: Vec3) -> SceneObject {
    let span = end - start;
    let length = span.length();
    let rotation = if length > f32::EPSILON {
        Quat::from_rotation_arc(Vec3::X, span / length)
    } else {
        Quat::IDENTITY
    };
    SceneObject::new(
        "grapple-cable",
        start + span * 0.5,
        Vec3::new(length, CABLE_THICKNESS, CABLE_THICKNESS),
        colors::BLACK,
    )
    .with_rotation(rotation)
}
