//! Game session: the state machine that strings the menu, the levels and the
//! respawn and victory screens together.
//!
//! [`Game::update`] runs exactly one state handler per frame. Handlers return
//! the state for the next frame; the session records the transition.

mod draw;
mod playing;
mod screens;

use std::fmt;

use glam::{Vec2, Vec3};
use log::info;
use serde::{Deserialize, Serialize};

use crate::camera::{FirstPersonCamera, OrbitCamera, ViewCamera};
use crate::config::GameConfig;
use crate::grapple::Grapple;
use crate::input::FrameInput;
use crate::intro::IntroSequence;
use crate::level::{Hint, LevelSet, Platform};
use crate::physics::PhysicsWorld;

pub use screens::{play_button, respawn_button};

/// Point the menu and victory cameras circle around.
pub const SHOWCASE_TARGET: Vec3 = Vec3::new(15.0, 0.0, 0.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    Start,
    Intro,
    Playing,
    Respawn,
    Finish,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameState::Start => "start",
            GameState::Intro => "intro",
            GameState::Playing => "playing",
            GameState::Respawn => "respawn",
            GameState::Finish => "finish",
        };
        f.write_str(name)
    }
}

/// Things that happened during an update. Sound cues are among them; the
/// caller decides what to do with them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    StateChanged { from: GameState, to: GameState },
    Jumped,
    LevelCompleted { stage: usize },
    GrappleUnlocked,
    GrappleAttached { platform: usize },
    Died,
    Respawned,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct DeathCam {
    time_since_death: f32,
    fall_speed: f32,
    target_at_death: Vec3,
}

pub struct Game {
    config: GameConfig,
    levels: LevelSet,
    state: GameState,
    stage: usize,
    platforms: Vec<Platform>,
    marker: Vec3,
    hint: Option<Hint>,
    camera: FirstPersonCamera,
    orbit: OrbitCamera,
    view: ViewCamera,
    physics: PhysicsWorld,
    intro: IntroSequence,
    grapple: Grapple,
    grappling_unlocked: bool,
    unstable_timer: f32,
    current_ground: Option<usize>,
    last_ground: Option<usize>,
    last_lateral: f32,
    death: DeathCam,
    pointer: Vec2,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(config: GameConfig, levels: LevelSet) -> Self {
        let camera = FirstPersonCamera::new(
            config.fov,
            config.move_speed,
            config.sprint_multiplier,
            config.mouse_sensitivity,
        );
        let orbit = OrbitCamera::around(SHOWCASE_TARGET, config.orbit_speed, config.fov);
        let mut game = Self {
            physics: PhysicsWorld::new(config.gravity),
            view: orbit.view(),
            camera,
            orbit,
            levels,
            state: GameState::Intro,
            stage: 0,
            platforms: Vec::new(),
            marker: Vec3::ZERO,
            hint: None,
            intro: IntroSequence::new(),
            grapple: Grapple::new(),
            grappling_unlocked: false,
            unstable_timer: 0.0,
            current_ground: None,
            last_ground: None,
            last_lateral: 0.0,
            death: DeathCam::default(),
            pointer: Vec2::ZERO,
            events: Vec::new(),
            config,
        };
        game.load_stage();
        game
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Position in the campaign order.
    pub fn stage(&self) -> usize {
        self.stage
    }

    pub fn levels(&self) -> &LevelSet {
        &self.levels
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn camera(&self) -> &FirstPersonCamera {
        &self.camera
    }

    pub fn view(&self) -> ViewCamera {
        self.view
    }

    pub fn grappling_unlocked(&self) -> bool {
        self.grappling_unlocked
    }

    pub fn unstable_timer(&self) -> f32 {
        self.unstable_timer
    }

    pub fn current_ground(&self) -> Option<usize> {
        self.current_ground
    }

    /// Whether the cursor should be locked to the window.
    pub fn wants_mouse_captured(&self) -> bool {
        self.camera.mouse_captured()
    }

    /// Runs one frame and returns what happened during it.
    pub fn update(&mut self, input: &FrameInput) -> Vec<GameEvent> {
        self.pointer = input.mouse_position;
        let next = match self.state {
            GameState::Intro => self.update_intro(),
            GameState::Start => self.update_start(input),
            GameState::Playing => self.update_playing(input),
            GameState::Respawn => self.update_respawn(input),
            GameState::Finish => self.update_finish(input),
        };
        if next != self.state {
            info!("state {} -> {}", self.state, next);
            self.events.push(GameEvent::StateChanged {
                from: self.state,
                to: next,
            });
            self.state = next;
        }
        std::mem::take(&mut self.events)
    }

    /// Loads the level for the current stage. Returns `false` once the
    /// campaign is complete.
    fn load_stage(&mut self) -> bool {
        let Some(level) = self.levels.level_for_stage(self.stage) else {
            return false;
        };
        info!(
            "stage {}: {} ({} platforms)",
            self.stage,
            level.name,
            level.platform_count()
        );
        self.platforms = level.instantiate();
        self.marker = level.marker;
        self.hint = level.hint;
        self.current_ground = None;
        self.last_ground = None;
        true
    }

    /// Puts the player back at the spawn point of the current level.
    fn reset_player(&mut self) {
        self.camera.position = Vec3::ZERO;
        self.physics.player.reset();
        self.physics.ground.orient = 0.0;
        self.unstable_timer = 0.0;
        self.last_lateral = 0.0;
        self.last_ground = None;
        self.grapple.release();
    }
}

#[cfg(test)]
mod tests;
