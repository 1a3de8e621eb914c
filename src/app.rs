use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::config::GameConfig;
use crate::game::{Game, GameEvent, GameState};
use crate::input::FrameInput;
use crate::level::LevelSet;

/// Fixed step used when there is no display to pace the loop.
pub const HEADLESS_STEP: f32 = 1.0 / 60.0;
pub const HEADLESS_VIEWPORT: (u32, u32) = (800, 450);

pub fn load_levels(path: Option<&Path>) -> Result<LevelSet> {
    match path {
        Some(path) => {
            let xml = fs::read_to_string(path)
                .with_context(|| format!("failed to read level file {}", path.display()))?;
            LevelSet::from_xml(&xml)
                .with_context(|| format!("failed to load levels from {}", path.display()))
        }
        None => LevelSet::builtin().context("built-in levels are invalid"),
    }
}

pub fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => {
            let xml = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            GameConfig::from_xml(&xml)
                .with_context(|| format!("failed to load config from {}", path.display()))
        }
        None => Ok(GameConfig::default()),
    }
}

/// Human readable listing of the levels and the order they are played in.
pub fn level_summary(levels: &LevelSet) -> String {
    let mut out = format!("Loaded {} levels\n", levels.levels().len());
    for (index, level) in levels.levels().iter().enumerate() {
        out.push_str(&format!(
            " - [{index}] {} ({} platforms, marker at ({:.0}, {:.0}, {:.0}))\n",
            level.name,
            level.platform_count(),
            level.marker.x,
            level.marker.y,
            level.marker.z
        ));
    }
    let order: Vec<String> = levels.campaign().iter().map(ToString::to_string).collect();
    out.push_str(&format!("Campaign: {}\n", order.join(" ")));
    out
}

/// Writes gameplay events to the log; sound cues go to debug.
pub fn log_event(event: &GameEvent) {
    match event {
        GameEvent::StateChanged { .. } => {}
        GameEvent::Jumped => debug!("cue: jump sound"),
        GameEvent::GrappleAttached { platform } => debug!("cue: grapple hit platform {platform}"),
        GameEvent::LevelCompleted { stage } => info!("reached stage {stage}"),
        GameEvent::GrappleUnlocked => info!("grappling gun unlocked"),
        GameEvent::Died => info!("player fell"),
        GameEvent::Respawned => info!("player respawned"),
        GameEvent::Finished => info!("victory"),
    }
}

/// Wall-clock frame timer; long stalls are clamped.
#[derive(Debug)]
pub struct FrameClock {
    last: Instant,
    max_frame_time: f32,
}

impl FrameClock {
    pub fn new(max_frame_time: f32) -> Self {
        Self {
            last: Instant::now(),
            max_frame_time,
        }
    }

    /// Seconds since the previous tick.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        elapsed.min(self.max_frame_time)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub frame: usize,
    pub from: GameState,
    pub to: GameState,
}

/// Outcome of a windowless run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub frames: usize,
    pub transitions: Vec<Transition>,
    pub final_state: GameState,
    pub stage: usize,
    pub stage_count: usize,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for transition in &self.transitions {
            writeln!(
                f,
                "frame {}: {} -> {}",
                transition.frame, transition.from, transition.to
            )?;
        }
        write!(
            f,
            "Simulated {} frames; final state: {} (stage {} of {})",
            self.frames,
            self.final_state,
            self.stage + 1,
            self.stage_count
        )
    }
}

/// Steps the game `frames` times with no input at a fixed step.
pub fn run_headless(game: &mut Game, frames: usize) -> RunReport {
    let mut transitions = Vec::new();
    for frame in 1..=frames {
        let input = FrameInput::idle(HEADLESS_STEP, HEADLESS_VIEWPORT);
        for event in game.update(&input) {
            log_event(&event);
            if let GameEvent::StateChanged { from, to } = event {
                transitions.push(Transition { frame, from, to });
            }
        }
    }
    RunReport {
        frames,
        transitions,
        final_state: game.state(),
        stage: game.stage(),
        stage_count: game.levels().stage_count(),
    }
}
