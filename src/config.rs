use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::{KeyCode, MouseButton};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("<{tag}>: {value:?} is not a number")]
    InvalidNumber { tag: String, value: String },
    #[error("<{tag}>: unknown key {value:?}")]
    UnknownKey { tag: String, value: String },
}

/// Key bindings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    pub forward: KeyCode,
    pub back: KeyCode,
    pub right: KeyCode,
    pub left: KeyCode,
    pub sprint: KeyCode,
    pub jump: KeyCode,
    pub toggle_cursor: KeyCode,
    pub confirm: KeyCode,
    pub fullscreen: KeyCode,
    /// Fires and holds the grappling gun.
    pub grapple: MouseButton,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            forward: KeyCode::Character('W'),
            back: KeyCode::Character('S'),
            right: KeyCode::Character('D'),
            left: KeyCode::Character('A'),
            sprint: KeyCode::LEFT_SHIFT,
            jump: KeyCode::SPACE,
            toggle_cursor: KeyCode::ESCAPE,
            confirm: KeyCode::ENTER,
            fullscreen: KeyCode::Function(11),
            grapple: MouseButton::LEFT,
        }
    }
}

/// Gameplay tuning. Every value has a default; a config file only needs the
/// tags it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub window_width: u32,
    pub window_height: u32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub gravity: f32,
    pub jump_speed: f32,
    pub move_speed: f32,
    pub sprint_multiplier: f32,
    /// Radians per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    pub death_height: f32,
    /// Seconds on one platform before it starts to wobble.
    pub unstable_after: f32,
    pub grapple_unlock_stage: usize,
    pub grapple_lift: f32,
    /// Pull is measured per 60 Hz frame; this rescales it to seconds.
    pub grapple_pull_rate: f32,
    /// Gun muzzle in camera space (right, up, forward).
    pub gun_offset: Vec3,
    /// Radians per second for the menu and victory cameras.
    pub orbit_speed: f32,
    /// Longest frame the simulation accepts before clamping.
    pub max_frame_time: f32,
    pub controls: Controls,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 450,
            fov: 60.0,
            gravity: 20.0,
            jump_speed: 10.0,
            move_speed: 10.0,
            sprint_multiplier: 2.0,
            mouse_sensitivity: 0.003,
            death_height: -90.0,
            unstable_after: 3.0,
            grapple_unlock_stage: 2,
            grapple_lift: 40.0,
            grapple_pull_rate: 60.0,
            gun_offset: Vec3::new(0.6, -0.4, 1.2),
            orbit_speed: 0.5,
            max_frame_time: 0.1,
            controls: Controls::default(),
        }
    }
}

impl GameConfig {
    /// Reads overrides from a `<config>` document.
    pub fn from_xml(xml: &str) -> Result<Self, ConfigError> {
        let document = Document::parse(xml)?;
        let root = document.root_element();
        let mut config = Self::default();

        config.window_width = parse_number(&root, "window_width", config.window_width)?;
        config.window_height = parse_number(&root, "window_height", config.window_height)?;
        config.fov = parse_number(&root, "fov", config.fov)?;
        config.gravity = parse_number(&root, "gravity", config.gravity)?;
        config.jump_speed = parse_number(&root, "jump_speed", config.jump_speed)?;
        config.move_speed = parse_number(&root, "move_speed", config.move_speed)?;
        config.sprint_multiplier =
            parse_number(&root, "sprint_multiplier", config.sprint_multiplier)?;
        config.mouse_sensitivity =
            parse_number(&root, "mouse_sensitivity", config.mouse_sensitivity)?;
        config.death_height = parse_number(&root, "death_height", config.death_height)?;
        config.unstable_after = parse_number(&root, "unstable_after", config.unstable_after)?;
        config.grapple_unlock_stage =
            parse_number(&root, "grapple_unlock_stage", config.grapple_unlock_stage)?;
        config.grapple_lift = parse_number(&root, "grapple_lift", config.grapple_lift)?;
        config.grapple_pull_rate =
            parse_number(&root, "grapple_pull_rate", config.grapple_pull_rate)?;
        config.gun_offset = parse_vec3(&root, "gun_offset", config.gun_offset)?;
        config.orbit_speed = parse_number(&root, "orbit_speed", config.orbit_speed)?;
        config.max_frame_time = parse_number(&root, "max_frame_time", config.max_frame_time)?;

        if let Some(controls) = root.children().find(|n| n.has_tag_name("controls")) {
            let c = &mut config.controls;
            c.forward = parse_key(&controls, "forward", c.forward)?;
            c.back = parse_key(&controls, "back", c.back)?;
            c.right = parse_key(&controls, "right", c.right)?;
            c.left = parse_key(&controls, "left", c.left)?;
            c.sprint = parse_key(&controls, "sprint", c.sprint)?;
            c.jump = parse_key(&controls, "jump", c.jump)?;
            c.toggle_cursor = parse_key(&controls, "toggle_cursor", c.toggle_cursor)?;
            c.confirm = parse_key(&controls, "confirm", c.confirm)?;
            c.fullscreen = parse_key(&controls, "fullscreen", c.fullscreen)?;
            c.grapple = parse_button(&controls, "grapple", c.grapple)?;
        }

        Ok(config)
    }
}

fn optional_text<'a>(node: &Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

fn parse_number<T: std::str::FromStr>(
    node: &Node<'_, '_>,
    tag: &str,
    default: T,
) -> Result<T, ConfigError> {
    match optional_text(node, tag) {
        Some(value) => value.parse::<T>().map_err(|_| ConfigError::InvalidNumber {
            tag: tag.to_string(),
            value: value.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_vec3(node: &Node<'_, '_>, tag: &str, default: Vec3) -> Result<Vec3, ConfigError> {
    let Some(value) = optional_text(node, tag) else {
        return Ok(default);
    };
    let invalid = || ConfigError::InvalidNumber {
        tag: tag.to_string(),
        value: value.to_string(),
    };
    let components = value
        .split_whitespace()
        .map(|part| part.parse::<f32>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    match components.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(invalid()),
    }
}

fn parse_key(node: &Node<'_, '_>, tag: &str, default: KeyCode) -> Result<KeyCode, ConfigError> {
    match optional_text(node, tag) {
        Some(value) => KeyCode::from_name(value).ok_or_else(|| ConfigError::UnknownKey {
            tag: tag.to_string(),
            value: value.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_button(
    node: &Node<'_, '_>,
    tag: &str,
    default: MouseButton,
) -> Result<MouseButton, ConfigError> {
    match optional_text(node, tag) {
        Some(value) => MouseButton::from_name(value).ok_or_else(|| ConfigError::UnknownKey {
            tag: tag.to_string(),
            value: value.to_string(),
        }),
        None => Ok(default),
    }
}
