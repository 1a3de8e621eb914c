use std::collections::HashSet;

use glam::Vec2;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
    Function(u8),
}

impl KeyCode {
    pub const SPACE: Self = Self::Named(NamedKey::Space);
    pub const ENTER: Self = Self::Named(NamedKey::Enter);
    pub const ESCAPE: Self = Self::Named(NamedKey::Escape);
    pub const LEFT_SHIFT: Self = Self::Named(NamedKey::LeftShift);

    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(key) = parse_named_key(name) {
            return Some(key);
        }
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if ch.is_ascii_alphabetic() {
                return Some(Self::Character(ch.to_ascii_uppercase()));
            }
            if ch.is_ascii_digit() {
                return Some(Self::Digit(ch as u8 - b'0'));
            }
        }
        if let Some(function) = name.strip_prefix('F').or_else(|| name.strip_prefix('f')) {
            if let Ok(index) = function.parse::<u8>() {
                if (1..=25).contains(&index) {
                    return Some(Self::Function(index));
                }
            }
        }
        None
    }
}

fn parse_named_key(name: &str) -> Option<KeyCode> {
    use NamedKey::*;
    let key = match name {
        "Space" => Space,
        "Enter" | "Return" => Enter,
        "Tab" => Tab,
        "Left" => Left,
        "Right" => Right,
        "Up" => Up,
        "Down" => Down,
        "Escape" | "Esc" => Escape,
        "Backspace" => Backspace,
        "LeftShift" | "LShift" => LeftShift,
        "RightShift" | "RShift" => RightShift,
        "LeftCtrl" | "LControl" => LeftCtrl,
        "RightCtrl" | "RControl" => RightCtrl,
        "LeftAlt" | "LAlt" => LeftAlt,
        "RightAlt" | "RAlt" => RightAlt,
        _ => return None,
    };
    Some(KeyCode::Named(key))
}

/// Friendly names for the non-character keys the game can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Space,
    Enter,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Escape,
    Backspace,
    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,
}

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    /// `Mouse` or `Mouse<n>` with one-based `n`, case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        let prefix = name.get(..5)?;
        if !prefix.eq_ignore_ascii_case("mouse") {
            return None;
        }
        let suffix = &name[5..];
        if suffix.is_empty() {
            return Some(Self::LEFT);
        }
        match suffix.parse::<u8>().ok()? {
            0 => None,
            index => Some(Self(index - 1)),
        }
    }
}

#[derive(Debug, Default)]
struct Edges {
    keys: HashSet<KeyCode>,
    mouse_buttons: HashSet<MouseButton>,
    mouse_delta: Vec2,
}

/// Input gathered by the event loop between two frames.
#[derive(Debug, Default)]
pub struct InputState {
    keys: RwLock<HashSet<KeyCode>>,
    mouse_buttons: RwLock<HashSet<MouseButton>>,
    mouse_position: RwLock<Vec2>,
    edges: RwLock<Edges>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Auto-repeat presses of a held key are not new presses.
    pub fn set_key_down(&self, key: KeyCode) {
        if self.keys.write().insert(key) {
            self.edges.write().keys.insert(key);
        }
    }

    pub fn set_key_up(&self, key: KeyCode) {
        self.keys.write().remove(&key);
    }

    pub fn set_mouse_button_down(&self, button: MouseButton) {
        if self.mouse_buttons.write().insert(button) {
            self.edges.write().mouse_buttons.insert(button);
        }
    }

    pub fn set_mouse_button_up(&self, button: MouseButton) {
        self.mouse_buttons.write().remove(&button);
    }

    pub fn set_mouse_position(&self, position: Vec2) {
        *self.mouse_position.write() = position;
    }

    /// Accumulates raw pointer motion until the next frame.
    pub fn add_mouse_motion(&self, delta: Vec2) {
        self.edges.write().mouse_delta += delta;
    }

    pub fn mouse_position(&self) -> Vec2 {
        *self.mouse_position.read()
    }

    /// Forgets held keys, e.g. when the window loses focus.
    pub fn release_all(&self) {
        self.keys.write().clear();
        self.mouse_buttons.write().clear();
    }

    /// Snapshot for one game update. Presses and motion recorded since the
    /// previous call are handed over and cleared.
    pub fn take_frame(&self, dt: f32, viewport: (u32, u32)) -> FrameInput {
        let edges = std::mem::take(&mut *self.edges.write());
        FrameInput {
            dt,
            viewport,
            keys_down: self.keys.read().clone(),
            keys_pressed: edges.keys,
            buttons_down: self.mouse_buttons.read().clone(),
            buttons_pressed: edges.mouse_buttons,
            mouse_position: self.mouse_position(),
            mouse_delta: edges.mouse_delta,
        }
    }
}

/// Immutable input for a single frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Drawable size in pixels.
    pub viewport: (u32, u32),
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    buttons_down: HashSet<MouseButton>,
    buttons_pressed: HashSet<MouseButton>,
    pub mouse_position: Vec2,
    pub mouse_delta: Vec2,
}

impl FrameInput {
    /// A frame with nothing pressed.
    pub fn idle(dt: f32, viewport: (u32, u32)) -> Self {
        Self {
            dt,
            viewport,
            ..Self::default()
        }
    }

    pub fn with_key_held(mut self, key: KeyCode) -> Self {
        self.keys_down.insert(key);
        self
    }

    /// Pressed this frame, which also means held.
    pub fn with_key_pressed(mut self, key: KeyCode) -> Self {
        self.keys_down.insert(key);
        self.keys_pressed.insert(key);
        self
    }

    pub fn with_mouse_held(mut self, button: MouseButton) -> Self {
        self.buttons_down.insert(button);
        self
    }

    pub fn with_mouse_pressed(mut self, button: MouseButton) -> Self {
        self.buttons_down.insert(button);
        self.buttons_pressed.insert(button);
        self
    }

    pub fn with_mouse_at(mut self, position: Vec2) -> Self {
        self.mouse_position = position;
        self
    }

    pub fn with_mouse_delta(mut self, delta: Vec2) -> Self {
        self.mouse_delta = delta;
        self
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_character_keys() {
        assert_eq!(KeyCode::from_name("Space"), Some(KeyCode::SPACE));
        assert_eq!(KeyCode::from_name("a"), Some(KeyCode::Character('A')));
        assert_eq!(KeyCode::from_name("F11"), Some(KeyCode::Function(11)));
        assert_eq!(KeyCode::from_name("LShift"), Some(KeyCode::LEFT_SHIFT));
        assert_eq!(KeyCode::from_name("Banana"), None);
    }

    #[test]
    fn mouse_names_are_supported() {
        assert_eq!(MouseButton::from_name("Mouse"), Some(MouseButton::LEFT));
        assert_eq!(MouseButton::from_name("Mouse1"), Some(MouseButton::LEFT));
        assert_eq!(MouseButton::from_name("mouse3"), Some(MouseButton::new(2)));
        assert_eq!(MouseButton::from_name("Mouse0"), None);
        assert_eq!(MouseButton::from_name("Space"), None);
    }

    #[test]
    fn input_state_tracks_keys() {
        let state = InputState::new();
        state.set_key_down(KeyCode::SPACE);
        assert!(state.take_frame(0.016, (800, 450)).is_key_down(KeyCode::SPACE));
        state.set_key_up(KeyCode::SPACE);
        assert!(!state.take_frame(0.016, (800, 450)).is_key_down(KeyCode::SPACE));
    }

    #[test]
    fn release_all_forgets_held_input() {
        let state = InputState::new();
        state.set_key_down(KeyCode::Character('W'));
        state.set_mouse_button_down(MouseButton::LEFT);
        state.release_all();
        let frame = state.take_frame(0.016, (800, 450));
        assert!(!frame.is_key_down(KeyCode::Character('W')));
        assert!(!frame.is_mouse_down(MouseButton::LEFT));
    }

    #[test]
    fn presses_are_reported_once() {
        let state = InputState::new();
        state.set_key_down(KeyCode::SPACE);
        state.set_key_down(KeyCode::SPACE);
        let first = state.take_frame(0.016, (800, 450));
        assert!(first.is_key_pressed(KeyCode::SPACE));
        assert!(first.is_key_down(KeyCode::SPACE));

        let second = state.take_frame(0.016, (800, 450));
        assert!(!second.is_key_pressed(KeyCode::SPACE));
        assert!(second.is_key_down(KeyCode::SPACE));
    }

    #[test]
    fn mouse_motion_accumulates_per_frame() {
        let state = InputState::new();
        state.add_mouse_motion(Vec2::new(3.0, 1.0));
        state.add_mouse_motion(Vec2::new(2.0, -4.0));
        state.set_mouse_button_down(MouseButton::LEFT);
        let frame = state.take_frame(0.016, (800, 450));
        assert_eq!(frame.mouse_delta, Vec2::new(5.0, -3.0));
        assert!(frame.is_mouse_pressed(MouseButton::LEFT));
        assert_eq!(state.take_frame(0.016, (800, 450)).mouse_delta, Vec2::ZERO);
    }
}
