//! Rocky Road: a small first-person platformer.
//!
//! Gameplay lives in [`game::Game`], a pure state machine stepped once per
//! frame with a [`FrameInput`] snapshot. It produces [`scene::Scene`]
//! descriptions that the wgpu [`Renderer`] draws, so everything except the
//! window and GPU plumbing runs and tests headless.

pub mod app;
pub mod camera;
pub mod config;
pub mod game;
pub mod geometry;
pub mod grapple;
pub mod input;
pub mod intro;
pub mod level;
pub mod physics;
pub mod render;
pub mod scene;

pub use camera::{FirstPersonCamera, OrbitCamera, ViewCamera};
pub use config::{ConfigError, Controls, GameConfig};
pub use game::{Game, GameEvent, GameState};
pub use geometry::{Aabb, Ray, RayHit};
pub use grapple::{Grapple, GrappleTarget};
pub use input::{FrameInput, InputState, KeyCode, MouseButton, NamedKey};
pub use intro::IntroSequence;
pub use level::{Hint, Level, LevelError, LevelSet, Platform};
pub use physics::{Body, PhysicsWorld};
pub use render::{CameraParams, LightParams, Renderer};
pub use scene::{Light, OverlayRect, Scene, SceneObject};
