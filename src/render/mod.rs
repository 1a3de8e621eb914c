pub mod common;
mod native;
mod shader;

pub use common::{CameraParams, DrawItem, LightParams};
pub use native::Renderer;
