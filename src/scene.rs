use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::camera::ViewCamera;

pub mod colors {
    use glam::Vec4;

    pub const BLACK: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);
    pub const RAYWHITE: Vec4 = Vec4::new(0.96, 0.96, 0.96, 1.0);
    pub const SKY: Vec4 = Vec4::new(0.53, 0.75, 0.92, 1.0);
    pub const WOOD: Vec4 = Vec4::new(0.55, 0.36, 0.2, 1.0);
    pub const GOLD: Vec4 = Vec4::new(1.0, 0.8, 0.0, 1.0);
    pub const RED: Vec4 = Vec4::new(0.9, 0.16, 0.22, 1.0);
    pub const STEEL: Vec4 = Vec4::new(0.35, 0.38, 0.42, 1.0);
    pub const PANEL: Vec4 = Vec4::new(0.2, 0.2, 0.25, 1.0);
    pub const BUTTON: Vec4 = Vec4::new(0.85, 0.85, 0.85, 1.0);
    pub const BUTTON_HOVER: Vec4 = Vec4::new(0.79, 0.9, 0.98, 1.0);

    /// `color` with its alpha multiplied by `alpha`.
    pub fn fade(color: Vec4, alpha: f32) -> Vec4 {
        Vec4::new(color.x, color.y, color.z, color.w * alpha.clamp(0.0, 1.0))
    }
}

/// Everything drawn for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Screen text; shown in the window title.
    pub title: String,
    pub clear_color: Vec4,
    /// `None` for screens without a 3D view.
    pub camera: Option<ViewCamera>,
    pub light: Light,
    pub objects: Vec<SceneObject>,
    pub overlay: Vec<OverlayRect>,
}

impl Scene {
    pub fn new(title: impl Into<String>, clear_color: Vec4) -> Self {
        Self {
            title: title.into(),
            clear_color,
            camera: None,
            light: Light::default(),
            objects: Vec::new(),
            overlay: Vec::new(),
        }
    }

    pub fn find(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.name == name)
    }

    pub fn push(&mut self, object: SceneObject) {
        self.objects.push(object);
    }
}

/// Colored box in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    pub color: Vec4,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, position: Vec3, scale: Vec3, color: Vec4) -> Self {
        Self {
            name: name.into(),
            position,
            rotation: Quat::IDENTITY,
            scale,
            color,
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

/// Screen-space rectangle in pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Vec4,
}

impl OverlayRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32, color: Vec4) -> Self {
        Self {
            x,
            y,
            width,
            height,
            color,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 5.0, 0.0),
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_matrix_scales_then_translates() {
        let object = SceneObject::new(
            "platform-0",
            Vec3::new(0.0, -2.0, 0.0),
            Vec3::new(10.0, 1.0, 10.0),
            colors::WOOD,
        );
        let corner = object.model_matrix().transform_point3(Vec3::splat(0.5));
        assert_eq!(corner, Vec3::new(5.0, -1.5, 5.0));
    }

    #[test]
    fn overlay_contains_edges() {
        let rect = OverlayRect::new(360.0, 202.5, 80.0, 45.0, colors::BUTTON);
        assert!(rect.contains(Vec2::new(400.0, 225.0)));
        assert!(rect.contains(Vec2::new(360.0, 202.5)));
        assert!(!rect.contains(Vec2::new(441.0, 225.0)));
    }

    #[test]
    fn find_by_name() {
        let mut scene = Scene::new("Rocky Road", colors::SKY);
        scene.push(SceneObject::new("marker", Vec3::ZERO, Vec3::ONE, colors::GOLD));
        assert!(scene.find("marker").is_some());
        assert!(scene.find("player").is_none());
        assert_eq!(scene.light.position, Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn fade_scales_alpha_only() {
        let faded = colors::fade(colors::BLACK, 0.25);
        assert_eq!(faded, Vec4::new(0.0, 0.0, 0.0, 0.25));
    }
}
