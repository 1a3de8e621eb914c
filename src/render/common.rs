use glam::{Mat3, Mat4, Vec3, Vec4};

use crate::camera::ViewCamera;
use crate::scene::{Light, OverlayRect, Scene};

/// Depth of the first overlay rectangle; later ones sit in front of it.
const OVERLAY_BASE_DEPTH: f32 = 0.5;
const OVERLAY_DEPTH_STEP: f32 = 1e-4;
const OVERLAY_THICKNESS: f32 = 1e-5;

/// Camera parameters consumed by the renderer's uniform buffer.
#[derive(Clone, Debug)]
pub struct CameraParams {
    pub view_proj: Mat4,
    pub position: Vec3,
}

impl CameraParams {
    pub fn from_view(camera: &ViewCamera, aspect: f32) -> Self {
        Self {
            view_proj: camera.view_proj(aspect),
            position: camera.eye,
        }
    }

    /// Pass-through camera for geometry already in clip space.
    pub fn screen() -> Self {
        Self {
            view_proj: Mat4::IDENTITY,
            position: Vec3::ZERO,
        }
    }
}

/// Lighting state consumed by the renderer's uniform buffer.
#[derive(Clone, Debug)]
pub struct LightParams {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl From<&Light> for LightParams {
    fn from(light: &Light) -> Self {
        Self {
            position: light.position,
            color: light.color,
            intensity: light.intensity.max(0.1),
        }
    }
}

/// One unit cube to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawItem {
    pub model: Mat4,
    pub color: Vec4,
    pub unlit: bool,
}

impl DrawItem {
    pub fn normal_matrix(&self) -> Mat3 {
        let linear = Mat3::from_mat4(self.model);
        if linear.determinant().abs() <= f32::EPSILON {
            Mat3::IDENTITY
        } else {
            linear.inverse().transpose()
        }
    }
}

pub fn world_items(scene: &Scene) -> Vec<DrawItem> {
    scene
        .objects
        .iter()
        .map(|object| DrawItem {
            model: object.model_matrix(),
            color: object.color,
            unlit: false,
        })
        .collect()
}

pub fn overlay_items(scene: &Scene, viewport: (u32, u32)) -> Vec<DrawItem> {
    scene
        .overlay
        .iter()
        .enumerate()
        .map(|(index, rect)| DrawItem {
            model: overlay_matrix(rect, viewport, index),
            color: rect.color,
            unlit: true,
        })
        .collect()
}

/// Maps the unit cube onto a pixel rectangle in clip space.
pub fn overlay_matrix(rect: &OverlayRect, viewport: (u32, u32), layer: usize) -> Mat4 {
    let width = viewport.0.max(1) as f32;
    let height = viewport.1.max(1) as f32;
    let center_x = (rect.x + rect.width / 2.0) / width * 2.0 - 1.0;
    let center_y = 1.0 - (rect.y + rect.height / 2.0) / height * 2.0;
    let depth = OVERLAY_BASE_DEPTH - layer as f32 * OVERLAY_DEPTH_STEP;
    Mat4::from_translation(Vec3::new(center_x, center_y, depth))
        * Mat4::from_scale(Vec3::new(
            rect.width / width * 2.0,
            rect.height / height * 2.0,
            OVERLAY_THICKNESS,
        ))
}
