// Copyright @yucwang 2026

use crate::math::constants::{Matrix4f, Vector3f};

/// Source of the transforms used to map screen space back into the world.
pub trait Camera: Sync {
    fn projection_matrix(&self, width: usize, height: usize) -> Matrix4f;
    fn view_matrix(&self) -> Matrix4f;
    /// World-space eye position.
    fn position(&self) -> Vector3f;
    fn describe(&self) -> String {
        String::from("Camera")
    }
}
