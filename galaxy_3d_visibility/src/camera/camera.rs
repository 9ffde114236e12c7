/// Camera: viewpoint of a traversal pass.
///
/// Holds the camera-to-world transform, the view-space frustum extents and the
/// viewport; the view matrix, projection matrix and world frustum are derived
/// from them whenever one of the three changes.

use glam::{Mat4, Vec3};
use super::frustum::Frustum;
use super::view_frustum::ViewFrustum;
use super::viewport::Viewport;

#[derive(Debug, Clone)]
pub struct Camera {
    transform: Mat4,
    view_matrix: Mat4,
    projection_matrix: Mat4,
    frustum: Frustum,
    view_frustum: ViewFrustum,
    viewport: Viewport,
}

impl Camera {
    /// Create a camera from its camera-to-world transform.
    pub fn new(transform: Mat4, view_frustum: ViewFrustum, viewport: Viewport) -> Self {
        debug_assert!(view_frustum.is_valid(), "invalid view frustum: {:?}", view_frustum);
        let view_matrix = transform.inverse();
        let projection_matrix = view_frustum.projection_matrix();
        Self {
            transform,
            view_matrix,
            projection_matrix,
            frustum: Frustum::from_view_projection(&(projection_matrix * view_matrix)),
            view_frustum,
            viewport,
        }
    }

    /// Same viewpoint restricted to other extents (portal sub-view).
    pub fn with_view(&self, view_frustum: ViewFrustum, viewport: Viewport) -> Self {
        Self::new(self.transform, view_frustum, viewport)
    }

    // ===== GETTERS =====

    /// Camera-to-world transform.
    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    /// View matrix (inverse of the camera's world transform).
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// World-space frustum planes and corners.
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn view_frustum(&self) -> &ViewFrustum {
        &self.view_frustum
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn position(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    /// World-space viewing direction (-Z of the transform).
    pub fn forward(&self) -> Vec3 {
        (-self.transform.z_axis.truncate()).normalize_or_zero()
    }

    /// True when the transform mirrors space (negative determinant).
    pub fn is_mirrored(&self) -> bool {
        self.transform.determinant() < 0.0
    }

    /// World-space frustum of other extents seen from this viewpoint.
    pub fn frustum_for(&self, view_frustum: &ViewFrustum) -> Frustum {
        Frustum::from_view_projection(&(view_frustum.projection_matrix() * self.view_matrix))
    }

    // ===== SETTERS =====

    pub fn set_transform(&mut self, transform: Mat4) {
        *self = Self::new(transform, self.view_frustum, self.viewport);
    }

    pub fn set_view_frustum(&mut self, view_frustum: ViewFrustum) {
        *self = Self::new(self.transform, view_frustum, self.viewport);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
