/// View-space frustum extents.
///
/// `left`, `right`, `bottom`, `top` are measured on the near plane, in view space
/// (right-handed, camera looking down -Z). Portal projection narrows these extents
/// to the screen area a portal covers; the projection matrix is then off-center.

use glam::{Mat4, Vec3, Vec4};
use crate::scene::AABB;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewFrustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl ViewFrustum {
    pub fn new(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self { left, right, bottom, top, near, far }
    }

    /// Symmetric perspective frustum (vertical field of view in radians).
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let top = near * (0.5 * fov_y).tan();
        let right = top * aspect;
        Self { left: -right, right, bottom: -top, top, near, far }
    }

    pub fn is_valid(&self) -> bool {
        self.left < self.right && self.bottom < self.top && self.near > 0.0 && self.near < self.far
    }

    /// Off-center perspective projection, right-handed, depth range [0, 1].
    pub fn projection_matrix(&self) -> Mat4 {
        let (l, r, b, t, n, f) = (self.left, self.right, self.bottom, self.top, self.near, self.far);
        Mat4::from_cols(
            Vec4::new(2.0 * n / (r - l), 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 * n / (t - b), 0.0, 0.0),
            Vec4::new((r + l) / (r - l), (t + b) / (t - b), f / (n - f), -1.0),
            Vec4::new(0.0, 0.0, n * f / (n - f), 0.0),
        )
    }

    /// Corners in view space. Bit layout: bit0 = right, bit1 = top, bit2 = far.
    pub fn view_corners(&self) -> [Vec3; 8] {
        let far_scale = self.far / self.near;
        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let x = if i & 1 == 0 { self.left } else { self.right };
            let y = if i & 2 == 0 { self.bottom } else { self.top };
            let near_point = Vec3::new(x, y, -self.near);
            *corner = if i & 4 == 0 { near_point } else { near_point * far_scale };
        }
        corners
    }

    /// Corners transformed by a camera-to-world matrix.
    pub fn world_corners(&self, camera_transform: &Mat4) -> [Vec3; 8] {
        self.view_corners().map(|c| camera_transform.transform_point3(c))
    }

    /// World-space box enclosing the frustum.
    pub fn world_bounds(&self, camera_transform: &Mat4) -> AABB {
        let corners = self.world_corners(camera_transform);
        corners[1..].iter().fold(AABB::new(corners[0], corners[0]), |aabb, c| {
            AABB::new(aabb.min.min(*c), aabb.max.max(*c))
        })
    }

    /// Extents covering both frustums (near/far of `self`).
    pub fn union(&self, other: &ViewFrustum) -> ViewFrustum {
        ViewFrustum {
            left: self.left.min(other.left),
            right: self.right.max(other.right),
            bottom: self.bottom.min(other.bottom),
            top: self.top.max(other.top),
            near: self.near,
            far: self.far,
        }
    }

    /// Overlapping extents (near/far of `self`), `None` when empty.
    pub fn intersection(&self, other: &ViewFrustum) -> Option<ViewFrustum> {
        let result = ViewFrustum {
            left: self.left.max(other.left),
            right: self.right.min(other.right),
            bottom: self.bottom.max(other.bottom),
            top: self.top.min(other.top),
            near: self.near,
            far: self.far,
        };
        if result.left < result.right && result.bottom < result.top { Some(result) } else { None }
    }
}

#[cfg(test)]
#[path = "view_frustum_tests.rs"]
mod tests;
