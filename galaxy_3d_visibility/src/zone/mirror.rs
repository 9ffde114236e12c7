/// Planar mirror: a single transform portal.
///
/// The mirror is a rectangle in its local XY plane facing local +Z. Seen from
/// the front, it records itself as a transform portal; the traversal then runs a
/// pass from the reflected viewpoint, clipped to the mirror plane.

use glam::{Mat4, Vec3, Vec4};
use crate::camera::{ViewFrustum, Viewport};
use crate::scene::{SceneObject, AABB};
use crate::traversal::RenderContext;
use super::portal::{project_portal_quad, reflection_matrix};
use super::zone_manager::{PortalOwner, PortalView};

/// Half thickness of the mirror's object box.
const MIRROR_HALF_DEPTH: f32 = 0.01;

#[derive(Debug, Clone)]
pub struct MirrorPortal {
    half_width: f32,
    half_height: f32,
    world_quad: [Vec3; 4],
    plane: Vec4,
    reflection: Mat4,
}

impl MirrorPortal {
    pub fn new(width: f32, height: f32) -> Self {
        let mut mirror = Self {
            half_width: 0.5 * width,
            half_height: 0.5 * height,
            world_quad: [Vec3::ZERO; 4],
            plane: Vec4::Z,
            reflection: Mat4::IDENTITY,
        };
        mirror.set_world_transform(&Mat4::IDENTITY, Vec3::ONE);
        mirror
    }

    /// Local box of the mirror surface.
    pub fn object_box(&self) -> AABB {
        AABB::new(
            Vec3::new(-self.half_width, -self.half_height, -MIRROR_HALF_DEPTH),
            Vec3::new(self.half_width, self.half_height, MIRROR_HALF_DEPTH),
        )
    }

    /// World plane, normal pointing to the reflecting side.
    pub fn plane(&self) -> Vec4 {
        self.plane
    }

    pub fn world_quad(&self) -> &[Vec3; 4] {
        &self.world_quad
    }

    pub fn is_facing(&self, point: Vec3) -> bool {
        self.plane.truncate().dot(point) + self.plane.w > 0.0
    }
}

impl SceneObject for MirrorPortal {
    fn prepare_render_image(&mut self, ctx: &mut RenderContext<'_>) -> bool {
        if !ctx.is_object_rendered() {
            return false;
        }
        if self.is_facing(ctx.camera().position()) {
            let zone = ctx.zones().first().copied().unwrap_or(0);
            ctx.insert_transform_portal(0, zone);
        }
        ctx.submit(false);
        true
    }

    fn set_world_transform(&mut self, transform: &Mat4, scale: Vec3) {
        let matrix = *transform * Mat4::from_scale(scale);
        let (w, h) = (self.half_width, self.half_height);
        self.world_quad = [
            Vec3::new(-w, -h, 0.0),
            Vec3::new(w, -h, 0.0),
            Vec3::new(w, h, 0.0),
            Vec3::new(-w, h, 0.0),
        ]
        .map(|p| matrix.transform_point3(p));

        let normal = transform.transform_vector3(Vec3::Z).normalize_or_zero();
        let center = transform.transform_point3(Vec3::ZERO);
        self.plane = normal.extend(-normal.dot(center));
        self.reflection = reflection_matrix(self.plane);
    }

    fn as_portal_owner(&self) -> Option<&dyn PortalOwner> {
        Some(self)
    }
}

impl PortalOwner for MirrorPortal {
    fn portal_count(&self) -> u32 {
        1
    }

    fn project_portal(&self, _portal: u32, view: &PortalView<'_>) -> Option<(ViewFrustum, Viewport)> {
        project_portal_quad(view.camera, view.frustum, &self.world_quad)
    }

    fn transform_position(&self, _portal: u32, position: Vec3) -> Vec3 {
        self.reflection.transform_point3(position)
    }

    fn transform_camera(&self, _portal: u32, camera_transform: &Mat4) -> Mat4 {
        self.reflection * *camera_transform
    }

    fn portal_clip_plane(&self, _portal: u32) -> Option<Vec4> {
        Some(self.plane)
    }
}

#[cfg(test)]
#[path = "mirror_tests.rs"]
mod tests;
