/// Portal geometry: screen projection of portal quads and planar reflection.

use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::camera::{Camera, ViewFrustum, Viewport};

/// Project a world-space portal quad seen by `camera` through `frustum`.
///
/// The quad is clipped against the near plane, projected onto it, and its
/// bounds are intersected with `frustum`. A camera standing in the opening
/// (closer than the near plane, inside the quad) sees through the whole
/// frustum. Returns `None` when the portal covers no part of `frustum`.
pub fn project_portal_quad(camera: &Camera, frustum: &ViewFrustum, quad: &[Vec3; 4]) -> Option<(ViewFrustum, Viewport)> {
    let view = camera.view_matrix();
    let points = quad.map(|p| view.transform_point3(p));
    let near = frustum.near;

    if is_eye_in_opening(&points, near) {
        return Some((*frustum, viewport_for(camera, frustum)));
    }

    let clipped = clip_to_near(&points, near);
    if clipped.len() < 3 {
        return None;
    }

    let (min, max) = clipped.iter().fold(
        (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
        |(min, max), p| {
            let projected = Vec2::new(p.x, p.y) * (near / -p.z);
            (min.min(projected), max.max(projected))
        },
    );
    let projected = ViewFrustum::new(min.x, max.x, min.y, max.y, near, frustum.far);
    let visible = frustum.intersection(&projected)?;
    Some((visible, viewport_for(camera, &visible)))
}

/// Screen rectangle of view-space extents, relative to the camera's own
/// extents and viewport (screen Y grows downward).
pub fn viewport_for(camera: &Camera, frustum: &ViewFrustum) -> Viewport {
    let full = camera.view_frustum();
    let screen = camera.viewport();
    let sx = screen.width / (full.right - full.left);
    let sy = screen.height / (full.top - full.bottom);
    Viewport {
        x: screen.x + (frustum.left - full.left) * sx,
        y: screen.y + (full.top - frustum.top) * sy,
        width: (frustum.right - frustum.left) * sx,
        height: (frustum.top - frustum.bottom) * sy,
        min_depth: screen.min_depth,
        max_depth: screen.max_depth,
    }
}

/// Eye (view-space origin) within `near` of the quad plane and inside the quad.
fn is_eye_in_opening(points: &[Vec3; 4], near: f32) -> bool {
    let normal = (points[1] - points[0]).cross(points[2] - points[0]).normalize_or_zero();
    if normal == Vec3::ZERO {
        return false;
    }
    let distance = -normal.dot(points[0]);
    if distance.abs() > near {
        return false;
    }

    let foot = normal * normal.dot(points[0]);
    let mut sign = 0.0_f32;
    for i in 0..4 {
        let edge = points[(i + 1) % 4] - points[i];
        let side = edge.cross(foot - points[i]).dot(normal);
        if side * sign < 0.0 {
            return false;
        }
        if side != 0.0 {
            sign = side;
        }
    }
    true
}

/// Sutherland-Hodgman clip of a view-space polygon to `z <= -near`.
fn clip_to_near(points: &[Vec3], near: f32) -> Vec<Vec3> {
    let distance = |p: &Vec3| -p.z - near;
    let mut out = Vec::with_capacity(points.len() + 1);
    for (i, current) in points.iter().enumerate() {
        let next = &points[(i + 1) % points.len()];
        let (dc, dn) = (distance(current), distance(next));
        if dc >= 0.0 {
            out.push(*current);
        }
        if (dc >= 0.0) != (dn >= 0.0) {
            out.push(current.lerp(*next, dc / (dc - dn)));
        }
    }
    out
}

/// Reflection through a normalized plane (n, d): p' = p - 2 (n·p + d) n.
pub fn reflection_matrix(plane: Vec4) -> Mat4 {
    let n = plane.truncate();
    let d = plane.w;
    Mat4::from_cols(
        Vec4::new(1.0 - 2.0 * n.x * n.x, -2.0 * n.x * n.y, -2.0 * n.x * n.z, 0.0),
        Vec4::new(-2.0 * n.y * n.x, 1.0 - 2.0 * n.y * n.y, -2.0 * n.y * n.z, 0.0),
        Vec4::new(-2.0 * n.z * n.x, -2.0 * n.z * n.y, 1.0 - 2.0 * n.z * n.z, 0.0),
        Vec4::new(-2.0 * d * n.x, -2.0 * d * n.y, -2.0 * d * n.z, 1.0),
    )
}

#[cfg(test)]
#[path = "portal_tests.rs"]
mod tests;
