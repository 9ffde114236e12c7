/// Bounding volumes used by the container, the zone managers and the traversal.
///
/// - `AABB`: axis-aligned box (object space or world space)
/// - `Polyhedron`: convex volume described by inward planes and its corner points

use glam::{Mat4, Vec3, Vec4};

/// Half extent of the world box reported for global-bounds objects.
pub const GLOBAL_BOUNDS_EXTENT: f32 = 1.0e10;

// ===== AABB =====

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    /// World box of a global-bounds object.
    pub const GLOBAL: AABB = AABB {
        min: Vec3::splat(-GLOBAL_BOUNDS_EXTENT),
        max: Vec3::splat(GLOBAL_BOUNDS_EXTENT),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of the given half extents around `center`.
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self { min: center - half_extents, max: center + half_extents }
    }

    /// Smallest box containing all `points`. `None` for an empty slice.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        let mut aabb = AABB { min: first, max: first };
        for p in &points[1..] {
            aabb.min = aabb.min.min(*p);
            aabb.max = aabb.max.max(*p);
        }
        Some(aabb)
    }

    /// `min <= max` on every axis, and no NaN.
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Size along each axis.
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Bounding sphere (center, radius) enclosing the box.
    pub fn bounding_sphere(&self) -> (Vec3, f32) {
        (self.center(), self.half_extents().length())
    }

    /// Transform this AABB by a matrix, returning a new AABB.
    ///
    /// Uses the Arvo method: projects each matrix axis onto the AABB extents
    /// for a tight result without transforming all 8 corners.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let translation = matrix.col(3).truncate();
        let mut new_min = translation;
        let mut new_max = translation;

        for i in 0..3 {
            let axis = matrix.col(i).truncate();
            let a = axis * self.min[i];
            let b = axis * self.max[i];
            new_min += a.min(b);
            new_max += a.max(b);
        }

        AABB { min: new_min, max: new_max }
    }

    /// Component-wise scale (negative factors mirror the box).
    pub fn scaled(&self, scale: Vec3) -> AABB {
        let a = self.min * scale;
        let b = self.max * scale;
        AABB { min: a.min(b), max: a.max(b) }
    }

    pub fn translated(&self, offset: Vec3) -> AABB {
        AABB { min: self.min + offset, max: self.max + offset }
    }

    /// Box grown by `margin` on every side.
    pub fn expanded(&self, margin: Vec3) -> AABB {
        AABB { min: self.min - margin, max: self.max + margin }
    }

    /// Test if this AABB fully contains another AABB.
    pub fn contains(&self, other: &AABB) -> bool {
        self.min.x <= other.min.x && self.max.x >= other.max.x
        && self.min.y <= other.min.y && self.max.y >= other.max.y
        && self.min.z <= other.min.z && self.max.z >= other.max.z
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x
        && p.y >= self.min.y && p.y <= self.max.y
        && p.z >= self.min.z && p.z <= self.max.z
    }

    /// Test if this AABB intersects (overlaps) another AABB.
    ///
    /// Returns `true` if the two AABBs overlap or touch.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
        && self.min.y <= other.max.y && self.max.y >= other.min.y
        && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Overlapping region, or `None` when the boxes are disjoint.
    pub fn intersection(&self, other: &AABB) -> Option<AABB> {
        let result = AABB { min: self.min.max(other.min), max: self.max.min(other.max) };
        if result.is_valid() { Some(result) } else { None }
    }

    pub fn union(&self, other: &AABB) -> AABB {
        AABB { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    /// The 8 corners. Bit layout of the index: bit0 = X, bit1 = Y, bit2 = Z (0 = min).
    pub fn corners(&self) -> [Vec3; 8] {
        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            *corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
        }
        corners
    }

    /// The 6 faces as counter-clockwise quads seen from outside.
    pub fn faces(&self) -> [[Vec3; 4]; 6] {
        let c = self.corners();
        [
            [c[0], c[4], c[6], c[2]], // -X
            [c[1], c[3], c[7], c[5]], // +X
            [c[0], c[1], c[5], c[4]], // -Y
            [c[2], c[6], c[7], c[3]], // +Y
            [c[0], c[2], c[3], c[1]], // -Z
            [c[4], c[5], c[7], c[6]], // +Z
        ]
    }

    /// Segment test from `start` to `end` (slab method).
    ///
    /// Returns the entry parameter `t` in [0, 1] and the outward normal of the
    /// face that was hit. A segment starting inside the box hits at `t = 0`.
    pub fn ray_intersect(&self, start: Vec3, end: Vec3) -> Option<(f32, Vec3)> {
        let dir = end - start;
        let mut t_enter = 0.0f32;
        let mut t_exit = 1.0f32;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let s = start[axis];
            let d = dir[axis];
            if d.abs() < f32::EPSILON {
                if s < self.min[axis] || s > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (self.min[axis] - s) * inv;
            let mut t1 = (self.max[axis] - s) * inv;
            // Entering through the min face when moving along +axis
            let mut face = -1.0;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
                face = 1.0;
            }
            if t0 > t_enter {
                t_enter = t0;
                normal = Vec3::ZERO;
                normal[axis] = face;
            }
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }

        if normal == Vec3::ZERO {
            // Started inside
            normal = self.nearest_face_normal(start);
        }
        Some((t_enter, normal))
    }

    /// Swept test of `moving` translated by `velocity` against this box.
    ///
    /// Returns the time of impact in [0, 1] and the contact normal (pointing
    /// from this box toward the moving box).
    pub fn sweep_intersect(&self, moving: &AABB, velocity: Vec3) -> Option<(f32, Vec3)> {
        let expanded = self.expanded(moving.half_extents());
        let start = moving.center();
        if expanded.contains_point(start) {
            return Some((0.0, expanded.nearest_face_normal(start)));
        }
        if velocity == Vec3::ZERO {
            return None;
        }
        expanded.ray_intersect(start, start + velocity)
    }

    /// Outward normal of the face closest to a point inside the box.
    fn nearest_face_normal(&self, p: Vec3) -> Vec3 {
        let mut best = f32::MAX;
        let mut normal = Vec3::Z;
        for axis in 0..3 {
            let to_min = p[axis] - self.min[axis];
            let to_max = self.max[axis] - p[axis];
            if to_min < best {
                best = to_min;
                normal = Vec3::ZERO;
                normal[axis] = -1.0;
            }
            if to_max < best {
                best = to_max;
                normal = Vec3::ZERO;
                normal[axis] = 1.0;
            }
        }
        normal
    }
}

// ===== POLYHEDRON =====

/// Convex polyhedron: inward-facing planes plus the corner points.
///
/// Each plane is (A, B, C, D) with a point P inside when `A*x + B*y + C*z + D >= 0`.
/// The points are only used to compute the bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyhedron {
    pub points: Vec<Vec3>,
    pub planes: Vec<Vec4>,
}

impl Polyhedron {
    pub fn new(points: Vec<Vec3>, planes: Vec<Vec4>) -> Self {
        Self { points, planes }
    }

    /// Six-plane polyhedron matching an AABB.
    pub fn from_box(aabb: &AABB) -> Self {
        let planes = vec![
            Vec4::new(1.0, 0.0, 0.0, -aabb.min.x),
            Vec4::new(-1.0, 0.0, 0.0, aabb.max.x),
            Vec4::new(0.0, 1.0, 0.0, -aabb.min.y),
            Vec4::new(0.0, -1.0, 0.0, aabb.max.y),
            Vec4::new(0.0, 0.0, 1.0, -aabb.min.z),
            Vec4::new(0.0, 0.0, -1.0, aabb.max.z),
        ];
        Self { points: aabb.corners().to_vec(), planes }
    }

    pub fn bounding_box(&self) -> Option<AABB> {
        AABB::from_points(&self.points)
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        self.planes.iter().all(|plane| plane.truncate().dot(p) + plane.w >= 0.0)
    }

    /// Conservative overlap test (positive vertex per plane).
    ///
    /// May return false positives near edges, never false negatives.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.planes.iter().all(|plane| {
            let normal = plane.truncate();
            let p_vertex = Vec3::new(
                if normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );
            normal.dot(p_vertex) + plane.w >= 0.0
        })
    }

    /// Convex volume enclosing this polyhedron swept along `velocity`.
    ///
    /// Planes facing away from the motion are pushed out by the distance travelled
    /// along their normal; the result contains every swept position (it may be
    /// slightly larger than the exact swept hull at the silhouette edges).
    pub fn extruded(&self, velocity: Vec3) -> Polyhedron {
        let mut points = Vec::with_capacity(self.points.len() * 2);
        points.extend_from_slice(&self.points);
        points.extend(self.points.iter().map(|p| *p + velocity));

        let planes = self.planes.iter()
            .map(|plane| {
                let push = (-plane.truncate().dot(velocity)).max(0.0);
                Vec4::new(plane.x, plane.y, plane.z, plane.w + push)
            })
            .collect();

        Polyhedron { points, planes }
    }
}

#[cfg(test)]
#[path = "bounds_tests.rs"]
mod tests;
