/// Collision queries: polygon lists and swept-volume contact lists.

use glam::Vec3;
use crate::scene::{ObjectKey, ObjectTypes, Polyhedron, AABB};
use super::container::{QueryRegion, SpatialContainer};

// ===== POLY LIST =====

/// World-space polygon of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub object: ObjectKey,
    pub vertices: Vec<Vec3>,
}

impl Polygon {
    /// Unit normal (Newell's method), zero for a degenerate polygon.
    pub fn normal(&self) -> Vec3 {
        let mut normal = Vec3::ZERO;
        for (i, current) in self.vertices.iter().enumerate() {
            let next = self.vertices[(i + 1) % self.vertices.len()];
            normal.x += (current.y - next.y) * (current.z + next.z);
            normal.y += (current.z - next.z) * (current.x + next.x);
            normal.z += (current.x - next.x) * (current.y + next.y);
        }
        normal.normalize_or_zero()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PolyList {
    polygons: Vec<Polygon>,
}

impl PolyList {
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Distinct entities contributing polygons.
    pub fn objects(&self) -> Vec<ObjectKey> {
        let mut keys: Vec<ObjectKey> = Vec::new();
        for polygon in &self.polygons {
            if !keys.contains(&polygon.object) {
                keys.push(polygon.object);
            }
        }
        keys
    }
}

// ===== COLLISION LIST =====

/// Volume swept by `build_collision_list`.
#[derive(Debug, Clone)]
pub enum SweepVolume {
    Box(AABB),
    Polyhedron(Polyhedron),
}

impl SweepVolume {
    pub fn bounding_box(&self) -> Option<AABB> {
        match self {
            SweepVolume::Box(aabb) => Some(*aabb),
            SweepVolume::Polyhedron(poly) => poly.bounding_box(),
        }
    }

    pub fn to_polyhedron(&self) -> Polyhedron {
        match self {
            SweepVolume::Box(aabb) => Polyhedron::from_box(aabb),
            SweepVolume::Polyhedron(poly) => poly.clone(),
        }
    }
}

/// Earliest contact with one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub object: ObjectKey,
    /// Time of impact in [0, 1] along the velocity
    pub t: f32,
    /// World normal pointing from the entity toward the moving volume
    pub normal: Vec3,
    pub point: Vec3,
}

/// Contacts ordered by time of impact, at most one per entity.
#[derive(Debug, Clone, Default)]
pub struct CollisionList {
    contacts: Vec<Contact>,
}

impl CollisionList {
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn earliest(&self) -> Option<&Contact> {
        self.contacts.first()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

impl SpatialContainer {
    /// World-space polygons of every collision-enabled entity of `mask`
    /// overlapping `region`.
    pub fn build_poly_list(&mut self, region: &QueryRegion<'_>, mask: ObjectTypes) -> PolyList {
        let mut list = PolyList::default();
        let Some(bounds) = region.bounding_box() else {
            return list;
        };

        let mut local = Vec::new();
        for key in self.find_object_keys(region, mask) {
            let Some(entity) = self.objects.get(key) else {
                continue;
            };
            let state = &entity.state;
            if !state.is_collision_enabled() {
                continue;
            }

            local.clear();
            let local_region = state.world_box_to_local(&bounds);
            if !entity.object.build_poly_list(state.object_box(), &local_region, &mut local) {
                continue;
            }
            let to_world = state.render_transform();
            list.polygons.extend(local.drain(..).map(|vertices| Polygon {
                object: key,
                vertices: vertices.into_iter().map(|v| to_world.transform_point3(v)).collect(),
            }));
        }
        list
    }

    /// Contacts of `source` moving by `velocity` against entities of `mask`.
    ///
    /// The source is extruded along the velocity into a convex polyhedron that
    /// drives the broad phase; each candidate is then tested exactly in its
    /// local space. `exclude` is typically the moving entity itself.
    pub fn build_collision_list(
        &mut self,
        source: &SweepVolume,
        velocity: Vec3,
        mask: ObjectTypes,
        exclude: Option<ObjectKey>,
    ) -> CollisionList {
        let mut list = CollisionList::default();
        let Some(source_box) = source.bounding_box() else {
            return list;
        };

        let swept = source.to_polyhedron().extruded(velocity);
        for key in self.find_object_keys(&QueryRegion::Polyhedron(&swept), mask) {
            if Some(key) == exclude {
                continue;
            }
            let Some(entity) = self.objects.get(key) else {
                continue;
            };
            let state = &entity.state;
            if !state.is_collision_enabled() {
                continue;
            }

            let local_box = state.world_box_to_local(&source_box);
            let local_velocity = state.world_vector_to_local(velocity);
            let Some(hit) = entity.object.collide_swept_box(state.object_box(), &local_box, local_velocity) else {
                continue;
            };

            let t = hit.t.clamp(0.0, 1.0);
            let center = source_box.center() + velocity * t;
            list.contacts.push(Contact {
                object: key,
                t,
                normal: state.local_normal_to_world(hit.normal),
                point: center.clamp(state.world_box().min, state.world_box().max),
            });
        }

        list.contacts.sort_by(|a, b| a.t.total_cmp(&b.t));
        list
    }
}

#[cfg(test)]
#[path = "collision_tests.rs"]
mod tests;
