/// Scene objects: the behaviour side of an entity.
///
/// The container stores every entity as a boxed `SceneObject` (what the entity
/// does) next to a container-owned `ObjectState` (where it is). Objects never see
/// the container; they answer local-space geometry questions and submit render
/// images through a `RenderContext`.

use bitflags::bitflags;
use glam::{Mat4, Vec3};
use slotmap::new_key_type;
use crate::traversal::RenderContext;
use crate::zone::{PortalOwner, ZoneManager};
use super::bounds::AABB;
use super::terrain::TerrainHeightField;

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for an entity within a container.
    ///
    /// Keys remain valid even after other entities are removed.
    /// A key becomes invalid only when its own entity is removed.
    pub struct ObjectKey;
}

// ===== TYPE MASK =====

bitflags! {
    /// Entity type bits, matched against query masks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectTypes: u32 {
        const ENVIRONMENT = 1 << 0;
        const TERRAIN = 1 << 1;
        const INTERIOR = 1 << 2;
        const WATER = 1 << 3;
        const TRIGGER = 1 << 4;
        const MARKER = 1 << 5;
        const STATIC_SHAPE = 1 << 6;
        const SHAPE_BASE = 1 << 7;
        const CAMERA = 1 << 8;
        const PLAYER = 1 << 9;
        const ITEM = 1 << 10;
        const VEHICLE = 1 << 11;
        const PROJECTILE = 1 << 12;
        const DEBRIS = 1 << 13;
        const PHYSICAL_ZONE = 1 << 14;
        const PORTAL = 1 << 15;
        const MIRROR = 1 << 16;
        const LIGHT = 1 << 17;
        const STATIC_RENDERED = 1 << 18;
    }
}

impl ObjectTypes {
    /// Types kept in the container's flat side list.
    pub const SIDE_LIST: ObjectTypes = ObjectTypes::WATER.union(ObjectTypes::PHYSICAL_ZONE);
}

// ===== DESCRIPTORS =====

/// Placement of a new entity.
#[derive(Debug, Clone, Copy)]
pub struct ObjectDesc {
    /// Local-to-world transform (scale excluded)
    pub transform: Mat4,
    /// Per-axis scale applied before `transform`
    pub scale: Vec3,
    /// Local-space bounds
    pub object_box: AABB,
    pub type_mask: ObjectTypes,
    /// Infinite extent: stored in the overflow bin and always considered present
    pub global_bounds: bool,
}

impl ObjectDesc {
    pub fn new(object_box: AABB, type_mask: ObjectTypes) -> Self {
        Self {
            transform: Mat4::IDENTITY,
            scale: Vec3::ONE,
            object_box,
            type_mask,
            global_bounds: false,
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform = Mat4::from_translation(position);
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_global_bounds(mut self) -> Self {
        self.global_bounds = true;
        self
    }
}

// ===== QUERY RESULTS =====

/// Local-space hit reported by an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Ray parameter in [0, 1]
    pub t: f32,
    /// Surface normal in the object's local (scaled) space
    pub normal: Vec3,
}

/// World-space result of a container ray cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayInfo {
    pub object: ObjectKey,
    pub t: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

// ===== SCENE OBJECT =====

/// Per-kind entity behaviour.
///
/// Every method has a box-shaped default, so a plain entity only implements
/// what differs. Geometry methods work in the object's local space: the
/// container has already applied the inverse transform and inverse scale.
pub trait SceneObject {
    /// Submit this object's render image for the current pass.
    ///
    /// Returns true when something was submitted.
    fn prepare_render_image(&mut self, ctx: &mut RenderContext<'_>) -> bool {
        if ctx.is_object_rendered() {
            ctx.submit(false);
            true
        } else {
            false
        }
    }

    /// Exact segment test in local space.
    fn cast_ray(&self, object_box: &AABB, start: Vec3, end: Vec3) -> Option<RayHit> {
        object_box
            .ray_intersect(start, end)
            .map(|(t, normal)| RayHit { t, normal })
    }

    /// Append the local-space polygons overlapping `local_region`.
    ///
    /// Returns true when at least one polygon was added.
    fn build_poly_list(&self, object_box: &AABB, local_region: &AABB, out: &mut Vec<Vec<Vec3>>) -> bool {
        if !object_box.intersects(local_region) {
            return false;
        }
        out.extend(object_box.faces().iter().map(|face| face.to_vec()));
        true
    }

    /// Earliest contact of `local_box` moving by `local_velocity`.
    fn collide_swept_box(&self, object_box: &AABB, local_box: &AABB, local_velocity: Vec3) -> Option<RayHit> {
        object_box
            .sweep_intersect(local_box, local_velocity)
            .map(|(t, normal)| RayHit { t, normal })
    }

    /// Whether hits on this object are meaningful to gameplay code.
    fn has_game_object(&self) -> bool {
        true
    }

    /// Called by the container after the transform or scale changed.
    fn set_world_transform(&mut self, _transform: &Mat4, _scale: Vec3) {}

    fn as_zone_manager(&self) -> Option<&dyn ZoneManager> {
        None
    }

    fn as_portal_owner(&self) -> Option<&dyn PortalOwner> {
        None
    }

    fn as_terrain(&self) -> Option<&dyn TerrainHeightField> {
        None
    }
}

#[cfg(test)]
#[path = "object_tests.rs"]
mod tests;
