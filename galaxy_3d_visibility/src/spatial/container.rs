/// Spatial container: owns every entity of a world and indexes it in a bin grid.
///
/// Uses a SlotMap for O(1) insert/remove with stable keys. Bin membership is a
/// set of intrusive reference lists (`RefPool`), one list per bin plus the
/// overflow bin, so moving an entity only touches the bins it left or entered.
///
/// Queries stamp each visited entity with a per-call query key; an entity linked
/// in several bins is therefore reported once per call.

use glam::{Mat4, Vec3};
use slotmap::SlotMap;
use crate::camera::Frustum;
use crate::error::Result;
use crate::engine_debug;
use crate::scene::{ObjectDesc, ObjectKey, ObjectTypes, Polyhedron, SceneObject, AABB};
use crate::traversal::TraversalStatus;
use crate::utils::RefPool;
use super::bin_grid::{BinGrid, BinPlacement, ContainerConfig};

// ===== ENTITY =====

/// Container-owned state of one entity.
#[derive(Debug, Clone)]
pub struct ObjectState {
    transform: Mat4,
    inverse_transform: Mat4,
    scale: Vec3,
    object_box: AABB,
    world_box: AABB,
    world_sphere: (Vec3, f32),
    type_mask: ObjectTypes,
    collision_count: u32,
    global_bounds: bool,
    placement: BinPlacement,
    pub(crate) last_query_key: u32,
    pub(crate) traversal_key: u32,
    pub(crate) traversal_status: TraversalStatus,
}

impl ObjectState {
    fn new(desc: &ObjectDesc) -> Self {
        let mut state = Self {
            transform: desc.transform,
            inverse_transform: desc.transform.inverse(),
            scale: desc.scale,
            object_box: desc.object_box,
            world_box: desc.object_box,
            world_sphere: (Vec3::ZERO, 0.0),
            type_mask: desc.type_mask,
            collision_count: 0,
            global_bounds: desc.global_bounds,
            placement: BinPlacement::Overflow,
            last_query_key: 0,
            traversal_key: 0,
            traversal_status: TraversalStatus::Pending,
        };
        state.update_world_box();
        state
    }

    fn update_world_box(&mut self) {
        debug_assert!(self.object_box.is_valid(), "invalid object box: {:?}", self.object_box);
        self.world_box = if self.global_bounds {
            AABB::GLOBAL
        } else {
            self.object_box.scaled(self.scale).transformed(&self.transform)
        };
        self.world_sphere = self.world_box.bounding_sphere();
    }

    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    pub fn inverse_transform(&self) -> &Mat4 {
        &self.inverse_transform
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Transform including scale (local box space to world).
    pub fn render_transform(&self) -> Mat4 {
        self.transform * Mat4::from_scale(self.scale)
    }

    pub fn position(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    pub fn object_box(&self) -> &AABB {
        &self.object_box
    }

    pub fn world_box(&self) -> &AABB {
        &self.world_box
    }

    /// Bounding sphere of the world box (center, radius).
    pub fn world_sphere(&self) -> (Vec3, f32) {
        self.world_sphere
    }

    pub fn type_mask(&self) -> ObjectTypes {
        self.type_mask
    }

    pub fn is_global_bounds(&self) -> bool {
        self.global_bounds
    }

    pub fn is_collision_enabled(&self) -> bool {
        self.collision_count == 0
    }

    pub fn placement(&self) -> &BinPlacement {
        &self.placement
    }

    /// World point to the object's local (scaled) space.
    pub fn world_to_local(&self, p: Vec3) -> Vec3 {
        self.inverse_transform.transform_point3(p) / self.scale
    }

    pub fn world_vector_to_local(&self, v: Vec3) -> Vec3 {
        self.inverse_transform.transform_vector3(v) / self.scale
    }

    /// Local normal to a unit world normal.
    pub fn local_normal_to_world(&self, n: Vec3) -> Vec3 {
        self.transform.transform_vector3(n / self.scale).normalize_or_zero()
    }

    /// World box to a box in the object's local (scaled) space.
    pub fn world_box_to_local(&self, aabb: &AABB) -> AABB {
        aabb.transformed(&self.inverse_transform).scaled(self.scale.recip())
    }
}

pub(crate) struct SceneEntity {
    pub(crate) object: Box<dyn SceneObject>,
    pub(crate) state: ObjectState,
}

// ===== QUERIES =====

/// Region of a `find_objects` query.
#[derive(Debug, Clone, Copy)]
pub enum QueryRegion<'a> {
    Box(AABB),
    Frustum(&'a Frustum),
    Polyhedron(&'a Polyhedron),
}

impl QueryRegion<'_> {
    /// World box the grid walk covers.
    pub fn bounding_box(&self) -> Option<AABB> {
        match self {
            QueryRegion::Box(aabb) => Some(*aabb),
            QueryRegion::Frustum(frustum) => Some(frustum.bounding_box()),
            QueryRegion::Polyhedron(poly) => poly.bounding_box(),
        }
    }

    /// Exact overlap test against a world box.
    pub fn overlaps(&self, aabb: &AABB) -> bool {
        match self {
            QueryRegion::Box(region) => region.intersects(aabb),
            QueryRegion::Frustum(frustum) => frustum.intersects_aabb(aabb),
            QueryRegion::Polyhedron(poly) => poly.intersects_aabb(aabb),
        }
    }
}

/// Bin mutation and query counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerStats {
    pub bin_inserts: u64,
    pub bin_removals: u64,
    pub queries: u64,
}

// ===== CONTAINER =====

pub struct SpatialContainer {
    grid: BinGrid,
    pub(crate) objects: SlotMap<ObjectKey, SceneEntity>,
    pub(crate) refs: RefPool,
    /// Entities typed WATER or PHYSICAL_ZONE
    side_list: Vec<ObjectKey>,
    terrains: Vec<ObjectKey>,
    query_key: u32,
    pub(crate) stats: ContainerStats,
}

impl SpatialContainer {
    pub fn new(config: ContainerConfig) -> Result<Self> {
        config.validate()?;
        let grid = BinGrid::new(config);
        engine_debug!("galaxy3d::SpatialContainer",
            "Created container: {}x{} bins of {} units", config.bin_count, config.bin_count, config.bin_size);
        Ok(Self {
            grid,
            objects: SlotMap::with_key(),
            refs: RefPool::with_lists(grid.list_count()),
            side_list: Vec::new(),
            terrains: Vec::new(),
            query_key: 0,
            stats: ContainerStats::default(),
        })
    }

    pub fn config(&self) -> &ContainerConfig {
        self.grid.config()
    }

    pub fn grid(&self) -> &BinGrid {
        &self.grid
    }

    pub fn stats(&self) -> ContainerStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = ContainerStats::default();
    }

    // ===== ENTITY LIFECYCLE =====

    /// Add an entity and link it into its bins.
    ///
    /// The object moves into the container, so it can never be owned twice.
    pub fn add_object(&mut self, mut object: Box<dyn SceneObject>, desc: ObjectDesc) -> ObjectKey {
        object.set_world_transform(&desc.transform, desc.scale);
        let is_terrain = object.as_terrain().is_some();
        let state = ObjectState::new(&desc);
        let key = self.objects.insert(SceneEntity { object, state });

        if desc.type_mask.intersects(ObjectTypes::SIDE_LIST) {
            self.side_list.push(key);
        }
        if is_terrain {
            self.terrains.push(key);
        }
        self.link_bins(key);
        key
    }

    /// Remove an entity, unlinking every bin reference. Returns the object.
    pub fn remove_object(&mut self, key: ObjectKey) -> Option<Box<dyn SceneObject>> {
        let entity = self.objects.remove(key)?;
        self.stats.bin_removals += self.refs.unlink_object(key) as u64;
        self.side_list.retain(|k| *k != key);
        self.terrains.retain(|k| *k != key);
        Some(entity.object)
    }

    pub fn contains(&self, key: ObjectKey) -> bool {
        self.objects.contains_key(key)
    }

    pub fn object(&self, key: ObjectKey) -> Option<&dyn SceneObject> {
        self.objects.get(key).map(|e| e.object.as_ref())
    }

    pub fn object_mut(&mut self, key: ObjectKey) -> Option<&mut (dyn SceneObject + 'static)> {
        self.objects.get_mut(key).map(|e| e.object.as_mut())
    }

    pub fn object_state(&self, key: ObjectKey) -> Option<&ObjectState> {
        self.objects.get(key).map(|e| &e.state)
    }

    pub fn object_keys(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.objects.keys()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Terrain entities, in insertion order.
    pub fn terrains(&self) -> &[ObjectKey] {
        &self.terrains
    }

    // ===== MUTATION =====

    /// Set the world transform. Returns false if the key is invalid.
    pub fn set_transform(&mut self, key: ObjectKey, transform: Mat4) -> bool {
        let Some(entity) = self.objects.get_mut(key) else {
            return false;
        };
        entity.state.transform = transform;
        entity.state.inverse_transform = transform.inverse();
        self.refresh(key);
        true
    }

    /// Set the per-axis scale. Returns false if the key is invalid.
    pub fn set_scale(&mut self, key: ObjectKey, scale: Vec3) -> bool {
        let Some(entity) = self.objects.get_mut(key) else {
            return false;
        };
        entity.state.scale = scale;
        self.refresh(key);
        true
    }

    /// Set the local-space box. Returns false if the key is invalid.
    pub fn set_object_box(&mut self, key: ObjectKey, object_box: AABB) -> bool {
        let Some(entity) = self.objects.get_mut(key) else {
            return false;
        };
        entity.state.object_box = object_box;
        self.refresh(key);
        true
    }

    fn refresh(&mut self, key: ObjectKey) {
        if let Some(entity) = self.objects.get_mut(key) {
            entity.state.update_world_box();
            entity.object.set_world_transform(&entity.state.transform, entity.state.scale);
        }
        self.check_bins(key);
    }

    /// Re-bin an entity after its world box changed.
    ///
    /// No bin is touched when the covered range is unchanged; otherwise only the
    /// bins that were left are unlinked and only the bins that were entered are
    /// linked.
    pub fn check_bins(&mut self, key: ObjectKey) {
        let Some(entity) = self.objects.get_mut(key) else {
            return;
        };
        let state = &mut entity.state;
        let new_placement = self.grid.placement(&state.world_box, state.global_bounds);
        if new_placement == state.placement {
            return;
        }

        let mut old_bins = self.grid.placement_bins(&state.placement);
        let mut new_bins = self.grid.placement_bins(&new_placement);
        state.placement = new_placement;
        old_bins.sort_unstable();
        new_bins.sort_unstable();

        for bin in old_bins.iter().filter(|b| new_bins.binary_search(b).is_err()) {
            if self.refs.unlink(key, *bin) {
                self.stats.bin_removals += 1;
            }
        }
        for bin in new_bins.iter().filter(|b| old_bins.binary_search(b).is_err()) {
            self.refs.link(key, *bin);
            self.stats.bin_inserts += 1;
        }
    }

    fn link_bins(&mut self, key: ObjectKey) {
        let Some(entity) = self.objects.get_mut(key) else {
            return;
        };
        let placement = self.grid.placement(&entity.state.world_box, entity.state.global_bounds);
        entity.state.placement = placement;
        for bin in self.grid.placement_bins(&placement) {
            self.refs.link(key, bin);
            self.stats.bin_inserts += 1;
        }
    }

    /// Bins an entity is currently linked in.
    pub fn object_bins(&self, key: ObjectKey) -> Vec<u32> {
        let mut bins: Vec<u32> = self.refs.object_lists(key).collect();
        bins.sort_unstable();
        bins
    }

    // ===== COLLISION COUNTER =====

    /// Enable collision (decrements the disable counter).
    pub fn enable_collision(&mut self, key: ObjectKey) {
        if let Some(entity) = self.objects.get_mut(key) {
            debug_assert!(entity.state.collision_count > 0, "unbalanced enable_collision");
            entity.state.collision_count = entity.state.collision_count.saturating_sub(1);
        }
    }

    /// Disable collision. Calls nest: each needs a matching `enable_collision`.
    pub fn disable_collision(&mut self, key: ObjectKey) {
        if let Some(entity) = self.objects.get_mut(key) {
            entity.state.collision_count += 1;
        }
    }

    pub fn is_collision_enabled(&self, key: ObjectKey) -> bool {
        self.objects.get(key).is_some_and(|e| e.state.is_collision_enabled())
    }

    // ===== QUERIES =====

    /// Key for a new query. On wrap-around every stamp is reset.
    pub(crate) fn next_query_key(&mut self) -> u32 {
        self.query_key = self.query_key.wrapping_add(1);
        if self.query_key == 0 {
            for entity in self.objects.values_mut() {
                entity.state.last_query_key = 0;
            }
            self.query_key = 1;
        }
        self.query_key
    }

    /// Visit every entity whose type matches `mask` and whose world box overlaps
    /// `region`. Global-bounds entities always match the region.
    ///
    /// Each entity is reported at most once per call.
    pub fn find_objects<F>(&mut self, region: &QueryRegion<'_>, mask: ObjectTypes, mut callback: F)
    where
        F: FnMut(ObjectKey, &ObjectState),
    {
        self.stats.queries += 1;
        let query_key = self.next_query_key();

        if !mask.is_empty() && ObjectTypes::SIDE_LIST.contains(mask) {
            for key in &self.side_list {
                if let Some(entity) = self.objects.get(*key) {
                    let state = &entity.state;
                    if state.type_mask.intersects(mask)
                        && (state.global_bounds || region.overlaps(&state.world_box))
                    {
                        callback(*key, state);
                    }
                }
            }
            return;
        }

        let Some(bounds) = region.bounding_box() else {
            return;
        };
        debug_assert!(bounds.is_valid(), "invalid query region: {:?}", bounds);
        if !bounds.is_valid() {
            return;
        }

        let mut visit = |objects: &mut SlotMap<ObjectKey, SceneEntity>, key: ObjectKey| {
            let Some(entity) = objects.get_mut(key) else {
                return;
            };
            let state = &mut entity.state;
            if state.last_query_key == query_key {
                return;
            }
            state.last_query_key = query_key;
            if state.type_mask.intersects(mask)
                && (state.global_bounds || region.overlaps(&state.world_box))
            {
                callback(key, &*state);
            }
        };

        for key in self.refs.list_iter(self.grid.overflow_bin()) {
            visit(&mut self.objects, key);
        }
        for bin in self.grid.query_bins(&bounds) {
            for key in self.refs.list_iter(bin) {
                visit(&mut self.objects, key);
            }
        }
    }

    /// Keys of every entity `find_objects` would report.
    pub fn find_object_keys(&mut self, region: &QueryRegion<'_>, mask: ObjectTypes) -> Vec<ObjectKey> {
        let mut keys = Vec::new();
        self.find_objects(region, mask, |key, _| keys.push(key));
        keys
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
