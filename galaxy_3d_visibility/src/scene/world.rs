/// Scene world: one spatial container plus its zone graph.
///
/// Every mutation that can move an entity across bins also refreshes its zone
/// membership. Moving or removing a zone manager rezones the entities that were,
/// or now are, inside it.

use glam::{Mat4, Vec3};
use crate::error::Result;
use crate::engine_trace;
use crate::spatial::{ContainerConfig, QueryRegion, SpatialContainer};
use crate::zone::{ZoneGraph, OUTDOOR_ZONE};
use super::bounds::AABB;
use super::object::{ObjectDesc, ObjectKey, ObjectTypes, SceneObject};

pub struct SceneWorld {
    pub(crate) container: SpatialContainer,
    pub(crate) zones: ZoneGraph,
    pass_key: u32,
}

impl SceneWorld {
    pub fn new(config: ContainerConfig) -> Result<Self> {
        Ok(Self {
            container: SpatialContainer::new(config)?,
            zones: ZoneGraph::new(),
            pass_key: 0,
        })
    }

    // ===== ACCESSORS =====

    pub fn container(&self) -> &SpatialContainer {
        &self.container
    }

    /// Mutable container access for queries and collision toggles.
    ///
    /// Moving entities through it bypasses zone refresh: use the world's setters.
    pub fn container_mut(&mut self) -> &mut SpatialContainer {
        &mut self.container
    }

    pub fn zone_graph(&self) -> &ZoneGraph {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.container.len()
    }

    pub fn is_empty(&self) -> bool {
        self.container.is_empty()
    }

    /// Zones an entity is a tenant of, ascending.
    pub fn object_zones(&self, key: ObjectKey) -> Vec<u32> {
        self.zones.object_zones(key).collect()
    }

    /// Key for a new traversal pass. On wrap-around every status is reset.
    pub(crate) fn next_pass_key(&mut self) -> u32 {
        self.pass_key = self.pass_key.wrapping_add(1);
        if self.pass_key == 0 {
            for entity in self.container.objects.values_mut() {
                entity.state.traversal_key = 0;
            }
            self.pass_key = 1;
        }
        self.pass_key
    }

    // ===== ENTITY LIFECYCLE =====

    /// Add an entity. Zone managers get their zone range here.
    ///
    /// Fails when a zone manager reports zero zones; the entity is then dropped.
    pub fn add_object(&mut self, object: Box<dyn SceneObject>, desc: ObjectDesc) -> Result<ObjectKey> {
        let zone_count = object.as_zone_manager().map(|manager| manager.zone_count());
        let key = self.container.add_object(object, desc);

        if let Some(zone_count) = zone_count {
            if let Err(err) = self.zones.register_manager(key, zone_count) {
                self.container.remove_object(key);
                return Err(err);
            }
            self.rezone(key);
            for tenant in self.overlapping_objects(key) {
                self.rezone(tenant);
            }
        } else {
            self.rezone(key);
        }

        engine_trace!("galaxy3d::SceneWorld", "Added {:?} in zones {:?}", key, self.object_zones(key));
        Ok(key)
    }

    /// Remove an entity. Former tenants of a removed manager are rezoned.
    pub fn remove_object(&mut self, key: ObjectKey) -> Option<Box<dyn SceneObject>> {
        if !self.container.contains(key) {
            return None;
        }
        let tenants = self.zones.unregister_manager(key);
        self.zones.clear_object_zones(key);
        let object = self.container.remove_object(key);
        for tenant in tenants {
            self.rezone(tenant);
        }
        object
    }

    // ===== MUTATION =====

    pub fn set_transform(&mut self, key: ObjectKey, transform: Mat4) -> bool {
        let tenants = self.manager_tenants(key);
        if !self.container.set_transform(key, transform) {
            return false;
        }
        self.after_move(key, tenants);
        true
    }

    pub fn set_scale(&mut self, key: ObjectKey, scale: Vec3) -> bool {
        let tenants = self.manager_tenants(key);
        if !self.container.set_scale(key, scale) {
            return false;
        }
        self.after_move(key, tenants);
        true
    }

    pub fn set_object_box(&mut self, key: ObjectKey, object_box: AABB) -> bool {
        let tenants = self.manager_tenants(key);
        if !self.container.set_object_box(key, object_box) {
            return false;
        }
        self.after_move(key, tenants);
        true
    }

    fn after_move(&mut self, key: ObjectKey, former_tenants: Vec<ObjectKey>) {
        self.rezone(key);
        if !self.zones.is_manager(key) {
            return;
        }
        let mut affected = former_tenants;
        for tenant in self.overlapping_objects(key) {
            if !affected.contains(&tenant) {
                affected.push(tenant);
            }
        }
        for tenant in affected {
            self.rezone(tenant);
        }
    }

    /// Entities in any zone of `manager`.
    fn manager_tenants(&self, manager: ObjectKey) -> Vec<ObjectKey> {
        let Some((first, count)) = self.zones.manager_range(manager) else {
            return Vec::new();
        };
        let mut tenants = Vec::new();
        for zone in first..first + count {
            for tenant in self.zones.zone_objects(zone) {
                if !tenants.contains(&tenant) {
                    tenants.push(tenant);
                }
            }
        }
        tenants
    }

    /// Entities (other than `key`) overlapping the world box of `key`.
    fn overlapping_objects(&mut self, key: ObjectKey) -> Vec<ObjectKey> {
        let Some(world_box) = self.container.object_state(key).map(|s| *s.world_box()) else {
            return Vec::new();
        };
        let mut keys = self.container.find_object_keys(&QueryRegion::Box(world_box), ObjectTypes::all());
        keys.retain(|k| *k != key);
        keys
    }

    // ===== ZONES =====

    /// Innermost zone containing a point: (owning manager, zone).
    ///
    /// When several managers claim the point, the one with the smallest world
    /// box wins. Points outside every manager are in zone 0.
    pub fn find_zone(&self, point: Vec3) -> (Option<ObjectKey>, u32) {
        let mut best: Option<(f32, ObjectKey, u32)> = None;
        for manager_key in self.zones.managers() {
            let (Some(state), Some(manager), Some((first, _))) = (
                self.container.object_state(manager_key),
                self.container.object(manager_key).and_then(|o| o.as_zone_manager()),
                self.zones.manager_range(manager_key),
            ) else {
                continue;
            };
            let Some(local) = manager.point_zone(point) else {
                continue;
            };
            let extents = state.world_box().extents();
            let volume = extents.x * extents.y * extents.z;
            let is_smaller = match best {
                Some((best_volume, _, _)) => volume < best_volume,
                None => true,
            };
            if is_smaller {
                best = Some((volume, manager_key, first + local));
            }
        }
        match best {
            Some((_, manager, zone)) => (Some(manager), zone),
            None => (None, OUTDOOR_ZONE),
        }
    }

    /// Recompute the zones of an entity from the managers overlapping it.
    ///
    /// Zone 0 is kept unless a manager fully contains the entity.
    /// Global-bounds entities always live in zone 0 only. A zone manager is only
    /// zoned by managers enclosing its whole box.
    pub fn rezone(&mut self, key: ObjectKey) {
        let Some(state) = self.container.object_state(key) else {
            return;
        };
        if state.is_global_bounds() {
            self.zones.set_object_zones(key, &[OUTDOOR_ZONE]);
            return;
        }

        let world_box = *state.world_box();
        let is_manager = self.zones.is_manager(key);
        let mut zones = Vec::new();
        let mut outdoors = true;
        let mut local = Vec::new();
        for manager_key in self.zones.managers() {
            if manager_key == key {
                continue;
            }
            let (Some(manager_state), Some(manager), Some((first, _))) = (
                self.container.object_state(manager_key),
                self.container.object(manager_key).and_then(|o| o.as_zone_manager()),
                self.zones.manager_range(manager_key),
            ) else {
                continue;
            };
            // Managers nest only inside managers that enclose them
            if is_manager && !manager_state.world_box().contains(&world_box) {
                continue;
            }
            local.clear();
            let leaks = manager.overlapping_zones(&world_box, &mut local);
            if !local.is_empty() && !leaks {
                outdoors = false;
            }
            zones.extend(local.iter().map(|zone| first + zone));
        }
        if outdoors {
            zones.push(OUTDOOR_ZONE);
        }
        self.zones.set_object_zones(key, &zones);
    }
}

#[cfg(test)]
#[path = "world_tests.rs"]
mod tests;
