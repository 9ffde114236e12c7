/// Zone graph: zone index allocation, zone ownership and membership lists.
///
/// Zone 0 is the outdoor zone and has no owner. Every zone manager owns a
/// contiguous range of zone indices. Entities and zones are linked both ways
/// through a `RefPool`: an entity may straddle several zones and every zone
/// lists its tenants.

use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::{engine_bail, engine_trace};
use crate::scene::ObjectKey;
use crate::utils::{RefPool, ZoneRangeAllocator};

/// The outdoor / default zone.
pub const OUTDOOR_ZONE: u32 = 0;

#[derive(Debug)]
pub struct ZoneGraph {
    /// Owner of each zone index (`None` for zone 0 and free indices)
    owners: Vec<Option<ObjectKey>>,
    /// Registered managers: (first zone, zone count)
    ranges: FxHashMap<ObjectKey, (u32, u32)>,
    allocator: ZoneRangeAllocator,
    members: RefPool,
}

impl ZoneGraph {
    pub fn new() -> Self {
        Self {
            owners: vec![None],
            ranges: FxHashMap::default(),
            allocator: ZoneRangeAllocator::new(1),
            members: RefPool::with_lists(1),
        }
    }

    /// Number of zone indices in use (including zone 0 and free holes).
    pub fn zone_count(&self) -> u32 {
        self.owners.len() as u32
    }

    // ===== MANAGERS =====

    /// Give `manager` a range of `zone_count` zones. Returns the first zone.
    pub fn register_manager(&mut self, manager: ObjectKey, zone_count: u32) -> Result<u32> {
        if zone_count == 0 {
            engine_bail!("galaxy3d::ZoneGraph", InvalidZone,
                "Zone manager {:?} reports zero zones", manager);
        }
        if self.ranges.contains_key(&manager) {
            engine_bail!("galaxy3d::ZoneGraph", InvalidOperation,
                "Zone manager {:?} is already registered", manager);
        }

        let first = self.allocator.alloc(zone_count);
        let end = (first + zone_count) as usize;
        if self.owners.len() < end {
            self.owners.resize(end, None);
        }
        for owner in &mut self.owners[first as usize..end] {
            *owner = Some(manager);
        }
        self.ranges.insert(manager, (first, zone_count));
        engine_trace!("galaxy3d::ZoneGraph",
            "Registered manager {:?}: zones {}..{}", manager, first, end);
        Ok(first)
    }

    /// Release a manager's zones. Tenants lose their membership in those zones.
    ///
    /// Returns the former tenants (each once).
    pub fn unregister_manager(&mut self, manager: ObjectKey) -> Vec<ObjectKey> {
        let Some((first, count)) = self.ranges.remove(&manager) else {
            return Vec::new();
        };

        let mut tenants = Vec::new();
        for zone in first..first + count {
            let zone_tenants: Vec<ObjectKey> = self.members.list_iter(zone).collect();
            for tenant in zone_tenants {
                self.members.unlink(tenant, zone);
                if !tenants.contains(&tenant) {
                    tenants.push(tenant);
                }
            }
            self.owners[zone as usize] = None;
        }
        self.allocator.free(first, count);
        tenants
    }

    pub fn zone_owner(&self, zone: u32) -> Option<ObjectKey> {
        self.owners.get(zone as usize).copied().flatten()
    }

    /// (first zone, zone count) of a registered manager.
    pub fn manager_range(&self, manager: ObjectKey) -> Option<(u32, u32)> {
        self.ranges.get(&manager).copied()
    }

    pub fn is_manager(&self, key: ObjectKey) -> bool {
        self.ranges.contains_key(&key)
    }

    pub fn managers(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.ranges.keys().copied()
    }

    // ===== MEMBERSHIP =====

    /// Replace the zones of an entity.
    pub fn set_object_zones(&mut self, object: ObjectKey, zones: &[u32]) {
        self.members.unlink_object(object);
        let mut sorted = zones.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        // Lists iterate newest first, link in reverse to read back ascending
        for zone in sorted.into_iter().rev() {
            debug_assert!(zone < self.zone_count(), "zone {} out of range", zone);
            self.members.link(object, zone);
        }
    }

    pub fn clear_object_zones(&mut self, object: ObjectKey) {
        self.members.unlink_object(object);
    }

    /// Zones of an entity, ascending.
    pub fn object_zones(&self, object: ObjectKey) -> impl Iterator<Item = u32> + '_ {
        self.members.object_lists(object)
    }

    /// Tenants of a zone.
    pub fn zone_objects(&self, zone: u32) -> impl Iterator<Item = ObjectKey> + '_ {
        self.members.list_iter(zone)
    }
}

impl Default for ZoneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "zone_graph_tests.rs"]
mod tests;
