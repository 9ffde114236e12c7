/// Capability traits for zone-owning and portal-owning entities.
///
/// A `ZoneManager` owns a contiguous range of zones and decides which of them a
/// pass can see. A `PortalOwner` exposes transform portals (mirrors, teleporters)
/// the traversal recurses through. Both work with zone indices local to the
/// manager; `ZoneContext` maps them onto the pass's traversal state.

use glam::{Mat4, Vec3, Vec4};
use crate::camera::{Camera, ViewFrustum, Viewport};
use crate::scene::AABB;
use crate::traversal::TraversalState;

// ===== ZONE MANAGER =====

pub trait ZoneManager {
    /// Number of zones owned. Must not change while registered.
    fn zone_count(&self) -> u32;

    /// Local zone containing a world-space point.
    fn point_zone(&self, point: Vec3) -> Option<u32>;

    /// Append the local zones overlapping a world box.
    ///
    /// Returns true when the box also extends outside the managed zones.
    fn overlapping_zones(&self, aabb: &AABB, zones: &mut Vec<u32>) -> bool;

    /// The pass starts inside local zone `start_zone` (already visible).
    ///
    /// Marks the zones visible from there and returns true when the view escapes
    /// into the containing zone (marked through `ZoneContext::mark_outside`).
    fn manages_further_nesting(&self, ctx: &mut ZoneContext<'_>, start_zone: u32) -> bool;

    /// The pass reached this manager from its containing zone.
    fn setup_zones_from_outside(&self, ctx: &mut ZoneContext<'_>);
}

// ===== PORTAL OWNER =====

/// Viewpoint a portal is projected from.
#[derive(Debug, Clone, Copy)]
pub struct PortalView<'a> {
    pub camera: &'a Camera,
    /// Extents of the zone the portal is seen from
    pub frustum: &'a ViewFrustum,
}

pub trait PortalOwner {
    fn portal_count(&self) -> u32;

    /// Screen area of portal `portal` seen through `view`, `None` when hidden.
    fn project_portal(&self, portal: u32, view: &PortalView<'_>) -> Option<(ViewFrustum, Viewport)>;

    /// World point mapped through the portal.
    fn transform_position(&self, portal: u32, position: Vec3) -> Vec3;

    /// Camera-to-world transform of the viewpoint on the far side of the portal.
    fn transform_camera(&self, portal: u32, camera_transform: &Mat4) -> Mat4;

    /// Local zone the portal leads into (`None` = the zone it is seen from).
    fn portal_exit_zone(&self, _portal: u32) -> Option<u32> {
        None
    }

    /// World plane clipping everything between the new viewpoint and the portal.
    fn portal_clip_plane(&self, _portal: u32) -> Option<Vec4> {
        None
    }
}

// ===== ZONE CONTEXT =====

/// Traversal state seen through the zone range of one manager.
pub struct ZoneContext<'a> {
    state: &'a mut TraversalState,
    first_zone: u32,
    zone_count: u32,
    outside_zones: &'a [u32],
}

impl<'a> ZoneContext<'a> {
    /// `outside_zones` are the (global) zones the manager itself is a tenant of.
    pub fn new(state: &'a mut TraversalState, first_zone: u32, zone_count: u32, outside_zones: &'a [u32]) -> Self {
        Self { state, first_zone, zone_count, outside_zones }
    }

    pub fn camera(&self) -> &Camera {
        self.state.camera()
    }

    pub fn first_zone(&self) -> u32 {
        self.first_zone
    }

    pub fn outside_zones(&self) -> &[u32] {
        self.outside_zones
    }

    fn global_zone(&self, local: u32) -> Option<u32> {
        debug_assert!(local < self.zone_count, "local zone {} out of range", local);
        (local < self.zone_count).then(|| self.first_zone + local)
    }

    /// Mark a local zone visible. Returns true when its view changed.
    pub fn mark_zone(&mut self, local: u32, frustum: ViewFrustum, viewport: Viewport) -> bool {
        match self.global_zone(local) {
            Some(zone) => self.state.mark_zone_visible(zone, frustum, viewport),
            None => false,
        }
    }

    pub fn is_zone_visible(&self, local: u32) -> bool {
        self.global_zone(local).is_some_and(|zone| self.state.is_zone_visible(zone))
    }

    pub fn zone_view(&self, local: u32) -> Option<(ViewFrustum, Viewport)> {
        self.global_zone(local).and_then(|zone| self.state.zone_view(zone))
    }

    /// Union of the views of the visible containing zones.
    pub fn outside_view(&self) -> Option<(ViewFrustum, Viewport)> {
        self.outside_zones
            .iter()
            .filter_map(|&zone| self.state.zone_view(zone))
            .reduce(|(f1, v1), (f2, v2)| (f1.union(&f2), v1.union(&v2)))
    }

    /// Mark every containing zone visible. Returns true when one of them changed.
    pub fn mark_outside(&mut self, frustum: ViewFrustum, viewport: Viewport) -> bool {
        let mut changed = false;
        for &zone in self.outside_zones {
            changed |= self.state.mark_zone_visible(zone, frustum, viewport);
        }
        changed
    }
}

#[cfg(test)]
#[path = "zone_manager_tests.rs"]
mod tests;
