/// Rooms-and-doorways zone manager.
///
/// Each room is a local-space box and one zone. Doorways are quads joining two
/// rooms, or a room and the containing zone. Visibility floods from room to room
/// through every doorway whose projection is still on screen, narrowing the view
/// at each step.

use glam::{Mat4, Vec3};
use crate::error::Result;
use crate::engine_bail;
use crate::scene::{SceneObject, AABB};
use super::portal::project_portal_quad;
use super::zone_manager::{ZoneContext, ZoneManager};

/// What lies on one side of a doorway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalSide {
    /// Local room index
    Zone(u32),
    /// The zone containing the manager
    Outside,
}

/// A doorway quad (local space) and the two sides it joins.
#[derive(Debug, Clone, Copy)]
pub struct ZonePortal {
    pub quad: [Vec3; 4],
    pub front: PortalSide,
    pub back: PortalSide,
}

impl ZonePortal {
    pub fn new(quad: [Vec3; 4], front: PortalSide, back: PortalSide) -> Self {
        Self { quad, front, back }
    }

    /// Side opposite to `room`, `None` when the doorway does not touch it.
    fn opposite(&self, room: u32) -> Option<PortalSide> {
        if self.front == PortalSide::Zone(room) {
            Some(self.back)
        } else if self.back == PortalSide::Zone(room) {
            Some(self.front)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct PortalZoneManager {
    rooms: Vec<AABB>,
    portals: Vec<ZonePortal>,
    bounds: AABB,
    world_rooms: Vec<AABB>,
    world_quads: Vec<[Vec3; 4]>,
    world_bounds: AABB,
}

impl PortalZoneManager {
    pub fn new(rooms: Vec<AABB>, portals: Vec<ZonePortal>) -> Result<Self> {
        let Some(first) = rooms.first() else {
            engine_bail!("galaxy3d::PortalZoneManager", InvalidZone, "Zone manager needs at least one room");
        };
        let room_count = rooms.len() as u32;
        for (index, portal) in portals.iter().enumerate() {
            for side in [portal.front, portal.back] {
                if let PortalSide::Zone(room) = side {
                    if room >= room_count {
                        engine_bail!("galaxy3d::PortalZoneManager", InvalidZone,
                            "Portal {} references room {} of {}", index, room, room_count);
                    }
                }
            }
        }

        let bounds = rooms[1..].iter().fold(*first, |acc, room| acc.union(room));
        Ok(Self {
            world_rooms: rooms.clone(),
            world_quads: portals.iter().map(|p| p.quad).collect(),
            world_bounds: bounds,
            rooms,
            portals,
            bounds,
        })
    }

    /// Local box enclosing every room (the manager's object box).
    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    pub fn rooms(&self) -> &[AABB] {
        &self.rooms
    }

    pub fn portals(&self) -> &[ZonePortal] {
        &self.portals
    }

    pub fn world_room(&self, room: u32) -> Option<&AABB> {
        self.world_rooms.get(room as usize)
    }

    /// Expand visible rooms through their doorways. Returns true when a
    /// doorway to the outside was seen.
    ///
    /// A room is expanded again whenever its view grows, so rooms behind it
    /// receive the wider view too. Views only grow by union of projected
    /// doorway extents, which bounds the work.
    fn flood(&self, ctx: &mut ZoneContext<'_>, mut pending: Vec<u32>) -> bool {
        let mut escaped = false;

        while let Some(room) = pending.pop() {
            let Some((frustum, _)) = ctx.zone_view(room) else {
                continue;
            };

            for (portal, quad) in self.portals.iter().zip(&self.world_quads) {
                let Some(side) = portal.opposite(room) else {
                    continue;
                };
                let Some((view, viewport)) = project_portal_quad(ctx.camera(), &frustum, quad) else {
                    continue;
                };
                match side {
                    PortalSide::Zone(next) => {
                        if ctx.mark_zone(next, view, viewport) && !pending.contains(&next) {
                            pending.push(next);
                        }
                    }
                    PortalSide::Outside => {
                        ctx.mark_outside(view, viewport);
                        escaped = true;
                    }
                }
            }
        }
        escaped
    }
}

impl SceneObject for PortalZoneManager {
    fn set_world_transform(&mut self, transform: &Mat4, scale: Vec3) {
        let matrix = *transform * Mat4::from_scale(scale);
        self.world_rooms = self.rooms.iter().map(|room| room.transformed(&matrix)).collect();
        self.world_quads = self
            .portals
            .iter()
            .map(|portal| portal.quad.map(|p| matrix.transform_point3(p)))
            .collect();
        self.world_bounds = self.bounds.transformed(&matrix);
    }

    fn as_zone_manager(&self) -> Option<&dyn ZoneManager> {
        Some(self)
    }
}

impl ZoneManager for PortalZoneManager {
    fn zone_count(&self) -> u32 {
        self.rooms.len() as u32
    }

    fn point_zone(&self, point: Vec3) -> Option<u32> {
        self.world_rooms
            .iter()
            .position(|room| room.contains_point(point))
            .map(|room| room as u32)
    }

    fn overlapping_zones(&self, aabb: &AABB, zones: &mut Vec<u32>) -> bool {
        zones.extend(
            self.world_rooms
                .iter()
                .enumerate()
                .filter(|(_, room)| room.intersects(aabb))
                .map(|(index, _)| index as u32),
        );
        !self.world_bounds.contains(aabb)
    }

    fn manages_further_nesting(&self, ctx: &mut ZoneContext<'_>, start_zone: u32) -> bool {
        self.flood(ctx, vec![start_zone])
    }

    fn setup_zones_from_outside(&self, ctx: &mut ZoneContext<'_>) {
        let Some((outside, _)) = ctx.outside_view() else {
            return;
        };

        let mut entered = Vec::new();
        for (portal, quad) in self.portals.iter().zip(&self.world_quads) {
            let room = match (portal.front, portal.back) {
                (PortalSide::Outside, PortalSide::Zone(room)) | (PortalSide::Zone(room), PortalSide::Outside) => room,
                _ => continue,
            };
            if let Some((view, viewport)) = project_portal_quad(ctx.camera(), &outside, quad) {
                ctx.mark_zone(room, view, viewport);
                entered.push(room);
            }
        }
        self.flood(ctx, entered);
    }
}

#[cfg(test)]
#[path = "portal_zone_tests.rs"]
mod tests;
