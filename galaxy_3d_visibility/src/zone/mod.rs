//! Zone module: zones, zone managers and portals.
//!
//! Zone 0 is the outdoor zone. Zone managers (buildings, caves) own contiguous
//! zone ranges and decide which of their zones a pass can see; portal owners
//! (mirrors, teleporters) let the traversal recurse into another viewpoint.

mod mirror;
mod portal;
mod portal_zone;
mod zone_graph;
mod zone_manager;

pub use mirror::MirrorPortal;
pub use portal::{project_portal_quad, reflection_matrix, viewport_for};
pub use portal_zone::{PortalSide, PortalZoneManager, ZonePortal};
pub use zone_graph::{ZoneGraph, OUTDOOR_ZONE};
pub use zone_manager::{PortalOwner, PortalView, ZoneContext, ZoneManager};
