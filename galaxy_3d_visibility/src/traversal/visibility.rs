/// Visibility traversal: decides what a camera sees, one pass per viewpoint.
///
/// A pass marks the camera's zone visible, walks up through the zone managers
/// the view escapes from, queries the container with the frustum bounds clipped
/// to the traversal root, and visits every candidate depth first (zone owners
/// before their tenants). Transform portals recorded during the pass are then
/// recursed into, each producing a subsidiary state.

use glam::Vec3;
use rustc_hash::FxHashSet;
use crate::camera::Camera;
use crate::scene::{ObjectKey, ObjectTypes, SceneWorld};
use crate::spatial::{QueryRegion, SceneEntity};
use crate::zone::{PortalView, ZoneContext};
use crate::{engine_debug, engine_error, engine_trace};
use super::occlusion::{is_occluded_by_terrain, TerrainOcclusionConfig};
use super::render_context::RenderContext;
use super::traversal_state::{TransformPortal, TraversalState, TraversalStatus};

const SOURCE: &str = "galaxy3d::VisibilityTraversal";

#[derive(Debug, Clone, PartialEq)]
pub struct TraversalConfig {
    /// Portal recursion depth cap (the root pass is depth 0)
    pub max_portal_depth: u32,
    /// Margin added around the query box
    pub query_padding: f32,
    pub occlusion: TerrainOcclusionConfig,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_portal_depth: 4,
            query_padding: 1.0,
            occlusion: TerrainOcclusionConfig::default(),
        }
    }
}

/// One traversal: the camera and what to look for.
#[derive(Debug, Clone)]
pub struct TraversalRequest {
    pub camera: Camera,
    /// Types of entities collected (zone owners are visited regardless)
    pub type_mask: ObjectTypes,
    /// Zone the camera is in; looked up from its position when `None`
    pub start_zone: Option<u32>,
    /// Entity the viewer controls
    pub control_object: Option<ObjectKey>,
    /// Always render the control object in the root pass
    pub first_person: bool,
}

impl TraversalRequest {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            type_mask: ObjectTypes::all(),
            start_zone: None,
            control_object: None,
            first_person: false,
        }
    }

    pub fn with_type_mask(mut self, type_mask: ObjectTypes) -> Self {
        self.type_mask = type_mask;
        self
    }

    pub fn with_start_zone(mut self, zone: u32) -> Self {
        self.start_zone = Some(zone);
        self
    }

    pub fn with_control_object(mut self, object: ObjectKey, first_person: bool) -> Self {
        self.control_object = Some(object);
        self.first_person = first_person;
        self
    }
}

#[derive(Debug, Default)]
pub struct VisibilityTraversal {
    config: TraversalConfig,
}

impl VisibilityTraversal {
    pub fn new(config: TraversalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Run the root pass and every portal pass below it.
    pub fn traverse(&self, world: &mut SceneWorld, request: &TraversalRequest) -> TraversalState {
        let zone_count = world.zones.zone_count();
        let mut start_zone = request
            .start_zone
            .unwrap_or_else(|| world.find_zone(request.camera.position()).1);
        debug_assert!(start_zone < zone_count, "start zone {} out of range", start_zone);
        if start_zone >= zone_count {
            start_zone = 0;
        }

        let mut state = TraversalState::new(request.camera.clone(), zone_count);
        self.run_pass(world, &mut state, start_zone, request);
        engine_trace!(SOURCE, "Traversal from zone {}: {} state(s), {} image(s) in root pass",
            start_zone, state.state_count(), state.render_images().len());
        state
    }

    fn run_pass(&self, world: &mut SceneWorld, state: &mut TraversalState, start_zone: u32, request: &TraversalRequest) {
        let pass_key = world.next_pass_key();
        let (frustum, viewport) = (*state.camera().view_frustum(), *state.camera().viewport());
        state.mark_zone_visible(start_zone, frustum, viewport);

        let mut set_up_inside = FxHashSet::default();
        let root = self.find_traversal_root(world, state, start_zone, &mut set_up_inside);

        let pass = Pass { key: pass_key, start_zone, set_up_inside: &set_up_inside };
        for key in self.query_candidates(world, state, root, request.type_mask) {
            self.visit(world, state, key, &pass);
        }

        if state.depth() == 0 && request.first_person {
            if let Some(control) = request.control_object {
                force_include(world, state, control, &pass);
            }
        }

        self.recurse_portals(world, state, request);
        state.sort_render_images();
    }

    // ===== ROOT WALK =====

    /// Walk up from the start zone while the view escapes its manager.
    ///
    /// Returns the manager bounding the pass (`None` = the whole world).
    fn find_traversal_root(
        &self,
        world: &SceneWorld,
        state: &mut TraversalState,
        start_zone: u32,
        set_up_inside: &mut FxHashSet<ObjectKey>,
    ) -> Option<ObjectKey> {
        let mut zone = start_zone;
        // Each step leaves one manager, so the walk is bounded by the zone count
        for _ in 0..world.zones.zone_count() {
            let owner = world.zones.zone_owner(zone)?;
            let manager = world.container.object(owner).and_then(|o| o.as_zone_manager())?;
            let (first, count) = world.zones.manager_range(owner)?;
            if !check_zone_count(owner, manager.zone_count(), count) {
                return Some(owner);
            }

            set_up_inside.insert(owner);
            let outside: Vec<u32> = world.zones.object_zones(owner).collect();
            let escaped = {
                let mut ctx = ZoneContext::new(state, first, count, &outside);
                manager.manages_further_nesting(&mut ctx, zone - first)
            };
            if !escaped {
                return Some(owner);
            }
            if outside.len() != 1 {
                engine_error!(SOURCE, "Zone manager {:?} lies in {} zones, expected 1", owner, outside.len());
                debug_assert!(false, "zone manager {:?} lies in {} zones, expected 1", owner, outside.len());
                return Some(owner);
            }
            zone = outside[0];
        }
        None
    }

    // ===== CANDIDATES =====

    fn query_candidates(
        &self,
        world: &mut SceneWorld,
        state: &TraversalState,
        root: Option<ObjectKey>,
        mask: ObjectTypes,
    ) -> Vec<ObjectKey> {
        let frustum_box = state.camera().frustum().bounding_box();
        let query_box = match root.and_then(|k| world.container.object_state(k)) {
            Some(root_state) => frustum_box.intersection(root_state.world_box()),
            None => Some(frustum_box),
        };
        let Some(query_box) = query_box else {
            return Vec::new();
        };

        let region = QueryRegion::Box(query_box.expanded(Vec3::splat(self.config.query_padding)));
        let mut candidates = world.container.find_object_keys(&region, mask);
        candidates.retain(|&key| world.container.is_collision_enabled(key));
        candidates
    }

    // ===== VISIT =====

    fn visit(&self, world: &mut SceneWorld, state: &mut TraversalState, key: ObjectKey, pass: &Pass<'_>) {
        if status(world, key, pass.key) != TraversalStatus::Pending {
            return;
        }
        set_status(world, key, pass.key, TraversalStatus::Working);

        let zones: Vec<u32> = world.zones.object_zones(key).collect();
        for &zone in &zones {
            if let Some(owner) = world.zones.zone_owner(zone) {
                if owner != key {
                    self.visit(world, state, owner, pass);
                }
            }
        }

        let mut modify_base_zone_state = false;
        if !pass.set_up_inside.contains(&key) {
            if let (Some((first, count)), Some(manager)) = (
                world.zones.manager_range(key),
                world.container.object(key).and_then(|o| o.as_zone_manager()),
            ) {
                if check_zone_count(key, manager.zone_count(), count) {
                    let mut ctx = ZoneContext::new(state, first, count, &zones);
                    manager.setup_zones_from_outside(&mut ctx);
                    modify_base_zone_state = true;
                }
            }
        }

        if !self.is_occluded(world, state, key, &zones) {
            prepare_render_image(world, state, key, &zones, pass, modify_base_zone_state, false);
        }
        set_status(world, key, pass.key, TraversalStatus::Done);
    }

    fn is_occluded(&self, world: &SceneWorld, state: &TraversalState, key: ObjectKey, zones: &[u32]) -> bool {
        let Some(object_state) = world.container.object_state(key) else {
            return false;
        };
        is_occluded_by_terrain(
            &world.container,
            &self.config.occlusion,
            state.camera().position(),
            key,
            object_state,
            zones,
        )
    }

    // ===== PORTALS =====

    fn recurse_portals(&self, world: &mut SceneWorld, state: &mut TraversalState, request: &TraversalRequest) {
        let portals = state.transform_portals().to_vec();
        if portals.is_empty() {
            return;
        }
        if state.depth() >= self.config.max_portal_depth {
            engine_debug!(SOURCE, "Portal depth {} reached, {} portal(s) not followed",
                self.config.max_portal_depth, portals.len());
            return;
        }

        for portal in &portals {
            let Some((mut child, exit_zone)) = portal_pass(world, state, portal) else {
                continue;
            };
            self.run_pass(world, &mut child, exit_zone, request);
            state.add_subsidiary(child);
        }
    }
}

/// Per-pass data shared by every visit.
struct Pass<'a> {
    key: u32,
    start_zone: u32,
    /// Managers the root walk already set up from inside
    set_up_inside: &'a FxHashSet<ObjectKey>,
}

fn status(world: &SceneWorld, key: ObjectKey, pass_key: u32) -> TraversalStatus {
    match world.container.object_state(key) {
        Some(state) if state.traversal_key == pass_key => state.traversal_status,
        Some(_) => TraversalStatus::Pending,
        None => TraversalStatus::Done,
    }
}

fn set_status(world: &mut SceneWorld, key: ObjectKey, pass_key: u32, status: TraversalStatus) {
    if let Some(entity) = world.container.objects.get_mut(key) {
        entity.state.traversal_key = pass_key;
        entity.state.traversal_status = status;
    }
}

/// A manager must keep the zone count it registered with.
fn check_zone_count(manager: ObjectKey, reported: u32, registered: u32) -> bool {
    if reported == registered {
        return true;
    }
    engine_error!(SOURCE, "Zone manager {:?} reports {} zones, {} registered", manager, reported, registered);
    debug_assert!(false, "zone manager {:?} reports {} zones, {} registered", manager, reported, registered);
    false
}

fn prepare_render_image(
    world: &mut SceneWorld,
    state: &mut TraversalState,
    key: ObjectKey,
    zones: &[u32],
    pass: &Pass<'_>,
    modify_base_zone_state: bool,
    force_visible: bool,
) {
    let Some(SceneEntity { object, state: object_state }) = world.container.objects.get_mut(key) else {
        return;
    };
    let mut ctx = RenderContext::new(
        state,
        key,
        object_state,
        zones,
        pass.key,
        pass.start_zone,
        modify_base_zone_state,
        force_visible,
    );
    object.prepare_render_image(&mut ctx);
}

/// Render the first-person control object even when culled.
fn force_include(world: &mut SceneWorld, state: &mut TraversalState, control: ObjectKey, pass: &Pass<'_>) {
    if !world.container.contains(control) || state.render_images().iter().any(|i| i.object == control) {
        return;
    }
    let zones: Vec<u32> = world.zones.object_zones(control).collect();
    prepare_render_image(world, state, control, &zones, pass, false, true);
    set_status(world, control, pass.key, TraversalStatus::Done);
}

/// Child state and exit zone for a recorded portal, `None` when it is hidden.
fn portal_pass(world: &SceneWorld, state: &TraversalState, portal: &TransformPortal) -> Option<(TraversalState, u32)> {
    let owner = world.container.object(portal.owner)?.as_portal_owner()?;
    debug_assert!(portal.portal_index < owner.portal_count(), "portal {} out of range", portal.portal_index);

    let zone_frustum = state
        .zone_view(portal.zone)
        .map(|(frustum, _)| frustum)
        .unwrap_or(*state.camera().view_frustum());
    let view = PortalView { camera: state.camera(), frustum: &zone_frustum };
    let (frustum, viewport) = owner.project_portal(portal.portal_index, &view)?;

    let transform = owner.transform_camera(portal.portal_index, state.camera().transform());
    let exit_zone = owner
        .portal_exit_zone(portal.portal_index)
        .and_then(|local| world.zones.manager_range(portal.owner).map(|(first, _)| first + local))
        .unwrap_or(portal.zone);

    let child = TraversalState::new_subsidiary(
        Camera::new(transform, frustum, viewport),
        world.zones.zone_count(),
        *portal,
        owner.portal_clip_plane(portal.portal_index),
        state.depth() + 1,
    );
    Some((child, exit_zone))
}

#[cfg(test)]
#[path = "visibility_tests.rs"]
mod tests;
