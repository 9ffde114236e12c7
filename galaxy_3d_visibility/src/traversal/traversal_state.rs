/// Traversal state: result of one visibility pass.
///
/// A state owns the camera of its pass, one `ZoneState` per zone, the render
/// images submitted during the pass and the transform portals recorded for
/// recursion. Each portal crossing produces a subsidiary state owned by its
/// parent, so a whole frame is one tree and dropping the root drops it all.

use glam::{Vec3, Vec4};
use crate::camera::{Camera, ViewFrustum, Viewport};
use crate::scene::{ObjectKey, AABB};

/// Per-pass visit status of an entity (valid while its traversal key matches).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalStatus {
    Pending,
    Working,
    Done,
}

// ===== ZONE STATE =====

/// Visibility of one zone within a pass.
#[derive(Debug, Clone, Copy)]
pub struct ZoneState {
    render: bool,
    frustum: ViewFrustum,
    viewport: Viewport,
    clip_planes_valid: bool,
    clip_planes: [Vec4; 6],
}

impl ZoneState {
    fn hidden(frustum: ViewFrustum, viewport: Viewport) -> Self {
        Self {
            render: false,
            frustum,
            viewport,
            clip_planes_valid: false,
            clip_planes: [Vec4::ZERO; 6],
        }
    }

    pub fn is_rendered(&self) -> bool {
        self.render
    }

    /// View-space extents through which the zone is seen.
    pub fn frustum(&self) -> &ViewFrustum {
        &self.frustum
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn clip_planes_valid(&self) -> bool {
        self.clip_planes_valid
    }
}

// ===== SUBMISSIONS =====

/// One submitted render image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderImage {
    pub object: ObjectKey,
    /// Squared distance from the camera to the world box centre
    pub distance_sq: f32,
    pub translucent: bool,
}

/// A portal recorded during a pass, recursed into once the pass is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformPortal {
    /// Entity implementing `PortalOwner`
    pub owner: ObjectKey,
    pub portal_index: u32,
    /// Zone the portal is seen from
    pub zone: u32,
}

// ===== TRAVERSAL STATE =====

#[derive(Debug)]
pub struct TraversalState {
    camera: Camera,
    zone_states: Vec<ZoneState>,
    render_images: Vec<RenderImage>,
    transform_portals: Vec<TransformPortal>,
    subsidiaries: Vec<TraversalState>,
    portal: Option<TransformPortal>,
    portal_clip_plane: Option<Vec4>,
    flip_cull: bool,
    depth: u32,
}

impl TraversalState {
    /// Root state for a camera. Every zone starts hidden.
    pub fn new(camera: Camera, zone_count: u32) -> Self {
        let zone_states = vec![ZoneState::hidden(*camera.view_frustum(), *camera.viewport()); zone_count as usize];
        Self {
            flip_cull: camera.is_mirrored(),
            camera,
            zone_states,
            render_images: Vec::new(),
            transform_portals: Vec::new(),
            subsidiaries: Vec::new(),
            portal: None,
            portal_clip_plane: None,
            depth: 0,
        }
    }

    /// State of a pass seen through `portal`.
    pub(crate) fn new_subsidiary(
        camera: Camera,
        zone_count: u32,
        portal: TransformPortal,
        portal_clip_plane: Option<Vec4>,
        depth: u32,
    ) -> Self {
        let mut state = Self::new(camera, zone_count);
        state.portal = Some(portal);
        state.portal_clip_plane = portal_clip_plane;
        state.depth = depth;
        state
    }

    // ===== GETTERS =====

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Recursion depth (0 for the root pass).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Cull faces reversed (mirrored camera).
    pub fn flip_cull(&self) -> bool {
        self.flip_cull
    }

    /// Portal this pass looks through (`None` for the root pass).
    pub fn portal(&self) -> Option<&TransformPortal> {
        self.portal.as_ref()
    }

    pub fn portal_clip_plane(&self) -> Option<Vec4> {
        self.portal_clip_plane
    }

    pub fn zone_count(&self) -> u32 {
        self.zone_states.len() as u32
    }

    pub fn zone_state(&self, zone: u32) -> Option<&ZoneState> {
        self.zone_states.get(zone as usize)
    }

    // ===== ZONES =====

    /// Mark a zone visible through `frustum` / `viewport`.
    ///
    /// A zone that is already visible grows to the union of both views.
    /// Returns true when the zone was hidden or its view grew.
    pub fn mark_zone_visible(&mut self, zone: u32, frustum: ViewFrustum, viewport: Viewport) -> bool {
        let Some(state) = self.zone_states.get_mut(zone as usize) else {
            debug_assert!(false, "zone {} out of range", zone);
            return false;
        };
        if !state.render {
            state.render = true;
            state.frustum = frustum;
            state.viewport = viewport;
            state.clip_planes_valid = false;
            return true;
        }

        let grown = state.frustum.union(&frustum);
        if grown == state.frustum {
            return false;
        }
        state.frustum = grown;
        state.viewport = state.viewport.union(&viewport);
        state.clip_planes_valid = false;
        true
    }

    pub fn is_zone_visible(&self, zone: u32) -> bool {
        self.zone_states.get(zone as usize).is_some_and(|s| s.render)
    }

    /// (frustum, viewport) of a visible zone.
    pub fn zone_view(&self, zone: u32) -> Option<(ViewFrustum, Viewport)> {
        self.zone_states
            .get(zone as usize)
            .filter(|s| s.render)
            .map(|s| (s.frustum, s.viewport))
    }

    /// World-space clip planes of a zone, computed once per pass.
    fn clip_planes(&mut self, zone: u32) -> Option<[Vec4; 6]> {
        let state = self.zone_states.get_mut(zone as usize).filter(|s| s.render)?;
        if !state.clip_planes_valid {
            state.clip_planes = self.camera.frustum_for(&state.frustum).planes;
            state.clip_planes_valid = true;
        }
        Some(state.clip_planes)
    }

    /// True when `aabb` is inside the portal clip plane and inside the clip
    /// planes of at least one visible zone in `zones`.
    pub fn is_box_visible(&mut self, aabb: &AABB, zones: &[u32]) -> bool {
        if let Some(plane) = self.portal_clip_plane {
            if !box_on_positive_side(aabb, plane) {
                return false;
            }
        }
        zones.iter().any(|&zone| {
            self.clip_planes(zone)
                .is_some_and(|planes| planes.iter().all(|&plane| box_on_positive_side(aabb, plane)))
        })
    }

    // ===== SUBMISSIONS =====

    pub fn submit_render_image(&mut self, object: ObjectKey, world_box: &AABB, global_bounds: bool, translucent: bool) {
        let distance_sq = if global_bounds {
            f32::MAX
        } else {
            world_box.center().distance_squared(self.camera.position())
        };
        self.render_images.push(RenderImage { object, distance_sq, translucent });
    }

    pub fn render_images(&self) -> &[RenderImage] {
        &self.render_images
    }

    /// Record a portal to recurse into. Duplicates are ignored.
    pub fn insert_transform_portal(&mut self, portal: TransformPortal) {
        if !self.transform_portals.contains(&portal) {
            self.transform_portals.push(portal);
        }
    }

    pub fn transform_portals(&self) -> &[TransformPortal] {
        &self.transform_portals
    }

    /// Opaque images near to far, then translucent images far to near.
    pub fn sort_render_images(&mut self) {
        self.render_images.sort_by(|a, b| match (a.translucent, b.translucent) {
            (false, true) => std::cmp::Ordering::Less,
            (true, false) => std::cmp::Ordering::Greater,
            (false, false) => a.distance_sq.total_cmp(&b.distance_sq),
            (true, true) => b.distance_sq.total_cmp(&a.distance_sq),
        });
    }

    // ===== TREE =====

    pub fn subsidiaries(&self) -> &[TraversalState] {
        &self.subsidiaries
    }

    pub(crate) fn add_subsidiary(&mut self, state: TraversalState) {
        self.subsidiaries.push(state);
    }

    /// Every state of the tree, children before their parent (depth first).
    pub fn render_order(&self) -> Vec<&TraversalState> {
        let mut order = Vec::with_capacity(self.state_count());
        self.collect_post_order(&mut order);
        order
    }

    fn collect_post_order<'a>(&'a self, order: &mut Vec<&'a TraversalState>) {
        for child in &self.subsidiaries {
            child.collect_post_order(order);
        }
        order.push(self);
    }

    /// Entities submitted by this pass, in submission order, each once.
    pub fn visible_objects(&self) -> Vec<ObjectKey> {
        let mut objects: Vec<ObjectKey> = Vec::with_capacity(self.render_images.len());
        for image in &self.render_images {
            if !objects.contains(&image.object) {
                objects.push(image.object);
            }
        }
        objects
    }

    /// Number of states in the tree (this one included).
    pub fn state_count(&self) -> usize {
        1 + self.subsidiaries.iter().map(|s| s.state_count()).sum::<usize>()
    }

    /// Deepest recursion depth in the tree.
    pub fn max_depth(&self) -> u32 {
        self.subsidiaries.iter().map(|s| s.max_depth()).max().unwrap_or(self.depth)
    }
}

/// P-vertex test: false when the box lies entirely on the negative side.
pub(crate) fn box_on_positive_side(aabb: &AABB, plane: Vec4) -> bool {
    let normal = plane.truncate();
    let p = Vec3::select(normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
    normal.dot(p) + plane.w >= 0.0
}

#[cfg(test)]
#[path = "traversal_state_tests.rs"]
mod tests;
