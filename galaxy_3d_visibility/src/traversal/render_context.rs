/// Render context: what an entity sees while it is visited by a pass.
///
/// Handed to `SceneObject::prepare_render_image`. It bundles the traversal state
/// of the pass with the visited entity's key, container state and zones, so the
/// object can test its own visibility, submit a render image and record transform
/// portals without reaching into the container.

use crate::camera::Camera;
use crate::scene::{ObjectKey, AABB};
use crate::spatial::ObjectState;
use super::traversal_state::{TraversalState, TransformPortal};

pub struct RenderContext<'a> {
    traversal: &'a mut TraversalState,
    object: ObjectKey,
    object_state: &'a ObjectState,
    zones: &'a [u32],
    pass_key: u32,
    start_zone: u32,
    modify_base_zone_state: bool,
    force_visible: bool,
}

impl<'a> RenderContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        traversal: &'a mut TraversalState,
        object: ObjectKey,
        object_state: &'a ObjectState,
        zones: &'a [u32],
        pass_key: u32,
        start_zone: u32,
        modify_base_zone_state: bool,
        force_visible: bool,
    ) -> Self {
        Self {
            traversal,
            object,
            object_state,
            zones,
            pass_key,
            start_zone,
            modify_base_zone_state,
            force_visible,
        }
    }

    // ===== GETTERS =====

    pub fn object(&self) -> ObjectKey {
        self.object
    }

    pub fn object_state(&self) -> &ObjectState {
        self.object_state
    }

    pub fn world_box(&self) -> &AABB {
        self.object_state.world_box()
    }

    /// Zones the entity is a tenant of, ascending.
    pub fn zones(&self) -> &[u32] {
        self.zones
    }

    pub fn camera(&self) -> &Camera {
        self.traversal.camera()
    }

    pub fn traversal(&self) -> &TraversalState {
        self.traversal
    }

    pub fn pass_key(&self) -> u32 {
        self.pass_key
    }

    /// Zone the pass started from.
    pub fn start_zone(&self) -> u32 {
        self.start_zone
    }

    /// True when this visit set up the zones of the entity (zone managers
    /// reached from outside).
    pub fn modify_base_zone_state(&self) -> bool {
        self.modify_base_zone_state
    }

    /// True for an entity included regardless of culling (first-person control object).
    pub fn is_force_visible(&self) -> bool {
        self.force_visible
    }

    // ===== VISIBILITY =====

    /// Whether the entity is visible in this pass.
    ///
    /// Global-bounds entities are visible as soon as one of their zones is.
    pub fn is_object_rendered(&mut self) -> bool {
        if self.force_visible {
            return true;
        }
        if self.object_state.is_global_bounds() {
            return self.zones.iter().any(|&zone| self.traversal.is_zone_visible(zone));
        }
        self.traversal.is_box_visible(self.object_state.world_box(), self.zones)
    }

    // ===== SUBMISSION =====

    /// Submit the entity's render image.
    pub fn submit(&mut self, translucent: bool) {
        self.traversal.submit_render_image(
            self.object,
            self.object_state.world_box(),
            self.object_state.is_global_bounds(),
            translucent,
        );
    }

    /// Record portal `portal_index` of this entity, seen from `zone`.
    pub fn insert_transform_portal(&mut self, portal_index: u32, zone: u32) {
        self.traversal.insert_transform_portal(TransformPortal {
            owner: self.object,
            portal_index,
            zone,
        });
    }
}
