use glam::Mat4;
use crate::camera::{Camera, ViewFrustum, Viewport};
use crate::traversal::TraversalState;
use super::*;

fn create_test_state(zone_count: u32) -> TraversalState {
    let camera = Camera::new(
        Mat4::IDENTITY,
        ViewFrustum::perspective(std::f32::consts::FRAC_PI_2, 1.0, 1.0, 100.0),
        Viewport::new(0.0, 0.0, 100.0, 100.0),
    );
    TraversalState::new(camera, zone_count)
}

fn small_view(left: f32, right: f32) -> (ViewFrustum, Viewport) {
    (
        ViewFrustum::new(left, right, -0.1, 0.1, 1.0, 100.0),
        Viewport::new(50.0 * (left + 1.0), 45.0, 50.0 * (right - left), 10.0),
    )
}

#[test]
fn test_context_maps_local_zones() {
    let mut state = create_test_state(6);
    let outside = [0];
    {
        let mut ctx = ZoneContext::new(&mut state, 3, 2, &outside);
        assert_eq!(ctx.first_zone(), 3);
        let (frustum, viewport) = small_view(-0.5, 0.5);
        assert!(ctx.mark_zone(1, frustum, viewport));
        assert!(!ctx.mark_zone(1, frustum, viewport));
        assert!(ctx.is_zone_visible(1));
        assert!(!ctx.is_zone_visible(0));
        assert_eq!(ctx.zone_view(1).unwrap().0, frustum);
    }
    assert!(state.is_zone_visible(4));
    assert!(!state.is_zone_visible(3));
}

#[test]
fn test_context_outside_view_is_union() {
    let mut state = create_test_state(4);
    let (f1, v1) = small_view(-0.8, -0.4);
    let (f2, v2) = small_view(0.2, 0.6);
    state.mark_zone_visible(0, f1, v1);
    state.mark_zone_visible(2, f2, v2);

    let outside = [0, 1, 2];
    let ctx = ZoneContext::new(&mut state, 3, 1, &outside);
    let (frustum, viewport) = ctx.outside_view().unwrap();
    assert_eq!(frustum.left, -0.8);
    assert_eq!(frustum.right, 0.6);
    assert!((viewport.width - 70.0).abs() < 1e-4);
}

#[test]
fn test_context_mark_outside() {
    let mut state = create_test_state(4);
    let outside = [0, 2];
    {
        let mut ctx = ZoneContext::new(&mut state, 3, 1, &outside);
        assert!(ctx.outside_view().is_none());
        let (frustum, viewport) = small_view(-0.5, 0.5);
        assert!(ctx.mark_outside(frustum, viewport));
        assert!(!ctx.mark_outside(frustum, viewport));
    }
    assert!(state.is_zone_visible(0));
    assert!(!state.is_zone_visible(1));
    assert!(state.is_zone_visible(2));
}
