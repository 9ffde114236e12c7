use glam::{Mat4, Vec3};
use crate::camera::{Camera, ViewFrustum, Viewport};
use crate::scene::{MockObject, ObjectDesc, ObjectKey, ObjectTypes, Polyhedron, AABB};
use super::*;
use super::super::ContainerConfig;

fn make_container(bin_count: u32) -> SpatialContainer {
    SpatialContainer::new(ContainerConfig { bin_size: 64.0, bin_count }).unwrap()
}

fn add_box(container: &mut SpatialContainer, min: Vec3, max: Vec3) -> ObjectKey {
    container.add_object(
        Box::new(MockObject::new("box")),
        ObjectDesc::new(AABB::new(min, max), ObjectTypes::STATIC_SHAPE),
    )
}

fn query(container: &mut SpatialContainer, min: Vec3, max: Vec3) -> Vec<ObjectKey> {
    let mut keys = container.find_object_keys(&QueryRegion::Box(AABB::new(min, max)), ObjectTypes::all());
    keys.sort();
    keys
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_new_rejects_invalid_config() {
    assert!(SpatialContainer::new(ContainerConfig { bin_size: -1.0, bin_count: 4 }).is_err());
    assert!(SpatialContainer::new(ContainerConfig { bin_size: 8.0, bin_count: 0 }).is_err());
}

#[test]
fn test_new_container_is_empty() {
    let container = make_container(10);
    assert!(container.is_empty());
    assert_eq!(container.stats(), ContainerStats::default());
    assert_eq!(container.config().bin_count, 10);
}

// ============================================================================
// Add / remove
// ============================================================================

#[test]
fn test_add_computes_world_box() {
    let mut container = make_container(10);
    let key = container.add_object(
        Box::new(MockObject::new("scaled")),
        ObjectDesc::new(AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0)), ObjectTypes::ITEM)
            .with_position(Vec3::new(100.0, 0.0, 0.0))
            .with_scale(Vec3::new(2.0, 1.0, 1.0)),
    );
    let state = container.object_state(key).unwrap();
    assert_eq!(state.world_box().min, Vec3::new(98.0, -1.0, -1.0));
    assert_eq!(state.world_box().max, Vec3::new(102.0, 1.0, 1.0));
    assert_eq!(state.world_sphere().0, Vec3::new(100.0, 0.0, 0.0));
    assert!(state.is_collision_enabled());
    // Y straddles the wrap at 0: rows 9 and 0
    assert_eq!(container.object_bins(key), vec![1, 91]);
}

#[test]
fn test_remove_unlinks_every_bin() {
    let mut container = make_container(10);
    let key = add_box(&mut container, Vec3::new(0.0, 0.0, 0.0), Vec3::new(200.0, 200.0, 1.0));
    assert_eq!(container.object_bins(key).len(), 16);

    assert!(container.remove_object(key).is_some());
    assert!(container.refs.is_empty());
    assert!(!container.contains(key));
    assert!(query(&mut container, Vec3::splat(-1000.0), Vec3::splat(1000.0)).is_empty());
    assert!(container.remove_object(key).is_none());
}

// ============================================================================
// find_objects
// ============================================================================

#[test]
fn test_scenario_10x10_bins() {
    let mut container = make_container(10);
    let key = add_box(&mut container, Vec3::ZERO, Vec3::ONE);

    assert_eq!(query(&mut container, Vec3::splat(-5.0), Vec3::splat(5.0)), vec![key]);
    assert!(query(&mut container, Vec3::splat(1000.0), Vec3::splat(1001.0)).is_empty());
}

#[test]
fn test_wrapped_bin_does_not_report_far_object() {
    let mut container = make_container(10);
    add_box(&mut container, Vec3::ZERO, Vec3::ONE);
    // Same bin after wrapping, far away in world space
    assert!(query(&mut container, Vec3::new(640.0, 640.0, 0.0), Vec3::new(641.0, 641.0, 1.0)).is_empty());
}

#[test]
fn test_global_bounds_always_found() {
    let mut container = make_container(10);
    let global = container.add_object(
        Box::new(MockObject::new("sky")),
        ObjectDesc::new(AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0)), ObjectTypes::ENVIRONMENT)
            .with_global_bounds(),
    );
    let bounded = add_box(&mut container, Vec3::new(5000.0, 5000.0, 0.0), Vec3::new(5001.0, 5001.0, 1.0));

    assert_eq!(*container.object_state(global).unwrap().world_box(), AABB::GLOBAL);
    let found = query(&mut container, Vec3::new(-300.0, 123.0, 7.0), Vec3::new(-299.0, 124.0, 8.0));
    assert_eq!(found, vec![global]);
    assert!(!found.contains(&bounded));
}

#[test]
fn test_type_mask_filters() {
    let mut container = make_container(10);
    let player = container.add_object(
        Box::new(MockObject::new("player")),
        ObjectDesc::new(AABB::new(Vec3::ZERO, Vec3::ONE), ObjectTypes::PLAYER),
    );
    add_box(&mut container, Vec3::ZERO, Vec3::ONE);

    let region = QueryRegion::Box(AABB::new(Vec3::splat(-1.0), Vec3::splat(2.0)));
    assert_eq!(container.find_object_keys(&region, ObjectTypes::PLAYER | ObjectTypes::VEHICLE), vec![player]);
    assert_eq!(container.find_object_keys(&region, ObjectTypes::all()).len(), 2);
    assert!(container.find_object_keys(&region, ObjectTypes::empty()).is_empty());
}

#[test]
fn test_no_double_visit_across_bins() {
    let mut container = make_container(10);
    // Spans nine columns and nine rows
    let key = add_box(&mut container, Vec3::new(0.0, -10.0, 0.0), Vec3::new(520.0, 500.0, 1.0));
    assert_eq!(container.object_bins(key).len(), 81);

    let mut visits = 0;
    container.find_objects(
        &QueryRegion::Box(AABB::new(Vec3::new(-100.0, -100.0, -1.0), Vec3::new(600.0, 600.0, 2.0))),
        ObjectTypes::all(),
        |k, _| {
            assert_eq!(k, key);
            visits += 1;
        },
    );
    assert_eq!(visits, 1);
}

#[test]
fn test_query_is_idempotent() {
    let mut container = make_container(10);
    for i in 0..20 {
        let x = i as f32 * 37.0;
        add_box(&mut container, Vec3::new(x, x * 0.5, 0.0), Vec3::new(x + 10.0, x * 0.5 + 10.0, 1.0));
    }
    let first = query(&mut container, Vec3::new(50.0, 0.0, -1.0), Vec3::new(400.0, 300.0, 2.0));
    let second = query(&mut container, Vec3::new(50.0, 0.0, -1.0), Vec3::new(400.0, 300.0, 2.0));
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_query_key_wrap_resets_stamps() {
    let mut container = make_container(4);
    let key = add_box(&mut container, Vec3::ZERO, Vec3::ONE);
    container.query_key = u32::MAX - 1;

    for _ in 0..3 {
        assert_eq!(query(&mut container, Vec3::splat(-1.0), Vec3::splat(2.0)), vec![key]);
    }
    assert_eq!(container.query_key, 2);
}

#[test]
fn test_frustum_query() {
    let mut container = make_container(10);
    let ahead = add_box(&mut container, Vec3::new(-1.0, -1.0, -30.0), Vec3::new(1.0, 1.0, -28.0));
    let behind = add_box(&mut container, Vec3::new(-1.0, -1.0, 28.0), Vec3::new(1.0, 1.0, 30.0));

    let camera = Camera::new(
        Mat4::IDENTITY,
        ViewFrustum::perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0),
        Viewport::new(0.0, 0.0, 640.0, 480.0),
    );
    let keys = container.find_object_keys(&QueryRegion::Frustum(camera.frustum()), ObjectTypes::all());
    assert!(keys.contains(&ahead));
    assert!(!keys.contains(&behind));
}

#[test]
fn test_polyhedron_query() {
    let mut container = make_container(10);
    let inside = add_box(&mut container, Vec3::ZERO, Vec3::ONE);
    add_box(&mut container, Vec3::new(30.0, 0.0, 0.0), Vec3::new(31.0, 1.0, 1.0));

    let poly = Polyhedron::from_box(&AABB::new(Vec3::splat(-2.0), Vec3::splat(2.0))).extruded(Vec3::new(0.0, 10.0, 0.0));
    assert_eq!(container.find_object_keys(&QueryRegion::Polyhedron(&poly), ObjectTypes::all()), vec![inside]);
}

#[test]
fn test_side_list_fast_path() {
    let mut container = make_container(10);
    let water = container.add_object(
        Box::new(MockObject::new("lake")),
        ObjectDesc::new(AABB::new(Vec3::ZERO, Vec3::new(50.0, 50.0, 2.0)), ObjectTypes::WATER),
    );
    add_box(&mut container, Vec3::ZERO, Vec3::ONE);
    let region = QueryRegion::Box(AABB::new(Vec3::splat(-1.0), Vec3::splat(3.0)));

    assert_eq!(container.find_object_keys(&region, ObjectTypes::WATER), vec![water]);
    assert!(container.find_object_keys(&region, ObjectTypes::PHYSICAL_ZONE).is_empty());

    container.remove_object(water);
    assert!(container.find_object_keys(&region, ObjectTypes::WATER).is_empty());
}

// ============================================================================
// Re-binning
// ============================================================================

#[test]
fn test_rebin_stability() {
    let mut container = make_container(10);
    let key = add_box(&mut container, Vec3::ZERO, Vec3::new(10.0, 10.0, 1.0));
    container.reset_stats();

    // Sub-bin move inside bin 0: no bin mutation
    assert!(container.set_transform(key, Mat4::from_translation(Vec3::new(5.0, 5.0, 0.0))));
    assert_eq!(container.stats().bin_inserts, 0);
    assert_eq!(container.stats().bin_removals, 0);

    // Now spans columns 0 and 1: exactly one bin entered
    container.set_transform(key, Mat4::from_translation(Vec3::new(60.0, 5.0, 0.0)));
    assert_eq!(container.stats().bin_inserts, 1);
    assert_eq!(container.stats().bin_removals, 0);
    assert_eq!(container.object_bins(key), vec![0, 1]);

    // Column 1 only: exactly one bin left
    container.set_transform(key, Mat4::from_translation(Vec3::new(70.0, 5.0, 0.0)));
    assert_eq!(container.stats().bin_inserts, 1);
    assert_eq!(container.stats().bin_removals, 1);
    assert_eq!(container.object_bins(key), vec![1]);

    assert_eq!(query(&mut container, Vec3::new(75.0, 6.0, 0.0), Vec3::new(76.0, 7.0, 1.0)), vec![key]);
    assert!(query(&mut container, Vec3::new(1.0, 1.0, 0.0), Vec3::new(2.0, 2.0, 1.0)).is_empty());
}

#[test]
fn test_growing_into_overflow_and_back() {
    let mut container = make_container(4);
    let key = add_box(&mut container, Vec3::ZERO, Vec3::ONE);

    container.set_scale(key, Vec3::new(1000.0, 1000.0, 1.0));
    assert_eq!(container.object_bins(key), vec![container.grid().overflow_bin()]);

    container.set_scale(key, Vec3::ONE);
    assert_eq!(container.object_bins(key), vec![0]);
}

#[test]
fn test_wall_spanning_ring_stays_in_its_row() {
    let mut container = make_container(4);
    let wall = add_box(&mut container, Vec3::new(-1000.0, 10.0, 0.0), Vec3::new(1000.0, 12.0, 1.0));
    assert_eq!(container.object_bins(wall), vec![0, 1, 2, 3]);

    assert_eq!(query(&mut container, Vec3::new(700.0, 9.0, 0.0), Vec3::new(701.0, 11.0, 1.0)), vec![wall]);
    assert!(query(&mut container, Vec3::new(700.0, 100.0, 0.0), Vec3::new(701.0, 101.0, 1.0)).is_empty());
}

#[test]
fn test_set_object_box() {
    let mut container = make_container(10);
    let key = add_box(&mut container, Vec3::ZERO, Vec3::ONE);
    assert!(container.set_object_box(key, AABB::new(Vec3::new(100.0, 0.0, 0.0), Vec3::new(101.0, 1.0, 1.0))));
    assert_eq!(container.object_bins(key), vec![1]);
    assert!(query(&mut container, Vec3::splat(-1.0), Vec3::splat(2.0)).is_empty());
}

#[test]
fn test_mutating_unknown_key_fails() {
    let mut container = make_container(10);
    let key = add_box(&mut container, Vec3::ZERO, Vec3::ONE);
    container.remove_object(key);
    assert!(!container.set_transform(key, Mat4::IDENTITY));
    assert!(!container.set_scale(key, Vec3::ONE));
    assert!(!container.set_object_box(key, AABB::new(Vec3::ZERO, Vec3::ONE)));
}

// ============================================================================
// Collision counter
// ============================================================================

#[test]
fn test_collision_counter_nests() {
    let mut container = make_container(10);
    let key = add_box(&mut container, Vec3::ZERO, Vec3::ONE);

    container.disable_collision(key);
    container.disable_collision(key);
    assert!(!container.is_collision_enabled(key));
    container.enable_collision(key);
    assert!(!container.is_collision_enabled(key));
    container.enable_collision(key);
    assert!(container.is_collision_enabled(key));
}
