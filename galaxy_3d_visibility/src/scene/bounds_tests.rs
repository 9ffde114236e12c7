use glam::{Mat4, Quat, Vec3};
use super::*;

fn make_aabb(min: Vec3, max: Vec3) -> AABB {
    AABB { min, max }
}

fn approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < 1e-4
}

// ============================================================================
// AABB
// ============================================================================

#[test]
fn test_aabb_contains() {
    let big = make_aabb(Vec3::splat(-10.0), Vec3::splat(10.0));
    let small = make_aabb(Vec3::splat(-1.0), Vec3::splat(1.0));
    let straddling = make_aabb(Vec3::new(5.0, 5.0, 5.0), Vec3::new(15.0, 15.0, 15.0));

    assert!(big.contains(&small));
    assert!(!small.contains(&big));
    assert!(!big.contains(&straddling));
}

#[test]
fn test_aabb_intersects() {
    let a = make_aabb(Vec3::splat(-2.0), Vec3::splat(2.0));
    let b = make_aabb(Vec3::splat(1.0), Vec3::splat(3.0));
    let c = make_aabb(Vec3::splat(5.0), Vec3::splat(7.0));

    assert!(a.intersects(&b));
    assert!(!a.intersects(&c));
}

#[test]
fn test_aabb_intersection_and_union() {
    let a = make_aabb(Vec3::ZERO, Vec3::splat(4.0));
    let b = make_aabb(Vec3::splat(2.0), Vec3::splat(6.0));

    let i = a.intersection(&b).unwrap();
    assert_eq!(i, make_aabb(Vec3::splat(2.0), Vec3::splat(4.0)));

    let u = a.union(&b);
    assert_eq!(u, make_aabb(Vec3::ZERO, Vec3::splat(6.0)));

    let far = make_aabb(Vec3::splat(10.0), Vec3::splat(11.0));
    assert!(a.intersection(&far).is_none());
}

#[test]
fn test_aabb_transformed_translation() {
    let local = make_aabb(Vec3::splat(-1.0), Vec3::splat(1.0));
    let world = local.transformed(&Mat4::from_translation(Vec3::new(10.0, 0.0, -5.0)));
    assert!(approx(world.min, Vec3::new(9.0, -1.0, -6.0)));
    assert!(approx(world.max, Vec3::new(11.0, 1.0, -4.0)));
}

#[test]
fn test_aabb_transformed_rotation_grows_box() {
    let local = make_aabb(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
    let rot = Mat4::from_quat(Quat::from_rotation_z(std::f32::consts::FRAC_PI_4));
    let world = local.transformed(&rot);
    let expected = 2.0f32.sqrt();
    assert!((world.max.x - expected).abs() < 1e-4);
    assert!((world.min.y + expected).abs() < 1e-4);
}

#[test]
fn test_aabb_scaled_negative() {
    let local = make_aabb(Vec3::new(1.0, 2.0, 3.0), Vec3::new(2.0, 3.0, 4.0));
    let scaled = local.scaled(Vec3::new(-1.0, 2.0, 1.0));
    assert_eq!(scaled.min, Vec3::new(-2.0, 4.0, 3.0));
    assert_eq!(scaled.max, Vec3::new(-1.0, 6.0, 4.0));
}

#[test]
fn test_aabb_validity() {
    assert!(make_aabb(Vec3::ZERO, Vec3::ZERO).is_valid());
    assert!(!make_aabb(Vec3::ONE, Vec3::ZERO).is_valid());
    assert!(!make_aabb(Vec3::splat(f32::NAN), Vec3::ONE).is_valid());
}

#[test]
fn test_aabb_from_points() {
    let points = [Vec3::new(1.0, -2.0, 0.0), Vec3::new(-1.0, 5.0, 3.0), Vec3::ZERO];
    let aabb = AABB::from_points(&points).unwrap();
    assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
    assert_eq!(aabb.max, Vec3::new(1.0, 5.0, 3.0));
    assert!(AABB::from_points(&[]).is_none());
}

#[test]
fn test_aabb_faces_point_outward() {
    let aabb = make_aabb(Vec3::ZERO, Vec3::ONE);
    let center = aabb.center();
    for face in aabb.faces() {
        let normal = (face[1] - face[0]).cross(face[2] - face[0]).normalize();
        let face_center = (face[0] + face[1] + face[2] + face[3]) * 0.25;
        assert!(normal.dot(face_center - center) > 0.0);
    }
}

// ============================================================================
// Ray / sweep
// ============================================================================

#[test]
fn test_ray_hits_front_face() {
    let aabb = make_aabb(Vec3::splat(-1.0), Vec3::splat(1.0));
    let (t, normal) = aabb
        .ray_intersect(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0))
        .unwrap();
    assert!((t - 0.4).abs() < 1e-5);
    assert_eq!(normal, Vec3::new(-1.0, 0.0, 0.0));
}

#[test]
fn test_ray_hits_from_negative_direction() {
    let aabb = make_aabb(Vec3::splat(-1.0), Vec3::splat(1.0));
    let (t, normal) = aabb
        .ray_intersect(Vec3::new(0.0, 0.0, 11.0), Vec3::new(0.0, 0.0, -9.0))
        .unwrap();
    assert!((t - 0.5).abs() < 1e-5);
    assert_eq!(normal, Vec3::Z);
}

#[test]
fn test_ray_misses_and_falls_short() {
    let aabb = make_aabb(Vec3::splat(-1.0), Vec3::splat(1.0));
    assert!(aabb.ray_intersect(Vec3::new(-5.0, 3.0, 0.0), Vec3::new(5.0, 3.0, 0.0)).is_none());
    assert!(aabb.ray_intersect(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(-3.0, 0.0, 0.0)).is_none());
}

#[test]
fn test_ray_starting_inside_hits_at_zero() {
    let aabb = make_aabb(Vec3::splat(-1.0), Vec3::splat(1.0));
    let (t, _) = aabb.ray_intersect(Vec3::new(0.9, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0)).unwrap();
    assert_eq!(t, 0.0);
}

#[test]
fn test_sweep_time_of_impact() {
    let wall = make_aabb(Vec3::new(10.0, -5.0, -5.0), Vec3::new(11.0, 5.0, 5.0));
    let mover = make_aabb(Vec3::splat(-1.0), Vec3::splat(1.0));
    let (t, normal) = wall.sweep_intersect(&mover, Vec3::new(18.0, 0.0, 0.0)).unwrap();
    // Mover's +X face (x = 1) reaches x = 10 after 9 units of 18
    assert!((t - 0.5).abs() < 1e-5);
    assert_eq!(normal, Vec3::new(-1.0, 0.0, 0.0));
}

#[test]
fn test_sweep_overlapping_start_is_immediate() {
    let a = make_aabb(Vec3::ZERO, Vec3::splat(2.0));
    let b = make_aabb(Vec3::splat(1.0), Vec3::splat(3.0));
    let (t, _) = a.sweep_intersect(&b, Vec3::ZERO).unwrap();
    assert_eq!(t, 0.0);
}

#[test]
fn test_sweep_moving_away_misses() {
    let wall = make_aabb(Vec3::new(10.0, -5.0, -5.0), Vec3::new(11.0, 5.0, 5.0));
    let mover = make_aabb(Vec3::splat(-1.0), Vec3::splat(1.0));
    assert!(wall.sweep_intersect(&mover, Vec3::new(-20.0, 0.0, 0.0)).is_none());
    assert!(wall.sweep_intersect(&mover, Vec3::ZERO).is_none());
}

// ============================================================================
// Polyhedron
// ============================================================================

#[test]
fn test_polyhedron_from_box_matches_box() {
    let aabb = make_aabb(Vec3::splat(-2.0), Vec3::splat(2.0));
    let poly = Polyhedron::from_box(&aabb);

    assert_eq!(poly.bounding_box().unwrap(), aabb);
    assert!(poly.contains_point(Vec3::ZERO));
    assert!(!poly.contains_point(Vec3::new(3.0, 0.0, 0.0)));
    assert!(poly.intersects_aabb(&make_aabb(Vec3::splat(1.5), Vec3::splat(5.0))));
    assert!(!poly.intersects_aabb(&make_aabb(Vec3::splat(2.5), Vec3::splat(5.0))));
}

#[test]
fn test_polyhedron_extrusion_contains_swept_positions() {
    let aabb = make_aabb(Vec3::splat(-1.0), Vec3::splat(1.0));
    let velocity = Vec3::new(10.0, 4.0, 0.0);
    let swept = Polyhedron::from_box(&aabb).extruded(velocity);

    for step in 0..=10 {
        let t = step as f32 / 10.0;
        for corner in aabb.corners() {
            assert!(swept.contains_point(corner + velocity * t));
        }
    }
    assert!(!swept.contains_point(Vec3::new(-3.0, 0.0, 0.0)));

    let bounds = swept.bounding_box().unwrap();
    assert_eq!(bounds.min, Vec3::splat(-1.0));
    assert_eq!(bounds.max, Vec3::new(11.0, 5.0, 1.0));
}
