use glam::{Mat4, Quat, Vec3};
use crate::scene::AABB;
use super::*;
use super::super::{ViewFrustum, Viewport};

fn create_test_viewport() -> Viewport {
    Viewport::new(0.0, 0.0, 1920.0, 1080.0)
}

fn create_test_view_frustum() -> ViewFrustum {
    ViewFrustum::perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0)
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_camera_new_derives_matrices() {
    let transform = Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0));
    let camera = Camera::new(transform, create_test_view_frustum(), create_test_viewport());

    assert_eq!(*camera.transform(), transform);
    assert_eq!(*camera.view_matrix(), transform.inverse());
    assert_eq!(*camera.projection_matrix(), create_test_view_frustum().projection_matrix());
    assert_eq!(camera.viewport().width, 1920.0);
    assert_eq!(camera.position(), Vec3::new(0.0, 0.0, 5.0));
    assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-6);
}

#[test]
fn test_view_projection_matrix() {
    let transform = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    let camera = Camera::new(transform, create_test_view_frustum(), create_test_viewport());
    let expected = *camera.projection_matrix() * *camera.view_matrix();
    assert_eq!(camera.view_projection_matrix(), expected);
}

#[test]
fn test_world_frustum_follows_rotation() {
    // Looking down +X
    let transform = Mat4::from_quat(Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2));
    let camera = Camera::new(transform, create_test_view_frustum(), create_test_viewport());

    assert!((camera.forward() - Vec3::X).length() < 1e-5);
    let ahead = AABB::from_center(Vec3::new(10.0, 0.0, 0.0), Vec3::ONE);
    let behind = AABB::from_center(Vec3::new(-10.0, 0.0, 0.0), Vec3::ONE);
    assert!(camera.frustum().intersects_aabb(&ahead));
    assert!(!camera.frustum().intersects_aabb(&behind));
}

#[test]
fn test_mirrored_transform() {
    let plain = Camera::new(Mat4::IDENTITY, create_test_view_frustum(), create_test_viewport());
    assert!(!plain.is_mirrored());

    let mirrored = Camera::new(
        Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0)),
        create_test_view_frustum(),
        create_test_viewport(),
    );
    assert!(mirrored.is_mirrored());
}

// ============================================================================
// Sub-views
// ============================================================================

#[test]
fn test_with_view_keeps_transform() {
    let transform = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));
    let camera = Camera::new(transform, create_test_view_frustum(), create_test_viewport());

    let narrow = ViewFrustum::new(0.0, 0.1, -0.1, 0.1, 0.1, 100.0);
    let sub_viewport = Viewport::new(960.0, 0.0, 960.0, 1080.0);
    let child = camera.with_view(narrow, sub_viewport);

    assert_eq!(*child.transform(), transform);
    assert_eq!(*child.view_frustum(), narrow);
    assert_eq!(*child.viewport(), sub_viewport);

    // Left half of the parent view is outside the narrowed frustum
    let left = AABB::from_center(Vec3::new(-5.0, 1.0, -10.0), Vec3::splat(0.5));
    assert!(camera.frustum().intersects_aabb(&left));
    assert!(!child.frustum().intersects_aabb(&left));
    assert!(!camera.frustum_for(&narrow).intersects_aabb(&left));
}

// ============================================================================
// Setters
// ============================================================================

#[test]
fn test_set_transform_recomputes_frustum() {
    let mut camera = Camera::new(Mat4::IDENTITY, create_test_view_frustum(), create_test_viewport());
    let target = AABB::from_center(Vec3::new(0.0, 0.0, 40.0), Vec3::ONE);
    assert!(!camera.frustum().intersects_aabb(&target));

    camera.set_transform(Mat4::from_quat(Quat::from_rotation_y(std::f32::consts::PI)));
    assert!(camera.frustum().intersects_aabb(&target));
}

#[test]
fn test_set_viewport() {
    let mut camera = Camera::new(Mat4::IDENTITY, create_test_view_frustum(), create_test_viewport());
    let new_viewport = Viewport::new(100.0, 100.0, 800.0, 600.0);
    camera.set_viewport(new_viewport);
    assert_eq!(*camera.viewport(), new_viewport);
}

#[test]
fn test_set_view_frustum() {
    let mut camera = Camera::new(Mat4::IDENTITY, create_test_view_frustum(), create_test_viewport());
    let short = ViewFrustum::perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 5.0);
    camera.set_view_frustum(short);
    assert_eq!(*camera.view_frustum(), short);
    assert!(!camera.frustum().intersects_aabb(&AABB::from_center(Vec3::new(0.0, 0.0, -20.0), Vec3::ONE)));
}
