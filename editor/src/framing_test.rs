use glam::DVec3;

use super::*;

fn unit_cube_at(center: DVec3) -> Aabb {
    Aabb::new(center - DVec3::splat(0.5), center + DVec3::splat(0.5))
}

#[test]
fn fit_distance_formula() {
    let expected = (2.0 / (45.0_f64.to_radians() / 2.0).sin()).abs() * 1.5;
    assert!((fit_distance(2.0, 45.0) - expected).abs() < 1e-12);
}

#[test]
fn empty_bounds_leave_camera_unchanged() {
    let mut cam = Camera::default();
    let before = cam;
    assert!(!frame_bounds(&mut cam, &Aabb::EMPTY, FrameDirection::Diagonal));
    assert_eq!(cam, before);
    assert!(cam.position.is_finite());
}

#[test]
fn zero_and_infinite_extent_are_skipped() {
    let mut cam = Camera::default();
    let before = cam;
    let point = Aabb::new(DVec3::ONE, DVec3::ONE);
    let infinite = Aabb::new(DVec3::ZERO, DVec3::new(f64::INFINITY, 1.0, 1.0));
    assert!(!frame_bounds(&mut cam, &point, FrameDirection::PreserveLook));
    assert!(!frame_bounds(&mut cam, &infinite, FrameDirection::Diagonal));
    assert_eq!(cam, before);
}

#[test]
fn single_object_distance_matches_formula() {
    let mut cam = Camera::default();
    let bounds = unit_cube_at(DVec3::new(1.0, 2.0, 3.0));
    assert!(frame_bounds(&mut cam, &bounds, FrameDirection::Diagonal));
    let expected = fit_distance(1.0, 45.0);
    assert!((cam.distance() - expected).abs() < 1e-9);
    assert_eq!(cam.target, DVec3::new(1.0, 2.0, 3.0));
}

#[test]
fn diagonal_framing_looks_down_the_diagonal() {
    let mut cam = Camera::default();
    cam.look_at(DVec3::new(0.0, 0.0, 9.0), DVec3::ZERO);
    assert!(frame_bounds(&mut cam, &unit_cube_at(DVec3::ZERO), FrameDirection::Diagonal));
    let expected = -DVec3::ONE.normalize();
    assert!((cam.look_direction() - expected).length() < 1e-9);
}

#[test]
fn preserve_look_keeps_orientation() {
    let mut cam = Camera::default();
    cam.look_at(DVec3::new(0.0, 0.0, 9.0), DVec3::ZERO);
    let before = cam.look_direction();
    assert!(frame_bounds(&mut cam, &unit_cube_at(DVec3::new(4.0, 0.0, 0.0)), FrameDirection::PreserveLook));
    assert!((cam.look_direction() - before).length() < 1e-9);
    assert_eq!(cam.target, DVec3::new(4.0, 0.0, 0.0));
}

#[test]
fn preserve_look_with_coincident_eye_falls_back_to_diagonal() {
    let mut cam = Camera::default();
    cam.look_at(DVec3::ZERO, DVec3::ZERO);
    assert!(frame_bounds(&mut cam, &unit_cube_at(DVec3::ZERO), FrameDirection::PreserveLook));
    assert!(cam.position.x > 0.0 && cam.position.y > 0.0 && cam.position.z > 0.0);
}

#[test]
fn flat_plane_is_frameable() {
    let plane = Aabb::new(DVec3::new(-1.0, -1.0, 0.0), DVec3::new(1.0, 1.0, 0.0));
    assert!(is_frameable(&plane));
}
