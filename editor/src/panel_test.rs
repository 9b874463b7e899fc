#![allow(clippy::float_cmp)]

use super::*;
use crate::geometry::GeometryKind;
use crate::scene::Material;

fn make(kind: GeometryKind) -> SceneObject {
    SceneObject::new(kind.default_params(), Material::for_kind(kind, Rgb::new(10, 20, 30)))
}

// =============================================================
// Parsing
// =============================================================

#[test]
fn parse_number_accepts_plain_decimals() {
    assert_eq!(parse_number("3"), Some(3.0));
    assert_eq!(parse_number(" -1.25 "), Some(-1.25));
    assert_eq!(parse_number("1e2"), Some(100.0));
}

#[test]
fn parse_number_rejects_garbage_and_non_finite() {
    assert_eq!(parse_number("abc"), None);
    assert_eq!(parse_number(""), None);
    assert_eq!(parse_number("NaN"), None);
    assert_eq!(parse_number("inf"), None);
}

// =============================================================
// Panel → object
// =============================================================

#[test]
fn invalid_position_falls_back_to_zero_not_previous() {
    let mut obj = make(GeometryKind::Cube);
    obj.position.x = 3.0;
    PanelField::PositionX.apply("abc", &mut obj);
    assert_eq!(obj.position.x, 0.0);
}

#[test]
fn invalid_rotation_falls_back_to_zero() {
    let mut obj = make(GeometryKind::Cube);
    obj.rotation.y = 1.0;
    PanelField::RotationY.apply("", &mut obj);
    assert_eq!(obj.rotation.y, 0.0);
}

#[test]
fn invalid_scale_falls_back_to_one() {
    let mut obj = make(GeometryKind::Cube);
    obj.scale.z = 4.0;
    PanelField::ScaleZ.apply("x", &mut obj);
    assert_eq!(obj.scale.z, 1.0);
}

#[test]
fn rotation_is_entered_in_degrees() {
    let mut obj = make(GeometryKind::Cube);
    PanelField::RotationZ.apply("90", &mut obj);
    assert!((obj.rotation.z - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
}

#[test]
fn fields_write_only_their_axis() {
    let mut obj = make(GeometryKind::Sphere);
    PanelField::PositionY.apply("2.5", &mut obj);
    assert_eq!(obj.position, DVec3::new(0.0, 2.5, 0.0));
    PanelField::ScaleX.apply("3", &mut obj);
    assert_eq!(obj.scale, DVec3::new(3.0, 1.0, 1.0));
}

#[test]
fn color_accepts_hex_and_falls_back_to_white() {
    let mut obj = make(GeometryKind::Cube);
    PanelField::Color.apply("#ff8000", &mut obj);
    assert_eq!(obj.material.color, Rgb::new(255, 128, 0));
    PanelField::Color.apply("orange", &mut obj);
    assert_eq!(obj.material.color, Rgb::WHITE);
}

#[test]
fn material_scalars_clamp_and_fall_back_to_kind_defaults() {
    let mut obj = make(GeometryKind::Cylinder);
    PanelField::Metalness.apply("1.7", &mut obj);
    assert_eq!(obj.material.metalness, 1.0);
    PanelField::Metalness.apply("??", &mut obj);
    assert_eq!(obj.material.metalness, 0.1);
    PanelField::Roughness.apply("-2", &mut obj);
    assert_eq!(obj.material.roughness, 0.0);
    PanelField::Roughness.apply("bad", &mut obj);
    assert_eq!(obj.material.roughness, 0.7);
}

// =============================================================
// Object → panel
// =============================================================

#[test]
fn neutral_defaults() {
    let p = PanelState::neutral();
    assert_eq!(p.position, DVec3::ZERO);
    assert_eq!(p.rotation, DVec3::ZERO);
    assert_eq!(p.scale, DVec3::ONE);
    assert_eq!(p.color, Rgb::WHITE);
    assert_eq!(p.metalness, 0.1);
    assert_eq!(p.roughness, 0.8);
    assert!(p.name.is_empty());
}

#[test]
fn from_object_converts_rotation_to_degrees() {
    let mut obj = make(GeometryKind::Cube);
    obj.rotation = DVec3::new(std::f64::consts::PI, 0.0, -std::f64::consts::FRAC_PI_4);
    let p = PanelState::from_object(&obj);
    assert!((p.rotation.x - 180.0).abs() < 1e-9);
    assert!((p.rotation.z + 45.0).abs() < 1e-9);
    assert_eq!(p.vertex_count, 24);
}

#[test]
fn round_trip_preserves_values() {
    let inputs = [
        (PanelField::PositionX, -12.75),
        (PanelField::PositionZ, 0.001),
        (PanelField::RotationX, 37.5),
        (PanelField::RotationY, -179.9),
        (PanelField::RotationZ, 359.123),
        (PanelField::ScaleY, 0.25),
        (PanelField::Metalness, 0.42),
        (PanelField::Roughness, 0.9),
    ];
    for (field, value) in inputs {
        let mut obj = make(GeometryKind::Sphere);
        field.apply(&value.to_string(), &mut obj);
        let panel = PanelState::from_object(&obj);
        let tolerance = if matches!(field, PanelField::RotationX | PanelField::RotationY | PanelField::RotationZ) {
            1e-3
        } else {
            1e-12
        };
        assert!((panel.value(field) - value).abs() < tolerance, "{field:?}: {}", panel.value(field));
    }
}

#[test]
fn display_formats_per_field() {
    let mut p = PanelState::neutral();
    p.position.x = 1.0 / 3.0;
    p.rotation.y = 12.345;
    p.scale.z = 2.0;
    p.color = Rgb::new(0xAB, 0xCD, 0xEF);
    assert_eq!(p.display(PanelField::PositionX), "0.33");
    assert_eq!(p.display(PanelField::RotationY), "12.3");
    assert_eq!(p.display(PanelField::ScaleZ), "2.00");
    assert_eq!(p.display(PanelField::Color), "#abcdef");
}

#[test]
fn display_does_not_change_state() {
    let mut p = PanelState::neutral();
    p.position.x = 1.23456;
    let before = p.clone();
    let _text = p.display_fields();
    assert_eq!(p, before);
}

#[test]
fn field_names_round_trip() {
    for field in PanelField::ALL {
        assert_eq!(PanelField::from_name(field.name()), Some(field));
    }
    assert_eq!(PanelField::from_name("position-w"), None);
}
