use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::camera::ViewPreset;
use crate::geometry::GeometryKind;
use crate::scene::{SceneObject, SceneRegistry};

// =============================================================
// Helpers
// =============================================================

fn material(color: Rgb) -> Material {
    Material::for_kind(GeometryKind::Cube, color)
}

fn front_camera() -> Camera {
    let mut cam = Camera::default();
    cam.set_view(ViewPreset::Front);
    cam.set_viewport(800.0, 600.0);
    cam
}

fn graph_of(objects: Vec<SceneObject>) -> (Vec<ObjectId>, Rc<RefCell<RenderGraph>>) {
    let graph = Rc::new(RefCell::new(RenderGraph::new()));
    let mut reg = SceneRegistry::new();
    reg.subscribe(graph.clone());
    let ids = objects.into_iter().map(|o| reg.add(o)).collect();
    (ids, graph)
}

fn object(kind: GeometryKind, position: DVec3) -> SceneObject {
    let mut obj = SceneObject::new(kind.default_params(), Material::for_kind(kind, Rgb::new(128, 128, 128)));
    obj.position = position;
    obj
}

// =============================================================
// Shading
// =============================================================

#[test]
fn lit_side_is_brighter_than_shadow_side() {
    let m = material(Rgb::new(100, 100, 100));
    let light = DVec3::from_array(KEY_LIGHT_POSITION).normalize();
    let lit = shade(&m, light, light);
    let dark = shade(&m, -light, -light);
    assert!(lit.r > dark.r);
}

#[test]
fn shadow_side_gets_ambient_only() {
    let mut m = material(Rgb::new(200, 100, 50));
    m.metalness = 0.0;
    m.roughness = 1.0;
    let light = DVec3::from_array(KEY_LIGHT_POSITION).normalize();
    let c = shade(&m, -light, -light);
    assert_eq!(c, Rgb::from_unit(200.0 / 255.0 * 0.6, 100.0 / 255.0 * 0.6, 50.0 / 255.0 * 0.6));
}

#[test]
fn emissive_adds_highlight() {
    let mut m = material(Rgb::new(100, 100, 100));
    let light = DVec3::from_array(KEY_LIGHT_POSITION).normalize();
    let plain = shade(&m, -light, -light);
    m.emissive = Rgb::from_hex(0x0033_3333);
    let highlighted = shade(&m, -light, -light);
    assert!(highlighted.r > plain.r && highlighted.g > plain.g && highlighted.b > plain.b);
}

#[test]
fn shading_saturates_at_white() {
    let mut m = material(Rgb::WHITE);
    m.emissive = Rgb::WHITE;
    let light = DVec3::from_array(KEY_LIGHT_POSITION).normalize();
    assert_eq!(shade(&m, light, light), Rgb::WHITE);
}

// =============================================================
// Face building
// =============================================================

#[test]
fn empty_graph_has_no_faces() {
    assert!(build_faces(&RenderGraph::new(), &front_camera(), 800.0, 600.0).is_empty());
}

#[test]
fn cube_from_front_shows_one_face() {
    let (ids, graph) = graph_of(vec![object(GeometryKind::Cube, DVec3::ZERO)]);
    let faces = build_faces(&graph.borrow(), &front_camera(), 800.0, 600.0);
    assert_eq!(faces.len(), 2);
    assert!(faces.iter().all(|f| f.id == ids[0] && !f.wireframe));
}

#[test]
fn wireframe_keeps_back_faces() {
    let mut cube = object(GeometryKind::Cube, DVec3::ZERO);
    cube.material.wireframe = true;
    let (_, graph) = graph_of(vec![cube]);
    let faces = build_faces(&graph.borrow(), &front_camera(), 800.0, 600.0);
    assert!(faces.len() > 2);
    assert!(faces.iter().all(|f| f.wireframe));
}

#[test]
fn plane_is_visible_from_behind() {
    let mut cam = front_camera();
    cam.look_at(DVec3::new(0.0, 0.0, -5.0), DVec3::ZERO);
    let (_, graph) = graph_of(vec![object(GeometryKind::Plane, DVec3::ZERO)]);
    assert_eq!(build_faces(&graph.borrow(), &cam, 800.0, 600.0).len(), 2);
}

#[test]
fn faces_are_sorted_far_to_near() {
    let (ids, graph) = graph_of(vec![
        object(GeometryKind::Cube, DVec3::new(0.0, 0.0, 1.0)),
        object(GeometryKind::Cube, DVec3::new(0.0, 0.0, -3.0)),
    ]);
    let faces = build_faces(&graph.borrow(), &front_camera(), 800.0, 600.0);
    assert!(faces.windows(2).all(|w| w[0].depth >= w[1].depth));
    assert_eq!(faces.first().map(|f| f.id), Some(ids[1]));
    assert_eq!(faces.last().map(|f| f.id), Some(ids[0]));
}

#[test]
fn objects_behind_camera_are_dropped() {
    let (_, graph) = graph_of(vec![object(GeometryKind::Sphere, DVec3::new(0.0, 0.0, 20.0))]);
    assert!(build_faces(&graph.borrow(), &front_camera(), 800.0, 600.0).is_empty());
}

// =============================================================
// Helpers geometry
// =============================================================

#[test]
fn grid_has_two_lines_per_division_and_one_center_pair() {
    let lines = grid_lines();
    assert_eq!(lines.len(), 42);
    assert_eq!(lines.iter().filter(|(_, _, center)| *center).count(), 2);
    assert!(lines.iter().all(|(a, b, _)| a.y == 0.0 && b.y == 0.0));
}

#[test]
fn segment_crossing_near_plane_is_clipped() {
    let cam = front_camera();
    let seg = project_segment(&cam, DVec3::ZERO, DVec3::new(0.0, 0.0, 50.0), 800.0, 600.0);
    let Some((a, b)) = seg else {
        panic!("segment should be partly visible");
    };
    assert!(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite());
}

#[test]
fn segment_fully_behind_is_dropped() {
    let cam = front_camera();
    assert!(project_segment(&cam, DVec3::new(0.0, 0.0, 6.0), DVec3::new(1.0, 0.0, 9.0), 800.0, 600.0).is_none());
}

#[test]
fn render_mode_toggle_and_names() {
    assert_eq!(RenderMode::Solid.toggled(), RenderMode::Wireframe);
    assert_eq!(RenderMode::Wireframe.toggled(), RenderMode::Solid);
    assert_eq!(RenderMode::from_name("wireframe"), Some(RenderMode::Wireframe));
    assert_eq!(RenderMode::from_name("points"), None);
}
