use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::color::Rgb;
use crate::geometry::GeometryKind;
use crate::scene::{Material, SceneObject, SceneRegistry};

// =============================================================
// Helpers
// =============================================================

fn ray(origin: DVec3, toward: DVec3) -> Ray {
    Ray { origin, dir: (toward - origin).normalize() }
}

fn scene_with(positions: &[(GeometryKind, DVec3)]) -> (Vec<ObjectId>, Rc<RefCell<RenderGraph>>) {
    let graph = Rc::new(RefCell::new(RenderGraph::new()));
    let mut reg = SceneRegistry::new();
    reg.subscribe(graph.clone());
    let ids = positions
        .iter()
        .map(|(kind, pos)| {
            let mut obj = SceneObject::new(kind.default_params(), Material::for_kind(*kind, Rgb::WHITE));
            obj.position = *pos;
            reg.add(obj)
        })
        .collect();
    (ids, graph)
}

// =============================================================
// Triangle
// =============================================================

#[test]
fn triangle_hit_reports_distance() {
    let r = ray(DVec3::new(0.2, 0.2, 5.0), DVec3::new(0.2, 0.2, 0.0));
    let t = ray_triangle(&r, DVec3::ZERO, DVec3::X, DVec3::Y);
    assert!(t.is_some_and(|t| (t - 5.0).abs() < 1e-12));
}

#[test]
fn triangle_miss_outside_edges() {
    let r = ray(DVec3::new(0.8, 0.8, 5.0), DVec3::new(0.8, 0.8, 0.0));
    assert_eq!(ray_triangle(&r, DVec3::ZERO, DVec3::X, DVec3::Y), None);
}

#[test]
fn triangle_behind_origin_is_ignored() {
    let r = ray(DVec3::new(0.2, 0.2, -5.0), DVec3::new(0.2, 0.2, -10.0));
    assert_eq!(ray_triangle(&r, DVec3::ZERO, DVec3::X, DVec3::Y), None);
}

#[test]
fn parallel_ray_misses() {
    let r = Ray { origin: DVec3::new(0.0, 0.0, 1.0), dir: DVec3::X };
    assert_eq!(ray_triangle(&r, DVec3::ZERO, DVec3::X, DVec3::Y), None);
}

// =============================================================
// Box
// =============================================================

#[test]
fn box_slab_test() {
    let b = Aabb::new(DVec3::splat(-1.0), DVec3::splat(1.0));
    assert!(ray_hits_box(&ray(DVec3::new(0.0, 0.0, 5.0), DVec3::ZERO), &b));
    assert!(!ray_hits_box(&ray(DVec3::new(3.0, 0.0, 5.0), DVec3::new(3.0, 0.0, 0.0)), &b));
    assert!(!ray_hits_box(&ray(DVec3::new(0.0, 0.0, 5.0), DVec3::new(0.0, 0.0, 10.0)), &b));
    assert!(!ray_hits_box(&ray(DVec3::ZERO, DVec3::X), &Aabb::EMPTY));
}

// =============================================================
// Raycast
// =============================================================

#[test]
fn raycast_empty_graph_misses() {
    let graph = RenderGraph::new();
    assert_eq!(raycast(&ray(DVec3::new(0.0, 0.0, 5.0), DVec3::ZERO), &graph), None);
}

#[test]
fn raycast_picks_nearest_object() {
    let (ids, graph) = scene_with(&[
        (GeometryKind::Cube, DVec3::new(0.0, 0.0, -3.0)),
        (GeometryKind::Sphere, DVec3::ZERO),
    ]);
    let hit = raycast(&ray(DVec3::new(0.0, 0.0, 5.0), DVec3::ZERO), &graph.borrow());
    let Some(hit) = hit else {
        panic!("expected a hit");
    };
    assert_eq!(hit.object_id, ids[1]);
    assert!(hit.distance > 4.0 && hit.distance < 5.0);
}

#[test]
fn raycast_hits_far_object_when_near_one_is_off_axis() {
    let (ids, graph) = scene_with(&[
        (GeometryKind::Cube, DVec3::new(0.0, 0.0, -3.0)),
        (GeometryKind::Sphere, DVec3::new(2.0, 0.0, 0.0)),
    ]);
    let hit = raycast(&ray(DVec3::new(0.0, 0.0, 5.0), DVec3::ZERO), &graph.borrow());
    assert_eq!(hit.map(|h| h.object_id), Some(ids[0]));
}

#[test]
fn raycast_hits_plane_from_behind() {
    let (ids, graph) = scene_with(&[(GeometryKind::Plane, DVec3::ZERO)]);
    let hit = raycast(&ray(DVec3::new(0.1, 0.1, -4.0), DVec3::new(0.1, 0.1, 0.0)), &graph.borrow());
    assert_eq!(hit.map(|h| h.object_id), Some(ids[0]));
}
