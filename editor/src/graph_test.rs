use std::cell::RefCell;
use std::rc::Rc;

use glam::DVec3;

use super::*;
use crate::color::Rgb;
use crate::scene::SceneRegistry;

// =============================================================
// Helpers
// =============================================================

fn make(kind: GeometryKind) -> SceneObject {
    SceneObject::new(kind.default_params(), Material::for_kind(kind, Rgb::WHITE))
}

fn wired() -> (SceneRegistry, Rc<RefCell<RenderGraph>>) {
    let graph = Rc::new(RefCell::new(RenderGraph::new()));
    let mut reg = SceneRegistry::new();
    reg.subscribe(graph.clone());
    (reg, graph)
}

fn same_ids(reg: &SceneRegistry, graph: &RenderGraph) -> bool {
    let reg_ids: Vec<ObjectId> = reg.list().iter().map(|o| o.id).collect();
    reg_ids.iter().copied().eq(graph.nodes().iter().map(|n| n.id))
}

// =============================================================
// Mirroring
// =============================================================

#[test]
fn graph_tracks_adds_and_removes() {
    let (mut reg, graph) = wired();
    let a = reg.add(make(GeometryKind::Cube));
    let b = reg.add(make(GeometryKind::Sphere));
    assert!(same_ids(&reg, &graph.borrow()));

    reg.remove(a);
    assert!(same_ids(&reg, &graph.borrow()));
    assert!(graph.borrow().node(a).is_none());
    assert!(graph.borrow().node(b).is_some());
}

#[test]
fn graph_has_no_orphans_after_mixed_sequence() {
    let (mut reg, graph) = wired();
    let mut ids = Vec::new();
    for (i, kind) in GeometryKind::ALL.iter().cycle().take(10).enumerate() {
        ids.push(reg.add(make(*kind)));
        if i % 3 == 2 {
            let victim = ids.remove(0);
            reg.remove(victim);
        }
        assert!(same_ids(&reg, &graph.borrow()));
    }
    reg.clear();
    assert!(graph.borrow().is_empty());
    reg.add(make(GeometryKind::Plane));
    assert!(same_ids(&reg, &graph.borrow()));
}

#[test]
fn update_rebuilds_node_geometry() {
    let (mut reg, graph) = wired();
    let id = reg.add(make(GeometryKind::Cube));
    reg.update(id, |o| o.position = DVec3::new(4.0, 0.0, 0.0));
    let center = graph.borrow().node(id).map(|n| n.bounds.center());
    let Some(center) = center else {
        panic!("node missing");
    };
    assert!((center - DVec3::new(4.0, 0.0, 0.0)).length() < 1e-9);
}

#[test]
fn update_copies_material() {
    let (mut reg, graph) = wired();
    let id = reg.add(make(GeometryKind::Sphere));
    reg.update(id, |o| o.material.emissive = Rgb::from_hex(0x0033_3333));
    let emissive = graph.borrow().node(id).map(|n| n.material.emissive);
    assert_eq!(emissive, Some(Rgb::new(0x33, 0x33, 0x33)));
}

// =============================================================
// Bounds
// =============================================================

#[test]
fn empty_graph_bounds_are_empty() {
    assert!(RenderGraph::new().bounds().is_empty());
}

#[test]
fn bounds_union_all_nodes() {
    let (mut reg, graph) = wired();
    let a = reg.add(make(GeometryKind::Cube));
    let b = reg.add(make(GeometryKind::Cube));
    reg.update(a, |o| o.position = DVec3::new(-2.0, 0.0, 0.0));
    reg.update(b, |o| o.position = DVec3::new(2.0, 0.0, 0.0));
    let bounds = graph.borrow().bounds();
    assert!((bounds.min.x + 2.5).abs() < 1e-9);
    assert!((bounds.max.x - 2.5).abs() < 1e-9);
    assert!((bounds.max_dimension() - 5.0).abs() < 1e-9);
}

#[test]
fn node_mesh_is_in_world_space() {
    let mut obj = make(GeometryKind::Plane);
    obj.position = DVec3::new(0.0, 0.0, -3.0);
    let node = Node::from_object(&obj);
    assert!(node.mesh.positions.iter().all(|p| (p.z + 3.0).abs() < 1e-9));
    assert_eq!(node.kind, GeometryKind::Plane);
}
