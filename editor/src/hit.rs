//! Picking: cast a ray against the render graph and report the nearest object.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use glam::DVec3;

use crate::bounds::Aabb;
use crate::camera::Ray;
use crate::graph::RenderGraph;
use crate::scene::ObjectId;

/// Triangles closer to parallel than this are skipped.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Result of a raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub object_id: ObjectId,
    /// Distance along the ray.
    pub distance: f64,
}

/// The nearest node hit by `ray`, if any.
#[must_use]
pub fn raycast(ray: &Ray, graph: &RenderGraph) -> Option<Hit> {
    let mut best: Option<Hit> = None;
    for node in graph.nodes() {
        if !ray_hits_box(ray, &node.bounds) {
            continue;
        }
        for [a, b, c] in node.mesh.triangle_positions() {
            let Some(t) = ray_triangle(ray, a, b, c) else {
                continue;
            };
            if best.is_none_or(|hit| t < hit.distance) {
                best = Some(Hit { object_id: node.id, distance: t });
            }
        }
    }
    best
}

/// Möller–Trumbore intersection. Both faces count.
#[must_use]
pub fn ray_triangle(ray: &Ray, a: DVec3, b: DVec3, c: DVec3) -> Option<f64> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = ray.dir.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = ray.dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(q) * inv_det;
    (t > 0.0).then_some(t)
}

/// Slab test. Empty boxes are never hit.
#[must_use]
pub fn ray_hits_box(ray: &Ray, bounds: &Aabb) -> bool {
    if bounds.is_empty() {
        return false;
    }
    let mut t_min = 0.0_f64;
    let mut t_max = f64::INFINITY;
    for axis in 0..3 {
        let origin = ray.origin[axis];
        let dir = ray.dir[axis];
        let (lo, hi) = (bounds.min[axis], bounds.max[axis]);
        if dir.abs() < PARALLEL_EPSILON {
            if origin < lo || origin > hi {
                return false;
            }
            continue;
        }
        let t1 = (lo - origin) / dir;
        let t2 = (hi - origin) / dir;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
        if t_min > t_max {
            return false;
        }
    }
    true
}
