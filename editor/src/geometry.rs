//! Geometry factory: primitive kinds, their dimensions, and triangle meshes.
//!
//! Every scene object carries an explicit [`GeometryKind`] tag and a
//! [`GeometryParams`] value holding the primitive's dimensions. Meshes are
//! generated on demand in object-local space; the render graph caches the
//! world-space copy.
//!
//! Triangles wind counter-clockwise when seen from outside the solid, so a
//! positive-area screen projection means the face points at the viewer.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use std::f64::consts::{PI, TAU};
use std::fmt;

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;

/// The kind of primitive an object was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Cube,
    Sphere,
    Cylinder,
    Plane,
}

impl GeometryKind {
    pub const ALL: [Self; 4] = [Self::Cube, Self::Sphere, Self::Cylinder, Self::Plane];

    /// Display label, also used as the name prefix (`"Cube"` → `"Cube_0"`).
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Cube => "Cube",
            Self::Sphere => "Sphere",
            Self::Cylinder => "Cylinder",
            Self::Plane => "Plane",
        }
    }

    /// Parse a lowercase kind name as sent by the host toolbar.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|kind| kind.label().eq_ignore_ascii_case(name))
    }

    /// Default dimensions for a freshly added primitive.
    #[must_use]
    pub fn default_params(self) -> GeometryParams {
        match self {
            Self::Cube => GeometryParams::Cube { size: 1.0 },
            Self::Sphere => GeometryParams::Sphere { radius: 0.5, width_segments: 32, height_segments: 32 },
            Self::Cylinder => GeometryParams::Cylinder { radius: 0.5, height: 1.0, radial_segments: 32 },
            Self::Plane => GeometryParams::Plane { size: 2.0 },
        }
    }

    /// Default roughness of the kind's material.
    #[must_use]
    pub fn default_roughness(self) -> f64 {
        match self {
            Self::Cube => 0.8,
            Self::Sphere => 0.6,
            Self::Cylinder => 0.7,
            Self::Plane => 0.9,
        }
    }

    /// Whether back faces are drawn.
    #[must_use]
    pub fn double_sided(self) -> bool {
        matches!(self, Self::Plane)
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Dimensions of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GeometryParams {
    /// Axis-aligned cube centered at the origin.
    Cube { size: f64 },
    /// UV sphere centered at the origin.
    Sphere { radius: f64, width_segments: u32, height_segments: u32 },
    /// Capped cylinder along Y, centered at the origin.
    Cylinder { radius: f64, height: f64, radial_segments: u32 },
    /// Square in the XY plane facing +Z.
    Plane { size: f64 },
}

impl GeometryParams {
    #[must_use]
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Cube { .. } => GeometryKind::Cube,
            Self::Sphere { .. } => GeometryKind::Sphere,
            Self::Cylinder { .. } => GeometryKind::Cylinder,
            Self::Plane { .. } => GeometryKind::Plane,
        }
    }

    /// Object-local bounding box.
    #[must_use]
    pub fn local_bounds(&self) -> Aabb {
        match *self {
            Self::Cube { size } => Aabb::new(DVec3::splat(-size / 2.0), DVec3::splat(size / 2.0)),
            Self::Sphere { radius, .. } => Aabb::new(DVec3::splat(-radius), DVec3::splat(radius)),
            Self::Cylinder { radius, height, .. } => Aabb::new(
                DVec3::new(-radius, -height / 2.0, -radius),
                DVec3::new(radius, height / 2.0, radius),
            ),
            Self::Plane { size } => Aabb::new(
                DVec3::new(-size / 2.0, -size / 2.0, 0.0),
                DVec3::new(size / 2.0, size / 2.0, 0.0),
            ),
        }
    }

    /// Number of vertices in the primitive's buffer layout (per-face
    /// vertices for the cube, seam-duplicated rings for sphere and cylinder).
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        match *self {
            Self::Cube { .. } => 24,
            Self::Sphere { width_segments, height_segments, .. } => {
                (width_segments as usize + 1) * (height_segments as usize + 1)
            }
            Self::Cylinder { radial_segments, .. } => {
                let r = radial_segments as usize;
                // Torso: two rings. Caps: one center per segment plus a ring each.
                2 * (r + 1) + 2 * (r + r + 1)
            }
            Self::Plane { .. } => 4,
        }
    }

    /// Build the triangle mesh in object-local space.
    #[must_use]
    pub fn mesh(&self) -> Mesh {
        match *self {
            Self::Cube { size } => cube_mesh(size),
            Self::Sphere { radius, width_segments, height_segments } => {
                sphere_mesh(radius, width_segments.max(3), height_segments.max(2))
            }
            Self::Cylinder { radius, height, radial_segments } => {
                cylinder_mesh(radius, height, radial_segments.max(3))
            }
            Self::Plane { size } => plane_mesh(size),
        }
    }
}

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<DVec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Copy with every position transformed by `matrix`.
    #[must_use]
    pub fn transformed(&self, matrix: &DMat4) -> Self {
        Self {
            positions: self.positions.iter().map(|p| matrix.transform_point3(*p)).collect(),
            triangles: self.triangles.clone(),
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.positions.iter().copied())
    }

    /// Triangle corner positions, skipping any triangle with a bad index.
    pub fn triangle_positions(&self) -> impl Iterator<Item = [DVec3; 3]> + '_ {
        self.triangles.iter().filter_map(|tri| {
            let a = *self.positions.get(tri[0] as usize)?;
            let b = *self.positions.get(tri[1] as usize)?;
            let c = *self.positions.get(tri[2] as usize)?;
            Some([a, b, c])
        })
    }

    fn push_vertex(&mut self, p: DVec3) -> u32 {
        let index = u32::try_from(self.positions.len()).unwrap_or(u32::MAX);
        self.positions.push(p);
        index
    }
}

// =============================================================
// Primitive builders
// =============================================================

fn cube_mesh(size: f64) -> Mesh {
    let h = size / 2.0;
    let axes = [DVec3::X, DVec3::Y, DVec3::Z];
    let mut mesh = Mesh::default();

    for axis in 0..3 {
        for sign in [1.0, -1.0] {
            let normal = axes[axis] * sign;
            // (u, v) chosen so that u × v == normal.
            let (u, v) = if sign > 0.0 {
                (axes[(axis + 1) % 3], axes[(axis + 2) % 3])
            } else {
                (axes[(axis + 2) % 3], axes[(axis + 1) % 3])
            };
            let c = normal * h;
            let p0 = mesh.push_vertex(c - u * h - v * h);
            let p1 = mesh.push_vertex(c + u * h - v * h);
            let p2 = mesh.push_vertex(c + u * h + v * h);
            let p3 = mesh.push_vertex(c - u * h + v * h);
            mesh.triangles.push([p0, p1, p2]);
            mesh.triangles.push([p0, p2, p3]);
        }
    }
    mesh
}

fn sphere_mesh(radius: f64, width_segments: u32, height_segments: u32) -> Mesh {
    let mut mesh = Mesh::default();
    let mut grid: Vec<Vec<u32>> = Vec::with_capacity(height_segments as usize + 1);

    for iy in 0..=height_segments {
        let v = f64::from(iy) / f64::from(height_segments);
        let mut row = Vec::with_capacity(width_segments as usize + 1);
        for ix in 0..=width_segments {
            let u = f64::from(ix) / f64::from(width_segments);
            let p = DVec3::new(
                -radius * (u * TAU).cos() * (v * PI).sin(),
                radius * (v * PI).cos(),
                radius * (u * TAU).sin() * (v * PI).sin(),
            );
            row.push(mesh.push_vertex(p));
        }
        grid.push(row);
    }

    for iy in 0..height_segments as usize {
        for ix in 0..width_segments as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            if iy != 0 {
                mesh.triangles.push([a, b, d]);
            }
            if iy != height_segments as usize - 1 {
                mesh.triangles.push([b, c, d]);
            }
        }
    }
    mesh
}

fn cylinder_mesh(radius: f64, height: f64, radial_segments: u32) -> Mesh {
    let mut mesh = Mesh::default();
    let half = height / 2.0;
    let ring = |theta: f64, y: f64| DVec3::new(radius * theta.sin(), y, radius * theta.cos());
    let theta_at = |x: u32| f64::from(x) / f64::from(radial_segments) * TAU;

    // Torso: top ring then bottom ring.
    let top: Vec<u32> = (0..=radial_segments).map(|x| mesh.push_vertex(ring(theta_at(x), half))).collect();
    let bottom: Vec<u32> = (0..=radial_segments).map(|x| mesh.push_vertex(ring(theta_at(x), -half))).collect();
    for x in 0..radial_segments as usize {
        let (a, b, c, d) = (top[x], bottom[x], bottom[x + 1], top[x + 1]);
        mesh.triangles.push([a, b, d]);
        mesh.triangles.push([b, c, d]);
    }

    // Caps.
    for (y, facing_up) in [(half, true), (-half, false)] {
        let centers: Vec<u32> =
            (0..radial_segments).map(|_| mesh.push_vertex(DVec3::new(0.0, y, 0.0))).collect();
        let rim: Vec<u32> = (0..=radial_segments).map(|x| mesh.push_vertex(ring(theta_at(x), y))).collect();
        for x in 0..radial_segments as usize {
            if facing_up {
                mesh.triangles.push([centers[x], rim[x], rim[x + 1]]);
            } else {
                mesh.triangles.push([centers[x], rim[x + 1], rim[x]]);
            }
        }
    }
    mesh
}

fn plane_mesh(size: f64) -> Mesh {
    let h = size / 2.0;
    let mut mesh = Mesh::default();
    let a = mesh.push_vertex(DVec3::new(-h, -h, 0.0));
    let b = mesh.push_vertex(DVec3::new(h, -h, 0.0));
    let c = mesh.push_vertex(DVec3::new(h, h, 0.0));
    let d = mesh.push_vertex(DVec3::new(-h, h, 0.0));
    mesh.triangles.push([a, b, c]);
    mesh.triangles.push([a, c, d]);
    mesh
}
