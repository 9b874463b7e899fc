//! Rendering: draws the render graph to a 2D canvas context.
//!
//! Rasterization is a painter's algorithm. [`build_faces`] projects every
//! node's world-space triangles through the camera, culls back faces, shades
//! each triangle flat and sorts far-to-near. That part is pure and tested
//! without a browser. [`draw`] then paints the background, the grid and axes
//! helpers and the sorted faces onto a [`CanvasRenderingContext2d`].
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::{Camera, Point};
use crate::color::Rgb;
use crate::consts::{
    AMBIENT_INTENSITY, AXES_LENGTH, GRID_CENTER_COLOR, GRID_COLOR, GRID_DIVISIONS, GRID_SIZE, KEY_LIGHT_INTENSITY,
    KEY_LIGHT_POSITION,
};
use crate::graph::RenderGraph;
use crate::scene::{Material, ObjectId};

/// Axis helper colors: X red, Y green, Z blue.
const AXIS_COLORS: [&str; 3] = ["#ff0000", "#00ff00", "#0000ff"];

/// Faint edge stroke on solid faces to hide seams between triangles.
const SEAM_STROKE_WIDTH: f64 = 0.5;

/// Solid or wireframe drawing for every object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Solid,
    Wireframe,
}

impl RenderMode {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "solid" => Some(Self::Solid),
            "wireframe" => Some(Self::Wireframe),
            _ => None,
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Solid => Self::Wireframe,
            Self::Wireframe => Self::Solid,
        }
    }
}

/// What to draw besides the objects.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy)]
pub struct DrawOptions {
    /// Surface size in CSS pixels.
    pub width: f64,
    pub height: f64,
    /// Device pixel ratio of the backing store.
    pub dpr: f64,
    /// Fill color, or `None` to leave the surface transparent.
    pub background: Option<Rgb>,
    pub show_grid: bool,
    pub show_axes: bool,
}

/// One projected, shaded triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub id: ObjectId,
    pub points: [Point; 3],
    /// Mean eye distance of the corners; larger is farther.
    pub depth: f64,
    pub fill: Rgb,
    pub wireframe: bool,
}

/// Unit vector toward the key light.
fn key_light_dir() -> DVec3 {
    DVec3::from_array(KEY_LIGHT_POSITION).normalize()
}

/// Flat-shaded color of a surface with unit `normal`, seen along `to_eye`.
///
/// Ambient plus Lambert diffuse from the key light, a roughness-controlled
/// highlight, then the emissive term on top. Metalness darkens the diffuse
/// part.
#[must_use]
pub fn shade(material: &Material, normal: DVec3, to_eye: DVec3) -> Rgb {
    let light = key_light_dir();
    let n_dot_l = normal.dot(light).max(0.0);
    let diffuse = (AMBIENT_INTENSITY + KEY_LIGHT_INTENSITY * n_dot_l) * (1.0 - 0.5 * material.metalness);

    let half = (light + to_eye).normalize_or_zero();
    let gloss = 1.0 - material.roughness.clamp(0.0, 1.0);
    let shininess = 2.0 + gloss * 62.0;
    let specular = KEY_LIGHT_INTENSITY * gloss * gloss * normal.dot(half).max(0.0).powf(shininess);

    let base = material.color.to_unit();
    let emissive = material.emissive.to_unit();
    let channel = |i: usize| base[i] * diffuse + specular + emissive[i];
    Rgb::from_unit(channel(0), channel(1), channel(2))
}

/// Project and shade every visible triangle, sorted far-to-near.
///
/// Triangles with a corner behind the near plane are dropped. Back faces
/// are culled unless the material is double-sided or drawn as wireframe.
#[must_use]
pub fn build_faces(graph: &RenderGraph, camera: &Camera, width: f64, height: f64) -> Vec<Face> {
    let mut faces = Vec::new();
    for node in graph.nodes() {
        let wireframe = node.material.wireframe;
        for [a, b, c] in node.mesh.triangle_positions() {
            let Some(normal) = (b - a).cross(c - a).try_normalize() else {
                continue;
            };
            let centroid = (a + b + c) / 3.0;
            let to_eye = (camera.position - centroid).normalize_or_zero();
            let facing = normal.dot(to_eye) > 0.0;
            if !facing && !node.material.double_sided && !wireframe {
                continue;
            }
            let normal = if facing { normal } else { -normal };

            let (Some(pa), Some(pb), Some(pc)) =
                (camera.project(a, width, height), camera.project(b, width, height), camera.project(c, width, height))
            else {
                continue;
            };
            faces.push(Face {
                id: node.id,
                points: [pa.screen, pb.screen, pc.screen],
                depth: (pa.depth + pb.depth + pc.depth) / 3.0,
                fill: shade(&node.material, normal, to_eye),
                wireframe,
            });
        }
    }
    faces.sort_by(|x, y| y.depth.total_cmp(&x.depth));
    faces
}

/// Clip a world segment to the near plane and project it. `None` when the
/// whole segment is behind the camera.
#[must_use]
pub fn project_segment(camera: &Camera, a: DVec3, b: DVec3, width: f64, height: f64) -> Option<(Point, Point)> {
    let view = camera.view_matrix();
    // Clip slightly in front of the near plane so projection never rejects the cut point.
    let plane = camera.near * 1.01;
    let da = -view.transform_point3(a).z - plane;
    let db = -view.transform_point3(b).z - plane;
    if da < 0.0 && db < 0.0 {
        return None;
    }
    let (a, b) = if da < 0.0 {
        (a + (b - a) * (da / (da - db)), b)
    } else if db < 0.0 {
        (a, a + (b - a) * (da / (da - db)))
    } else {
        (a, b)
    };
    let pa = camera.project(a, width, height)?;
    let pb = camera.project(b, width, height)?;
    Some((pa.screen, pb.screen))
}

/// Grid line segments on the XZ plane: `(start, end, is_center_line)`.
#[must_use]
pub fn grid_lines() -> Vec<(DVec3, DVec3, bool)> {
    let half = GRID_SIZE / 2.0;
    let step = GRID_SIZE / f64::from(GRID_DIVISIONS);
    (0..=GRID_DIVISIONS)
        .flat_map(|i| {
            let k = -half + f64::from(i) * step;
            let center = i * 2 == GRID_DIVISIONS;
            [
                (DVec3::new(-half, 0.0, k), DVec3::new(half, 0.0, k), center),
                (DVec3::new(k, 0.0, -half), DVec3::new(k, 0.0, half), center),
            ]
        })
        .collect()
}

// =============================================================
// Canvas drawing
// =============================================================

/// Draw the full scene.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    graph: &RenderGraph,
    camera: &Camera,
    opts: &DrawOptions,
) -> Result<(), JsValue> {
    // Layer 1: background in device pixels, then CSS-pixel transform.
    ctx.set_transform(opts.dpr, 0.0, 0.0, opts.dpr, 0.0, 0.0)?;
    fill_background(ctx, opts.width, opts.height, opts.background);

    // Layer 2: helpers.
    if opts.show_grid {
        draw_grid(ctx, camera, opts.width, opts.height);
    }
    if opts.show_axes {
        draw_axes(ctx, camera, opts.width, opts.height);
    }

    // Layer 3: objects, far to near.
    for face in build_faces(graph, camera, opts.width, opts.height) {
        draw_face(ctx, &face);
    }
    Ok(())
}

/// Fill the surface with `background`, or clear it when `None`.
pub fn fill_background(ctx: &CanvasRenderingContext2d, width: f64, height: f64, background: Option<Rgb>) {
    match background {
        Some(color) => {
            ctx.set_fill_style_str(&color.to_hex_string());
            ctx.fill_rect(0.0, 0.0, width, height);
        }
        None => ctx.clear_rect(0.0, 0.0, width, height),
    }
}

fn draw_grid(ctx: &CanvasRenderingContext2d, camera: &Camera, width: f64, height: f64) {
    ctx.set_line_width(1.0);
    for (start, end, center) in grid_lines() {
        let Some((a, b)) = project_segment(camera, start, end, width, height) else {
            continue;
        };
        ctx.set_stroke_style_str(if center { GRID_CENTER_COLOR } else { GRID_COLOR });
        stroke_line(ctx, a, b);
    }
}

fn draw_axes(ctx: &CanvasRenderingContext2d, camera: &Camera, width: f64, height: f64) {
    ctx.set_line_width(2.0);
    for (axis, color) in [DVec3::X, DVec3::Y, DVec3::Z].into_iter().zip(AXIS_COLORS) {
        let Some((a, b)) = project_segment(camera, DVec3::ZERO, axis * AXES_LENGTH, width, height) else {
            continue;
        };
        ctx.set_stroke_style_str(color);
        stroke_line(ctx, a, b);
    }
}

fn stroke_line(ctx: &CanvasRenderingContext2d, a: Point, b: Point) {
    ctx.begin_path();
    ctx.move_to(a.x, a.y);
    ctx.line_to(b.x, b.y);
    ctx.stroke();
}

fn draw_face(ctx: &CanvasRenderingContext2d, face: &Face) {
    let [a, b, c] = face.points;
    ctx.begin_path();
    ctx.move_to(a.x, a.y);
    ctx.line_to(b.x, b.y);
    ctx.line_to(c.x, c.y);
    ctx.close_path();

    let css = face.fill.css();
    if face.wireframe {
        ctx.set_line_width(1.0);
        ctx.set_stroke_style_str(&css);
        ctx.stroke();
    } else {
        ctx.set_fill_style_str(&css);
        ctx.fill();
        ctx.set_line_width(SEAM_STROKE_WIDTH);
        ctx.set_stroke_style_str(&css);
        ctx.stroke();
    }
}
