//! Camera framing: fit a bounding volume inside the field of view.

#[cfg(test)]
#[path = "framing_test.rs"]
mod framing_test;

use glam::DVec3;

use crate::bounds::Aabb;
use crate::camera::Camera;
use crate::consts::FRAMING_MARGIN;

/// Which way the framed camera looks at the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDirection {
    /// From the fixed `(1, 1, 1)` diagonal.
    Diagonal,
    /// Along the camera's current look direction.
    PreserveLook,
}

/// Eye distance that fits `max_dimension` in a vertical field of view.
#[must_use]
pub fn fit_distance(max_dimension: f64, fov_deg: f64) -> f64 {
    (max_dimension / (fov_deg.to_radians() / 2.0).sin()).abs() * FRAMING_MARGIN
}

/// Whether `bounds` can be framed: non-empty, finite, with a positive
/// largest side.
#[must_use]
pub fn is_frameable(bounds: &Aabb) -> bool {
    !bounds.is_empty() && bounds.is_finite() && bounds.max_dimension() > 0.0
}

/// Aim `camera` at the center of `bounds` from far enough away to fit it.
///
/// Returns `false`, leaving the camera unchanged, when the bounds are
/// degenerate or the result would not be finite.
pub fn frame_bounds(camera: &mut Camera, bounds: &Aabb, direction: FrameDirection) -> bool {
    if !is_frameable(bounds) {
        return false;
    }
    let center = bounds.center();
    let distance = fit_distance(bounds.max_dimension(), camera.fov_deg);
    let diagonal = DVec3::ONE.normalize();
    let dir = match direction {
        FrameDirection::Diagonal => diagonal,
        FrameDirection::PreserveLook => match -camera.look_direction() {
            v if v == DVec3::ZERO => diagonal,
            v => v,
        },
    };
    let position = center + dir * distance;
    if !position.is_finite() {
        return false;
    }
    camera.look_at(position, center);
    true
}
