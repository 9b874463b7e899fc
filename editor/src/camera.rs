//! Perspective camera: view presets, orbit and zoom, projection and
//! picking rays.
//!
//! Screen coordinates are CSS pixels with the origin at the top-left of the
//! viewport. World space is right-handed with +Y up.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use glam::{DMat4, DVec3, DVec4};
use serde::{Deserialize, Serialize};

use crate::consts::{
    CAMERA_FAR, CAMERA_NEAR, DEFAULT_CAMERA_POSITION, DEFAULT_FOV_DEG, MIN_ORBIT_DISTANCE, ORBIT_RADIANS_PER_PX,
    PRESET_DISTANCE, ZOOM_PER_WHEEL_PX,
};

/// A point in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A world-space point projected to the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub screen: Point,
    /// Distance from the eye along the view direction.
    pub depth: f64,
}

/// A half-line in world space. `dir` is unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub dir: DVec3,
}

/// Named camera placements, all looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewPreset {
    Front,
    Side,
    Top,
    Perspective,
}

impl ViewPreset {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "front" => Some(Self::Front),
            "side" => Some(Self::Side),
            "top" => Some(Self::Top),
            "perspective" => Some(Self::Perspective),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Front => "Front",
            Self::Side => "Side",
            Self::Top => "Top",
            Self::Perspective => "Perspective",
        }
    }

    #[must_use]
    pub fn eye(self) -> DVec3 {
        match self {
            Self::Front => DVec3::new(0.0, 0.0, PRESET_DISTANCE),
            Self::Side => DVec3::new(PRESET_DISTANCE, 0.0, 0.0),
            Self::Top => DVec3::new(0.0, PRESET_DISTANCE, 0.0),
            Self::Perspective => DVec3::from_array(DEFAULT_CAMERA_POSITION),
        }
    }
}

/// Perspective camera state. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: DVec3,
    pub target: DVec3,
    /// Vertical field of view in degrees.
    pub fov_deg: f64,
    /// Width / height.
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: DVec3::from_array(DEFAULT_CAMERA_POSITION),
            target: DVec3::ZERO,
            fov_deg: DEFAULT_FOV_DEG,
            aspect: 1.0,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        }
    }
}

impl Camera {
    /// Place the camera at `position` looking at `target`.
    pub fn look_at(&mut self, position: DVec3, target: DVec3) {
        self.position = position;
        self.target = target;
    }

    /// Move to a preset placement, looking at the origin.
    pub fn set_view(&mut self, preset: ViewPreset) {
        self.look_at(preset.eye(), DVec3::ZERO);
    }

    /// Set the aspect ratio from a viewport size; ignores empty viewports.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    /// Unit vector from the eye toward the target, or zero if they coincide.
    #[must_use]
    pub fn look_direction(&self) -> DVec3 {
        (self.target - self.position).normalize_or_zero()
    }

    #[must_use]
    pub fn distance(&self) -> f64 {
        self.position.distance(self.target)
    }

    /// Up vector for the view basis. Straight-down and straight-up views
    /// use -Z so the basis stays defined.
    fn up(&self) -> DVec3 {
        let dir = self.look_direction();
        if dir.cross(DVec3::Y).length_squared() < 1e-12 {
            DVec3::NEG_Z
        } else {
            DVec3::Y
        }
    }

    #[must_use]
    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_rh(self.position, self.target, self.up())
    }

    #[must_use]
    pub fn projection_matrix(&self) -> DMat4 {
        DMat4::perspective_rh_gl(self.fov_deg.to_radians(), self.aspect, self.near, self.far)
    }

    #[must_use]
    pub fn view_projection(&self) -> DMat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world point onto a `width` × `height` viewport. `None` when
    /// the point is behind the near plane.
    #[must_use]
    pub fn project(&self, world: DVec3, width: f64, height: f64) -> Option<Projected> {
        let view = self.view_matrix().transform_point3(world);
        let depth = -view.z;
        if depth < self.near {
            return None;
        }
        let clip = self.projection_matrix() * DVec4::new(view.x, view.y, view.z, 1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        Some(Projected {
            screen: Point::new((ndc_x + 1.0) * 0.5 * width, (1.0 - ndc_y) * 0.5 * height),
            depth,
        })
    }

    /// The world ray through a screen point.
    #[must_use]
    pub fn screen_ray(&self, screen: Point, width: f64, height: f64) -> Ray {
        let ndc_x = if width > 0.0 { screen.x / width * 2.0 - 1.0 } else { 0.0 };
        let ndc_y = if height > 0.0 { 1.0 - screen.y / height * 2.0 } else { 0.0 };
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(DVec3::new(ndc_x, ndc_y, -1.0));
        let far = inverse.project_point3(DVec3::new(ndc_x, ndc_y, 1.0));
        let dir = (far - near).normalize_or_zero();
        let dir = if dir == DVec3::ZERO { self.look_direction() } else { dir };
        Ray { origin: self.position, dir }
    }

    /// Orbit around the target by a screen-space drag.
    pub fn orbit(&mut self, dx_px: f64, dy_px: f64) {
        let offset = self.position - self.target;
        let radius = self.distance();
        if radius <= 0.0 {
            return;
        }
        let mut azimuth = offset.x.atan2(offset.z);
        let mut polar = (offset.y / radius).clamp(-1.0, 1.0).acos();

        azimuth -= dx_px * ORBIT_RADIANS_PER_PX;
        polar -= dy_px * ORBIT_RADIANS_PER_PX;
        let limit = 1e-3;
        polar = polar.clamp(limit, std::f64::consts::PI - limit);

        let sin_polar = polar.sin();
        let offset = DVec3::new(
            radius * sin_polar * azimuth.sin(),
            radius * polar.cos(),
            radius * sin_polar * azimuth.cos(),
        );
        self.position = self.target + offset;
    }

    /// Dolly toward or away from the target. Positive `delta_px` (wheel
    /// down) moves away.
    pub fn zoom(&mut self, delta_px: f64) {
        let offset = self.position - self.target;
        let radius = self.distance();
        if radius <= 0.0 || !delta_px.is_finite() {
            return;
        }
        let factor = (delta_px * ZOOM_PER_WHEEL_PX).exp();
        let next = (radius * factor).clamp(MIN_ORBIT_DISTANCE, self.far * 0.5);
        self.position = self.target + offset / radius * next;
    }
}
