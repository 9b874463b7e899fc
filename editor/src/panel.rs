//! Property panel model: the two-way binding between panel fields and the
//! selected object's transform and material.
//!
//! Object → panel copies values verbatim (rotation radians → degrees) into a
//! numeric [`PanelState`]. Display formatting is a separate, read-only step
//! ([`PanelState::display`]) and never feeds back into the object.
//!
//! Panel → object parses each field on its own. Unparseable or non-finite
//! input never rejects the edit; it substitutes a safe default instead.

#[cfg(test)]
#[path = "panel_test.rs"]
mod panel_test;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::consts::{DEFAULT_METALNESS, NEUTRAL_COLOR, NEUTRAL_METALNESS, NEUTRAL_ROUGHNESS};
use crate::scene::SceneObject;

/// One editable panel field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelField {
    PositionX,
    PositionY,
    PositionZ,
    RotationX,
    RotationY,
    RotationZ,
    ScaleX,
    ScaleY,
    ScaleZ,
    Color,
    Metalness,
    Roughness,
}

impl PanelField {
    pub const ALL: [Self; 12] = [
        Self::PositionX,
        Self::PositionY,
        Self::PositionZ,
        Self::RotationX,
        Self::RotationY,
        Self::RotationZ,
        Self::ScaleX,
        Self::ScaleY,
        Self::ScaleZ,
        Self::Color,
        Self::Metalness,
        Self::Roughness,
    ];

    /// The host-side field name, e.g. `"position-x"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::PositionX => "position-x",
            Self::PositionY => "position-y",
            Self::PositionZ => "position-z",
            Self::RotationX => "rotation-x",
            Self::RotationY => "rotation-y",
            Self::RotationZ => "rotation-z",
            Self::ScaleX => "scale-x",
            Self::ScaleY => "scale-y",
            Self::ScaleZ => "scale-z",
            Self::Color => "color",
            Self::Metalness => "metalness",
            Self::Roughness => "roughness",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Index of the vector component a transform field edits.
    fn axis(self) -> usize {
        match self {
            Self::PositionX | Self::RotationX | Self::ScaleX => 0,
            Self::PositionY | Self::RotationY | Self::ScaleY => 1,
            _ => 2,
        }
    }

    /// Write raw panel text through to `object`.
    ///
    /// Position and rotation fall back to 0, scale to 1. Rotation is entered
    /// in degrees. Color falls back to white; metalness and roughness fall
    /// back to the kind's defaults and are clamped to `[0, 1]`.
    pub fn apply(self, raw: &str, object: &mut SceneObject) {
        match self {
            Self::PositionX | Self::PositionY | Self::PositionZ => {
                set_axis(&mut object.position, self.axis(), parse_or(raw, 0.0));
            }
            Self::RotationX | Self::RotationY | Self::RotationZ => {
                set_axis(&mut object.rotation, self.axis(), parse_or(raw, 0.0).to_radians());
            }
            Self::ScaleX | Self::ScaleY | Self::ScaleZ => {
                set_axis(&mut object.scale, self.axis(), parse_or(raw, 1.0));
            }
            Self::Color => {
                object.material.color = Rgb::parse(raw).unwrap_or(Rgb::from_hex(NEUTRAL_COLOR));
            }
            Self::Metalness => {
                object.material.metalness = parse_or(raw, DEFAULT_METALNESS).clamp(0.0, 1.0);
            }
            Self::Roughness => {
                let fallback = object.kind().default_roughness();
                object.material.roughness = parse_or(raw, fallback).clamp(0.0, 1.0);
            }
        }
    }
}

/// Parse a finite decimal number, or `None`.
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => None,
    }
}

fn parse_or(raw: &str, fallback: f64) -> f64 {
    parse_number(raw).unwrap_or(fallback)
}

fn set_axis(v: &mut DVec3, axis: usize, value: f64) {
    match axis {
        0 => v.x = value,
        1 => v.y = value,
        _ => v.z = value,
    }
}

/// Numeric mirror of the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelState {
    /// Display name of the selected object; empty when nothing is selected.
    pub name: String,
    pub vertex_count: usize,
    pub position: DVec3,
    /// Degrees.
    pub rotation: DVec3,
    pub scale: DVec3,
    pub color: Rgb,
    pub metalness: f64,
    pub roughness: f64,
}

impl Default for PanelState {
    fn default() -> Self {
        Self::neutral()
    }
}

impl PanelState {
    /// Values shown when nothing is selected.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            name: String::new(),
            vertex_count: 0,
            position: DVec3::ZERO,
            rotation: DVec3::ZERO,
            scale: DVec3::ONE,
            color: Rgb::from_hex(NEUTRAL_COLOR),
            metalness: NEUTRAL_METALNESS,
            roughness: NEUTRAL_ROUGHNESS,
        }
    }

    #[must_use]
    pub fn from_object(object: &SceneObject) -> Self {
        Self {
            name: object.name.clone(),
            vertex_count: object.vertex_count(),
            position: object.position,
            rotation: DVec3::new(
                object.rotation.x.to_degrees(),
                object.rotation.y.to_degrees(),
                object.rotation.z.to_degrees(),
            ),
            scale: object.scale,
            color: object.material.color,
            metalness: object.material.metalness,
            roughness: object.material.roughness,
        }
    }

    /// Reset to [`PanelState::neutral`].
    pub fn reset(&mut self) {
        *self = Self::neutral();
    }

    #[must_use]
    pub fn value(&self, field: PanelField) -> f64 {
        let axis = field.axis();
        match field {
            PanelField::PositionX | PanelField::PositionY | PanelField::PositionZ => self.position[axis],
            PanelField::RotationX | PanelField::RotationY | PanelField::RotationZ => self.rotation[axis],
            PanelField::ScaleX | PanelField::ScaleY | PanelField::ScaleZ => self.scale[axis],
            PanelField::Color => f64::from(self.color.to_hex()),
            PanelField::Metalness => self.metalness,
            PanelField::Roughness => self.roughness,
        }
    }

    /// Field text as the panel shows it: position and scale to 2 decimals,
    /// rotation to 1, color as `#rrggbb`.
    #[must_use]
    pub fn display(&self, field: PanelField) -> String {
        match field {
            PanelField::RotationX | PanelField::RotationY | PanelField::RotationZ => {
                format!("{:.1}", self.value(field))
            }
            PanelField::Color => self.color.to_hex_string(),
            _ => format!("{:.2}", self.value(field)),
        }
    }

    /// Every field with its display text, in panel order.
    #[must_use]
    pub fn display_fields(&self) -> Vec<(PanelField, String)> {
        PanelField::ALL.into_iter().map(|f| (f, self.display(f))).collect()
    }
}
