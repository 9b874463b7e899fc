//! Input model: tools, modifier keys, mouse buttons, keyboard shortcuts and
//! the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `InputState` is the gesture tracked between pointer-down and
//! pointer-up. Transform drags keep the object's starting transform and
//! recompute from it on every move, so a drag never accumulates error.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::camera::{Camera, Point};
use crate::consts::{MIN_SCALE, MOVE_PX_PER_UNIT, ROTATE_RADIANS_PER_PX, SCALE_PER_PX};
use crate::geometry::GeometryKind;
use crate::scene::{ObjectId, SceneObject};

/// Which tool is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Pick objects; drags orbit the camera.
    #[default]
    Select,
    /// Translate the selection.
    Move,
    /// Rotate the selection.
    Rotate,
    /// Scale the selection.
    Scale,
}

impl Tool {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "select" => Some(Self::Select),
            "move" => Some(Self::Move),
            "rotate" => Some(Self::Rotate),
            "scale" => Some(Self::Scale),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Move => "move",
            Self::Rotate => "rotate",
            Self::Scale => "scale",
        }
    }

    /// Whether dragging the selection with this tool edits its transform.
    #[must_use]
    pub fn is_transform(self) -> bool {
        !matches!(self, Self::Select)
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl, Alt or Meta held. Shortcuts are not matched while one is.
    #[must_use]
    pub fn any_command(self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` value.
    #[must_use]
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// A keyboard key as reported by the browser (`KeyboardEvent.key`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta in pixels (positive `dy` = down).
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    pub dx: f64,
    pub dy: f64,
}

/// Operations reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    SetTool(Tool),
    Add(GeometryKind),
    DeleteSelection,
    FrameSelected,
    FrameAll,
}

impl Shortcut {
    /// The shortcut bound to `key`, if any. Letters are case-sensitive.
    #[must_use]
    pub fn from_key(key: &Key, modifiers: Modifiers) -> Option<Self> {
        if modifiers.any_command() {
            return None;
        }
        let shortcut = match key.0.as_str() {
            "q" => Self::SetTool(Tool::Select),
            "w" => Self::SetTool(Tool::Move),
            "e" => Self::SetTool(Tool::Rotate),
            "r" => Self::SetTool(Tool::Scale),
            "1" => Self::Add(GeometryKind::Cube),
            "2" => Self::Add(GeometryKind::Sphere),
            "3" => Self::Add(GeometryKind::Cylinder),
            "4" => Self::Add(GeometryKind::Plane),
            "Delete" => Self::DeleteSelection,
            "f" => Self::FrameSelected,
            "a" => Self::FrameAll,
            _ => return None,
        };
        Some(shortcut)
    }
}

/// Position, rotation and scale of an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: DVec3,
    pub rotation: DVec3,
    pub scale: DVec3,
}

impl Transform {
    #[must_use]
    pub fn of(object: &SceneObject) -> Self {
        Self { position: object.position, rotation: object.rotation, scale: object.scale }
    }

    pub fn write_to(self, object: &mut SceneObject) {
        object.position = self.position;
        object.rotation = self.rotation;
        object.scale = self.scale;
    }
}

/// The transform after dragging by `delta` screen pixels with `tool`.
///
/// Move translates in the camera's screen plane, rotate turns about Y for
/// horizontal motion and X for vertical, scale grows uniformly toward the
/// upper right.
#[must_use]
pub fn drag_transform(tool: Tool, start: Transform, delta: Point, camera: &Camera) -> Transform {
    let mut next = start;
    match tool {
        Tool::Select => {}
        Tool::Move => {
            let forward = camera.look_direction();
            let right = forward.cross(DVec3::Y).try_normalize().unwrap_or(DVec3::X);
            let up = right.cross(forward).try_normalize().unwrap_or(DVec3::Y);
            let units = (right * delta.x - up * delta.y) / MOVE_PX_PER_UNIT;
            next.position = start.position + units;
        }
        Tool::Rotate => {
            next.rotation.y = start.rotation.y + delta.x * ROTATE_RADIANS_PER_PX;
            next.rotation.x = start.rotation.x + delta.y * ROTATE_RADIANS_PER_PX;
        }
        Tool::Scale => {
            let factor = (1.0 + (delta.x - delta.y) * SCALE_PER_PX).max(MIN_SCALE);
            let scaled = start.scale * factor;
            // Clamp magnitude only; a negative (mirrored) axis keeps its sign.
            next.scale = scaled.abs().max(DVec3::splat(MIN_SCALE)).copysign(scaled);
        }
    }
    next
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct UiState {
    pub tool: Tool,
}

/// The gesture in progress.
#[derive(Debug, Clone, Copy, Default)]
pub enum InputState {
    /// Waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the camera around its target.
    Orbiting {
        /// Pointer position at the previous event.
        last_screen: Point,
    },
    /// Dragging the selection with a transform tool.
    Transforming {
        id: ObjectId,
        tool: Tool,
        /// Pointer position at pointer-down.
        start_screen: Point,
        /// Object transform at pointer-down.
        start: Transform,
    },
}
