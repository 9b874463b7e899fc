//! Shared numeric constants for the editor crate.

// ── Camera ──────────────────────────────────────────────────────

/// Vertical field of view of the viewport camera, in degrees.
pub const DEFAULT_FOV_DEG: f64 = 45.0;

/// Near clip distance.
pub const CAMERA_NEAR: f64 = 0.1;

/// Far clip distance.
pub const CAMERA_FAR: f64 = 1000.0;

/// Starting (and "perspective" preset) camera position.
pub const DEFAULT_CAMERA_POSITION: [f64; 3] = [5.0, 5.0, 5.0];

/// Distance of the axis-aligned view presets from the origin.
pub const PRESET_DISTANCE: f64 = 5.0;

/// Headroom applied to the framing distance (1.5 = 50% margin).
pub const FRAMING_MARGIN: f64 = 1.5;

/// Orbit angle per dragged screen pixel, in radians.
pub const ORBIT_RADIANS_PER_PX: f64 = 0.01;

/// Fractional dolly per wheel pixel.
pub const ZOOM_PER_WHEEL_PX: f64 = 0.001;

/// Closest the orbit camera may get to its target.
pub const MIN_ORBIT_DISTANCE: f64 = 0.5;

// ── Scene ───────────────────────────────────────────────────────

/// Viewport clear color.
pub const SCENE_BACKGROUND: &str = "#242424";

/// Emissive color applied to the selected object.
pub const HIGHLIGHT_EMISSIVE: u32 = 0x0033_3333;

/// X offset applied to duplicated objects.
pub const DUPLICATE_OFFSET_X: f64 = 0.5;

/// Default metalness for freshly created primitives.
pub const DEFAULT_METALNESS: f64 = 0.1;

// ── Lighting ────────────────────────────────────────────────────

/// Ambient light contribution.
pub const AMBIENT_INTENSITY: f64 = 0.6;

/// Directional key light contribution.
pub const KEY_LIGHT_INTENSITY: f64 = 0.8;

/// Position of the directional key light (it shines toward the origin).
pub const KEY_LIGHT_POSITION: [f64; 3] = [5.0, 10.0, 7.5];

// ── Helpers ─────────────────────────────────────────────────────

/// Edge length of the ground grid.
pub const GRID_SIZE: f64 = 20.0;

/// Number of grid cells along each side.
pub const GRID_DIVISIONS: u32 = 20;

/// Grid center line color.
pub const GRID_CENTER_COLOR: &str = "#888888";

/// Grid line color.
pub const GRID_COLOR: &str = "#444444";

/// Length of each axis helper line.
pub const AXES_LENGTH: f64 = 5.0;

/// Dragged screen pixels per world unit for the move tool.
pub const MOVE_PX_PER_UNIT: f64 = 100.0;

/// Scale factor change per dragged screen pixel for the scale tool.
pub const SCALE_PER_PX: f64 = 0.01;

/// Rotation per dragged screen pixel for the rotate tool, in radians.
pub const ROTATE_RADIANS_PER_PX: f64 = 0.01;

/// Smallest scale the scale tool produces on any axis.
pub const MIN_SCALE: f64 = 0.01;

// ── Panel neutral values ────────────────────────────────────────

/// Panel color shown when nothing is selected or color input is invalid.
pub const NEUTRAL_COLOR: u32 = 0x00FF_FFFF;

/// Panel metalness shown when nothing is selected.
pub const NEUTRAL_METALNESS: f64 = 0.1;

/// Panel roughness shown when nothing is selected.
pub const NEUTRAL_ROUGHNESS: f64 = 0.8;

// ── Export ──────────────────────────────────────────────────────

/// Default export width in pixels.
pub const DEFAULT_EXPORT_WIDTH: u32 = 1920;

/// Default export height in pixels.
pub const DEFAULT_EXPORT_HEIGHT: u32 = 1080;

/// Default lossy encoder quality.
pub const DEFAULT_EXPORT_QUALITY: f64 = 0.9;

/// Delay before a full export runs so the loading indicator can paint.
pub const EXPORT_DEFER_MS: u32 = 100;

/// Preview render is at most this wide.
pub const PREVIEW_MAX_WIDTH: u32 = 500;

/// Preview render is at most this tall.
pub const PREVIEW_MAX_HEIGHT: u32 = 300;

/// Preview renders are this fraction of the requested size.
pub const PREVIEW_DIVISOR: u32 = 4;

/// Text stamped on full-size exports.
pub const WATERMARK_TEXT: &str = "Rendered with 3D Modeler";

/// Watermark inset from the bottom-right corner, in pixels.
pub const WATERMARK_INSET_PX: f64 = 20.0;

/// Top color of the placeholder background gradient.
pub const PLACEHOLDER_GRADIENT_TOP: &str = "#2c3e50";

/// Bottom color of the placeholder background gradient.
pub const PLACEHOLDER_GRADIENT_BOTTOM: &str = "#1a1a1a";
