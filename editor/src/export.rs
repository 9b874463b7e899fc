//! Render export: still images of the scene for download.
//!
//! Producing an image walks a three-stage fallback chain. Each stage runs
//! only when the previous one failed, and failures are logged, never raised:
//!
//! 1. [`ExportStage::Primary`]: draw the scene into a dedicated offscreen
//!    canvas with a render camera framed on every object.
//! 2. [`ExportStage::Snapshot`]: copy the live viewport canvas, scaled.
//! 3. [`ExportStage::Placeholder`]: paint an illustrative stand-in scene.
//!
//! Settings parsing, sizing, naming and the chain itself are plain Rust and
//! tested natively; the canvas work is at the bottom of the module.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlAnchorElement, HtmlCanvasElement};

use crate::camera::Camera;
use crate::color::Rgb;
use crate::consts::{
    DEFAULT_EXPORT_HEIGHT, DEFAULT_EXPORT_QUALITY, DEFAULT_EXPORT_WIDTH, PLACEHOLDER_GRADIENT_BOTTOM,
    PLACEHOLDER_GRADIENT_TOP, PREVIEW_DIVISOR, PREVIEW_MAX_HEIGHT, PREVIEW_MAX_WIDTH, SCENE_BACKGROUND, WATERMARK_INSET_PX,
    WATERMARK_TEXT,
};
use crate::framing::{self, FrameDirection};
use crate::graph::RenderGraph;
use crate::render::{self, DrawOptions};

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
        }
    }
}

/// What fills the image behind the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "color", rename_all = "lowercase")]
pub enum Background {
    /// The viewport's background color.
    #[default]
    Scene,
    /// No fill. Only honored for PNG.
    Transparent,
    Custom(Rgb),
}

impl Background {
    /// Parse the dialog's background mode and color picker value. An
    /// unknown mode or bad custom color falls back to [`Background::Scene`].
    #[must_use]
    pub fn from_parts(mode: &str, color: &str) -> Self {
        match mode {
            "transparent" => Self::Transparent,
            "custom" => Rgb::parse(color).map_or(Self::Scene, Self::Custom),
            _ => Self::Scene,
        }
    }
}

/// Everything the export dialog controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub width: u32,
    pub height: u32,
    /// Lossy encoder quality in `[0, 1]`.
    pub quality: f64,
    pub background: Background,
    pub format: ImageFormat,
    /// Stamp the watermark on full-size renders.
    pub watermark: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_EXPORT_WIDTH,
            height: DEFAULT_EXPORT_HEIGHT,
            quality: DEFAULT_EXPORT_QUALITY,
            background: Background::Scene,
            format: ImageFormat::Png,
            watermark: true,
        }
    }
}

/// Raw dialog values as the host page reads them from its inputs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawExportSettings {
    pub width: String,
    pub height: String,
    pub quality: String,
    pub format: String,
    pub background: String,
    pub background_color: String,
}

impl ExportSettings {
    /// Build settings from dialog text. Missing, zero or unparseable sizes
    /// use the defaults; quality is clamped to `[0, 1]`.
    #[must_use]
    pub fn from_raw(raw: &RawExportSettings) -> Self {
        let defaults = Self::default();
        let dimension = |text: &str, fallback: u32| match text.trim().parse::<u32>() {
            Ok(value) if value > 0 => value,
            _ => fallback,
        };
        let quality = match crate::panel::parse_number(&raw.quality) {
            Some(q) => q.clamp(0.0, 1.0),
            None => defaults.quality,
        };
        Self {
            width: dimension(&raw.width, defaults.width),
            height: dimension(&raw.height, defaults.height),
            quality,
            background: Background::from_parts(&raw.background, &raw.background_color),
            format: ImageFormat::from_name(&raw.format).unwrap_or_default(),
            watermark: defaults.watermark,
        }
    }

    /// The fill to clear with, or `None` for a transparent image.
    /// Transparency needs PNG; other formats get the scene color.
    #[must_use]
    pub fn resolved_background(&self) -> Option<Rgb> {
        let scene = Rgb::parse(SCENE_BACKGROUND).unwrap_or(Rgb::BLACK);
        match self.background {
            Background::Transparent if self.format == ImageFormat::Png => None,
            Background::Transparent | Background::Scene => Some(scene),
            Background::Custom(color) => Some(color),
        }
    }

    /// Output pixel size for a full render or a preview.
    #[must_use]
    pub fn output_size(&self, preview: bool) -> (u32, u32) {
        if preview { preview_size(self.width, self.height) } else { (self.width, self.height) }
    }
}

/// Preview dimensions: a quarter of the target, capped at 500×300.
#[must_use]
pub fn preview_size(width: u32, height: u32) -> (u32, u32) {
    (
        (width / PREVIEW_DIVISOR).clamp(1, PREVIEW_MAX_WIDTH),
        (height / PREVIEW_DIVISOR).clamp(1, PREVIEW_MAX_HEIGHT),
    )
}

/// Download file name: `render_<timestamp>.<ext>`, with `:` and `.` in the
/// timestamp replaced so the name is valid on every file system.
#[must_use]
pub fn file_name(iso_timestamp: &str, format: ImageFormat) -> String {
    let stamp: String = iso_timestamp.chars().map(|c| if c == ':' || c == '.' { '-' } else { c }).collect();
    format!("render_{stamp}.{}", format.extension())
}

/// An encoded full render and the format it was encoded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub data_url: String,
    pub format: ImageFormat,
}

impl RenderedImage {
    /// Download name; the extension follows the encoded format even if the
    /// dialog settings changed since.
    #[must_use]
    pub fn file_name(&self, iso_timestamp: &str) -> String {
        file_name(iso_timestamp, self.format)
    }
}

/// Watermark text placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatermarkLayout {
    pub font_px: f64,
    /// Right edge of the text.
    pub x: f64,
    /// Baseline.
    pub y: f64,
}

#[must_use]
pub fn watermark_layout(width: f64, height: f64) -> WatermarkLayout {
    WatermarkLayout {
        font_px: (height / 30.0).floor(),
        x: width - WATERMARK_INSET_PX,
        y: height - WATERMARK_INSET_PX,
    }
}

// =============================================================
// Fallback chain
// =============================================================

/// A stage of the export fallback chain, in the order tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStage {
    Primary,
    Snapshot,
    Placeholder,
}

impl ExportStage {
    pub const CHAIN: [Self; 3] = [Self::Primary, Self::Snapshot, Self::Placeholder];
}

/// Why an export stage could not produce an image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("no document available")]
    NoDocument,
    #[error("2d context unavailable")]
    NoContext,
    #[error("no viewport canvas to snapshot")]
    NoViewport,
    #[error("canvas call failed: {0}")]
    Canvas(String),
    #[error("nothing has been rendered yet")]
    NothingRendered,
}

impl From<JsValue> for ExportError {
    fn from(value: JsValue) -> Self {
        Self::Canvas(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// Try each stage in order until one succeeds, returning it.
///
/// If even the placeholder fails the error is logged and
/// [`ExportStage::Placeholder`] is still returned: the chain never fails.
pub fn run_fallback_chain<F>(mut attempt: F) -> ExportStage
where
    F: FnMut(ExportStage) -> Result<(), ExportError>,
{
    for stage in ExportStage::CHAIN {
        match attempt(stage) {
            Ok(()) => {
                log::info!("export: rendered via {stage:?}");
                return stage;
            }
            Err(e) if stage == ExportStage::Placeholder => {
                log::error!("export: placeholder failed: {e}");
            }
            Err(e) => log::warn!("export: {stage:?} failed, falling back: {e}"),
        }
    }
    ExportStage::Placeholder
}

// =============================================================
// Canvas stages
// =============================================================

/// Scene inputs for an export.
pub struct ExportSource<'a> {
    pub graph: &'a RenderGraph,
    pub camera: &'a Camera,
    /// The live viewport, used by the snapshot stage.
    pub viewport: Option<&'a HtmlCanvasElement>,
    pub show_grid: bool,
    pub show_axes: bool,
}

/// 2d context of `canvas`.
///
/// # Errors
///
/// [`ExportError::NoContext`] when the canvas has no 2d context.
pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, ExportError> {
    let ctx = canvas.get_context("2d")?.ok_or(ExportError::NoContext)?;
    ctx.dyn_into::<CanvasRenderingContext2d>().map_err(|_| ExportError::NoContext)
}

/// Create a detached canvas element of the given size.
///
/// # Errors
///
/// Fails when the element cannot be created.
pub fn create_canvas(document: &Document, width: u32, height: u32) -> Result<HtmlCanvasElement, ExportError> {
    let canvas = document.create_element("canvas")?.dyn_into::<HtmlCanvasElement>().map_err(|_| ExportError::NoContext)?;
    canvas.set_width(width);
    canvas.set_height(height);
    Ok(canvas)
}

/// Render into `target` (resized to the output size) through the fallback
/// chain. Returns the stage that produced the image.
pub fn render_to_canvas(
    target: &HtmlCanvasElement,
    source: &ExportSource<'_>,
    settings: &ExportSettings,
    preview: bool,
) -> ExportStage {
    let (width, height) = settings.output_size(preview);
    target.set_width(width);
    target.set_height(height);
    let stamp = settings.watermark && !preview;

    run_fallback_chain(|stage| {
        let ctx = context_2d(target)?;
        let (w, h) = (f64::from(width), f64::from(height));
        match stage {
            ExportStage::Primary => render_primary(&ctx, source, settings, width, height)?,
            ExportStage::Snapshot => render_snapshot(&ctx, source, settings, w, h)?,
            ExportStage::Placeholder => {
                draw_placeholder(&ctx, w, h, settings, preview)?;
                return Ok(());
            }
        }
        if stamp {
            draw_watermark(&ctx, w, h)?;
        }
        Ok(())
    })
}

fn render_primary(
    ctx: &CanvasRenderingContext2d,
    source: &ExportSource<'_>,
    settings: &ExportSettings,
    width: u32,
    height: u32,
) -> Result<(), ExportError> {
    let document = web_sys::window().and_then(|w| w.document()).ok_or(ExportError::NoDocument)?;
    let offscreen = create_canvas(&document, width, height)?;
    let off_ctx = context_2d(&offscreen)?;
    let (w, h) = (f64::from(width), f64::from(height));

    let mut camera = *source.camera;
    camera.set_viewport(w, h);
    if !source.graph.is_empty() {
        framing::frame_bounds(&mut camera, &source.graph.bounds(), FrameDirection::PreserveLook);
    }
    let opts = DrawOptions {
        width: w,
        height: h,
        dpr: 1.0,
        background: settings.resolved_background(),
        show_grid: source.show_grid,
        show_axes: source.show_axes,
    };
    render::draw(&off_ctx, source.graph, &camera, &opts)?;

    ctx.clear_rect(0.0, 0.0, w, h);
    ctx.draw_image_with_html_canvas_element(&offscreen, 0.0, 0.0)?;
    Ok(())
}

fn render_snapshot(
    ctx: &CanvasRenderingContext2d,
    source: &ExportSource<'_>,
    settings: &ExportSettings,
    w: f64,
    h: f64,
) -> Result<(), ExportError> {
    let viewport = source.viewport.ok_or(ExportError::NoViewport)?;
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    render::fill_background(ctx, w, h, settings.resolved_background());
    ctx.draw_image_with_html_canvas_element_and_dw_and_dh(viewport, 0.0, 0.0, w, h)?;
    Ok(())
}

/// Stamp the watermark in the bottom-right corner.
///
/// # Errors
///
/// Returns `Err` if a `Canvas2D` call fails.
pub fn draw_watermark(ctx: &CanvasRenderingContext2d, width: f64, height: f64) -> Result<(), JsValue> {
    let layout = watermark_layout(width, height);
    ctx.set_font(&format!("{}px Arial", layout.font_px));
    ctx.set_fill_style_str("rgba(255, 255, 255, 0.5)");
    ctx.set_text_align("right");
    ctx.fill_text(WATERMARK_TEXT, layout.x, layout.y)
}

/// Paint the stand-in scene: gradient backdrop, a flat grid and a cube,
/// sphere and cylinder drawn with lightened and darkened faces.
///
/// # Errors
///
/// Returns `Err` if a `Canvas2D` call fails.
pub fn draw_placeholder(
    ctx: &CanvasRenderingContext2d,
    width: f64,
    height: f64,
    settings: &ExportSettings,
    preview: bool,
) -> Result<(), JsValue> {
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    match settings.background {
        Background::Transparent if settings.format == ImageFormat::Png => ctx.clear_rect(0.0, 0.0, width, height),
        Background::Custom(color) => {
            ctx.set_fill_style_str(&color.to_hex_string());
            ctx.fill_rect(0.0, 0.0, width, height);
        }
        _ => {
            let gradient = ctx.create_linear_gradient(0.0, 0.0, 0.0, height);
            gradient.add_color_stop(0.0, PLACEHOLDER_GRADIENT_TOP)?;
            gradient.add_color_stop(1.0, PLACEHOLDER_GRADIENT_BOTTOM)?;
            ctx.set_fill_style_canvas_gradient(&gradient);
            ctx.fill_rect(0.0, 0.0, width, height);
        }
    }

    let (cx, cy) = (width / 2.0, height / 2.0);
    let size = width.min(height) * 0.25;

    // Grid.
    ctx.set_stroke_style_str("rgba(100, 100, 100, 0.5)");
    ctx.set_line_width(if preview { 0.5 } else { 1.0 });
    let grid = size * 3.0;
    let step = grid / 10.0;
    for i in -5..=5 {
        let offset = f64::from(i) * step;
        ctx.begin_path();
        ctx.move_to(cx - grid / 2.0, cy + offset);
        ctx.line_to(cx + grid / 2.0, cy + offset);
        ctx.stroke();
        ctx.begin_path();
        ctx.move_to(cx + offset, cy - grid / 2.0);
        ctx.line_to(cx + offset, cy + grid / 2.0);
        ctx.stroke();
    }

    draw_placeholder_cube(ctx, cx - size, cy - size / 2.0, size * 0.8, Rgb::from_hex(0x0034_98DB))?;
    draw_placeholder_sphere(ctx, cx + size * 0.7, cy - size * 0.3, size * 0.5, Rgb::from_hex(0x00E7_4C3C))?;
    draw_placeholder_cylinder(ctx, cx, cy + size * 0.7, size * 0.4, size * 0.9, Rgb::from_hex(0x002E_CC71))?;

    if !preview {
        ctx.set_font(&format!("{}px Arial", (height / 30.0).floor()));
        ctx.set_fill_style_str("rgba(255, 255, 255, 0.7)");
        ctx.set_text_align("center");
        ctx.fill_text("Sample Render (scene unavailable)", cx, height - 30.0)?;
    }
    Ok(())
}

fn draw_placeholder_cube(ctx: &CanvasRenderingContext2d, x: f64, y: f64, size: f64, color: Rgb) -> Result<(), JsValue> {
    let depth = size * 0.5;
    ctx.set_stroke_style_str("rgba(0,0,0,0.3)");

    ctx.set_fill_style_str(&color.css());
    ctx.begin_path();
    ctx.rect(x, y, size, size);
    ctx.fill();
    ctx.stroke();

    let faces = [
        (color.lighten(30.0), [(x, y), (x + depth, y - depth), (x + size + depth, y - depth), (x + size, y)]),
        (
            color.darken(20.0),
            [(x + size, y), (x + size + depth, y - depth), (x + size + depth, y + size - depth), (x + size, y + size)],
        ),
    ];
    for (fill, corners) in faces {
        ctx.set_fill_style_str(&fill.css());
        ctx.begin_path();
        ctx.move_to(corners[0].0, corners[0].1);
        for (px, py) in &corners[1..] {
            ctx.line_to(*px, *py);
        }
        ctx.close_path();
        ctx.fill();
        ctx.stroke();
    }
    Ok(())
}

fn draw_placeholder_sphere(ctx: &CanvasRenderingContext2d, x: f64, y: f64, r: f64, color: Rgb) -> Result<(), JsValue> {
    ctx.set_fill_style_str(&color.css());
    ctx.begin_path();
    ctx.arc(x, y, r, 0.0, TAU)?;
    ctx.fill();

    ctx.set_fill_style_str("rgba(255,255,255,0.3)");
    ctx.begin_path();
    ctx.arc(x - r * 0.3, y - r * 0.3, r * 0.4, 0.0, TAU)?;
    ctx.fill();

    ctx.set_stroke_style_str("rgba(0,0,0,0.2)");
    ctx.begin_path();
    ctx.arc(x, y, r, 0.0, TAU)?;
    ctx.stroke();

    ctx.set_stroke_style_str("rgba(0,0,0,0.1)");
    ctx.begin_path();
    ctx.ellipse(x, y, r * 0.9, r * 0.5, 0.0, 0.0, TAU)?;
    ctx.stroke();
    ctx.begin_path();
    ctx.ellipse(x, y, r * 0.5, r * 0.9, PI / 2.0, 0.0, TAU)?;
    ctx.stroke();
    Ok(())
}

fn draw_placeholder_cylinder(
    ctx: &CanvasRenderingContext2d,
    x: f64,
    y: f64,
    r: f64,
    height: f64,
    color: Rgb,
) -> Result<(), JsValue> {
    let top = y - height / 2.0;
    let bottom = y + height / 2.0;
    ctx.set_stroke_style_str("rgba(0,0,0,0.2)");

    for (cap_y, fill) in [(top, color.lighten(20.0)), (bottom, color.darken(10.0))] {
        ctx.set_fill_style_str(&fill.css());
        ctx.begin_path();
        ctx.ellipse(x, cap_y, r, r * 0.4, 0.0, 0.0, TAU)?;
        ctx.fill();
        ctx.stroke();
    }

    ctx.set_fill_style_str(&color.css());
    ctx.fill_rect(x - r, top, r * 2.0, height);

    for edge_x in [x - r, x + r] {
        ctx.begin_path();
        ctx.move_to(edge_x, top);
        ctx.line_to(edge_x, bottom);
        ctx.stroke();
    }
    Ok(())
}

// =============================================================
// Encoding and download
// =============================================================

/// Encode `canvas` as a data URL in the settings' format and quality.
///
/// # Errors
///
/// Fails if the browser refuses to encode (e.g. a tainted canvas).
pub fn encode(canvas: &HtmlCanvasElement, settings: &ExportSettings) -> Result<RenderedImage, ExportError> {
    let quality = JsValue::from_f64(settings.quality.clamp(0.0, 1.0));
    let data_url = canvas.to_data_url_with_type_and_encoder_options(settings.format.mime(), &quality)?;
    Ok(RenderedImage { data_url, format: settings.format })
}

/// Save `data_url` through a temporary anchor click.
///
/// # Errors
///
/// Fails if the anchor cannot be created or attached.
pub fn download(document: &Document, data_url: &str, name: &str) -> Result<(), ExportError> {
    let body = document.body().ok_or(ExportError::NoDocument)?;
    let anchor = document.create_element("a")?.dyn_into::<HtmlAnchorElement>().map_err(|_| ExportError::NoDocument)?;
    anchor.set_href(data_url);
    anchor.set_download(name);
    body.append_child(&anchor)?;
    anchor.click();
    body.remove_child(&anchor)?;
    Ok(())
}

/// The current time as an ISO-8601 string.
#[must_use]
pub fn now_iso() -> String {
    String::from(js_sys::Date::new_0().to_iso_string())
}
