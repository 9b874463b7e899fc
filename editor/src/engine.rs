use std::cell::RefCell;
use std::rc::Rc;

use glam::DVec3;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Camera, Point, ViewPreset};
use crate::color::Rgb;
use crate::consts::{DUPLICATE_OFFSET_X, SCENE_BACKGROUND};
use crate::export::{self, ExportError, ExportSettings, ExportSource, ExportStage, RenderedImage};
use crate::framing::{self, FrameDirection};
use crate::geometry::GeometryKind;
use crate::graph::RenderGraph;
use crate::hit;
use crate::input::{Button, InputState, Key, Modifiers, Shortcut, Tool, Transform, UiState, WheelDelta, drag_transform};
use crate::panel::{PanelField, PanelState};
use crate::render::{self, DrawOptions, RenderMode};
use crate::scene::{Material, ObjectId, SceneObject, SceneRegistry};
use crate::selection::Selection;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from engine operations for the host page to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Show `message` in the status line.
    Status { message: String },
    SelectionChanged { id: Option<ObjectId> },
    /// Panel values changed; the host should redisplay every field.
    PanelChanged,
    ToolChanged { tool: Tool },
    ObjectAdded { id: ObjectId },
    ObjectRemoved { id: ObjectId },
    SceneCleared,
    /// Scene or camera changed; the next animation frame will show it.
    RenderNeeded,
    /// A still render finished; `ready` when it can be downloaded.
    ExportFinished { stage: ExportStage, ready: bool },
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub registry: SceneRegistry,
    pub graph: Rc<RefCell<RenderGraph>>,
    pub selection: Selection,
    pub panel: PanelState,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    pub render_mode: RenderMode,
    pub show_grid: bool,
    pub show_axes: bool,
    pub export: ExportSettings,
    pub status: String,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
    rng: SmallRng,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty scene whose pastel colors come from `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let graph = Rc::new(RefCell::new(RenderGraph::new()));
        let mut registry = SceneRegistry::new();
        registry.subscribe(graph.clone());
        Self {
            registry,
            graph,
            selection: Selection::new(),
            panel: PanelState::neutral(),
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::default(),
            render_mode: RenderMode::default(),
            show_grid: true,
            show_axes: true,
            export: ExportSettings::default(),
            status: String::from("Ready"),
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn status(&mut self, message: impl Into<String>) -> Action {
        let message = message.into();
        log::info!("{message}");
        self.status.clone_from(&message);
        Action::Status { message }
    }

    // --- Objects ---

    /// Create a primitive at the origin with a pastel color and select it.
    pub fn add_primitive(&mut self, kind: GeometryKind) -> Vec<Action> {
        let mut material = Material::for_kind(kind, Rgb::pastel(&mut self.rng));
        material.wireframe = self.render_mode == RenderMode::Wireframe;
        let id = self.registry.add(SceneObject::new(kind.default_params(), material));

        let mut actions = vec![Action::ObjectAdded { id }];
        actions.extend(self.select(id));
        actions.push(self.status(format!("{kind} created")));
        actions
    }

    /// Remove the selected object.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        let Some(id) = self.selection.current() else {
            return vec![self.status("No object selected")];
        };
        self.registry.remove(id);
        self.selection.forget(id, &mut self.panel);
        self.input = InputState::Idle;
        vec![
            Action::ObjectRemoved { id },
            Action::SelectionChanged { id: None },
            Action::PanelChanged,
            self.status("Object deleted"),
            Action::RenderNeeded,
        ]
    }

    /// Copy the selected object, offset along X, and select the copy.
    pub fn duplicate_selected(&mut self) -> Vec<Action> {
        let Some(source) = self.selection.current().and_then(|id| self.registry.get(id)).cloned() else {
            return vec![self.status("No object selected")];
        };
        let kind = source.kind();
        let mut material = Material::for_kind(kind, source.material.color);
        material.metalness = source.material.metalness;
        material.roughness = source.material.roughness;
        material.wireframe = self.render_mode == RenderMode::Wireframe;

        let mut copy = SceneObject::new(source.params, material);
        copy.position = source.position + DVec3::new(DUPLICATE_OFFSET_X, 0.0, 0.0);
        copy.rotation = source.rotation;
        copy.scale = source.scale;
        let id = self.registry.add(copy);

        let mut actions = vec![Action::ObjectAdded { id }];
        actions.extend(self.select(id));
        actions.push(self.status("Object duplicated"));
        actions
    }

    /// Remove every object and clear the selection.
    pub fn new_scene(&mut self) -> Vec<Action> {
        self.selection.deselect(&mut self.registry, &mut self.panel);
        self.registry.clear();
        self.input = InputState::Idle;
        vec![
            Action::SceneCleared,
            Action::SelectionChanged { id: None },
            Action::PanelChanged,
            self.status("New scene created"),
            Action::RenderNeeded,
        ]
    }

    // --- Selection ---

    /// Select `id`, highlighting it and refreshing the panel.
    pub fn select(&mut self, id: ObjectId) -> Vec<Action> {
        if let Err(e) = self.selection.select(&mut self.registry, &mut self.panel, id) {
            log::warn!("select: {e}");
            return vec![self.status(e.to_string())];
        }
        let name = self.panel.name.clone();
        vec![
            Action::SelectionChanged { id: Some(id) },
            Action::PanelChanged,
            self.status(format!("Selected: {name}")),
            Action::RenderNeeded,
        ]
    }

    /// Clear the selection. A no-op when nothing is selected.
    pub fn deselect(&mut self) -> Vec<Action> {
        if self.selection.current().is_none() {
            return Vec::new();
        }
        self.selection.deselect(&mut self.registry, &mut self.panel);
        vec![
            Action::SelectionChanged { id: None },
            Action::PanelChanged,
            self.status("No selection"),
            Action::RenderNeeded,
        ]
    }

    fn pick(&self, screen: Point) -> Option<ObjectId> {
        let ray = self.camera.screen_ray(screen, self.viewport_width, self.viewport_height);
        hit::raycast(&ray, &self.graph.borrow()).map(|h| h.object_id)
    }

    // --- Panel ---

    /// Write raw panel text into the selected object.
    ///
    /// The numeric panel state follows, but no `PanelChanged` is emitted so
    /// the field being typed into is not reformatted under the cursor.
    pub fn set_field(&mut self, field: PanelField, raw: &str) -> Vec<Action> {
        let Some(id) = self.selection.current() else {
            return vec![self.status("No object selected")];
        };
        self.registry.update(id, |o| field.apply(raw, o));
        self.selection.refresh_panel(&self.registry, &mut self.panel);
        let message = match field {
            PanelField::Color | PanelField::Metalness | PanelField::Roughness => "Material updated",
            _ => "Properties updated",
        };
        vec![self.status(message), Action::RenderNeeded]
    }

    // --- Tool / view / display ---

    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.ui.tool = tool;
        if matches!(self.input, InputState::Transforming { .. }) {
            self.input = InputState::Idle;
        }
        vec![Action::ToolChanged { tool }, self.status(format!("Tool: {}", tool.name()))]
    }

    pub fn set_view(&mut self, preset: ViewPreset) -> Vec<Action> {
        self.camera.set_view(preset);
        vec![self.status(format!("View: {}", preset.label().to_lowercase())), Action::RenderNeeded]
    }

    /// Apply solid or wireframe drawing to every object.
    pub fn set_render_mode(&mut self, mode: RenderMode) -> Vec<Action> {
        self.render_mode = mode;
        let wireframe = mode == RenderMode::Wireframe;
        self.registry.update_all(|o| o.material.wireframe = wireframe);
        let name = match mode {
            RenderMode::Solid => "solid",
            RenderMode::Wireframe => "wireframe",
        };
        vec![self.status(format!("Render mode: {name}")), Action::RenderNeeded]
    }

    pub fn toggle_wireframe(&mut self) -> Vec<Action> {
        self.set_render_mode(self.render_mode.toggled())
    }

    pub fn toggle_grid(&mut self) -> Vec<Action> {
        self.show_grid = !self.show_grid;
        let state = if self.show_grid { "shown" } else { "hidden" };
        vec![self.status(format!("Grid {state}")), Action::RenderNeeded]
    }

    pub fn toggle_axes(&mut self) -> Vec<Action> {
        self.show_axes = !self.show_axes;
        let state = if self.show_axes { "shown" } else { "hidden" };
        vec![self.status(format!("Axes {state}")), Action::RenderNeeded]
    }

    // --- Framing ---

    /// Fit every object in view from the diagonal.
    pub fn frame_all(&mut self) -> Vec<Action> {
        let bounds = self.graph.borrow().bounds();
        if !framing::frame_bounds(&mut self.camera, &bounds, FrameDirection::Diagonal) {
            return vec![self.status("Nothing to frame")];
        }
        vec![self.status("Framed all objects"), Action::RenderNeeded]
    }

    /// Fit the selected object in view, keeping the look direction.
    pub fn frame_selected(&mut self) -> Vec<Action> {
        let Some(id) = self.selection.current() else {
            return vec![self.status("No object selected")];
        };
        let bounds = self.graph.borrow().node(id).map(|n| n.bounds);
        let framed = bounds.is_some_and(|b| framing::frame_bounds(&mut self.camera, &b, FrameDirection::PreserveLook));
        if !framed {
            return vec![self.status("Nothing to frame")];
        }
        vec![self.status("Framed selection"), Action::RenderNeeded]
    }

    // --- Viewport and input ---

    /// Update viewport dimensions and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css.max(0.0);
        self.viewport_height = height_css.max(0.0);
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        self.camera.set_viewport(self.viewport_width, self.viewport_height);
    }

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            self.input = InputState::Orbiting { last_screen: screen };
            return Vec::new();
        }
        let Some(id) = self.pick(screen) else {
            self.input = InputState::Orbiting { last_screen: screen };
            return self.deselect();
        };
        let actions = if self.selection.current() == Some(id) { Vec::new() } else { self.select(id) };
        let tool = self.ui.tool;
        self.input = match self.registry.get(id) {
            Some(object) if tool.is_transform() => {
                InputState::Transforming { id, tool, start_screen: screen, start: Transform::of(object) }
            }
            _ => InputState::Orbiting { last_screen: screen },
        };
        actions
    }

    pub fn on_pointer_move(&mut self, screen: Point, _modifiers: Modifiers) -> Vec<Action> {
        match self.input {
            InputState::Idle => Vec::new(),
            InputState::Orbiting { last_screen } => {
                self.camera.orbit(screen.x - last_screen.x, screen.y - last_screen.y);
                self.input = InputState::Orbiting { last_screen: screen };
                vec![Action::RenderNeeded]
            }
            InputState::Transforming { id, tool, start_screen, start } => {
                let delta = Point::new(screen.x - start_screen.x, screen.y - start_screen.y);
                let next = drag_transform(tool, start, delta, &self.camera);
                if self.registry.update(id, |o| next.write_to(o)) {
                    vec![Action::RenderNeeded]
                } else {
                    self.input = InputState::Idle;
                    Vec::new()
                }
            }
        }
    }

    pub fn on_pointer_up(&mut self, _screen: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        let finished = std::mem::take(&mut self.input);
        match finished {
            InputState::Transforming { .. } => {
                self.selection.refresh_panel(&self.registry, &mut self.panel);
                vec![Action::PanelChanged, self.status("Object transformed"), Action::RenderNeeded]
            }
            InputState::Idle | InputState::Orbiting { .. } => Vec::new(),
        }
    }

    pub fn on_wheel(&mut self, _screen: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        self.camera.zoom(delta.dy);
        vec![Action::RenderNeeded]
    }

    /// Run the shortcut bound to `key`. Ignored while a host text input has focus.
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers, text_input_focused: bool) -> Vec<Action> {
        if text_input_focused {
            return Vec::new();
        }
        match Shortcut::from_key(key, modifiers) {
            Some(Shortcut::SetTool(tool)) => self.set_tool(tool),
            Some(Shortcut::Add(kind)) => self.add_primitive(kind),
            Some(Shortcut::DeleteSelection) => self.delete_selected(),
            Some(Shortcut::FrameSelected) => self.frame_selected(),
            Some(Shortcut::FrameAll) => self.frame_all(),
            None => Vec::new(),
        }
    }

    // --- Queries ---

    /// The currently selected object, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ObjectId> {
        self.selection.current()
    }

    #[must_use]
    pub fn objects(&self) -> &[SceneObject] {
        self.registry.list()
    }

    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.registry.get(id)
    }

    #[must_use]
    pub fn draw_options(&self) -> DrawOptions {
        DrawOptions {
            width: self.viewport_width,
            height: self.viewport_height,
            dpr: self.dpr,
            background: Rgb::parse(SCENE_BACKGROUND),
            show_grid: self.show_grid,
            show_axes: self.show_axes,
        }
    }
}

/// The full editor engine. Wraps `EngineCore` and owns the viewport canvas.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: Option<CanvasRenderingContext2d>,
    pub core: EngineCore,
    rendered_image: Option<RenderedImage>,
}

impl Engine {
    /// Create an engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, seed: u64) -> Self {
        let ctx = match export::context_2d(&canvas) {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                log::warn!("viewport: {e}; drawing disabled");
                None
            }
        };
        Self { canvas, ctx, core: EngineCore::with_seed(seed), rendered_image: None }
    }

    /// Resize the backing store and update the camera aspect.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
        self.canvas.set_width(device_pixels(self.core.viewport_width, self.core.dpr));
        self.canvas.set_height(device_pixels(self.core.viewport_height, self.core.dpr));
    }

    /// Draw the current state to the canvas.
    pub fn render(&self) {
        let Some(ctx) = &self.ctx else {
            return;
        };
        let graph = self.core.graph.borrow();
        if let Err(e) = render::draw(ctx, &graph, &self.core.camera, &self.core.draw_options()) {
            log::warn!("render failed: {e:?}");
        }
    }

    /// Render the scene into `target` through the export fallback chain.
    /// A full render is also encoded and kept for [`Engine::download`].
    pub fn render_export(&mut self, target: &HtmlCanvasElement, preview: bool) -> ExportStage {
        let graph = self.core.graph.borrow();
        let source = ExportSource {
            graph: &graph,
            camera: &self.core.camera,
            viewport: Some(&self.canvas),
            show_grid: self.core.show_grid,
            show_axes: self.core.show_axes,
        };
        let stage = export::render_to_canvas(target, &source, &self.core.export, preview);
        drop(graph);

        if !preview {
            self.rendered_image = match export::encode(target, &self.core.export) {
                Ok(image) => Some(image),
                Err(e) => {
                    log::warn!("export: encoding failed: {e}");
                    None
                }
            };
        }
        stage
    }

    /// Full-size render into `target`, reporting how it went.
    pub fn render_image(&mut self, target: &HtmlCanvasElement) -> Vec<Action> {
        let stage = self.render_export(target, false);
        let ready = self.has_rendered_image();
        let message = match (stage, ready) {
            (_, false) => "Render failed",
            (ExportStage::Primary, true) => "Render complete",
            (_, true) => "Render complete (fallback image)",
        };
        vec![Action::ExportFinished { stage, ready }, self.core.status(message)]
    }

    /// Whether a full render is ready to download.
    #[must_use]
    pub fn has_rendered_image(&self) -> bool {
        self.rendered_image.is_some()
    }

    /// Save the last full render as `render_<timestamp>.<ext>`.
    ///
    /// # Errors
    ///
    /// Fails when nothing has been rendered or the download cannot start.
    pub fn download(&self) -> Result<String, ExportError> {
        let image = self.rendered_image.as_ref().ok_or(ExportError::NothingRendered)?;
        let document = web_sys::window().and_then(|w| w.document()).ok_or(ExportError::NoDocument)?;
        let name = image.file_name(&export::now_iso());
        export::download(&document, &image.data_url, &name)?;
        Ok(name)
    }

    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn device_pixels(css: f64, dpr: f64) -> u32 {
    (css * dpr).round().clamp(0.0, f64::from(u32::MAX)) as u32
}
