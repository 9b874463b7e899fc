//! Browser facade: the `wasm-bindgen` surface the host page calls, plus DOM
//! event wiring.
//!
//! [`WebEditor`] owns the [`Engine`] behind `Rc<RefCell<..>>` so event
//! listeners, the animation-frame loop and export timers can reach it.
//! Those closures hold only a `Weak` reference; dropping the editor stops
//! the frame loop and detaches every listener. The viewport is redrawn on
//! every animation frame. Engine actions are forwarded to the host as JSON
//! strings.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, EventTarget, HtmlCanvasElement, KeyboardEvent, PointerEvent, WheelEvent};

use crate::camera::{Point, ViewPreset};
use crate::consts::EXPORT_DEFER_MS;
use crate::engine::{Action, Engine, EngineCore};
use crate::export::{ExportSettings, RawExportSettings};
use crate::geometry::GeometryKind;
use crate::input::{Button, Key, Modifiers, Tool, WheelDelta};
use crate::panel::PanelField;
use crate::render::RenderMode;
use crate::scene::{ObjectId, SceneObject};

/// Tags whose keyboard focus suppresses editor shortcuts.
const TEXT_INPUT_TAGS: [&str; 3] = ["INPUT", "TEXTAREA", "SELECT"];

/// Install the panic hook and console logger.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_ok() {
        log::info!("editor module loaded");
    }
}

struct Shared {
    engine: RefCell<Engine>,
    callback: RefCell<Option<js_sys::Function>>,
    frame: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    /// Id of the next scheduled animation frame.
    frame_id: Cell<Option<i32>>,
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

/// The editor as seen from JavaScript.
#[wasm_bindgen]
pub struct WebEditor {
    shared: Rc<Shared>,
    listeners: Vec<Listener>,
}

#[derive(Serialize)]
struct PanelView<'a> {
    selected: Option<ObjectId>,
    name: &'a str,
    vertex_count: usize,
    fields: BTreeMap<&'static str, String>,
}

#[derive(Serialize)]
struct ObjectSummary<'a> {
    id: ObjectId,
    name: &'a str,
    kind: GeometryKind,
}

#[wasm_bindgen]
impl WebEditor {
    /// Bind the editor to `canvas` and start listening for input.
    ///
    /// # Errors
    ///
    /// Fails when no window is available or a listener cannot be attached.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> Result<WebEditor, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let seed = random_seed();
        let shared = Rc::new(Shared {
            engine: RefCell::new(Engine::new(canvas.clone(), seed)),
            callback: RefCell::new(None),
            frame: RefCell::new(None),
            frame_id: Cell::new(None),
        });

        let weak = Rc::downgrade(&shared);
        let frame = Closure::wrap(Box::new(move |_ts: f64| {
            if let Some(shared) = weak.upgrade() {
                shared.engine.borrow().render();
                schedule_frame(&shared);
            }
        }) as Box<dyn FnMut(f64)>);
        *shared.frame.borrow_mut() = Some(frame);

        let canvas_target: &EventTarget = canvas.as_ref();
        let window_target: &EventTarget = window.as_ref();
        let listeners = vec![
            listen(canvas_target, "pointerdown", &shared, on_pointer_down)?,
            listen(canvas_target, "pointermove", &shared, on_pointer_move)?,
            listen(canvas_target, "pointerup", &shared, on_pointer_up)?,
            listen(canvas_target, "wheel", &shared, on_wheel)?,
            listen(window_target, "keydown", &shared, on_key_down)?,
            listen(window_target, "resize", &shared, |shared: &Rc<Shared>, _: Event| sync_viewport(shared))?,
        ];

        sync_viewport(&shared);
        schedule_frame(&shared);
        log::info!("editor attached");
        Ok(WebEditor { shared, listeners })
    }

    /// Register `callback(actionJson)` to receive engine actions.
    #[wasm_bindgen(js_name = onAction)]
    pub fn on_action(&self, callback: js_sys::Function) {
        *self.shared.callback.borrow_mut() = Some(callback);
    }

    /// Re-read the canvas size after a layout change.
    pub fn resize(&self) {
        sync_viewport(&self.shared);
    }

    // --- Objects ---

    /// Add a primitive by kind name (`cube`, `sphere`, `cylinder`, `plane`).
    ///
    /// # Errors
    ///
    /// Fails on an unknown kind name.
    #[wasm_bindgen(js_name = addPrimitive)]
    pub fn add_primitive(&self, kind: &str) -> Result<(), JsValue> {
        let kind = GeometryKind::from_name(kind).ok_or_else(|| unknown("primitive", kind))?;
        self.run(|core| core.add_primitive(kind));
        Ok(())
    }

    #[wasm_bindgen(js_name = deleteSelected)]
    pub fn delete_selected(&self) {
        self.run(EngineCore::delete_selected);
    }

    #[wasm_bindgen(js_name = duplicateSelected)]
    pub fn duplicate_selected(&self) {
        self.run(EngineCore::duplicate_selected);
    }

    #[wasm_bindgen(js_name = newScene)]
    pub fn new_scene(&self) {
        self.run(EngineCore::new_scene);
    }

    pub fn select(&self, id: u32) {
        self.run(|core| core.select(ObjectId(u64::from(id))));
    }

    pub fn deselect(&self) {
        self.run(EngineCore::deselect);
    }

    // --- Panel ---

    /// Apply raw text from a panel field, e.g. `("position-x", "1.5")`.
    ///
    /// # Errors
    ///
    /// Fails on an unknown field name.
    #[wasm_bindgen(js_name = setField)]
    pub fn set_field(&self, field: &str, raw: &str) -> Result<(), JsValue> {
        let field = PanelField::from_name(field).ok_or_else(|| unknown("field", field))?;
        self.run(|core| core.set_field(field, raw));
        Ok(())
    }

    /// Panel contents as JSON: selection, name, vertex count and formatted fields.
    ///
    /// # Errors
    ///
    /// Fails if serialization fails.
    #[wasm_bindgen(js_name = panelJson)]
    pub fn panel_json(&self) -> Result<String, JsValue> {
        let engine = self.shared.engine.borrow();
        let core = &engine.core;
        let view = PanelView {
            selected: core.selection(),
            name: &core.panel.name,
            vertex_count: core.panel.vertex_count,
            fields: core.panel.display_fields().into_iter().map(|(f, v)| (f.name(), v)).collect(),
        };
        serde_json::to_string(&view).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Scene objects as a JSON array of `{id, name, kind}`.
    ///
    /// # Errors
    ///
    /// Fails if serialization fails.
    #[wasm_bindgen(js_name = objectsJson)]
    pub fn objects_json(&self) -> Result<String, JsValue> {
        let engine = self.shared.engine.borrow();
        let summaries: Vec<ObjectSummary<'_>> = engine
            .core
            .objects()
            .iter()
            .map(|o: &SceneObject| ObjectSummary { id: o.id, name: &o.name, kind: o.kind() })
            .collect();
        serde_json::to_string(&summaries).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn status(&self) -> String {
        self.shared.engine.borrow().core.status.clone()
    }

    // --- Tools and view ---

    /// # Errors
    ///
    /// Fails on an unknown tool name.
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&self, name: &str) -> Result<(), JsValue> {
        let tool = Tool::from_name(name).ok_or_else(|| unknown("tool", name))?;
        self.run(|core| core.set_tool(tool));
        Ok(())
    }

    /// # Errors
    ///
    /// Fails on an unknown view name.
    #[wasm_bindgen(js_name = setView)]
    pub fn set_view(&self, name: &str) -> Result<(), JsValue> {
        let preset = ViewPreset::from_name(name).ok_or_else(|| unknown("view", name))?;
        self.run(|core| core.set_view(preset));
        Ok(())
    }

    /// # Errors
    ///
    /// Fails on an unknown render mode.
    #[wasm_bindgen(js_name = setRenderMode)]
    pub fn set_render_mode(&self, name: &str) -> Result<(), JsValue> {
        let mode = RenderMode::from_name(name).ok_or_else(|| unknown("render mode", name))?;
        self.run(|core| core.set_render_mode(mode));
        Ok(())
    }

    #[wasm_bindgen(js_name = toggleWireframe)]
    pub fn toggle_wireframe(&self) {
        self.run(EngineCore::toggle_wireframe);
    }

    #[wasm_bindgen(js_name = toggleGrid)]
    pub fn toggle_grid(&self) {
        self.run(EngineCore::toggle_grid);
    }

    #[wasm_bindgen(js_name = toggleAxes)]
    pub fn toggle_axes(&self) {
        self.run(EngineCore::toggle_axes);
    }

    #[wasm_bindgen(js_name = frameAll)]
    pub fn frame_all(&self) {
        self.run(EngineCore::frame_all);
    }

    #[wasm_bindgen(js_name = frameSelected)]
    pub fn frame_selected(&self) {
        self.run(EngineCore::frame_selected);
    }

    // --- Export ---

    /// Replace the export settings from the render dialog's raw values.
    ///
    /// # Errors
    ///
    /// Fails if `json` is not an object of string fields.
    #[wasm_bindgen(js_name = setExportSettings)]
    pub fn set_export_settings(&self, json: &str) -> Result<(), JsValue> {
        let raw: RawExportSettings = serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.shared.engine.borrow_mut().core.export = ExportSettings::from_raw(&raw);
        Ok(())
    }

    /// Draw a reduced-size preview into `target` after a short delay.
    #[wasm_bindgen(js_name = renderPreview)]
    pub fn render_preview(&self, target: HtmlCanvasElement) {
        self.defer_export(move |shared| {
            let stage = shared.engine.borrow_mut().render_export(&target, true);
            log::debug!("preview rendered via {stage:?}");
        });
    }

    /// Render at full size into `target` after a short delay; the result
    /// becomes available to [`WebEditor::download`].
    #[wasm_bindgen(js_name = renderImage)]
    pub fn render_image(&self, target: HtmlCanvasElement) {
        self.defer_export(move |shared| {
            let actions = shared.engine.borrow_mut().render_image(&target);
            dispatch(shared, actions);
        });
    }

    /// Download the last full render, returning its file name.
    ///
    /// # Errors
    ///
    /// Fails when nothing has been rendered or the download cannot start.
    pub fn download(&self) -> Result<String, JsValue> {
        self.shared.engine.borrow().download().map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl WebEditor {
    fn run(&self, op: impl FnOnce(&mut EngineCore) -> Vec<Action>) {
        let actions = op(&mut self.shared.engine.borrow_mut().core);
        dispatch(&self.shared, actions);
    }

    /// Run `job` after [`EXPORT_DEFER_MS`] so the host can repaint its
    /// loading indicator first. Once scheduled, a job always runs.
    fn defer_export(&self, job: impl FnOnce(&Rc<Shared>) + 'static) {
        let weak: Weak<Shared> = Rc::downgrade(&self.shared);
        Timeout::new(EXPORT_DEFER_MS, move || {
            if let Some(shared) = weak.upgrade() {
                job(&shared);
            }
        })
        .forget();
    }
}

impl Drop for WebEditor {
    fn drop(&mut self) {
        if let (Some(window), Some(id)) = (web_sys::window(), self.shared.frame_id.take()) {
            if let Err(e) = window.cancel_animation_frame(id) {
                log::warn!("failed to cancel animation frame: {e:?}");
            }
        }
        for listener in self.listeners.drain(..) {
            if let Err(e) = listener
                .target
                .remove_event_listener_with_callback(listener.event, listener.closure.as_ref().unchecked_ref())
            {
                log::warn!("failed to detach {} listener: {e:?}", listener.event);
            }
        }
    }
}

// =============================================================
// Event wiring
// =============================================================

fn listen<E, F>(target: &EventTarget, event: &'static str, shared: &Rc<Shared>, mut handler: F) -> Result<Listener, JsValue>
where
    E: JsCast + 'static,
    F: FnMut(&Rc<Shared>, E) + 'static,
{
    let weak = Rc::downgrade(shared);
    let closure = Closure::wrap(Box::new(move |ev: Event| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        if let Ok(ev) = ev.dyn_into::<E>() {
            handler(&shared, ev);
        }
    }) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    Ok(Listener { target: target.clone(), event, closure })
}

fn on_pointer_down(shared: &Rc<Shared>, ev: PointerEvent) {
    ev.prevent_default();
    if let Err(e) = shared.engine.borrow().canvas().set_pointer_capture(ev.pointer_id()) {
        log::debug!("pointer capture unavailable: {e:?}");
    }
    let actions =
        shared.engine.borrow_mut().core.on_pointer_down(pointer_point(&ev), Button::from_dom(ev.button()), mouse_modifiers(&ev));
    dispatch(shared, actions);
}

fn on_pointer_move(shared: &Rc<Shared>, ev: PointerEvent) {
    let actions = shared.engine.borrow_mut().core.on_pointer_move(pointer_point(&ev), mouse_modifiers(&ev));
    dispatch(shared, actions);
}

fn on_pointer_up(shared: &Rc<Shared>, ev: PointerEvent) {
    let actions =
        shared.engine.borrow_mut().core.on_pointer_up(pointer_point(&ev), Button::from_dom(ev.button()), mouse_modifiers(&ev));
    dispatch(shared, actions);
}

fn on_wheel(shared: &Rc<Shared>, ev: WheelEvent) {
    ev.prevent_default();
    let point = Point::new(f64::from(ev.offset_x()), f64::from(ev.offset_y()));
    let delta = WheelDelta { dx: ev.delta_x(), dy: ev.delta_y() };
    let modifiers = Modifiers { shift: ev.shift_key(), ctrl: ev.ctrl_key(), alt: ev.alt_key(), meta: ev.meta_key() };
    let actions = shared.engine.borrow_mut().core.on_wheel(point, delta, modifiers);
    dispatch(shared, actions);
}

fn on_key_down(shared: &Rc<Shared>, ev: KeyboardEvent) {
    let typing = ev
        .target()
        .as_ref()
        .and_then(|t| t.dyn_ref::<Element>())
        .is_some_and(|el| TEXT_INPUT_TAGS.contains(&el.tag_name().as_str()));
    let modifiers = Modifiers { shift: ev.shift_key(), ctrl: ev.ctrl_key(), alt: ev.alt_key(), meta: ev.meta_key() };
    let actions = shared.engine.borrow_mut().core.on_key_down(&Key(ev.key()), modifiers, typing);
    if !actions.is_empty() {
        ev.prevent_default();
    }
    dispatch(shared, actions);
}

fn pointer_point(ev: &PointerEvent) -> Point {
    Point::new(f64::from(ev.offset_x()), f64::from(ev.offset_y()))
}

fn mouse_modifiers(ev: &PointerEvent) -> Modifiers {
    Modifiers { shift: ev.shift_key(), ctrl: ev.ctrl_key(), alt: ev.alt_key(), meta: ev.meta_key() }
}

// =============================================================
// Rendering and host callbacks
// =============================================================

/// Match the engine viewport to the canvas's laid-out size.
fn sync_viewport(shared: &Rc<Shared>) {
    let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
    let mut engine = shared.engine.borrow_mut();
    let width = f64::from(engine.canvas().client_width());
    let height = f64::from(engine.canvas().client_height());
    engine.set_viewport(width, height, dpr);
}

/// Queue the next tick of the redraw loop.
fn schedule_frame(shared: &Shared) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let frame = shared.frame.borrow();
    let Some(frame) = frame.as_ref() else {
        return;
    };
    match window.request_animation_frame(frame.as_ref().unchecked_ref()) {
        Ok(id) => shared.frame_id.set(Some(id)),
        Err(e) => {
            shared.frame_id.set(None);
            log::warn!("animation frame unavailable, viewport redraw stopped: {e:?}");
        }
    }
}

/// Forward `actions` to the host callback.
fn dispatch(shared: &Rc<Shared>, actions: Vec<Action>) {
    let callback = shared.callback.borrow().clone();
    if let Some(callback) = callback {
        for action in &actions {
            match serde_json::to_string(action) {
                Ok(json) => {
                    if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                        log::warn!("action callback failed: {e:?}");
                    }
                }
                Err(e) => log::warn!("failed to encode action: {e}"),
            }
        }
    }
}

fn unknown(what: &str, name: &str) -> JsValue {
    JsValue::from_str(&format!("unknown {what}: {name}"))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn random_seed() -> u64 {
    (js_sys::Math::random() * f64::from(u32::MAX)) as u64
}
