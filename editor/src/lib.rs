//! Scene editing and viewport engine for the browser 3D modeler.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! full lifecycle of the editor: the registry of scene objects, selection and
//! highlight state, two-way sync with the property panel, camera framing,
//! picking, drawing the viewport onto a 2D canvas, and exporting still
//! renders. The host page is responsible only for its widgets; it feeds raw
//! field text and DOM events into the engine and displays the returned
//! [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`scene`] | Scene registry, scene objects and change notifications |
//! | [`graph`] | Render graph mirroring the registry (world meshes and bounds) |
//! | [`selection`] | Single-object selection and highlight |
//! | [`panel`] | Property panel state and field parsing |
//! | [`geometry`] | Primitive kinds, dimensions and mesh generation |
//! | [`bounds`] | Axis-aligned bounding boxes |
//! | [`camera`] | Perspective camera, view presets, projection and rays |
//! | [`framing`] | Fitting a bounding volume in the field of view |
//! | [`hit`] | Ray casting against the render graph |
//! | [`input`] | Tools, keys, modifiers and the gesture state machine |
//! | [`render`] | Viewport drawing to a 2D context |
//! | [`export`] | Still-image export and its fallback chain |
//! | [`color`] | RGB colors, hex parsing, lighten/darken |
//! | [`web`] | `wasm-bindgen` facade and DOM event wiring |
//! | [`consts`] | Shared numeric constants |

pub mod bounds;
pub mod camera;
pub mod color;
pub mod consts;
pub mod engine;
pub mod export;
pub mod framing;
pub mod geometry;
pub mod graph;
pub mod hit;
pub mod input;
pub mod panel;
pub mod render;
pub mod scene;
pub mod selection;
pub mod web;
