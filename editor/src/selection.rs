//! Selection controller: at most one active object.
//!
//! The controller holds an id, never the object. Selecting or deselecting
//! moves the highlight (an emissive tint) and refreshes the panel in the same
//! call, so the panel can never show a stale object.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use thiserror::Error;

use crate::color::Rgb;
use crate::consts::HIGHLIGHT_EMISSIVE;
use crate::panel::PanelState;
use crate::scene::{ObjectId, SceneRegistry};

/// Errors from selection changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("object {0} is not in the scene")]
    UnknownObject(ObjectId),
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    current: Option<ObjectId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Option<ObjectId> {
        self.current
    }

    /// Make `id` the selection, moving the highlight and refreshing `panel`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnknownObject`] if `id` is not in `registry`;
    /// the selection and highlight are left untouched.
    pub fn select(
        &mut self,
        registry: &mut SceneRegistry,
        panel: &mut PanelState,
        id: ObjectId,
    ) -> Result<(), SelectionError> {
        if !registry.contains(id) {
            return Err(SelectionError::UnknownObject(id));
        }
        if let Some(previous) = self.current.take() {
            registry.update(previous, |o| o.material.emissive = Rgb::BLACK);
        }
        registry.update(id, |o| o.material.emissive = Rgb::from_hex(HIGHLIGHT_EMISSIVE));
        self.current = Some(id);
        self.refresh_panel(registry, panel);
        Ok(())
    }

    /// Clear the selection and highlight, and reset `panel` to neutral values.
    pub fn deselect(&mut self, registry: &mut SceneRegistry, panel: &mut PanelState) {
        if let Some(previous) = self.current.take() {
            registry.update(previous, |o| o.material.emissive = Rgb::BLACK);
        }
        panel.reset();
    }

    /// Drop the selection if it refers to `id`. Call after `id` is removed.
    pub fn forget(&mut self, id: ObjectId, panel: &mut PanelState) {
        if self.current == Some(id) {
            self.current = None;
            panel.reset();
        }
    }

    /// Copy the selected object's values into `panel`, or reset it when the
    /// selection is empty or dangling.
    pub fn refresh_panel(&self, registry: &SceneRegistry, panel: &mut PanelState) {
        match self.current.and_then(|id| registry.get(id)) {
            Some(object) => *panel = PanelState::from_object(object),
            None => panel.reset(),
        }
    }
}
