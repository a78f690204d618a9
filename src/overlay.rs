//! Overlay renderings and the factories that turn them into dialogs.

use std::fmt;
use std::sync::Arc;

use crate::dialog::Dialog;
use crate::environment::Environment;
use crate::error::Result;
use crate::screen::{Rendering, Screen};

/// An overlay whose content is a screen rendering.
pub trait ScreenOverlay: fmt::Debug {
    fn content(&self) -> &Rendering;
}

/// Overlay shown in a modal dialog: it blocks input to everything below it
/// within the modal area.
#[derive(Debug, Clone)]
pub struct ModalScreenOverlay {
    content: Rendering,
}

impl ModalScreenOverlay {
    pub fn new(content: impl Screen) -> Self {
        Self {
            content: Arc::new(content),
        }
    }

    pub const fn from_rendering(content: Rendering) -> Self {
        Self { content }
    }
}

impl ScreenOverlay for ModalScreenOverlay {
    fn content(&self) -> &Rendering {
        &self.content
    }
}

/// Builds a dialog for an overlay rendering and keeps it up to date.
pub trait OverlayDialogFactory<O: ?Sized> {
    /// Build (but do not show) a dialog for `initial`.
    fn build_dialog(&self, initial: &O, env: &Environment) -> Result<Dialog>;

    /// Show `rendering` in a dialog previously built by this factory.
    fn update_dialog(&self, dialog: &mut Dialog, rendering: &O, env: &Environment) -> Result<()>;
}
