//! Modal overlay dialogs for ratatui applications.
//!
//! A [`ModalScreenOverlay`] wraps a screen rendering. The
//! [`ModalScreenOverlayDialogFactory`] turns it into a [`Dialog`] that blocks
//! input to the layers below it, routes escape and back keys to the
//! [`OnModalBackPressed`] policy of its environment, and keeps itself inside
//! the [`ModalArea`] published by the host.

pub mod back_button;
pub mod back_pressed;
pub mod bounds;
pub mod config;
pub mod dialog;
pub mod environment;
pub mod error;
pub mod holder;
pub mod input;
pub mod modal;
pub mod modal_area;
pub mod overlay;
pub mod registry;
pub mod screen;
pub mod theme;
pub mod view;

pub use back_pressed::{DismissalKeys, DismissalPolicy, DispatchToBackHandler, NotHandled, OnModalBackPressed};
pub use dialog::{Dialog, DialogId, DialogState, WindowFlags};
pub use environment::{Environment, EnvironmentKey};
pub use error::{ModalError, Result};
pub use modal::{DefaultDialogHooks, DialogHooks, ModalScreenOverlayDialogFactory};
pub use modal_area::ModalArea;
pub use overlay::{ModalScreenOverlay, OverlayDialogFactory, ScreenOverlay};
pub use registry::{ScreenViewFactory, ViewRegistry};
pub use screen::{CompatibilityKey, Rendering, Screen, ScreenType};
pub use theme::Theme;
pub use view::{BackPressedHandler, EventResult, View, ViewComponent};
