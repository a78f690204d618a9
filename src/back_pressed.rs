//! Environment keys deciding what a dismissal key does inside a modal.

use std::fmt;
use std::sync::Arc;

use crossterm::event::KeyCode;

use crate::config::{Key, KeyBinding};
use crate::environment::EnvironmentKey;
use crate::view::View;

/// Decides whether a back press delivered to a modal was consumed by its
/// content.
pub trait DismissalPolicy: Send + Sync {
    /// Returns `true` when the back press was handled.
    fn on_back_pressed(&self, view: &View) -> bool;
}

/// Policy used when the environment provides none: nothing is handled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotHandled;

impl DismissalPolicy for NotHandled {
    fn on_back_pressed(&self, _view: &View) -> bool {
        false
    }
}

/// Runs the view's back-pressed handler, if it has one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchToBackHandler;

impl DismissalPolicy for DispatchToBackHandler {
    fn on_back_pressed(&self, view: &View) -> bool {
        view.back_pressed_handler().is_some_and(|handler| {
            handler();
            true
        })
    }
}

impl<F> DismissalPolicy for F
where
    F: Fn(&View) -> bool + Send + Sync,
{
    fn on_back_pressed(&self, view: &View) -> bool {
        self(view)
    }
}

/// Environment key for the dismissal policy of modal dialogs.
#[derive(Clone)]
pub struct OnModalBackPressed(pub Arc<dyn DismissalPolicy>);

impl OnModalBackPressed {
    pub fn new(policy: impl DismissalPolicy + 'static) -> Self {
        Self(Arc::new(policy))
    }

    pub fn on_back_pressed(&self, view: &View) -> bool {
        self.0.on_back_pressed(view)
    }
}

impl fmt::Debug for OnModalBackPressed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OnModalBackPressed").finish_non_exhaustive()
    }
}

impl EnvironmentKey for OnModalBackPressed {
    type Value = Self;
    const NAME: &'static str = "OnModalBackPressed";

    fn default_value() -> Self {
        Self::new(NotHandled)
    }
}

/// Keys treated as escape and platform back by modal dialogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DismissalKeys(pub KeyBinding);

impl EnvironmentKey for DismissalKeys {
    type Value = Self;
    const NAME: &'static str = "DismissalKeys";

    fn default_value() -> Self {
        Self(vec![Key::new(KeyCode::Esc), Key::with_alt(KeyCode::Left)].into())
    }
}
