//! Back-press handling for wrapped content.
//!
//! [`BackButtonScreen`] wraps any rendering and makes sure its view carries a
//! back-pressed handler. The handler of the wrapped content always takes
//! precedence; the wrapper's handler is only installed on views that end up
//! without one after the content was shown.

use std::fmt;
use std::sync::Arc;

use crate::environment::Environment;
use crate::error::Result;
use crate::registry::{ScreenViewFactory, ViewRegistry};
use crate::screen::{CompatibilityKey, Rendering, Screen, ScreenType, expect_screen};
use crate::view::{BackPressedHandler, View, noop_back_handler};

pub const BACK_BUTTON_SCREEN: ScreenType = ScreenType::new("back-button");

#[derive(Clone)]
pub struct BackButtonScreen {
    wrapped: Rendering,
    on_back_pressed: BackPressedHandler,
}

impl BackButtonScreen {
    pub fn new(wrapped: Rendering, on_back_pressed: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            wrapped,
            on_back_pressed: Arc::new(on_back_pressed),
        }
    }

    /// Wrapper whose handler swallows the back press.
    pub fn noop(wrapped: Rendering) -> Self {
        Self {
            wrapped,
            on_back_pressed: noop_back_handler(),
        }
    }

    pub const fn wrapped(&self) -> &Rendering {
        &self.wrapped
    }

    pub const fn on_back_pressed(&self) -> &BackPressedHandler {
        &self.on_back_pressed
    }
}

impl fmt::Debug for BackButtonScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackButtonScreen")
            .field("wrapped", &self.wrapped)
            .finish_non_exhaustive()
    }
}

impl Screen for BackButtonScreen {
    fn screen_type(&self) -> ScreenType {
        BACK_BUTTON_SCREEN
    }

    fn compatibility_key(&self) -> CompatibilityKey {
        CompatibilityKey::wrapping(BACK_BUTTON_SCREEN, &self.wrapped.compatibility_key())
    }
}

/// Wrap modal content so that its view always has a back-pressed handler.
///
/// Pure; the result is compatible with any other decoration of a compatible
/// rendering, which keeps in-place updates of modal content possible.
pub fn decorate(content: &Rendering) -> Rendering {
    Arc::new(BackButtonScreen::noop(Arc::clone(content)))
}

/// Shows the wrapped rendering in its own view and fills the handler slot
/// afterwards if the content left it empty.
pub struct BackButtonScreenViewFactory;

impl ScreenViewFactory for BackButtonScreenViewFactory {
    fn screen_type(&self) -> ScreenType {
        BACK_BUTTON_SCREEN
    }

    fn build_view(&self, initial: &dyn Screen, env: &Environment) -> Result<View> {
        let screen = expect_screen::<BackButtonScreen>(initial, BACK_BUTTON_SCREEN)?;
        let wrapped = screen.wrapped.as_ref();
        env.get::<ViewRegistry>()
            .require(wrapped.screen_type())?
            .build_view(wrapped, env)
    }

    fn show(&self, view: &mut View, rendering: &dyn Screen, env: &Environment) -> Result<()> {
        let screen = expect_screen::<BackButtonScreen>(rendering, BACK_BUTTON_SCREEN)?;
        let wrapped = screen.wrapped.as_ref();
        env.get::<ViewRegistry>()
            .require(wrapped.screen_type())?
            .show(view, wrapped, env)?;

        if view.back_pressed_handler().is_none() {
            view.set_back_pressed_handler(Some(Arc::clone(&screen.on_back_pressed)));
        }
        Ok(())
    }
}
