//! Default dialog factory for [`ModalScreenOverlay`] and other screen
//! overlays.
//!
//! Dialogs built here:
//!
//! - always carry a back-pressed handler on their content view, so a dismissal
//!   key never leaks to handlers that this modal session should block;
//! - answer releases of the [`DismissalKeys`] with the [`OnModalBackPressed`]
//!   policy of their current environment;
//! - follow the [`ModalArea`] of their environment. They are created with
//!   [`WindowFlags::NOT_TOUCH_MODAL`] so pointer events outside that area
//!   reach lower layers (a status bar, say).
//!
//! [`ModalScreenOverlay`]: crate::overlay::ModalScreenOverlay
//! [`OnModalBackPressed`]: crate::back_pressed::OnModalBackPressed
//! [`ModalArea`]: crate::modal_area::ModalArea

use std::sync::Arc;

use ratatui::layout::Rect;
use ratatui::style::Color;
use tracing::{debug, warn};

use crate::Theme;
use crate::back_button::decorate;
use crate::back_pressed::DismissalKeys;
use crate::bounds::BoundsSubscription;
use crate::dialog::{Dialog, DialogState, WindowFlags};
use crate::environment::Environment;
use crate::error::{ModalError, Result};
use crate::holder::start_showing;
use crate::input::{self, ModalContentLookup};
use crate::overlay::{OverlayDialogFactory, ScreenOverlay};
use crate::view::{View, noop_back_handler};

/// Customization points of [`ModalScreenOverlayDialogFactory`].
///
/// Overrides are not required to call the default behavior.
pub trait DialogHooks: 'static {
    /// Build (but do not show) the dialog that will display `content`.
    ///
    /// The default creates a dialog and configures it with
    /// [`Dialog::set_modal_content`] and [`DialogHooks::window_background`].
    fn build_dialog_with_content_view(&self, content: &View, env: &Environment) -> Result<Dialog> {
        let mut dialog = Dialog::new();
        dialog.set_modal_content(content, self.window_background(env))?;
        Ok(dialog)
    }

    /// Background of full-bleed dialogs. Defaults to the theme's window
    /// background, or none when the theme does not define a color.
    fn window_background(&self, env: &Environment) -> Option<Color> {
        env.get::<Theme>().resolve_window_background()
    }

    /// Called with every value of the modal area. Dialogs are expected to
    /// restrict themselves to it; the default calls [`Dialog::set_bounds`].
    fn update_bounds(&self, dialog: &mut Dialog, bounds: Rect) {
        dialog.set_bounds(bounds);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDialogHooks;

impl DialogHooks for DefaultDialogHooks {}

#[derive(Debug, Clone, Default)]
pub struct ModalScreenOverlayDialogFactory<H = DefaultDialogHooks> {
    hooks: Arc<H>,
}

impl ModalScreenOverlayDialogFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: DialogHooks> ModalScreenOverlayDialogFactory<H> {
    pub fn with_hooks(hooks: H) -> Self {
        Self {
            hooks: Arc::new(hooks),
        }
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }
}

impl<O, H> OverlayDialogFactory<O> for ModalScreenOverlayDialogFactory<H>
where
    O: ScreenOverlay + ?Sized,
    H: DialogHooks,
{
    fn build_dialog(&self, initial: &O, env: &Environment) -> Result<Dialog> {
        let mut holder = start_showing(decorate(initial.content()), env)?;
        if holder.view().back_pressed_handler().is_none() {
            warn!(
                view = %holder.view().id(),
                "content view lost its back handler, installing a no-op"
            );
            holder
                .view_mut()
                .set_back_pressed_handler(Some(noop_back_handler()));
        }

        let mut dialog = self
            .hooks
            .build_dialog_with_content_view(holder.view(), env)?;
        dialog.require_window()?;

        let keys = holder.environment().get::<DismissalKeys>();
        dialog.attach_modal_content(holder)?;
        input::install(&mut dialog, keys, ModalContentLookup)?;

        dialog
            .require_window()?
            .set_flags(WindowFlags::NOT_TOUCH_MODAL, WindowFlags::NOT_TOUCH_MODAL);

        let hooks = Arc::clone(&self.hooks);
        let subscription = BoundsSubscription::attach(
            &mut dialog,
            env,
            Box::new(move |dialog: &mut Dialog, bounds: Rect| hooks.update_bounds(dialog, bounds)),
        );
        dialog.set_bounds_subscription(subscription);

        dialog.set_state(DialogState::Built);
        debug!(dialog = %dialog.id(), content = %initial.content().screen_type(), "built modal dialog");
        Ok(dialog)
    }

    fn update_dialog(&self, dialog: &mut Dialog, rendering: &O, env: &Environment) -> Result<()> {
        let id = dialog.id();
        if dialog.state() == DialogState::Dismissed {
            return Err(ModalError::Dismissed(id));
        }
        dialog
            .modal_content_mut()
            .ok_or(ModalError::MissingContent(id))?
            .show(decorate(rendering.content()), env.clone())?;

        dialog.set_state(DialogState::Updated);
        dialog.maintain_bounds();
        debug!(dialog = %id, content = %rendering.content().screen_type(), "updated modal dialog");
        Ok(())
    }
}
