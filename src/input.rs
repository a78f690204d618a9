//! Routes dismissal keys of a modal dialog to its dismissal policy.

use crossterm::event::{KeyEvent, KeyEventKind, MouseEvent};
use tracing::{trace, warn};

use crate::back_pressed::{DismissalKeys, OnModalBackPressed};
use crate::dialog::{DecorView, Dialog, WindowCallback};
use crate::error::Result;
use crate::view::View;

/// What a dismissal key is routed to: the policy and the view it asks about.
pub struct DismissalTarget<'a> {
    pub policy: OnModalBackPressed,
    pub view: &'a View,
}

/// Finds the current dismissal target of a window at dispatch time.
pub trait DismissalLookup {
    fn lookup<'a>(&self, decor: &'a DecorView) -> Option<DismissalTarget<'a>>;
}

/// Looks the target up through the content stored in the decor view's tag
/// slot, reading the policy from that content's latest environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModalContentLookup;

impl DismissalLookup for ModalContentLookup {
    fn lookup<'a>(&self, decor: &'a DecorView) -> Option<DismissalTarget<'a>> {
        decor.modal_content().map(|holder| DismissalTarget {
            policy: holder.environment().get::<OnModalBackPressed>(),
            view: holder.view(),
        })
    }
}

/// `true` for the release of a dismissal key.
pub fn is_dismissal(event: &KeyEvent, keys: &DismissalKeys) -> bool {
    event.kind == KeyEventKind::Release && keys.0.matches(event)
}

struct DismissalInterceptor<L> {
    real: Box<dyn WindowCallback>,
    keys: DismissalKeys,
    lookup: L,
}

impl<L: DismissalLookup> WindowCallback for DismissalInterceptor<L> {
    fn dispatch_key_event(&mut self, event: &KeyEvent, decor: &mut DecorView) -> bool {
        if !is_dismissal(event, &self.keys) {
            return self.real.dispatch_key_event(event, decor);
        }
        let Some(target) = self.lookup.lookup(decor) else {
            warn!(code = ?event.code, "dismissal key with no modal content attached");
            return false;
        };
        let handled = target.policy.on_back_pressed(target.view);
        trace!(view = %target.view.id(), handled, "dismissal key routed");
        handled
    }

    fn dispatch_mouse_event(&mut self, event: &MouseEvent, decor: &mut DecorView) -> bool {
        self.real.dispatch_mouse_event(event, decor)
    }
}

/// Wrap the window callback of `dialog` so that releases of `keys` are
/// answered by the dismissal policy found through `lookup`. Every other event
/// goes to the previous callback unchanged.
///
/// Call once per dialog, after its window exists and before it is shown.
pub fn install(
    dialog: &mut Dialog,
    keys: DismissalKeys,
    lookup: impl DismissalLookup + 'static,
) -> Result<()> {
    dialog.require_window()?.wrap_callback(|real| {
        Box::new(DismissalInterceptor { real, keys, lookup })
    });
    Ok(())
}
