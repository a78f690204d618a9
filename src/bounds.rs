//! Keeps a dialog inside the [`ModalArea`] published in its environment.

use std::fmt;

use ratatui::layout::Rect;
use tokio::sync::watch;
use tracing::trace;

use crate::dialog::Dialog;
use crate::environment::Environment;
use crate::modal_area::ModalArea;

/// Applies a bounds value to a dialog.
pub type ApplyBounds = Box<dyn FnMut(&mut Dialog, Rect)>;

/// Live link between the modal area of a dialog's environment and the
/// dialog's bounds. Owned by the dialog and dropped with it.
///
/// The subscription reads the environment of the dialog's current content on
/// every refresh, so an update that swaps the modal area is followed without
/// resubscribing.
pub struct BoundsSubscription {
    source: Option<watch::Receiver<Rect>>,
    last_applied: Option<Rect>,
    apply: ApplyBounds,
}

impl BoundsSubscription {
    /// Subscribe `dialog` to the modal area in `env` and apply it right away
    /// if there is one.
    pub fn attach(dialog: &mut Dialog, env: &Environment, apply: ApplyBounds) -> Self {
        let mut subscription = Self {
            source: None,
            last_applied: None,
            apply,
        };
        subscription.refresh_from(dialog, env);
        subscription
    }

    pub const fn last_applied(&self) -> Option<Rect> {
        self.last_applied
    }

    /// Re-read the modal area through the dialog's current content.
    pub(crate) fn refresh(&mut self, dialog: &mut Dialog) {
        let Some(env) = dialog
            .modal_content()
            .map(|holder| holder.environment().clone())
        else {
            return;
        };
        self.refresh_from(dialog, &env);
    }

    fn refresh_from(&mut self, dialog: &mut Dialog, env: &Environment) {
        let Some(area) = env.get::<ModalArea>() else {
            return;
        };

        let rebind = self
            .source
            .as_ref()
            .is_none_or(|source| !source.same_channel(area.receiver()));
        if rebind {
            self.source = Some(area.receiver().clone());
        }
        let Some(source) = self.source.as_mut() else {
            return;
        };

        let bounds = *source.borrow_and_update();
        if self.last_applied == Some(bounds) {
            return;
        }
        trace!(dialog = %dialog.id(), ?bounds, "applying modal area");
        self.last_applied = Some(bounds);
        (self.apply)(dialog, bounds);
    }
}

impl fmt::Debug for BoundsSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundsSubscription")
            .field("subscribed", &self.source.is_some())
            .field("last_applied", &self.last_applied)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<Rect>>>, ApplyBounds) {
        let applied = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&applied);
        let apply: ApplyBounds = Box::new(move |dialog: &mut Dialog, bounds: Rect| {
            sink.lock().unwrap().push(bounds);
            dialog.set_bounds(bounds);
        });
        (applied, apply)
    }

    #[test]
    fn test_absent_area_never_applies() {
        let mut dialog = Dialog::new();
        let (applied, apply) = recorder();
        let subscription = BoundsSubscription::attach(&mut dialog, &Environment::new(), apply);

        assert!(applied.lock().unwrap().is_empty());
        assert_eq!(subscription.last_applied(), None);
        assert_eq!(dialog.bounds(), None);
    }

    #[test]
    fn test_present_area_applies_immediately() {
        let mut dialog = Dialog::new();
        let (applied, apply) = recorder();
        let env = Environment::new().with::<ModalArea>(Some(ModalArea::fixed(Rect::new(0, 0, 100, 200))));

        BoundsSubscription::attach(&mut dialog, &env, apply);

        assert_eq!(*applied.lock().unwrap(), vec![Rect::new(0, 0, 100, 200)]);
        assert_eq!(dialog.bounds(), Some(Rect::new(0, 0, 100, 200)));
    }

    #[test]
    fn test_changes_are_applied_once() {
        let mut dialog = Dialog::new();
        let (applied, apply) = recorder();
        let (tx, area) = ModalArea::channel(Rect::new(0, 0, 10, 10));
        let env = Environment::new().with::<ModalArea>(Some(area));
        let mut subscription = BoundsSubscription::attach(&mut dialog, &env, apply);

        subscription.refresh_from(&mut dialog, &env);
        tx.send_replace(Rect::new(0, 0, 30, 10));
        subscription.refresh_from(&mut dialog, &env);
        subscription.refresh_from(&mut dialog, &env);

        assert_eq!(
            *applied.lock().unwrap(),
            vec![Rect::new(0, 0, 10, 10), Rect::new(0, 0, 30, 10)]
        );
    }

    #[test]
    fn test_swapping_area_rebinds() {
        let mut dialog = Dialog::new();
        let (applied, apply) = recorder();
        let first = Environment::new().with::<ModalArea>(Some(ModalArea::fixed(Rect::new(0, 0, 5, 5))));
        let mut subscription = BoundsSubscription::attach(&mut dialog, &first, apply);

        let (tx, area) = ModalArea::channel(Rect::new(1, 1, 5, 5));
        let second = Environment::new().with::<ModalArea>(Some(area));
        subscription.refresh_from(&mut dialog, &second);
        tx.send_replace(Rect::new(2, 2, 5, 5));
        subscription.refresh_from(&mut dialog, &second);

        // Removing the area keeps the last constraint in place.
        subscription.refresh_from(&mut dialog, &Environment::new());

        assert_eq!(applied.lock().unwrap().len(), 3);
        assert_eq!(dialog.bounds(), Some(Rect::new(2, 2, 5, 5)));
    }
}
