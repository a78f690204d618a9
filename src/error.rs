//! Contract errors raised while building or updating modal dialogs.
//!
//! Every variant is a sequencing bug on the caller's side, never a transient
//! condition. They are propagated out of the call that detected them and are
//! not retried.

use crate::dialog::DialogId;
use crate::screen::{CompatibilityKey, ScreenType};

#[derive(Debug, thiserror::Error)]
pub enum ModalError {
    #[error("dialog {0} must be attached to a window")]
    NoWindow(DialogId),

    #[error("expected the decor view of dialog {0} to have been built")]
    NoDecorView(DialogId),

    #[error("modal content tag of dialog {0} is already occupied")]
    ContentTagOccupied(DialogId),

    #[error("dialog {0} was not built by a modal overlay dialog factory")]
    MissingContent(DialogId),

    #[error("dialog {0} has been dismissed")]
    Dismissed(DialogId),

    #[error("cannot show {attempted} in a view built for {current}")]
    IncompatibleRendering {
        current: CompatibilityKey,
        attempted: CompatibilityKey,
    },

    #[error("no view factory registered for {0}")]
    NoViewFactory(ScreenType),

    #[error("view factory for {expected} was handed a {actual} rendering")]
    UnexpectedRendering {
        expected: ScreenType,
        actual: ScreenType,
    },
}

pub type Result<T> = std::result::Result<T, ModalError>;
