use ratatui::layout::Rect;
use tokio::sync::watch;

use crate::environment::EnvironmentKey;

/// Live bounds of the area modals may cover, published by the container that
/// lays out the body and its overlays.
///
/// Dialogs built while a `ModalArea` is in the environment follow every value
/// sent on the channel for as long as they live.
#[derive(Debug, Clone)]
pub struct ModalArea {
    bounds: watch::Receiver<Rect>,
}

impl ModalArea {
    pub const fn new(bounds: watch::Receiver<Rect>) -> Self {
        Self { bounds }
    }

    /// A modal area with its publishing side.
    pub fn channel(initial: Rect) -> (watch::Sender<Rect>, Self) {
        let (tx, rx) = watch::channel(initial);
        (tx, Self::new(rx))
    }

    /// An area that never changes.
    pub fn fixed(bounds: Rect) -> Self {
        Self::channel(bounds).1
    }

    pub fn current(&self) -> Rect {
        *self.bounds.borrow()
    }

    pub(crate) const fn receiver(&self) -> &watch::Receiver<Rect> {
        &self.bounds
    }
}

impl EnvironmentKey for ModalArea {
    type Value = Option<Self>;
    const NAME: &'static str = "ModalArea";

    fn default_value() -> Option<Self> {
        None
    }
}
