//! The host presentation surface: a dialog window composited over the body.
//!
//! A [`Dialog`] owns an optional [`Window`]; the window owns the input
//! callback, the layout flags and bounds, the background, and the
//! [`DecorView`] whose tag slot holds the modal content once it is attached.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;
use crossterm::event::{KeyEvent, KeyEventKind, MouseEvent};
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Clear};
use tracing::debug;

use crate::Theme;
use crate::bounds::BoundsSubscription;
use crate::error::{ModalError, Result};
use crate::holder::ScreenViewHolder;
use crate::view::{View, ViewId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DialogId(u64);

impl DialogId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dialog#{}", self.0)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WindowFlags: u32 {
        /// Pointer events outside the window bounds go to lower layers
        /// instead of being swallowed by the dialog.
        const NOT_TOUCH_MODAL = 1 << 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    /// Constructed, content not yet attached.
    Unbuilt,
    Built,
    Updated,
    /// Terminal. The window and everything it owned has been released.
    Dismissed,
}

/// Input dispatch slot of a [`Window`].
///
/// Callbacks receive the decor view so they can reach the attached content.
pub trait WindowCallback {
    /// Returns `true` when the event was consumed.
    fn dispatch_key_event(&mut self, event: &KeyEvent, decor: &mut DecorView) -> bool;

    /// Returns `true` when the event was consumed.
    fn dispatch_mouse_event(&mut self, event: &MouseEvent, decor: &mut DecorView) -> bool;
}

/// Forwards input to the content view. Key releases are not delivered to
/// views.
#[derive(Debug, Default)]
pub struct DefaultWindowCallback;

impl WindowCallback for DefaultWindowCallback {
    fn dispatch_key_event(&mut self, event: &KeyEvent, decor: &mut DecorView) -> bool {
        if event.kind == KeyEventKind::Release {
            return false;
        }
        decor
            .content_view_mut()
            .is_some_and(|view| view.handle_key(*event).is_consumed())
    }

    fn dispatch_mouse_event(&mut self, event: &MouseEvent, decor: &mut DecorView) -> bool {
        decor
            .content_view_mut()
            .is_some_and(|view| view.handle_mouse(*event).is_consumed())
    }
}

/// Root of a window's view tree.
#[derive(Debug, Default)]
pub struct DecorView {
    content_view: Option<ViewId>,
    modal_content: Option<ScreenViewHolder>,
}

impl DecorView {
    pub const fn content_view_id(&self) -> Option<ViewId> {
        self.content_view
    }

    /// Content holder stored by the modal dialog factory.
    pub const fn modal_content(&self) -> Option<&ScreenViewHolder> {
        self.modal_content.as_ref()
    }

    pub(crate) const fn modal_content_mut(&mut self) -> Option<&mut ScreenViewHolder> {
        self.modal_content.as_mut()
    }

    pub(crate) fn content_view_mut(&mut self) -> Option<&mut View> {
        self.modal_content.as_mut().map(ScreenViewHolder::view_mut)
    }
}

pub struct Window {
    callback: Box<dyn WindowCallback>,
    callback_installs: u32,
    flags: WindowFlags,
    bounds: Option<Rect>,
    background: Option<Color>,
    decor: Option<DecorView>,
}

impl Window {
    fn new() -> Self {
        Self {
            callback: Box::new(DefaultWindowCallback),
            callback_installs: 0,
            flags: WindowFlags::empty(),
            bounds: None,
            background: None,
            decor: None,
        }
    }

    /// Replace the input callback; `wrap` receives the current one.
    pub(crate) fn wrap_callback(
        &mut self,
        wrap: impl FnOnce(Box<dyn WindowCallback>) -> Box<dyn WindowCallback>,
    ) {
        let real = std::mem::replace(&mut self.callback, Box::new(DefaultWindowCallback));
        self.callback = wrap(real);
        self.callback_installs += 1;
    }

    /// Number of times the callback was replaced since construction.
    pub const fn callback_installs(&self) -> u32 {
        self.callback_installs
    }

    pub const fn flags(&self) -> WindowFlags {
        self.flags
    }

    /// Set the flags in `mask` to their value in `flags`.
    pub fn set_flags(&mut self, flags: WindowFlags, mask: WindowFlags) {
        self.flags = (self.flags & !mask) | (flags & mask);
    }

    pub const fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub const fn set_bounds(&mut self, bounds: Option<Rect>) {
        self.bounds = bounds;
    }

    pub const fn background(&self) -> Option<Color> {
        self.background
    }

    pub const fn set_background(&mut self, background: Option<Color>) {
        self.background = background;
    }

    /// The decor view, if content has been set.
    pub const fn peek_decor_view(&self) -> Option<&DecorView> {
        self.decor.as_ref()
    }

    pub(crate) const fn peek_decor_view_mut(&mut self) -> Option<&mut DecorView> {
        self.decor.as_mut()
    }

    /// Build the decor view if needed and make `view` its content.
    pub(crate) fn set_content_view(&mut self, view: ViewId) {
        self.decor.get_or_insert_with(DecorView::default).content_view = Some(view);
    }

    fn dispatch_key_event(&mut self, event: &KeyEvent) -> bool {
        let Self { callback, decor, .. } = self;
        decor
            .as_mut()
            .is_some_and(|decor| callback.dispatch_key_event(event, decor))
    }

    fn dispatch_mouse_event(&mut self, event: &MouseEvent) -> bool {
        let Self { callback, decor, .. } = self;
        decor
            .as_mut()
            .is_some_and(|decor| callback.dispatch_mouse_event(event, decor))
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("callback_installs", &self.callback_installs)
            .field("flags", &self.flags)
            .field("bounds", &self.bounds)
            .field("background", &self.background)
            .field("decor", &self.decor)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct Dialog {
    id: DialogId,
    state: DialogState,
    cancelable: bool,
    window: Option<Window>,
    bounds_subscription: Option<BoundsSubscription>,
}

impl Dialog {
    pub fn new() -> Self {
        Self {
            window: Some(Window::new()),
            ..Self::detached()
        }
    }

    /// A dialog that has no window. Useful for hosts that attach windows
    /// lazily; modal dialog factories reject it.
    pub fn detached() -> Self {
        Self {
            id: DialogId::next(),
            state: DialogState::Unbuilt,
            cancelable: true,
            window: None,
            bounds_subscription: None,
        }
    }

    pub const fn id(&self) -> DialogId {
        self.id
    }

    pub const fn state(&self) -> DialogState {
        self.state
    }

    pub(crate) const fn set_state(&mut self, state: DialogState) {
        self.state = state;
    }

    /// Whether [`Dialog::cancel`] may dismiss the dialog. Modal content
    /// turns this off; such dialogs go away through their dismissal policy.
    pub const fn is_cancelable(&self) -> bool {
        self.cancelable
    }

    pub const fn set_cancelable(&mut self, cancelable: bool) {
        self.cancelable = cancelable;
    }

    /// Dismiss the dialog if it is cancelable. Returns `true` when it was
    /// dismissed.
    pub fn cancel(&mut self) -> bool {
        if !self.cancelable {
            debug!(dialog = %self.id, "ignoring cancel of non-cancelable dialog");
            return false;
        }
        self.dismiss();
        true
    }

    pub const fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }

    pub const fn window_mut(&mut self) -> Option<&mut Window> {
        self.window.as_mut()
    }

    /// Window of a dialog that must have one.
    pub fn require_window(&mut self) -> Result<&mut Window> {
        let id = self.id;
        self.window.as_mut().ok_or(ModalError::NoWindow(id))
    }

    /// Configure a freshly built dialog to show `content` as a non-cancelable
    /// modal. A `None` background leaves the window transparent so it can go
    /// full bleed.
    pub fn set_modal_content(&mut self, content: &View, background: Option<Color>) -> Result<()> {
        self.cancelable = false;
        let window = self.require_window()?;
        window.set_content_view(content.id());
        window.set_background(background);
        Ok(())
    }

    /// Restrict the dialog to `bounds`.
    pub fn set_bounds(&mut self, bounds: Rect) {
        if let Some(window) = self.window.as_mut() {
            window.set_bounds(Some(bounds));
        }
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.window.as_ref().and_then(Window::bounds)
    }

    pub fn modal_content(&self) -> Option<&ScreenViewHolder> {
        self.window
            .as_ref()
            .and_then(Window::peek_decor_view)
            .and_then(DecorView::modal_content)
    }

    pub(crate) fn modal_content_mut(&mut self) -> Option<&mut ScreenViewHolder> {
        self.window
            .as_mut()
            .and_then(Window::peek_decor_view_mut)
            .and_then(DecorView::modal_content_mut)
    }

    /// Store the modal content in the decor view's tag slot. The slot is
    /// written once per dialog.
    pub(crate) fn attach_modal_content(&mut self, holder: ScreenViewHolder) -> Result<()> {
        let id = self.id;
        let decor = self
            .require_window()?
            .peek_decor_view_mut()
            .ok_or(ModalError::NoDecorView(id))?;
        if decor.modal_content.is_some() {
            return Err(ModalError::ContentTagOccupied(id));
        }
        decor.modal_content = Some(holder);
        Ok(())
    }

    pub(crate) fn set_bounds_subscription(&mut self, subscription: BoundsSubscription) {
        self.bounds_subscription = Some(subscription);
    }

    pub const fn is_showing(&self) -> bool {
        matches!(self.state, DialogState::Built | DialogState::Updated)
    }

    /// Reapply the modal area if it changed since it was last applied.
    pub fn maintain_bounds(&mut self) {
        if let Some(mut subscription) = self.bounds_subscription.take() {
            subscription.refresh(self);
            self.bounds_subscription = Some(subscription);
        }
    }

    /// Route a key event through the window callback.
    pub fn dispatch_key_event(&mut self, event: &KeyEvent) -> bool {
        if !self.is_showing() {
            return false;
        }
        self.window
            .as_mut()
            .is_some_and(|window| window.dispatch_key_event(event))
    }

    /// Route a pointer event. Events outside the bounds of a
    /// [`WindowFlags::NOT_TOUCH_MODAL`] window are left for lower layers;
    /// every other event is consumed by the dialog.
    pub fn dispatch_mouse_event(&mut self, event: &MouseEvent) -> bool {
        if !self.is_showing() {
            return false;
        }
        self.maintain_bounds();
        let Some(window) = self.window.as_mut() else {
            return false;
        };
        let inside = window
            .bounds
            .is_none_or(|bounds| bounds.contains(Position::new(event.column, event.row)));
        if !inside {
            return !window.flags.contains(WindowFlags::NOT_TOUCH_MODAL);
        }
        window.dispatch_mouse_event(event);
        true
    }

    /// Draw the dialog over whatever is already in the frame.
    pub fn render(&mut self, frame: &mut Frame) {
        if !self.is_showing() {
            return;
        }
        self.maintain_bounds();
        let theme = self
            .modal_content()
            .map(|holder| holder.environment().get::<Theme>())
            .unwrap_or_default();
        let Some(window) = self.window.as_mut() else {
            return;
        };
        let area = window
            .bounds
            .map_or_else(|| frame.area(), |bounds| bounds.intersection(frame.area()));
        if area.is_empty() {
            return;
        }

        if let Some(background) = window.background {
            frame.render_widget(Clear, area);
            frame.render_widget(Block::default().style(Style::default().bg(background)), area);
        }
        if let Some(view) = window.decor.as_mut().and_then(DecorView::content_view_mut) {
            view.render(frame, area, &theme);
        }
    }

    /// Release the window and everything attached to it.
    pub fn dismiss(&mut self) {
        if self.state == DialogState::Dismissed {
            return;
        }
        debug!(dialog = %self.id, "dismissing dialog");
        self.state = DialogState::Dismissed;
        self.bounds_subscription = None;
        self.window = None;
    }
}

impl Default for Dialog {
    fn default() -> Self {
        Self::new()
    }
}
