//! Displayable units.
//!
//! A [`View`] is the materialized form of a rendering: a boxed
//! [`ViewComponent`] that draws into a ratatui frame and reacts to input,
//! plus an optional back-pressed handler slot that dismissal policies consult.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::Theme;
use crate::screen::ScreenType;

/// Callback run when a back press reaches a view.
pub type BackPressedHandler = Arc<dyn Fn() + Send + Sync>;

/// Handler that swallows the back press and does nothing else.
pub fn noop_back_handler() -> BackPressedHandler {
    Arc::new(|| {})
}

/// Result of handling an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Input was not handled, parent should process it.
    Ignored,
    /// Input was handled, it will not be propagated further.
    Consumed,
}

impl EventResult {
    pub const fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}

impl From<bool> for EventResult {
    fn from(consumed: bool) -> Self {
        if consumed { Self::Consumed } else { Self::Ignored }
    }
}

/// Interactive building block behind a [`View`].
///
/// Components know nothing about renderings; view factories push rendering
/// data into them on every show.
pub trait ViewComponent: Any {
    fn handle_key(&mut self, key: KeyEvent) -> EventResult {
        _ = key;
        EventResult::Ignored
    }

    /// `area` is where the component was last drawn.
    fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect) -> EventResult {
        _ = (mouse, area);
        EventResult::Ignored
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(u64);

impl ViewId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

pub struct View {
    id: ViewId,
    screen_type: ScreenType,
    component: Box<dyn ViewComponent>,
    back_pressed_handler: Option<BackPressedHandler>,
    last_area: Rect,
}

impl View {
    pub fn new(screen_type: ScreenType, component: impl ViewComponent) -> Self {
        Self {
            id: ViewId::next(),
            screen_type,
            component: Box::new(component),
            back_pressed_handler: None,
            last_area: Rect::default(),
        }
    }

    pub const fn id(&self) -> ViewId {
        self.id
    }

    /// Type of the rendering this view was built for.
    pub const fn screen_type(&self) -> ScreenType {
        self.screen_type
    }

    pub const fn back_pressed_handler(&self) -> Option<&BackPressedHandler> {
        self.back_pressed_handler.as_ref()
    }

    pub fn set_back_pressed_handler(&mut self, handler: Option<BackPressedHandler>) {
        self.back_pressed_handler = handler;
    }

    pub fn component<C: ViewComponent>(&self) -> Option<&C> {
        let any: &dyn Any = self.component.as_ref();
        any.downcast_ref()
    }

    pub fn component_mut<C: ViewComponent>(&mut self) -> Option<&mut C> {
        let any: &mut dyn Any = self.component.as_mut();
        any.downcast_mut()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EventResult {
        self.component.handle_key(key)
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> EventResult {
        self.component.handle_mouse(mouse, self.last_area)
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.last_area = area;
        self.component.render(frame, area, theme);
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.id)
            .field("screen_type", &self.screen_type)
            .field("has_back_handler", &self.back_pressed_handler.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    struct Counter {
        keys: usize,
    }

    impl ViewComponent for Counter {
        fn handle_key(&mut self, _key: KeyEvent) -> EventResult {
            self.keys += 1;
            EventResult::Consumed
        }

        fn render(&mut self, _frame: &mut Frame, _area: Rect, _theme: &Theme) {}
    }

    struct Other;

    impl ViewComponent for Other {
        fn render(&mut self, _frame: &mut Frame, _area: Rect, _theme: &Theme) {}
    }

    #[test]
    fn test_view_ids_are_unique() {
        let a = View::new(ScreenType::new("a"), Other);
        let b = View::new(ScreenType::new("a"), Other);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_component_downcast() {
        let mut view = View::new(ScreenType::new("counter"), Counter { keys: 0 });
        view.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert_eq!(view.component::<Counter>().map(|c| c.keys), Some(1));
        assert!(view.component::<Other>().is_none());
        assert!(view.component_mut::<Counter>().is_some());
    }

    #[test]
    fn test_back_handler_slot() {
        let mut view = View::new(ScreenType::new("other"), Other);
        assert!(view.back_pressed_handler().is_none());
        let handler = noop_back_handler();
        view.set_back_pressed_handler(Some(handler.clone()));
        assert!(Arc::ptr_eq(view.back_pressed_handler().unwrap(), &handler));
    }
}
