//! Renderings: immutable descriptions of what a view should display.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{ModalError, Result};

/// Stable identifier of a rendering variant.
///
/// View factories are looked up by this identifier, so it must be unique per
/// rendering type within a [`ViewRegistry`](crate::registry::ViewRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenType(&'static str);

impl ScreenType {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ScreenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Decides whether a view built for one rendering may show another.
///
/// Two renderings are compatible iff their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompatibilityKey(String);

impl CompatibilityKey {
    pub fn of(screen_type: ScreenType) -> Self {
        Self(screen_type.name().to_string())
    }

    /// Key for a rendering that should only replace renderings of the same
    /// type and name.
    pub fn named(screen_type: ScreenType, name: &str) -> Self {
        Self(format!("{screen_type}+{name}"))
    }

    /// Key for a wrapper rendering, stable as long as the wrapped key is.
    pub fn wrapping(outer: ScreenType, inner: &Self) -> Self {
        Self(format!("{outer}({})", inner.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompatibilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A rendering type.
///
/// Implementations are plain immutable values. The view that displays them
/// is selected through [`Screen::screen_type`].
pub trait Screen: Any + fmt::Debug + Send + Sync {
    fn screen_type(&self) -> ScreenType;

    fn compatibility_key(&self) -> CompatibilityKey {
        CompatibilityKey::of(self.screen_type())
    }
}

impl dyn Screen {
    pub fn downcast_ref<S: Screen>(&self) -> Option<&S> {
        let any: &dyn Any = self;
        any.downcast_ref()
    }

    pub fn is_compatible_with(&self, other: &dyn Screen) -> bool {
        self.compatibility_key() == other.compatibility_key()
    }
}

/// Shared handle to an immutable rendering.
pub type Rendering = Arc<dyn Screen>;

/// Downcast a rendering handed to the view factory registered for `expected`.
pub fn expect_screen<S: Screen>(rendering: &dyn Screen, expected: ScreenType) -> Result<&S> {
    rendering
        .downcast_ref::<S>()
        .ok_or_else(|| ModalError::UnexpectedRendering {
            expected,
            actual: rendering.screen_type(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Plain;

    impl Screen for Plain {
        fn screen_type(&self) -> ScreenType {
            ScreenType::new("plain")
        }
    }

    #[derive(Debug)]
    struct Named(&'static str);

    impl Screen for Named {
        fn screen_type(&self) -> ScreenType {
            ScreenType::new("named")
        }

        fn compatibility_key(&self) -> CompatibilityKey {
            CompatibilityKey::named(self.screen_type(), self.0)
        }
    }

    #[test]
    fn test_compatibility_by_type() {
        let a: Rendering = Arc::new(Plain);
        let b: Rendering = Arc::new(Plain);
        let c: Rendering = Arc::new(Named("x"));
        assert!(a.is_compatible_with(b.as_ref()));
        assert!(!a.is_compatible_with(c.as_ref()));
    }

    #[test]
    fn test_compatibility_by_name() {
        let x: Rendering = Arc::new(Named("x"));
        let y: Rendering = Arc::new(Named("y"));
        assert!(!x.is_compatible_with(y.as_ref()));
        assert_eq!(x.compatibility_key().as_str(), "named+x");
    }

    #[test]
    fn test_wrapping_key() {
        let inner = CompatibilityKey::of(ScreenType::new("plain"));
        let key = CompatibilityKey::wrapping(ScreenType::new("back-button"), &inner);
        assert_eq!(key.to_string(), "back-button(plain)");
    }

    #[test]
    fn test_expect_screen() {
        let plain: Rendering = Arc::new(Plain);
        assert!(expect_screen::<Plain>(plain.as_ref(), ScreenType::new("plain")).is_ok());
        let err = expect_screen::<Named>(plain.as_ref(), ScreenType::new("named")).unwrap_err();
        assert!(matches!(err, ModalError::UnexpectedRendering { .. }));
    }
}
