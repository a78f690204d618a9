use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::back_button::BackButtonScreenViewFactory;
use crate::environment::{Environment, EnvironmentKey};
use crate::error::{ModalError, Result};
use crate::screen::{Screen, ScreenType};
use crate::view::View;

/// Builds and updates the [`View`] for one rendering type.
///
/// `build_view` creates the view once; `show` is called right after it, and
/// again for every later rendering of a compatible type. A factory must be
/// able to show any rendering whose `screen_type` equals its own.
pub trait ScreenViewFactory: Send + Sync {
    fn screen_type(&self) -> ScreenType;

    fn build_view(&self, initial: &dyn Screen, env: &Environment) -> Result<View>;

    fn show(&self, view: &mut View, rendering: &dyn Screen, env: &Environment) -> Result<()>;
}

/// Registry of view factories, keyed by rendering type.
///
/// The registry travels in the [`Environment`], so nested renderings resolve
/// their factories from the same table as their parent.
///
/// # Example
///
/// ```rust,ignore
/// let registry = ViewRegistry::with_defaults().with(ConfirmScreenViewFactory);
/// let env = Environment::new().with::<ViewRegistry>(registry);
/// let holder = start_showing(rendering, &env)?;
/// ```
#[derive(Clone, Default)]
pub struct ViewRegistry {
    factories: HashMap<ScreenType, Arc<dyn ScreenViewFactory>>,
}

impl ViewRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the factories this crate ships with.
    pub fn with_defaults() -> Self {
        Self::new().with(BackButtonScreenViewFactory)
    }

    /// Register a factory.
    ///
    /// If a factory for the same rendering type already exists, it is replaced.
    pub fn register<F: ScreenViewFactory + 'static>(&mut self, factory: F) {
        self.factories
            .insert(factory.screen_type(), Arc::new(factory));
    }

    #[must_use]
    pub fn with<F: ScreenViewFactory + 'static>(mut self, factory: F) -> Self {
        self.register(factory);
        self
    }

    pub fn get(&self, screen_type: ScreenType) -> Option<Arc<dyn ScreenViewFactory>> {
        self.factories.get(&screen_type).cloned()
    }

    /// Like [`ViewRegistry::get`], failing with [`ModalError::NoViewFactory`].
    pub fn require(&self, screen_type: ScreenType) -> Result<Arc<dyn ScreenViewFactory>> {
        self.get(screen_type)
            .ok_or(ModalError::NoViewFactory(screen_type))
    }

    pub fn screen_types(&self) -> Vec<ScreenType> {
        let mut types: Vec<_> = self.factories.keys().copied().collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRegistry")
            .field("screen_types", &self.screen_types())
            .finish()
    }
}

impl EnvironmentKey for ViewRegistry {
    type Value = Self;
    const NAME: &'static str = "ViewRegistry";

    fn default_value() -> Self {
        Self::with_defaults()
    }
}
