//! The live, in-place updatable materialization of a rendering.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::environment::Environment;
use crate::error::{ModalError, Result};
use crate::registry::{ScreenViewFactory, ViewRegistry};
use crate::screen::{Rendering, Screen};
use crate::view::View;

/// A [`View`] together with the rendering and environment it last showed.
pub struct ScreenViewHolder {
    view: View,
    rendering: Rendering,
    environment: Environment,
    factory: Arc<dyn ScreenViewFactory>,
}

impl ScreenViewHolder {
    pub const fn view(&self) -> &View {
        &self.view
    }

    pub const fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    pub const fn rendering(&self) -> &Rendering {
        &self.rendering
    }

    pub const fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn can_show(&self, rendering: &dyn Screen) -> bool {
        self.rendering.is_compatible_with(rendering)
    }

    /// Update the view in place.
    ///
    /// Fails with [`ModalError::IncompatibleRendering`] without touching the
    /// view when `rendering` is not compatible with the current one.
    pub fn show(&mut self, rendering: Rendering, environment: Environment) -> Result<()> {
        if !self.can_show(rendering.as_ref()) {
            return Err(ModalError::IncompatibleRendering {
                current: self.rendering.compatibility_key(),
                attempted: rendering.compatibility_key(),
            });
        }
        self.factory
            .show(&mut self.view, rendering.as_ref(), &environment)?;
        self.rendering = rendering;
        self.environment = environment;
        Ok(())
    }
}

impl fmt::Debug for ScreenViewHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenViewHolder")
            .field("view", &self.view)
            .field("rendering", &self.rendering)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

/// Build a view for `rendering` with the factory registered in `env` and show
/// the rendering in it.
pub fn start_showing(rendering: Rendering, env: &Environment) -> Result<ScreenViewHolder> {
    let factory = env
        .get::<ViewRegistry>()
        .require(rendering.screen_type())?;
    let mut view = factory.build_view(rendering.as_ref(), env)?;
    factory.show(&mut view, rendering.as_ref(), env)?;
    trace!(view = %view.id(), screen = %rendering.screen_type(), "started showing");
    Ok(ScreenViewHolder {
        view,
        rendering,
        environment: env.clone(),
        factory,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::Frame;
    use ratatui::layout::Rect;

    use super::*;
    use crate::Theme;
    use crate::screen::{ScreenType, expect_screen};
    use crate::view::ViewComponent;

    const LABEL: ScreenType = ScreenType::new("label");
    const OTHER: ScreenType = ScreenType::new("other");

    #[derive(Debug)]
    struct LabelScreen(&'static str);

    impl Screen for LabelScreen {
        fn screen_type(&self) -> ScreenType {
            LABEL
        }
    }

    #[derive(Debug)]
    struct OtherScreen;

    impl Screen for OtherScreen {
        fn screen_type(&self) -> ScreenType {
            OTHER
        }
    }

    #[derive(Default)]
    struct Label {
        text: &'static str,
        shows: usize,
    }

    impl ViewComponent for Label {
        fn render(&mut self, _frame: &mut Frame, _area: Rect, _theme: &Theme) {}
    }

    struct LabelFactory;

    impl ScreenViewFactory for LabelFactory {
        fn screen_type(&self) -> ScreenType {
            LABEL
        }

        fn build_view(&self, _initial: &dyn Screen, _env: &Environment) -> Result<View> {
            Ok(View::new(LABEL, Label::default()))
        }

        fn show(&self, view: &mut View, rendering: &dyn Screen, _env: &Environment) -> Result<()> {
            let screen = expect_screen::<LabelScreen>(rendering, LABEL)?;
            if let Some(label) = view.component_mut::<Label>() {
                label.text = screen.0;
                label.shows += 1;
            }
            Ok(())
        }
    }

    fn env() -> Environment {
        Environment::new().with::<ViewRegistry>(ViewRegistry::with_defaults().with(LabelFactory))
    }

    #[test]
    fn test_start_showing_builds_and_shows() {
        let holder = start_showing(Arc::new(LabelScreen("first")), &env()).unwrap();
        let label = holder.view().component::<Label>().unwrap();
        assert_eq!(label.text, "first");
        assert_eq!(label.shows, 1);
    }

    #[test]
    fn test_start_showing_without_factory() {
        let err = start_showing(Arc::new(OtherScreen), &env()).unwrap_err();
        assert!(matches!(err, ModalError::NoViewFactory(t) if t == OTHER));
    }

    #[test]
    fn test_show_updates_in_place() {
        let mut holder = start_showing(Arc::new(LabelScreen("first")), &env()).unwrap();
        let view_id = holder.view().id();
        let next_env = env().with::<Theme>(Theme::terminal());

        holder.show(Arc::new(LabelScreen("second")), next_env).unwrap();

        assert_eq!(holder.view().id(), view_id);
        assert_eq!(holder.view().component::<Label>().unwrap().text, "second");
        assert_eq!(holder.environment().get::<Theme>(), Theme::terminal());
    }

    #[test]
    fn test_show_incompatible_leaves_view_untouched() {
        let mut holder = start_showing(Arc::new(LabelScreen("first")), &env()).unwrap();
        let err = holder.show(Arc::new(OtherScreen), env()).unwrap_err();

        assert!(matches!(err, ModalError::IncompatibleRendering { .. }));
        let label = holder.view().component::<Label>().unwrap();
        assert_eq!(label.text, "first");
        assert_eq!(label.shows, 1);
        assert_eq!(holder.rendering().screen_type(), LABEL);
    }
}
