//! Screens shown by the demo app, with their views and view factories.

use std::fmt;

use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use modal_surface::config::KeyBinding;
use modal_surface::screen::expect_screen;
use modal_surface::{
    BackPressedHandler, Environment, EventResult, Result, Screen, ScreenType, ScreenViewFactory,
    Theme, View, ViewComponent,
};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tokio::sync::mpsc::UnboundedSender;

use crate::app::AppMessage;

pub const CONFIRM_SCREEN: ScreenType = ScreenType::new("confirm");
pub const TEXT_SCREEN: ScreenType = ScreenType::new("text");

/// A yes/no question. Carries its own back handler, which cancels.
#[derive(Clone)]
pub struct ConfirmScreen {
    pub title: String,
    pub message: String,
    pub ticks: u64,
    pub on_back: BackPressedHandler,
    pub messages: UnboundedSender<AppMessage>,
}

impl fmt::Debug for ConfirmScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfirmScreen")
            .field("title", &self.title)
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

impl Screen for ConfirmScreen {
    fn screen_type(&self) -> ScreenType {
        CONFIRM_SCREEN
    }
}

/// Read-only text. Has no back handler of its own.
#[derive(Debug, Clone)]
pub struct TextScreen {
    pub title: String,
    pub body: String,
    pub ticks: u64,
}

impl Screen for TextScreen {
    fn screen_type(&self) -> ScreenType {
        TEXT_SCREEN
    }
}

struct ConfirmView {
    title: String,
    message: String,
    ticks: u64,
    messages: Option<UnboundedSender<AppMessage>>,
    confirm: KeyBinding,
    cancel: KeyBinding,
}

impl ConfirmView {
    fn answer(&self, message: AppMessage) {
        if let Some(tx) = &self.messages {
            let _ = tx.send(message);
        }
    }
}

impl ViewComponent for ConfirmView {
    fn handle_key(&mut self, key: KeyEvent) -> EventResult {
        if self.confirm.matches(&key) {
            self.answer(AppMessage::Confirmed);
        } else if self.cancel.matches(&key) {
            self.answer(AppMessage::Cancelled);
        }
        // Consume all other keys to prevent propagation
        EventResult::Consumed
    }

    fn handle_mouse(&mut self, _mouse: MouseEvent, _area: Rect) -> EventResult {
        EventResult::Consumed
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup_area = area.centered(Constraint::Percentage(50), Constraint::Length(8));

        let key_style = Style::default()
            .fg(theme.peach())
            .add_modifier(Modifier::BOLD);
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(self.message.clone(), Style::default().fg(theme.text()))),
            Line::from(Span::styled(
                format!("open for {} ticks", self.ticks),
                Style::default().fg(theme.subtext0()),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled(format!("[{}]", self.confirm.display()), key_style),
                Span::raw(" "),
                Span::styled("Yes", Style::default().fg(theme.green()).add_modifier(Modifier::BOLD)),
                Span::raw("    "),
                Span::styled(format!("[{}]", self.cancel.display()), key_style),
                Span::raw(" "),
                Span::styled("No", Style::default().fg(theme.overlay1()).add_modifier(Modifier::BOLD)),
            ]),
        ];

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.lavender()))
            .style(Style::default().bg(theme.base()));

        frame.render_widget(
            Paragraph::new(lines).block(block).alignment(Alignment::Center),
            popup_area,
        );
    }
}

/// Builds [`ConfirmView`]s answering to the configured keys.
pub struct ConfirmViewFactory {
    confirm: KeyBinding,
    cancel: KeyBinding,
}

impl ConfirmViewFactory {
    pub const fn new(confirm: KeyBinding, cancel: KeyBinding) -> Self {
        Self { confirm, cancel }
    }
}

impl ScreenViewFactory for ConfirmViewFactory {
    fn screen_type(&self) -> ScreenType {
        CONFIRM_SCREEN
    }

    fn build_view(&self, _initial: &dyn Screen, _env: &Environment) -> Result<View> {
        Ok(View::new(
            CONFIRM_SCREEN,
            ConfirmView {
                title: String::new(),
                message: String::new(),
                ticks: 0,
                messages: None,
                confirm: self.confirm.clone(),
                cancel: self.cancel.clone(),
            },
        ))
    }

    fn show(&self, view: &mut View, rendering: &dyn Screen, _env: &Environment) -> Result<()> {
        let screen = expect_screen::<ConfirmScreen>(rendering, CONFIRM_SCREEN)?;
        view.set_back_pressed_handler(Some(screen.on_back.clone()));
        if let Some(confirm) = view.component_mut::<ConfirmView>() {
            confirm.title.clone_from(&screen.title);
            confirm.message.clone_from(&screen.message);
            confirm.ticks = screen.ticks;
            confirm.messages = Some(screen.messages.clone());
        }
        Ok(())
    }
}

#[derive(Default)]
struct TextView {
    title: String,
    body: String,
    ticks: u64,
}

impl ViewComponent for TextView {
    fn handle_key(&mut self, _key: KeyEvent) -> EventResult {
        EventResult::Consumed
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(Style::default().fg(theme.blue()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border()));
        let lines = vec![
            Line::from(Span::styled(self.body.clone(), Style::default().fg(theme.text()))),
            Line::from(""),
            Line::from(Span::styled(
                format!("open for {} ticks", self.ticks),
                Style::default().fg(theme.subtext0()),
            )),
        ];
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }
}

pub struct TextViewFactory;

impl ScreenViewFactory for TextViewFactory {
    fn screen_type(&self) -> ScreenType {
        TEXT_SCREEN
    }

    fn build_view(&self, _initial: &dyn Screen, _env: &Environment) -> Result<View> {
        Ok(View::new(TEXT_SCREEN, TextView::default()))
    }

    fn show(&self, view: &mut View, rendering: &dyn Screen, _env: &Environment) -> Result<()> {
        let screen = expect_screen::<TextScreen>(rendering, TEXT_SCREEN)?;
        view.set_back_pressed_handler(None);
        if let Some(text) = view.component_mut::<TextView>() {
            text.title.clone_from(&screen.title);
            text.body.clone_from(&screen.body);
            text.ticks = screen.ticks;
        }
        Ok(())
    }
}

/// Status line below the modal area. Stays clickable while a modal is open.
#[derive(Debug, Default)]
pub struct StatusBar {
    message: Option<String>,
    clicks: usize,
}

impl StatusBar {
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub const fn clicks(&self) -> usize {
        self.clicks
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect) -> EventResult {
        let inside = area.contains(Position::new(mouse.column, mouse.row));
        if inside && mouse.kind == MouseEventKind::Down(MouseButton::Left) {
            self.clicks += 1;
            return EventResult::Consumed;
        }
        EventResult::Ignored
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme, hints: &str) {
        let status = self.message.as_deref().unwrap_or("ready");
        let text = format!("{status} | clicks: {} | {hints}", self.clicks);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.surface1()))
            .title("Status")
            .title_style(Style::default().fg(theme.blue()).add_modifier(Modifier::BOLD));
        frame.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(theme.subtext0()))
                .block(block),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};
    use modal_surface::config::Key;
    use modal_surface::{
        DispatchToBackHandler, ModalArea, ModalScreenOverlay, ModalScreenOverlayDialogFactory,
        OnModalBackPressed, OverlayDialogFactory, ViewRegistry,
    };
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use tokio::sync::mpsc;

    use super::*;

    fn env() -> Environment {
        let registry = ViewRegistry::with_defaults()
            .with(ConfirmViewFactory::new(
                Key::new(KeyCode::Char('y')).into(),
                Key::new(KeyCode::Char('n')).into(),
            ))
            .with(TextViewFactory);
        Environment::new()
            .with::<ViewRegistry>(registry)
            .with::<OnModalBackPressed>(OnModalBackPressed::new(DispatchToBackHandler))
    }

    fn confirm(messages: &UnboundedSender<AppMessage>) -> ConfirmScreen {
        let tx = messages.clone();
        ConfirmScreen {
            title: "Delete".to_string(),
            message: "Really?".to_string(),
            ticks: 0,
            on_back: Arc::new(move || {
                let _ = tx.send(AppMessage::Cancelled);
            }),
            messages: messages.clone(),
        }
    }

    fn released(code: KeyCode) -> KeyEvent {
        KeyEvent {
            kind: KeyEventKind::Release,
            ..KeyEvent::new(code, KeyModifiers::NONE)
        }
    }

    #[test]
    fn test_escape_runs_confirm_back_handler() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dialog = ModalScreenOverlayDialogFactory::new()
            .build_dialog(&ModalScreenOverlay::new(confirm(&tx)), &env())
            .unwrap();

        assert!(dialog.dispatch_key_event(&released(KeyCode::Esc)));
        assert!(matches!(rx.try_recv(), Ok(AppMessage::Cancelled)));
    }

    #[test]
    fn test_confirm_key_answers() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dialog = ModalScreenOverlayDialogFactory::new()
            .build_dialog(&ModalScreenOverlay::new(confirm(&tx)), &env())
            .unwrap();

        assert!(dialog.dispatch_key_event(&KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE)));
        assert!(matches!(rx.try_recv(), Ok(AppMessage::Confirmed)));
    }

    #[test]
    fn test_text_screen_gets_noop_handler() {
        let screen = TextScreen {
            title: "About".to_string(),
            body: "hello".to_string(),
            ticks: 0,
        };
        let mut dialog = ModalScreenOverlayDialogFactory::new()
            .build_dialog(&ModalScreenOverlay::new(screen), &env())
            .unwrap();

        assert!(dialog.modal_content().unwrap().view().back_pressed_handler().is_some());
        // The no-op handler swallows the back press.
        assert!(dialog.dispatch_key_event(&released(KeyCode::Esc)));
    }

    #[test]
    fn test_text_modal_renders_inside_area() {
        let screen = TextScreen {
            title: "About".to_string(),
            body: "hello".to_string(),
            ticks: 3,
        };
        let env = env()
            .with::<Theme>(Theme::terminal())
            .with::<ModalArea>(Some(ModalArea::fixed(Rect::new(0, 0, 30, 6))));
        let mut dialog = ModalScreenOverlayDialogFactory::new()
            .build_dialog(&ModalScreenOverlay::new(screen), &env)
            .unwrap();
        let mut terminal = Terminal::new(TestBackend::new(30, 9)).unwrap();

        terminal.draw(|frame| dialog.render(frame)).unwrap();

        let buffer = terminal.backend().buffer();
        assert_eq!(buffer[(0, 0)].symbol(), "╭");
        assert_eq!(buffer[(0, 5)].symbol(), "╰");
        assert_eq!(buffer[(0, 6)].symbol(), " ");
    }

    #[test]
    fn test_status_bar_counts_clicks_inside() {
        let mut status = StatusBar::default();
        let area = Rect::new(0, 10, 40, 3);
        let click = |row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 2,
            row,
            modifiers: KeyModifiers::NONE,
        };

        assert!(status.handle_mouse(click(11), area).is_consumed());
        assert!(!status.handle_mouse(click(2), area).is_consumed());
        assert_eq!(status.clicks(), 1);
    }
}
