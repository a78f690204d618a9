use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};
use modal_surface::config::AppConfig;
use modal_surface::{
    Dialog, DismissalKeys, Environment, ModalArea, ModalScreenOverlay,
    ModalScreenOverlayDialogFactory, OnModalBackPressed, OverlayDialogFactory, Theme, View,
    ViewRegistry,
};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::cli::Args;
use crate::demo::{ConfirmScreen, ConfirmViewFactory, StatusBar, TextScreen, TextViewFactory};
use crate::tui::{Event, Tui};

/// Messages sent to the app by modal content and the dismissal policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMessage {
    Confirmed,
    Cancelled,
    BackPressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModalKind {
    Confirm,
    Text,
}

impl ModalKind {
    const fn next(self) -> Self {
        match self {
            Self::Confirm => Self::Text,
            Self::Text => Self::Confirm,
        }
    }
}

struct OpenModal {
    dialog: Dialog,
    kind: ModalKind,
    ticks: u64,
}

pub struct App {
    config: AppConfig,
    theme: Theme,
    env: Environment,
    modal_area: watch::Sender<Rect>,
    factory: ModalScreenOverlayDialogFactory,
    modal: Option<OpenModal>,
    next_kind: ModalKind,
    status: StatusBar,
    status_area: Rect,
    should_quit: bool,
    should_suspend: bool,
    message_tx: UnboundedSender<AppMessage>,
    message_rx: UnboundedReceiver<AppMessage>,
}

impl App {
    pub fn new(config: AppConfig, theme: Theme) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        let (modal_area, area) = ModalArea::channel(Rect::default());

        let keybindings = &config.keybindings;
        let registry = ViewRegistry::with_defaults()
            .with(ConfirmViewFactory::new(
                keybindings.confirm.clone(),
                keybindings.cancel.clone(),
            ))
            .with(TextViewFactory);

        let env = Environment::new()
            .with::<ViewRegistry>(registry)
            .with::<Theme>(theme)
            .with::<ModalArea>(Some(area))
            .with::<DismissalKeys>(DismissalKeys(keybindings.dismiss.clone()))
            .with::<OnModalBackPressed>(back_pressed_policy(message_tx.clone()));

        Self {
            config,
            theme,
            env,
            modal_area,
            factory: ModalScreenOverlayDialogFactory::new(),
            modal: None,
            next_kind: ModalKind::Confirm,
            status: StatusBar::default(),
            status_area: Rect::default(),
            should_quit: false,
            should_suspend: false,
            message_tx,
            message_rx,
        }
    }

    pub fn apply_cli_args(&mut self, args: &Args) {
        if let Some(rows) = args.reserve_rows {
            self.config.modal.reserve_rows = rows;
        }
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let mut tui = Tui::new(30.0, 4.0)?;
        tui.enter()?;

        loop {
            self.handle_events(&mut tui).await?;
            self.handle_messages();
            if self.should_suspend {
                tui.suspend()?;
                self.should_suspend = false;
                tui.resume()?;
                tui.clear()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        Ok(())
    }

    async fn handle_events(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        let Some(event) = tui.next_event().await else {
            return Ok(());
        };

        match event {
            Event::Quit => self.should_quit = true,
            Event::Tick => self.tick(),
            Event::Render => self.render(tui)?,
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, width, height))?;
                self.render(tui)?;
            }
            Event::Key(key) => self.handle_key_event(key),
            Event::Mouse(mouse) => self.handle_mouse_event(mouse),
            Event::Error(err) => warn!(%err, "terminal event error"),
            Event::Init | Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if let Some(modal) = self.modal.as_mut()
            && modal.dialog.dispatch_key_event(&key)
        {
            return;
        }
        if key.kind != KeyEventKind::Press {
            return;
        }

        let keybindings = &self.config.keybindings;
        if keybindings.quit.matches(&key) {
            self.should_quit = true;
        } else if keybindings.open_modal.matches(&key) {
            self.open_modal();
        } else if key.code == KeyCode::Char('z') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_suspend = true;
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        if let Some(modal) = self.modal.as_mut()
            && modal.dialog.dispatch_mouse_event(&mouse)
        {
            return;
        }
        self.status.handle_mouse(mouse, self.status_area);
    }

    fn handle_messages(&mut self) {
        while let Ok(message) = self.message_rx.try_recv() {
            debug!(?message, "handling app message");
            match message {
                AppMessage::Confirmed => {
                    self.status.set_message("confirmed");
                    self.close_modal();
                }
                AppMessage::Cancelled => {
                    self.status.set_message("cancelled");
                    self.close_modal();
                }
                AppMessage::BackPressed => {
                    if self.modal.is_some() {
                        self.status.set_message("dismissed");
                        self.close_modal();
                    }
                }
            }
        }
    }

    fn open_modal(&mut self) {
        if self.modal.is_some() {
            return;
        }
        let kind = self.next_kind;
        let overlay = overlay(kind, 0, &self.message_tx);
        match self.factory.build_dialog(&overlay, &self.env) {
            Ok(dialog) => {
                info!(dialog = %dialog.id(), ?kind, "opened modal");
                self.modal = Some(OpenModal {
                    dialog,
                    kind,
                    ticks: 0,
                });
                self.next_kind = kind.next();
            }
            Err(err) => {
                error!(%err, "failed to build modal");
                self.status.set_message(err.to_string());
            }
        }
    }

    /// Re-render the open modal in place with a fresh tick count.
    fn tick(&mut self) {
        let Some(modal) = self.modal.as_mut() else {
            return;
        };
        modal.ticks += 1;
        let overlay = overlay(modal.kind, modal.ticks, &self.message_tx);
        if let Err(err) = self.factory.update_dialog(&mut modal.dialog, &overlay, &self.env) {
            error!(%err, "failed to update modal");
            self.status.set_message(err.to_string());
        }
    }

    fn close_modal(&mut self) {
        if let Some(mut modal) = self.modal.take() {
            modal.dialog.dismiss();
        }
    }

    fn render(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        let size = tui.size()?;
        let [body, status] = split(Rect::new(0, 0, size.width, size.height), self.config.modal.reserve_rows);
        self.status_area = status;
        self.modal_area.send_if_modified(|current| {
            if *current == body {
                return false;
            }
            *current = body;
            true
        });

        let hints = format!(
            "{} open | {} close | {} quit",
            self.config.keybindings.open_modal.display(),
            self.config.keybindings.dismiss.display(),
            self.config.keybindings.quit.display(),
        );
        tui.draw(|frame| {
            render_body(frame, body, &self.theme);
            self.status.render(frame, status, &self.theme, &hints);
            if let Some(modal) = self.modal.as_mut() {
                modal.dialog.render(frame);
            }
        })?;
        Ok(())
    }
}

/// Runs the content's back handler and asks the app to close the modal.
fn back_pressed_policy(messages: UnboundedSender<AppMessage>) -> OnModalBackPressed {
    OnModalBackPressed::new(move |view: &View| {
        if let Some(handler) = view.back_pressed_handler() {
            handler();
        }
        let _ = messages.send(AppMessage::BackPressed);
        true
    })
}

fn overlay(kind: ModalKind, ticks: u64, messages: &UnboundedSender<AppMessage>) -> ModalScreenOverlay {
    match kind {
        ModalKind::Confirm => {
            let tx = messages.clone();
            ModalScreenOverlay::new(ConfirmScreen {
                title: "Confirm".to_string(),
                message: "Apply the pending changes?".to_string(),
                ticks,
                on_back: Arc::new(move || {
                    let _ = tx.send(AppMessage::Cancelled);
                }),
                messages: messages.clone(),
            })
        }
        ModalKind::Text => ModalScreenOverlay::new(TextScreen {
            title: "About".to_string(),
            body: "This modal covers the body but not the status bar. Clicks on the status bar still reach it.".to_string(),
            ticks,
        }),
    }
}

/// Split the terminal into the modal area and the status bar below it.
fn split(area: Rect, reserve_rows: u16) -> [Rect; 2] {
    Layout::vertical([Constraint::Min(0), Constraint::Length(reserve_rows)]).areas(area)
}

fn render_body(frame: &mut Frame, area: Rect, theme: &Theme) {
    let block = Block::default()
        .title(" modal-surface ")
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border()));
    frame.render_widget(
        Paragraph::new("Press the open key to show a modal.")
            .style(Style::default().fg(theme.text()))
            .block(block),
        area,
    );
}

#[cfg(test)]
mod tests {
    use crossterm::event::{MouseButton, MouseEventKind};

    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent {
            kind: KeyEventKind::Release,
            ..press(code)
        }
    }

    fn app() -> App {
        let mut app = App::new(AppConfig::default(), Theme::default());
        app.modal_area.send_replace(Rect::new(0, 0, 80, 21));
        app.status_area = Rect::new(0, 21, 80, 3);
        app
    }

    #[test]
    fn test_split_reserves_status_rows() {
        let [body, status] = split(Rect::new(0, 0, 80, 24), 3);
        assert_eq!(body, Rect::new(0, 0, 80, 21));
        assert_eq!(status, Rect::new(0, 21, 80, 3));
    }

    #[test]
    fn test_open_alternates_kinds() {
        let mut app = app();
        app.handle_key_event(press(KeyCode::Char('o')));
        assert_eq!(app.modal.as_ref().map(|m| m.kind), Some(ModalKind::Confirm));
        assert_eq!(app.modal.as_ref().and_then(|m| m.dialog.bounds()), Some(Rect::new(0, 0, 80, 21)));

        app.handle_key_event(press(KeyCode::Char('n')));
        app.handle_messages();
        assert!(app.modal.is_none());

        app.handle_key_event(press(KeyCode::Char('o')));
        assert_eq!(app.modal.as_ref().map(|m| m.kind), Some(ModalKind::Text));
    }

    #[test]
    fn test_escape_release_dismisses_text_modal() {
        let mut app = app();
        app.next_kind = ModalKind::Text;
        app.handle_key_event(press(KeyCode::Char('o')));

        app.handle_key_event(press(KeyCode::Esc));
        app.handle_messages();
        assert!(app.modal.is_some());

        app.handle_key_event(release(KeyCode::Esc));
        app.handle_messages();
        assert!(app.modal.is_none());
    }

    #[test]
    fn test_tick_updates_same_dialog() {
        let mut app = app();
        app.handle_key_event(press(KeyCode::Char('o')));
        let id = app.modal.as_ref().map(|m| m.dialog.id());

        app.modal_area.send_replace(Rect::new(0, 0, 80, 30));
        app.tick();

        let modal = app.modal.as_ref().unwrap();
        assert_eq!(Some(modal.dialog.id()), id);
        assert_eq!(modal.ticks, 1);
        assert_eq!(modal.dialog.bounds(), Some(Rect::new(0, 0, 80, 30)));
    }

    #[test]
    fn test_status_clicks_pass_through_modal() {
        let mut app = app();
        app.handle_key_event(press(KeyCode::Char('o')));
        let click = |row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row,
            modifiers: KeyModifiers::NONE,
        };

        app.handle_mouse_event(click(22));
        app.handle_mouse_event(click(5));
        assert_eq!(app.status.clicks(), 1);
    }
}
