//! Terminal UI wrapper.
//!
//! This module provides [`Tui`], a wrapper around ratatui's Terminal that
//! handles the event loop, raw mode, and alternate screen management.
//!
//! Modal dialogs react to key *releases*. The terminal is asked to report
//! them through the keyboard enhancement protocol; when it cannot, a release
//! is synthesized right after every press.

use std::io::Stdout;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

use crossterm::cursor;
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind,
    KeyboardEnhancementFlags, KeyModifiers, MouseEvent, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use futures::{FutureExt, StreamExt};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

const GRACEFUL_SHUTDOWN_TIMEOUT_MS: u64 = 500;
const FORCEFUL_SHUTDOWN_TIMEOUT_MS: u64 = 2000;

/// Escape must be disambiguated as well, or terminals keep sending it as a
/// legacy byte that has no release.
const KEYBOARD_FLAGS: KeyboardEnhancementFlags =
    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES.union(KeyboardEnhancementFlags::REPORT_EVENT_TYPES);

pub type Backend = CrosstermBackend<Stdout>;

#[derive(Clone, Debug)]
pub enum Event {
    Init,
    Quit,
    Error(String),
    Tick,
    Render,
    FocusGained,
    FocusLost,
    Paste(String),
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
}

/// Terminal UI wrapper.
///
/// Manages the terminal state (raw mode, alternate screen) and provides
/// an async event stream.
pub struct Tui {
    terminal: Terminal<Backend>,
    task: JoinHandle<()>,
    cancellation_token: CancellationToken,
    event_rx: UnboundedReceiver<Event>,
    event_tx: UnboundedSender<Event>,
    frame_rate: f64,
    tick_rate: f64,
    keyboard_enhanced: bool,
}

impl Tui {
    /// Create a new TUI with the specified frame and tick rates.
    ///
    /// # Arguments
    /// * `frame_rate` - Frames per second for rendering (e.g., 60.0)
    /// * `tick_rate` - Ticks per second for content updates (e.g., 4.0)
    pub fn new(frame_rate: f64, tick_rate: f64) -> color_eyre::Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Ok(Self {
            terminal: Terminal::new(Backend::new(std::io::stdout()))?,
            task: tokio::spawn(async {}),
            cancellation_token: CancellationToken::new(),
            event_rx,
            event_tx,
            frame_rate,
            tick_rate,
            keyboard_enhanced: false,
        })
    }

    /// Enter the TUI (raw mode, alternate screen, mouse capture, key release
    /// reporting).
    pub fn enter(&mut self) -> color_eyre::Result<()> {
        crossterm::terminal::enable_raw_mode()?;
        crossterm::execute!(std::io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        crossterm::execute!(std::io::stdout(), EnableMouseCapture)?;
        crossterm::execute!(std::io::stdout(), EnableBracketedPaste)?;

        self.keyboard_enhanced = crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.keyboard_enhanced {
            crossterm::execute!(
                std::io::stdout(),
                PushKeyboardEnhancementFlags(KEYBOARD_FLAGS)
            )?;
        } else {
            warn!("terminal does not report key releases, synthesizing them");
        }
        debug!(keyboard_enhanced = self.keyboard_enhanced, "entered terminal");

        self.start();
        Ok(())
    }

    /// Exit the TUI (restore terminal state).
    pub fn exit(&mut self) -> color_eyre::Result<()> {
        self.stop()?;
        if crossterm::terminal::is_raw_mode_enabled()? {
            self.flush()?;
            if self.keyboard_enhanced {
                crossterm::execute!(std::io::stdout(), PopKeyboardEnhancementFlags)?;
                self.keyboard_enhanced = false;
            }
            crossterm::execute!(std::io::stdout(), DisableBracketedPaste)?;
            crossterm::execute!(std::io::stdout(), DisableMouseCapture)?;
            crossterm::execute!(std::io::stdout(), LeaveAlternateScreen, cursor::Show)?;
            crossterm::terminal::disable_raw_mode()?;
        }
        Ok(())
    }

    /// Suspend the TUI (for Ctrl+Z handling).
    pub fn suspend(&mut self) -> color_eyre::Result<()> {
        self.exit()?;
        #[cfg(not(windows))]
        signal_hook::low_level::raise(signal_hook::consts::SIGTSTP)?;
        Ok(())
    }

    /// Resume the TUI after suspension.
    pub fn resume(&mut self) -> color_eyre::Result<()> {
        self.enter()?;
        Ok(())
    }

    /// Get the next event from the event stream.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    fn start(&mut self) {
        self.cancel();
        self.cancellation_token = CancellationToken::new();
        let event_loop = Self::event_loop(
            self.event_tx.clone(),
            self.cancellation_token.clone(),
            self.tick_rate,
            self.frame_rate,
            !self.keyboard_enhanced,
        );
        self.task = tokio::spawn(event_loop);
    }

    fn stop(&mut self) -> color_eyre::Result<()> {
        self.cancel();
        let mut shutdown_counter = 0;
        while !self.task.is_finished() {
            std::thread::sleep(Duration::from_millis(1));
            shutdown_counter += 1;
            if shutdown_counter >= GRACEFUL_SHUTDOWN_TIMEOUT_MS {
                self.task.abort();
            }
            if shutdown_counter >= FORCEFUL_SHUTDOWN_TIMEOUT_MS {
                return Err(color_eyre::eyre::eyre!("Failed to stop TUI task"));
            }
        }
        Ok(())
    }

    fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    async fn event_loop(
        event_tx: UnboundedSender<Event>,
        cancellation_token: CancellationToken,
        tick_rate: f64,
        frame_rate: f64,
        synthesize_releases: bool,
    ) {
        let mut event_stream = EventStream::new();
        let mut tick_interval = interval(Duration::from_secs_f64(1.0 / tick_rate));
        let mut frame_interval = interval(Duration::from_secs_f64(1.0 / frame_rate));

        #[cfg(unix)]
        {
            let event_tx = event_tx.clone();
            tokio::spawn(async move {
                let Ok(mut sigterm) =
                    tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                else {
                    error!("failed to install SIGTERM handler");
                    return;
                };
                sigterm.recv().await;
                let _ = event_tx.send(Event::Quit);
            });
        }

        if event_tx.send(Event::Init).is_err() {
            return;
        }

        loop {
            let events = tokio::select! {
                () = cancellation_token.cancelled() => {
                    break;
                }
                _ = tick_interval.tick() => vec![Event::Tick],
                _ = frame_interval.tick() => vec![Event::Render],
                crossterm_event = event_stream.next().fuse() => {
                    match crossterm_event {
                        Some(Ok(CrosstermEvent::Key(key))) => key_events(key, synthesize_releases),
                        Some(Ok(CrosstermEvent::Mouse(mouse))) => vec![Event::Mouse(mouse)],
                        Some(Ok(CrosstermEvent::Resize(width, height))) => vec![Event::Resize(width, height)],
                        Some(Ok(CrosstermEvent::FocusGained)) => vec![Event::FocusGained],
                        Some(Ok(CrosstermEvent::FocusLost)) => vec![Event::FocusLost],
                        Some(Ok(CrosstermEvent::Paste(paste))) => vec![Event::Paste(paste)],
                        Some(Err(e)) => vec![Event::Error(e.to_string())],
                        None => break,
                    }
                }
            };
            if events.into_iter().any(|event| event_tx.send(event).is_err()) {
                break;
            }
        }
        cancellation_token.cancel();
    }
}

/// Map a terminal key event to the events delivered to the app.
fn key_events(key: KeyEvent, synthesize_releases: bool) -> Vec<Event> {
    match key.kind {
        KeyEventKind::Press
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') =>
        {
            vec![Event::Quit]
        }
        KeyEventKind::Press if synthesize_releases => vec![
            Event::Key(key),
            Event::Key(KeyEvent {
                kind: KeyEventKind::Release,
                ..key
            }),
        ],
        KeyEventKind::Press | KeyEventKind::Release => vec![Event::Key(key)],
        KeyEventKind::Repeat => Vec::new(),
    }
}

impl Deref for Tui {
    type Target = Terminal<Backend>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Tui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(err) = self.exit() {
            error!(%err, "failed to restore terminal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(events: &[Event]) -> Vec<KeyEventKind> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::Key(key) => Some(key.kind),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_release_synthesized_after_press() {
        let events = key_events(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE), true);
        assert_eq!(kinds(&events), vec![KeyEventKind::Press, KeyEventKind::Release]);
    }

    #[test]
    fn test_reported_releases_forwarded() {
        let press = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        let release = KeyEvent {
            kind: KeyEventKind::Release,
            ..press
        };
        assert_eq!(kinds(&key_events(press, false)), vec![KeyEventKind::Press]);
        assert_eq!(kinds(&key_events(release, false)), vec![KeyEventKind::Release]);
    }

    #[test]
    fn test_keyboard_flags_report_escape_releases() {
        assert!(KEYBOARD_FLAGS.contains(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES));
        assert!(KEYBOARD_FLAGS.contains(KeyboardEnhancementFlags::REPORT_EVENT_TYPES));
    }

    #[test]
    fn test_enhanced_escape_press_and_release_reach_app() {
        let press = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        let release = KeyEvent {
            kind: KeyEventKind::Release,
            ..press
        };

        let events: Vec<Event> = [press, release]
            .into_iter()
            .flat_map(|key| key_events(key, false))
            .collect();

        assert!(matches!(
            events.as_slice(),
            [Event::Key(first), Event::Key(second)]
                if first.code == KeyCode::Esc
                    && first.kind == KeyEventKind::Press
                    && second.code == KeyCode::Esc
                    && second.kind == KeyEventKind::Release
        ));
    }

    #[test]
    fn test_ctrl_c_quits() {
        let events = key_events(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), true);
        assert!(matches!(events.as_slice(), [Event::Quit]));
    }
}
