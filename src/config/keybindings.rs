use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

use crate::config::key::{Key, KeyBinding};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybindingsConfig {
    /// Keys that dismiss a modal when released. Covers escape and the
    /// platform back gesture, which terminals report as `alt+Left`.
    pub dismiss: KeyBinding,
    pub open_modal: KeyBinding,
    pub quit: KeyBinding,
    pub confirm: KeyBinding,
    pub cancel: KeyBinding,
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            dismiss: vec![Key::new(KeyCode::Esc), Key::with_alt(KeyCode::Left)].into(),
            open_modal: Key::new(KeyCode::Char('o')).into(),
            quit: Key::new(KeyCode::Char('q')).into(),
            confirm: vec![Key::new(KeyCode::Char('y')), Key::new(KeyCode::Enter)].into(),
            cancel: Key::new(KeyCode::Char('n')).into(),
        }
    }
}
