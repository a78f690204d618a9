pub mod key;
pub mod keybindings;
pub mod loader;

pub use key::{Key, KeyBinding};
pub use keybindings::KeybindingsConfig;
pub use loader::load;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalConfig {
    /// Rows at the bottom of the terminal kept outside the modal area.
    pub reserve_rows: u16,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self { reserve_rows: 3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
    #[serde(default)]
    pub modal: ModalConfig,
}
