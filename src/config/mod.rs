//! Configuration for arbor.
//!
//! Read from `~/.config/arbor/config.toml` at startup. A commented default file
//! is written when none exists, and any key missing from the file falls back to
//! its default.

pub mod keybindings;

pub use keybindings::KeybindingConfig;

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::store::json::DEFAULT_STORE_FILE;

pub const DEFAULT_LOG_FILE: &str = "debug.log";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub keybindings: KeybindingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Store file, relative paths resolve against the working directory.
    pub store_path: PathBuf,
    pub log_path: PathBuf,
    /// How long transient status messages stay up.
    pub status_timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
            log_path: PathBuf::from(DEFAULT_LOG_FILE),
            status_timeout_secs: 5,
        }
    }
}

impl GeneralConfig {
    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }
}

impl Config {
    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// A missing default file is created with comments; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/arbor/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("arbor").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| ConfigError::Io { path, source }
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
        fs::write(path, Self::default_config_content()).map_err(io_err(path))
    }

    fn default_config_content() -> &'static str {
        r##"# arbor configuration
#
# Keybindings can be specified as:
# - Single characters: "a", "A", "?"
# - Special keys: Enter, Tab, BackTab, Backspace, Delete, Home, End,
#   PageUp, PageDown, Up, Down, Left, Right, Esc, Space, F1-F12
# - With modifiers: "Ctrl+c", "Shift+Tab", "Alt+Enter"

[general]
# Feed list, relative to the directory arbor is started from
store_path = "feeds.json"
log_path = "debug.log"
# Seconds before a status message reverts to the help line
status_timeout_secs = 5

[keybindings]
quit = ["q", "Ctrl+c"]
move_up = ["k", "Up"]
move_down = ["j", "Down"]
page_up = ["Ctrl+b", "PageUp"]
page_down = ["Ctrl+f", "PageDown"]
scroll_top = ["g", "Home"]
scroll_bottom = ["G", "End"]
next_pane = ["Tab"]

# Expand/collapse a folder or feed, show an item
select = ["Enter", "Space"]
add_feed = ["a"]
add_folder = ["A"]
rename_folder = ["r"]
remove_feed = ["d", "Delete"]
open_in_browser = ["o"]
help = ["?"]
"##
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
