//! Keybinding configuration for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use crate::tui::event::Action;

/// Keys bound to each action. Every action accepts several keys.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    pub quit: Vec<String>,
    pub move_up: Vec<String>,
    pub move_down: Vec<String>,
    pub page_up: Vec<String>,
    pub page_down: Vec<String>,
    pub scroll_top: Vec<String>,
    pub scroll_bottom: Vec<String>,
    pub next_pane: Vec<String>,
    pub select: Vec<String>,
    pub add_feed: Vec<String>,
    pub add_folder: Vec<String>,
    pub rename_folder: Vec<String>,
    pub remove_feed: Vec<String>,
    pub open_in_browser: Vec<String>,
    pub help: Vec<String>,
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            quit: keys(&["q", "Ctrl+c"]),
            move_up: keys(&["k", "Up"]),
            move_down: keys(&["j", "Down"]),
            page_up: keys(&["Ctrl+b", "PageUp"]),
            page_down: keys(&["Ctrl+f", "PageDown"]),
            scroll_top: keys(&["g", "Home"]),
            scroll_bottom: keys(&["G", "End"]),
            next_pane: keys(&["Tab"]),
            select: keys(&["Enter", "Space"]),
            add_feed: keys(&["a"]),
            add_folder: keys(&["A"]),
            rename_folder: keys(&["r"]),
            remove_feed: keys(&["d", "Delete"]),
            open_in_browser: keys(&["o"]),
            help: keys(&["?"]),
        }
    }
}

impl KeybindingConfig {
    /// Get the action for a key event. Earlier entries win on conflicts.
    pub fn get_action(&self, key: &KeyEvent) -> Action {
        let table: [(&[String], Action); 15] = [
            (&self.quit, Action::Quit),
            (&self.move_up, Action::MoveUp),
            (&self.move_down, Action::MoveDown),
            (&self.page_up, Action::PageUp),
            (&self.page_down, Action::PageDown),
            (&self.scroll_top, Action::ScrollTop),
            (&self.scroll_bottom, Action::ScrollBottom),
            (&self.next_pane, Action::NextPane),
            (&self.select, Action::Select),
            (&self.add_feed, Action::AddFeed),
            (&self.add_folder, Action::AddFolder),
            (&self.rename_folder, Action::RenameFolder),
            (&self.remove_feed, Action::RemoveFeed),
            (&self.open_in_browser, Action::OpenInBrowser),
            (&self.help, Action::Help),
        ];

        table
            .iter()
            .find(|(bindings, _)| matches_key(key, bindings))
            .map(|(_, action)| *action)
            .unwrap_or(Action::None)
    }
}

impl KeybindingConfig {
    /// Bound keys and a description for each action, in help-screen order.
    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        let entries: [(&[String], &'static str); 15] = [
            (&self.move_down, "move down"),
            (&self.move_up, "move up"),
            (&self.page_down, "page down"),
            (&self.page_up, "page up"),
            (&self.scroll_top, "jump to top"),
            (&self.scroll_bottom, "jump to bottom"),
            (&self.select, "open folder, load feed, read item"),
            (&self.next_pane, "switch between tree and preview"),
            (&self.add_feed, "add feed to the selected folder"),
            (&self.add_folder, "add folder"),
            (&self.rename_folder, "rename folder"),
            (&self.remove_feed, "remove feed"),
            (&self.open_in_browser, "open link in browser"),
            (&self.help, "show this help"),
            (&self.quit, "quit"),
        ];

        entries
            .iter()
            .filter(|(keys, _)| !keys.is_empty())
            .map(|(keys, what)| (keys.join(" / "), *what))
            .collect()
    }
}

fn matches_key(key: &KeyEvent, bindings: &[String]) -> bool {
    bindings
        .iter()
        .filter_map(|binding| parse_key_string(binding).ok())
        .any(|parsed| parsed.matches(key))
}

/// A key plus the modifiers that must be held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// SHIFT is ignored when the binding does not ask for it, since terminals
    /// report "G" as shift+g.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code
            && (self.modifiers == key.modifiers
                || self.modifiers == (key.modifiers & !KeyModifiers::SHIFT))
    }
}

/// Parse strings such as "j", "Enter", "F5" or "Ctrl+Shift+a".
pub fn parse_key_string(s: &str) -> Result<KeyBinding, String> {
    let s = s.trim();
    let (prefix, key_part) = match s.rsplit_once('+') {
        Some((prefix, key)) if !key.is_empty() => (prefix, key),
        _ => ("", s),
    };

    let mut modifiers = KeyModifiers::NONE;
    for part in prefix.split('+').filter(|p| !p.is_empty()) {
        modifiers |= match part.to_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "shift" => KeyModifiers::SHIFT,
            "alt" => KeyModifiers::ALT,
            _ => return Err(format!("Unknown modifier: {}", part)),
        };
    }

    let code = parse_key_code(key_part)?;
    Ok(KeyBinding { code, modifiers })
}

fn parse_key_code(s: &str) -> Result<KeyCode, String> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let lower = s.to_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        if (1..=12).contains(&n) {
            return Ok(KeyCode::F(n));
        }
    }

    match lower.as_str() {
        "enter" | "return" => Ok(KeyCode::Enter),
        "tab" => Ok(KeyCode::Tab),
        "backtab" => Ok(KeyCode::BackTab),
        "backspace" => Ok(KeyCode::Backspace),
        "delete" | "del" => Ok(KeyCode::Delete),
        "home" => Ok(KeyCode::Home),
        "end" => Ok(KeyCode::End),
        "pageup" | "pgup" => Ok(KeyCode::PageUp),
        "pagedown" | "pgdn" => Ok(KeyCode::PageDown),
        "up" => Ok(KeyCode::Up),
        "down" => Ok(KeyCode::Down),
        "left" => Ok(KeyCode::Left),
        "right" => Ok(KeyCode::Right),
        "esc" | "escape" => Ok(KeyCode::Esc),
        "space" => Ok(KeyCode::Char(' ')),
        _ => Err(format!("Unknown key: {}", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_char() {
        let binding = parse_key_string("j").unwrap();
        assert_eq!(binding.code, KeyCode::Char('j'));
        assert_eq!(binding.modifiers, KeyModifiers::NONE);
    }

    #[test]
    fn test_parse_non_ascii_char() {
        let binding = parse_key_string("é").unwrap();
        assert_eq!(binding.code, KeyCode::Char('é'));
    }

    #[test]
    fn test_parse_special_key() {
        assert_eq!(parse_key_string("Enter").unwrap().code, KeyCode::Enter);
        assert_eq!(parse_key_string("Space").unwrap().code, KeyCode::Char(' '));
        assert_eq!(parse_key_string("PageDown").unwrap().code, KeyCode::PageDown);
        assert_eq!(parse_key_string("F12").unwrap().code, KeyCode::F(12));
        assert!(parse_key_string("F13").is_err());
        assert!(parse_key_string("Hyper").is_err());
    }

    #[test]
    fn test_parse_modifiers() {
        let binding = parse_key_string("Ctrl+f").unwrap();
        assert_eq!(binding.code, KeyCode::Char('f'));
        assert_eq!(binding.modifiers, KeyModifiers::CONTROL);

        let binding = parse_key_string("Ctrl+Shift+a").unwrap();
        assert_eq!(binding.modifiers, KeyModifiers::CONTROL | KeyModifiers::SHIFT);
        assert!(parse_key_string("Meta+a").is_err());
    }

    #[test]
    fn test_keybinding_matches() {
        let binding = parse_key_string("Ctrl+c").unwrap();
        assert!(binding.matches(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!binding.matches(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_default_actions() {
        let config = KeybindingConfig::default();
        let action = |code, modifiers| config.get_action(&KeyEvent::new(code, modifiers));

        assert_eq!(action(KeyCode::Char('q'), KeyModifiers::NONE), Action::Quit);
        assert_eq!(action(KeyCode::Char('c'), KeyModifiers::CONTROL), Action::Quit);
        assert_eq!(action(KeyCode::Enter, KeyModifiers::NONE), Action::Select);
        assert_eq!(action(KeyCode::Char('a'), KeyModifiers::NONE), Action::AddFeed);
        // Terminals report capitals with SHIFT set.
        assert_eq!(action(KeyCode::Char('A'), KeyModifiers::SHIFT), Action::AddFolder);
        assert_eq!(action(KeyCode::Char('G'), KeyModifiers::SHIFT), Action::ScrollBottom);
        assert_eq!(action(KeyCode::Char('?'), KeyModifiers::SHIFT), Action::Help);
        assert_eq!(action(KeyCode::Delete, KeyModifiers::NONE), Action::RemoveFeed);
        assert_eq!(action(KeyCode::Char('z'), KeyModifiers::NONE), Action::None);
    }

    #[test]
    fn test_help_entries_follow_rebinding() {
        let mut config = KeybindingConfig::default();
        config.remove_feed = vec!["x".to_string()];
        config.help.clear();

        let entries = config.help_entries();
        assert!(entries.contains(&("x".to_string(), "remove feed")));
        assert!(entries.contains(&("j / Down".to_string(), "move down")));
        assert!(entries.iter().all(|(_, what)| *what != "show this help"));
    }
}
