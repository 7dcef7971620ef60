//! Colour management for CLI output
//!
//! Colours are on unless `--no-color` or `[base] no-color` asks otherwise,
//! `NO_COLOR` is set, or stdout is not a terminal.

use std::io::IsTerminal;

use colored::{ColoredString, Colorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColourManager {
    enabled: bool,
}

impl ColourManager {
    /// Detect from the environment
    pub fn new() -> Self {
        let enabled = std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();
        Self { enabled }
    }

    pub fn with_colours(enabled: bool) -> Self {
        Self { enabled }
    }

    /// CLI flag wins over config; both can only switch colours off
    pub fn from_flags(no_color_flag: bool, config_no_color: Option<bool>) -> Self {
        if no_color_flag || config_no_color == Some(true) {
            Self::with_colours(false)
        } else {
            Self::new()
        }
    }

    pub fn colours_enabled(&self) -> bool {
        self.enabled
    }

    pub fn error(&self, text: &str) -> ColoredString {
        self.paint(text, |t| t.red().bold())
    }

    pub fn warning(&self, text: &str) -> ColoredString {
        self.paint(text, |t| t.yellow())
    }

    pub fn success(&self, text: &str) -> ColoredString {
        self.paint(text, |t| t.green())
    }

    pub fn highlight(&self, text: &str) -> ColoredString {
        self.paint(text, |t| t.cyan().bold())
    }

    pub fn dim(&self, text: &str) -> ColoredString {
        self.paint(text, |t| t.bright_black())
    }

    fn paint<F>(&self, text: &str, style: F) -> ColoredString
    where
        F: FnOnce(&str) -> ColoredString,
    {
        if self.enabled {
            style(text)
        } else {
            text.normal()
        }
    }
}

impl Default for ColourManager {
    fn default() -> Self {
        Self::new()
    }
}
