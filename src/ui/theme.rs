//! Visual theme and styling.

use std::path::Path;

use chrono::{DateTime, Local};
use console::Style;

/// venv-update's visual theme.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Style for the `>` in front of echoed commands (cyan bold).
    pub prompt: Style,
    /// Style for echoed command lines (yellow bold).
    pub command: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for secondary text (dim).
    pub dim: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme {
    /// Create the default colored theme.
    pub fn new() -> Self {
        Self {
            prompt: Style::new().cyan().bold(),
            command: Style::new().yellow().bold(),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY or NO_COLOR).
    pub fn plain() -> Self {
        Self {
            prompt: Style::new(),
            command: Style::new(),
            error: Style::new(),
            dim: Style::new(),
        }
    }

    /// Pick the colored or plain theme for the current stdout.
    pub fn detect() -> Self {
        if should_use_colors() {
            Self::new()
        } else {
            Self::plain()
        }
    }

    /// Format an already-quoted command line as `> cmd`.
    pub fn format_command(&self, line: &str) -> String {
        format!("{} {}", self.prompt.apply_to(">"), self.command.apply_to(line))
    }

    /// Format an error message.
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("Error: {msg}")))
    }

    /// Format the notice printed after an environment was backdated.
    pub fn format_invalidation(&self, dir: &Path, backdated_to: DateTime<Local>) -> String {
        format!(
            "{}\n{}",
            self.error.apply_to(format!(
                "Something went wrong! Sending '{}' back in time, so make knows it's invalid.",
                dir.display()
            )),
            self.dim.apply_to(format!(
                "Its modification time is now {}.",
                backdated_to.format("%Y-%m-%d %H:%M:%S")
            )),
        )
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    console::Term::stdout().is_term()
}
