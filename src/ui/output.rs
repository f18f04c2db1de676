//! Terminal output.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};

use super::theme::Theme;

/// Writes user-facing lines with the detected theme.
///
/// Commands and notices go to stdout, interleaved with the children's own
/// output; errors go to stderr.
#[derive(Debug, Clone)]
pub struct Output {
    theme: Theme,
}

impl Default for Output {
    fn default() -> Self {
        Self::new(Theme::detect())
    }
}

impl Output {
    /// Create an output writer with an explicit theme.
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Echo a command line before it runs.
    pub fn command(&self, line: &str) {
        println!("{}", self.theme.format_command(line));
        let _ = std::io::stdout().flush();
    }

    /// Write a plain status line.
    pub fn println(&self, msg: &str) {
        println!("{msg}");
    }

    pub fn error(&self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    /// Announce that `dir` was backdated.
    pub fn invalidation(&self, dir: &Path, backdated_to: DateTime<Local>) {
        println!("{}", self.theme.format_invalidation(dir, backdated_to));
        let _ = std::io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_output_formats_commands_without_color() {
        let output = Output::new(Theme::plain());
        assert_eq!(output.theme.format_command("pip"), "> pip");
    }
}
