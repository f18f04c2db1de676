//! Terminal output and styling.
//!
//! This module provides:
//! - [`Theme`] for colored or plain formatting
//! - [`Output`] for echoing commands, errors, and notices
//!
//! # Example
//!
//! ```
//! use venv_update::ui::Theme;
//!
//! let theme = Theme::plain();
//! assert_eq!(theme.format_command("pip --version"), "> pip --version");
//! ```

pub mod output;
pub mod theme;

pub use output::Output;
pub use theme::{should_use_colors, Theme};
