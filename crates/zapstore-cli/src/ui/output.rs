//! One-line status messages.

use crossterm::style::Stylize;

use super::theme::Theme;

/// Prints icon-prefixed status lines. Errors go to stderr.
#[derive(Debug, Clone, Default)]
pub struct Output {
    theme: Theme,
}

impl Output {
    /// Create a new output handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints an informational message to the console.
    pub fn info(&self, msg: &str) {
        println!("  {} {msg}", self.theme.icons.info.with(self.theme.colors.secondary));
    }

    /// Prints a success message to the console.
    pub fn success(&self, msg: &str) {
        println!("  {} {msg}", self.theme.icons.success.with(self.theme.colors.success));
    }

    /// Prints a warning message to the console.
    pub fn warning(&self, msg: &str) {
        println!("  {} {msg}", self.theme.icons.warning.with(self.theme.colors.warning));
    }

    /// Prints an error message to stderr.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", self.theme.icons.error.with(self.theme.colors.error));
    }
}
