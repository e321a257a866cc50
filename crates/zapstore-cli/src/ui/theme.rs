//! Colors, icons and column widths shared by every command's output.

use crossterm::style::Color;

/// Visual constants for terminal output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Theme {
    pub colors: ColorScheme,
    pub icons: Icons,
    pub layout: Columns,
}

/// Foreground colors by role.
#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    pub package_name: Color,
    pub version: Color,
    /// Dates, sizes, hints.
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    /// Spinner icon while work is running.
    pub active: Color,
}

impl ColorScheme {
    const TERMINAL: Self = Self {
        package_name: Color::Cyan,
        version: Color::White,
        secondary: Color::DarkGrey,
        success: Color::Green,
        warning: Color::Yellow,
        error: Color::Red,
        active: Color::Magenta,
    };
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::TERMINAL
    }
}

/// Single-glyph status markers.
#[derive(Debug, Clone, Copy)]
pub struct Icons {
    pub pending: &'static str,
    pub active: &'static str,
    pub success: &'static str,
    pub error: &'static str,
    pub warning: &'static str,
    pub info: &'static str,
}

impl Icons {
    const UNICODE: Self = Self {
        pending: "○",
        active: "●",
        success: "✓",
        error: "✗",
        warning: "⚠",
        info: "ℹ",
    };
}

impl Default for Icons {
    fn default() -> Self {
        Self::UNICODE
    }
}

/// Column widths for `list` and `search`.
#[derive(Debug, Clone, Copy)]
pub struct Columns {
    pub name_width: usize,
    pub version_width: usize,
    pub executables_width: usize,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            name_width: 24,
            version_width: 12,
            executables_width: 20,
        }
    }
}

const UNITS: [&str; 3] = ["KB", "MB", "GB"];

/// `1536` becomes `1.5 KB`. Anything under 1 KiB is shown in bytes.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
