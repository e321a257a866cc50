//! Terminal output.
//!
//! - [`theme`] - Colors, icons, and column widths
//! - [`output`] - One-line status messages
//! - [`spinner`] - Animated status line for long-running work
//! - [`list`] - Column-aligned rendering for `list` and `search`

pub mod list;
pub mod output;
pub mod spinner;
pub mod theme;

pub use output::Output;
pub use spinner::Spinner;
pub use theme::Theme;
