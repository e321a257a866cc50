//! Shared types for zapstore.
//!
//! Everything in this crate is pure data: version ordering, platform
//! matching, the directory event model and the descriptors parsed from it.
//! Side effects live in `zapstore-core`.

pub mod event;
pub mod hash;
pub mod platform;
pub mod types;
pub mod version;

// Re-exports
pub use event::{Event, Filter};
pub use hash::{ContentHash, HashError};
pub use platform::Platform;
pub use types::*;
pub use version::Version;
