//! Core library for zapstore: resolution, installation and local state.

pub mod error;
pub mod gc;
pub mod installer;
pub mod io;
pub mod migrate;
pub mod paths;
pub mod relay;
pub mod resolver;
pub mod source;
pub mod state;

pub mod reporter;

pub use error::{Error, ErrorKind, Result};
pub use gc::{CleanupReport, cleanup};
pub use installer::{InstallRequest, InstalledBinary, Installer};
pub use paths::Layout;
pub use relay::{DEFAULT_RELAY, RelayClient};
pub use reporter::{NullReporter, Reporter};
pub use resolver::{DEFAULT_BLOB_SERVER, Resolution, Resolver};
pub use source::{EventSource, MemoryEventSource};
pub use state::{InstalledPackage, Registry};

/// User Agent string for core operations
pub const USER_AGENT: &str = concat!("zapstore/", env!("CARGO_PKG_VERSION"));
