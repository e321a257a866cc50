//! Error taxonomy for resolution, installation and state handling.

use std::path::{Path, PathBuf};

use thiserror::Error;
use zapstore_schema::HashError;

/// Boxed transport error source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Broad failure category, for callers that branch on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Nothing matched a query.
    NotFound,
    /// Downloaded content did not match its declared hash.
    Verification,
    /// Network, relay or deadline failure.
    Transport,
    /// The registry file exists but cannot be parsed.
    StateCorruption,
    /// Local filesystem failure.
    Filesystem,
}

/// Errors produced by zapstore core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No app, release or asset matched.
    #[error("{0}")]
    NotFound(String),

    /// The published hash is not a SHA-256 hex digest.
    #[error("invalid hash for {app_id}: {source}")]
    InvalidHash {
        /// App being installed.
        app_id: String,
        /// Validation failure.
        #[source]
        source: HashError,
    },

    /// The downloaded body does not hash to the expected digest.
    #[error("hash mismatch for {app_id} ({url}): expected {expected}, got {actual}")]
    HashMismatch {
        /// App being installed.
        app_id: String,
        /// Source URL.
        url: String,
        /// Published digest.
        expected: String,
        /// Digest of the downloaded body.
        actual: String,
    },

    /// A relay query or download failed.
    #[error("{context}: {source}")]
    Transport {
        /// What was being attempted, naming the identifier or URL.
        context: String,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },

    /// The registry file exists but is not valid.
    #[error("corrupt state file {}: {source}", .path.display())]
    StateCorruption {
        /// Registry path.
        path: PathBuf,
        /// Parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// A filesystem operation failed.
    #[error("{context} {}: {source}", .path.display())]
    Filesystem {
        /// What was being attempted.
        context: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidHash { .. } | Self::HashMismatch { .. } => ErrorKind::Verification,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::StateCorruption { .. } => ErrorKind::StateCorruption,
            Self::Filesystem { .. } => ErrorKind::Filesystem,
        }
    }

    /// Transport failure with context.
    pub fn transport(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Adapter for `map_err` on filesystem calls.
    pub fn fs(
        context: &'static str,
        path: &Path,
    ) -> impl FnOnce(std::io::Error) -> Self + use<> {
        let path = path.to_path_buf();
        move |source| Self::Filesystem {
            context,
            path,
            source,
        }
    }
}

/// Result alias for core operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
