//! SHA-256 content hashes as published in asset events.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when validating a content hash.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HashError {
    /// The string is not 64 characters long.
    #[error("invalid SHA-256 digest: expected 64 hex characters, got {0}")]
    Length(usize),

    /// The string contains a non-hex character.
    #[error("invalid SHA-256 digest: non-hex characters in '{0}'")]
    NonHex(String),
}

/// A SHA-256 content hash, stored as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Validate and normalize a hex digest.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if `s` is not exactly 64 ASCII hex characters.
    pub fn parse(s: &str) -> Result<Self, HashError> {
        if s.len() != 64 {
            return Err(HashError::Length(s.len()));
        }
        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HashError::NonHex(s.to_string()));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// Hex-encode raw digest bytes.
    pub fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }

    /// Lowercase hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
