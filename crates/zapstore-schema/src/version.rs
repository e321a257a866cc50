//! Version ordering for release selection and upgrade checks.
//!
//! Versions follow a pragmatic superset of Semantic Versioning:
//!
//! - An optional `v`/`V` prefix is stripped.
//! - Build metadata (after the first `+`) is discarded.
//! - A pre-release suffix (after the first `-`) orders below the same core
//!   version without one (`1.0.0-rc < 1.0.0`).
//! - The core is any number of dot-separated integers. Missing trailing
//!   components are zero (`1.2 == 1.2.0`) and non-numeric components parse
//!   as zero.
//! - Pre-release identifiers compare pairwise: numbers by value, text by code
//!   point, and a number always below text. A shorter identifier list that is
//!   a prefix of a longer one orders lower.
//!
//! # Example
//!
//! ```
//! use zapstore_schema::version::{Version, can_upgrade};
//!
//! assert!(can_upgrade("1.0.0-alpha.9", "1.0.0-alpha.10"));
//! assert_eq!(Version::parse("v1.2"), Version::parse("1.2.0+build.7"));
//! ```

use std::cmp::Ordering;
use std::fmt;

/// One dot-separated pre-release identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// All-digit identifier, compared by value.
    Numeric(u64),
    /// Anything else, compared lexicographically.
    Text(String),
}

impl Identifier {
    fn parse(s: &str) -> Self {
        match s.parse::<u64>() {
            Ok(n) if s.bytes().all(|b| b.is_ascii_digit()) => Self::Numeric(n),
            _ => Self::Text(s.to_string()),
        }
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => a.cmp(b),
            (Self::Numeric(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Numeric(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A parsed version string.
///
/// Equality and ordering only look at the parsed components, so `1.2` and
/// `v1.2.0+meta` are equal even though [`as_str`](Self::as_str) differs.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    core: Vec<u64>,
    pre: Vec<Identifier>,
}

impl Version {
    /// Parse a version string. Parsing never fails; malformed parts degrade
    /// to zero components.
    pub fn parse(s: &str) -> Self {
        let raw = s.to_string();

        let s = s.strip_prefix('v').unwrap_or(s);
        let s = s.strip_prefix('V').unwrap_or(s);

        let s = s.split_once('+').map_or(s, |(head, _build)| head);

        let (core, pre) = match s.split_once('-') {
            Some((core, pre)) => (core, pre),
            None => (s, ""),
        };

        let core = core
            .split('.')
            .map(|part| part.parse::<u64>().unwrap_or(0))
            .collect();

        let pre = if pre.is_empty() {
            Vec::new()
        } else {
            pre.split('.').map(Identifier::parse).collect()
        };

        Self { raw, core, pre }
    }

    /// The original, unmodified string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Numeric core components as written (no zero padding).
    pub fn core(&self) -> &[u64] {
        &self.core
    }

    /// Pre-release identifiers, empty for a stable version.
    pub fn pre_release(&self) -> &[Identifier] {
        &self.pre
    }

    /// Whether this version carries a pre-release suffix.
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    fn cmp_core(&self, other: &Self) -> Ordering {
        let len = self.core.len().max(other.core.len());
        (0..len)
            .map(|i| {
                let a = self.core.get(i).copied().unwrap_or(0);
                let b = other.core.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    fn cmp_pre(&self, other: &Self) -> Ordering {
        match (self.pre.is_empty(), other.pre.is_empty()) {
            (true, true) => return Ordering::Equal,
            (false, true) => return Ordering::Less,
            (true, false) => return Ordering::Greater,
            (false, false) => {}
        }

        // Pairwise, then the shorter list sorts first.
        self.pre
            .iter()
            .zip(&other.pre)
            .map(|(a, b)| a.cmp(b))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| self.pre.len().cmp(&other.pre.len()))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_core(other).then_with(|| self.cmp_pre(other))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for Version {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

/// Compare two version strings.
pub fn compare(a: &str, b: &str) -> Ordering {
    Version::parse(a).cmp(&Version::parse(b))
}

/// Returns true if `candidate` is strictly newer than `installed`.
pub fn can_upgrade(installed: &str, candidate: &str) -> bool {
    compare(candidate, installed) == Ordering::Greater
}
