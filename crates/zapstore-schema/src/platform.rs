//! Platform detection and asset compatibility.
//!
//! A [`Platform`] pairs the canonical `{os}-{arch}` tag used in directory
//! events (e.g. `darwin-arm64`, `linux-aarch64`) with the MIME types that
//! identify a native binary for that tag.
//!
//! # Example
//!
//! ```
//! use zapstore_schema::Platform;
//!
//! let p = Platform::detect("linux", "arm64");
//! assert_eq!(p.tag(), "linux-aarch64");
//! assert!(p.matches_mime("application/x-executable; format=elf; arch=arm"));
//! ```

use std::fmt;

/// OS aliases. Rust reports `macos` where the directory uses `darwin`.
const OS_ALIASES: &[(&str, &str)] = &[("macos", "darwin")];

/// Raw architecture name to canonical name, for every OS except linux.
const ARCH_NAMES: &[(&str, &str)] = &[
    ("arm64", "arm64"),
    ("aarch64", "arm64"),
    ("amd64", "x86_64"),
    ("x86_64", "x86_64"),
];

/// Linux tags spell 64-bit ARM as `aarch64`.
const LINUX_ARCH_NAMES: &[(&str, &str)] = &[
    ("arm64", "aarch64"),
    ("aarch64", "aarch64"),
    ("amd64", "x86_64"),
    ("x86_64", "x86_64"),
];

/// Canonical platform tag to the MIME types of a native binary.
const PLATFORM_MIME: &[(&str, &[&str])] = &[
    ("darwin-arm64", &["application/x-mach-binary; arch=arm64"]),
    ("darwin-x86_64", &["application/x-mach-binary; arch=x86-64"]),
    (
        "linux-aarch64",
        &["application/x-executable; format=elf; arch=arm"],
    ),
    (
        "linux-x86_64",
        &["application/x-executable; format=elf; arch=x86-64"],
    ),
    ("windows-x86_64", &["application/x-msdownload"]),
];

fn lookup<'a>(table: &[(&str, &'a str)], key: &str) -> Option<&'a str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// The running (or a hypothetical) platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    os: String,
    arch: String,
    tag: String,
    mime_types: Vec<String>,
}

impl Platform {
    /// Detect the platform this process runs on.
    pub fn current() -> Self {
        Self::detect(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Build a platform from raw OS and architecture names.
    ///
    /// Unknown architectures pass through unchanged, and a tag without known
    /// MIME types gets an empty set.
    pub fn detect(os: &str, arch: &str) -> Self {
        let canonical_os = lookup(OS_ALIASES, os).unwrap_or(os);

        let table = if canonical_os == "linux" {
            LINUX_ARCH_NAMES
        } else {
            ARCH_NAMES
        };
        let canonical_arch = lookup(table, arch).unwrap_or(arch);

        let tag = format!("{canonical_os}-{canonical_arch}");

        let mime_types = PLATFORM_MIME
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, mimes)| mimes.iter().map(|m| (*m).to_string()).collect())
            .unwrap_or_default();

        Self {
            os: os.to_string(),
            arch: arch.to_string(),
            tag,
            mime_types,
        }
    }

    /// Raw OS name this platform was built from.
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Raw architecture name this platform was built from.
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Canonical `{os}-{arch}` tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Compatible binary MIME types (possibly empty).
    pub fn mime_types(&self) -> &[String] {
        &self.mime_types
    }

    /// Exact match against a platform tag.
    pub fn matches_platform(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// Exact membership in the compatible MIME set.
    pub fn matches_mime(&self, mime: &str) -> bool {
        self.mime_types.iter().any(|m| m == mime)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}
