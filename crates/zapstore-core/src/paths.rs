//! On-disk layout.
//!
//! ```text
//! $XDG_DATA_HOME/zapstore/             (default ~/.local/share/zapstore)
//! ├── packages/<app-id>/<version>/<binary>
//! └── bin/<binary> -> ../packages/<app-id>/<version>/<binary>
//!
//! $XDG_STATE_HOME/zapstore/            (default ~/.local/state/zapstore)
//! └── state.json
//! ```

use dirs::home_dir;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "zapstore";
const REGISTRY_FILE: &str = "state.json";

/// Data and state roots for one installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    data_dir: PathBuf,
    state_dir: PathBuf,
}

impl Layout {
    /// Layout rooted at explicit directories.
    pub fn new(data_dir: impl Into<PathBuf>, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            state_dir: state_dir.into(),
        }
    }

    /// Layout from `XDG_DATA_HOME` / `XDG_STATE_HOME`, or `None` if neither
    /// those nor the home directory can be resolved.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            data_dir: xdg_dir("XDG_DATA_HOME", &[".local", "share"])?,
            state_dir: xdg_dir("XDG_STATE_HOME", &[".local", "state"])?,
        })
    }

    /// Data root.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// State root.
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// `packages/` under the data root.
    pub fn packages_dir(&self) -> PathBuf {
        self.data_dir.join("packages")
    }

    /// `bin/` under the data root.
    pub fn bin_dir(&self) -> PathBuf {
        self.data_dir.join("bin")
    }

    /// All versions of one app.
    pub fn app_dir(&self, app_id: &str) -> PathBuf {
        self.packages_dir().join(app_id)
    }

    /// One installed version of an app.
    pub fn version_dir(&self, app_id: &str, version: &str) -> PathBuf {
        self.app_dir(app_id).join(version)
    }

    /// The registry file.
    pub fn registry_path(&self) -> PathBuf {
        self.state_dir.join(REGISTRY_FILE)
    }

    /// Symlink target for a binary, relative to [`bin_dir`](Self::bin_dir).
    pub fn link_target(app_id: &str, version: &str, binary: &str) -> PathBuf {
        Path::new("..")
            .join("packages")
            .join(app_id)
            .join(version)
            .join(binary)
    }
}

fn xdg_dir(var: &str, fallback: &[&str]) -> Option<PathBuf> {
    if let Some(val) = std::env::var_os(var).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(val).join(APP_DIR));
    }
    let mut path = home_dir()?;
    path.extend(fallback);
    Some(path.join(APP_DIR))
}

/// The pre-XDG location, `~/.zapstore`.
pub fn legacy_dir() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".zapstore"))
}

/// Last path segment of a URL, without any query string.
pub fn filename_from_url(url: &str) -> &str {
    let last = url.split('/').next_back().unwrap_or("");
    last.split(['?', '#']).next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = Layout::new("/data/zapstore", "/state/zapstore");
        assert_eq!(layout.bin_dir(), PathBuf::from("/data/zapstore/bin"));
        assert_eq!(
            layout.version_dir("foo", "1.2.0"),
            PathBuf::from("/data/zapstore/packages/foo/1.2.0")
        );
        assert_eq!(
            layout.registry_path(),
            PathBuf::from("/state/zapstore/state.json")
        );
    }

    #[test]
    fn test_link_target_is_relative_to_bin() {
        let target = Layout::link_target("foo", "1.2.0", "foo-cli");
        assert_eq!(target, PathBuf::from("../packages/foo/1.2.0/foo-cli"));
        assert!(target.is_relative());
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(filename_from_url("https://example.com/dl/nak-v1?x=1"), "nak-v1");
        assert_eq!(filename_from_url("https://example.com/dl/"), "");
        assert_eq!(filename_from_url(""), "");
        assert_eq!(filename_from_url("https://cdn/abc#frag"), "abc");
    }
}
