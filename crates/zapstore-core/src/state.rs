//! Package state store.
//!
//! A single JSON file maps app id to what is installed. It is loaded whole,
//! mutated in memory and written back whole. There is no lock: two
//! concurrent writers race and the later one wins.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// One installed app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    /// Owner key the app was resolved under.
    #[serde(default)]
    pub pubkey: String,
    /// Installed version string, as published.
    #[serde(default)]
    pub version: String,
    /// RFC 3339 UTC install time.
    #[serde(default)]
    pub installed_at: String,
    /// Executable names linked into `bin/`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub executables: Vec<String>,
    /// Asset event the binary came from.
    #[serde(default)]
    pub asset_event_id: String,
}

/// Contents of `state.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    /// Installed packages keyed by app id.
    #[serde(default, deserialize_with = "null_as_default")]
    pub packages: BTreeMap<String, InstalledPackage>,
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

impl Registry {
    /// Read the registry at `path`. A missing file is an empty registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StateCorruption`] if the file exists but is not valid
    /// registry JSON, or a filesystem error if it cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no state file, starting empty");
                return Ok(Self::default());
            }
            Err(e) => return Err(Error::fs("reading state", path)(e)),
        };

        serde_json::from_slice(&data).map_err(|source| Error::StateCorruption {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the registry to `path`, creating its directory.
    ///
    /// # Errors
    ///
    /// Returns a filesystem error if the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::fs("creating state directory", parent))?;
        }
        let data = serde_json::to_vec_pretty(self)
            .map_err(|e| Error::fs("encoding state", path)(e.into()))?;
        std::fs::write(path, data).map_err(Error::fs("writing state", path))
    }

    /// Record an install, replacing any previous record for `app_id`.
    /// An empty `installed_at` is stamped with the current time.
    pub fn add(&mut self, app_id: &str, mut pkg: InstalledPackage) {
        if pkg.installed_at.is_empty() {
            pkg.installed_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        }
        self.packages.insert(app_id.to_string(), pkg);
    }

    /// Drop the record for `app_id`, returning it.
    pub fn remove(&mut self, app_id: &str) -> Option<InstalledPackage> {
        self.packages.remove(app_id)
    }

    /// Record for `app_id`.
    pub fn get(&self, app_id: &str) -> Option<&InstalledPackage> {
        self.packages.get(app_id)
    }

    /// Recorded version for `app_id`, or `""` when not installed.
    pub fn active_version(&self, app_id: &str) -> &str {
        self.get(app_id).map_or("", |p| p.version.as_str())
    }

    /// Number of installed packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether nothing is installed.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::tempdir;

    fn pkg(version: &str) -> InstalledPackage {
        InstalledPackage {
            pubkey: "owner".into(),
            version: version.into(),
            executables: vec!["foo".into()],
            asset_event_id: "asset-1".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let reg = Registry::load(&dir.path().join("state.json")).unwrap();
        assert!(reg.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/state.json");

        let mut reg = Registry::default();
        reg.add("foo", pkg("1.2.0"));
        reg.save(&path).unwrap();

        let loaded = Registry::load(&path).unwrap();
        assert_eq!(loaded, reg);
        assert_eq!(loaded.active_version("foo"), "1.2.0");
        assert_eq!(loaded.active_version("bar"), "");
    }

    #[test]
    fn test_add_stamps_rfc3339_utc() {
        let mut reg = Registry::default();
        reg.add("foo", pkg("1.0.0"));
        let at = &reg.get("foo").unwrap().installed_at;
        assert!(at.ends_with('Z'), "{at}");
        assert!(chrono::DateTime::parse_from_rfc3339(at).is_ok());

        let mut kept = pkg("1.0.0");
        kept.installed_at = "2024-01-01T00:00:00Z".into();
        reg.add("foo", kept);
        assert_eq!(reg.get("foo").unwrap().installed_at, "2024-01-01T00:00:00Z");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_wire_format() {
        let json = r#"{"packages":{"nak":{"pubkey":"pk","version":"0.7.1","installed_at":"2024-05-01T10:00:00Z","executables":["nak"],"asset_event_id":"ev"}}}"#;
        let reg: Registry = serde_json::from_str(json).unwrap();
        let nak = reg.get("nak").unwrap();
        assert_eq!(nak.version, "0.7.1");
        assert_eq!(nak.executables, ["nak"]);

        let out = serde_json::to_value(&reg).unwrap();
        assert_eq!(out["packages"]["nak"]["asset_event_id"], "ev");
    }

    #[test]
    fn test_null_collections_are_tolerated() {
        let reg: Registry = serde_json::from_str(r#"{"packages":null}"#).unwrap();
        assert!(reg.is_empty());

        let reg: Registry =
            serde_json::from_str(r#"{"packages":{"a":{"version":"1","executables":null}}}"#)
                .unwrap();
        assert!(reg.get("a").unwrap().executables.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = Registry::load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateCorruption);
        assert!(err.to_string().contains("state.json"));
    }

    #[test]
    fn test_remove() {
        let mut reg = Registry::default();
        reg.add("foo", pkg("1.0.0"));
        assert_eq!(reg.remove("foo").unwrap().version, "1.0.0");
        assert!(reg.remove("foo").is_none());
    }
}
