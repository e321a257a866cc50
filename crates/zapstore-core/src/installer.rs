//! Installation pipeline.
//!
//! download → verify → place under `packages/{app}/{version}/` → point
//! `bin/{binary}` at it → prune every other version of the app.
//!
//! Nothing touches the filesystem before the version directory is created,
//! and a hash mismatch removes that directory again.

use std::ffi::OsStr;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Component, Path, PathBuf};

use reqwest::Client;
use tracing::{debug, info, warn};
use zapstore_schema::ContentHash;

use crate::Reporter;
use crate::error::{Error, Result};
use crate::io::download;
use crate::paths::{Layout, filename_from_url};

/// What to install.
#[derive(Debug, Clone, Default)]
pub struct InstallRequest {
    /// App id; names the package directory.
    pub app_id: String,
    /// Version string; names the version directory.
    pub version: String,
    /// Download URL.
    pub url: String,
    /// Published SHA-256, if any.
    pub expected_hash: Option<String>,
    /// Published file name, if any.
    pub filename: Option<String>,
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledBinary {
    /// Executable name, also the symlink name.
    pub binary_name: String,
    /// Path of the installed file.
    pub binary_path: PathBuf,
    /// Path of the stable symlink.
    pub symlink_path: PathBuf,
    /// Size of the installed file in bytes.
    pub size: u64,
    /// Whether the body was checked against a published hash.
    pub verified: bool,
    /// Version directories removed after linking.
    pub pruned: Vec<String>,
}

/// Places binaries into a [`Layout`].
#[derive(Debug, Clone)]
pub struct Installer {
    layout: Layout,
    client: Client,
}

/// Pick the executable name: published filename, else the URL's last path
/// segment, else the app id.
pub fn binary_name(req: &InstallRequest) -> String {
    req.filename
        .as_deref()
        .filter(|f| !f.is_empty())
        .or_else(|| Some(filename_from_url(&req.url)).filter(|f| !f.is_empty()))
        .unwrap_or(req.app_id.as_str())
        .to_string()
}

impl Installer {
    /// Installer writing into `layout` and downloading with `client`.
    pub fn new(layout: Layout, client: Client) -> Self {
        Self { layout, client }
    }

    /// Layout this installer writes into.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Run the pipeline for one asset.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidHash`] or [`Error::HashMismatch`] when the
    /// body cannot be verified, a transport error if the download fails, and a
    /// filesystem error if the binary cannot be written or linked.
    pub async fn install<R: Reporter + ?Sized>(
        &self,
        req: &InstallRequest,
        reporter: &R,
    ) -> Result<InstalledBinary> {
        let app_id = req.app_id.as_str();
        let version = req.version.as_str();

        let binary_name = binary_name(req);
        check_component("unsafe app id", app_id)?;
        check_component("unsafe version", version)?;
        check_component("unsafe binary name", &binary_name)?;

        let expected = req
            .expected_hash
            .as_deref()
            .filter(|h| !h.is_empty())
            .map(|h| {
                ContentHash::parse(h).map_err(|source| Error::InvalidHash {
                    app_id: app_id.to_string(),
                    source,
                })
            })
            .transpose()?;

        let version_dir = self.layout.version_dir(app_id, version);
        tokio::fs::create_dir_all(&version_dir)
            .await
            .map_err(Error::fs("creating install directory", &version_dir))?;

        let downloaded =
            download::fetch(&self.client, &req.url, app_id, version, reporter).await?;

        if let Some(expected) = &expected {
            if *expected != downloaded.sha256 {
                if let Err(e) = tokio::fs::remove_dir_all(&version_dir).await {
                    warn!(path = %version_dir.display(), error = %e, "failed to remove rejected download");
                }
                return Err(Error::HashMismatch {
                    app_id: app_id.to_string(),
                    url: req.url.clone(),
                    expected: expected.to_string(),
                    actual: downloaded.sha256.to_string(),
                });
            }
            reporter.verified(app_id, version);
        }

        let binary_path = version_dir.join(&binary_name);
        tokio::fs::write(&binary_path, &downloaded.body)
            .await
            .map_err(Error::fs("writing binary", &binary_path))?;
        make_executable(&binary_path)?;

        let symlink_path = self.link(app_id, version, &binary_name)?;
        reporter.linked(&binary_name, version);

        let pruned = self.prune_other_versions(app_id, version, reporter);

        info!(app_id, version, binary = %binary_name, "installed");
        Ok(InstalledBinary {
            binary_name,
            binary_path,
            symlink_path,
            size: downloaded.body.len() as u64,
            verified: expected.is_some(),
            pruned,
        })
    }

    /// Replace `bin/{binary}` with a relative link into the version directory.
    fn link(&self, app_id: &str, version: &str, binary: &str) -> Result<PathBuf> {
        let bin_dir = self.layout.bin_dir();
        std::fs::create_dir_all(&bin_dir).map_err(Error::fs("creating bin directory", &bin_dir))?;

        let link = bin_dir.join(binary);
        match std::fs::remove_file(&link) {
            Ok(()) => debug!(link = %link.display(), "replacing existing link"),
            Err(e) if e.kind() == IoErrorKind::NotFound => {}
            Err(e) => return Err(Error::fs("removing old symlink", &link)(e)),
        }

        let target = Layout::link_target(app_id, version, binary);
        symlink(&target, &link).map_err(Error::fs("creating symlink", &link))?;
        Ok(link)
    }

    /// Remove every version directory of `app_id` except `keep`. Failures
    /// are reported and skipped.
    fn prune_other_versions<R: Reporter + ?Sized>(
        &self,
        app_id: &str,
        keep: &str,
        reporter: &R,
    ) -> Vec<String> {
        let app_dir = self.layout.app_dir(app_id);
        let Ok(entries) = std::fs::read_dir(&app_dir) else {
            return Vec::new();
        };

        let mut pruned = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == keep || !entry.path().is_dir() {
                continue;
            }
            match std::fs::remove_dir_all(entry.path()) {
                Ok(()) => {
                    debug!(app_id, version = %name, "pruned old version");
                    pruned.push(name);
                }
                Err(e) => {
                    warn!(app_id, version = %name, error = %e, "failed to prune old version");
                    reporter.warning(&format!("could not remove {app_id} {name}: {e}"));
                }
            }
        }
        pruned.sort();
        if !pruned.is_empty() {
            reporter.info(&format!("removed {app_id} {}", pruned.join(", ")));
        }
        pruned
    }

    /// Remove every version of `app_id`, then each of `executables` whose
    /// link still points into this app's package directory.
    ///
    /// # Errors
    ///
    /// Returns a filesystem error if the package directory or a link cannot be
    /// removed.
    pub fn uninstall(&self, app_id: &str, executables: &[String]) -> Result<()> {
        let app_dir = self.layout.app_dir(app_id);
        match std::fs::remove_dir_all(&app_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == IoErrorKind::NotFound => {}
            Err(e) => return Err(Error::fs("removing app directory", &app_dir)(e)),
        }

        let bin_dir = self.layout.bin_dir();
        for exe in executables {
            let link = bin_dir.join(exe);
            let Ok(target) = std::fs::read_link(&link) else {
                continue;
            };
            if !points_into(&target, app_id) {
                debug!(link = %link.display(), "link now owned by another app, keeping");
                continue;
            }
            std::fs::remove_file(&link).map_err(Error::fs("removing symlink", &link))?;
        }

        info!(app_id, "uninstalled");
        Ok(())
    }
}

/// Whether `target` has `app_id` as one of its directory segments. The final
/// segment is the binary name and never counts.
fn points_into(target: &Path, app_id: &str) -> bool {
    target
        .components()
        .rev()
        .skip(1)
        .any(|c| matches!(c, Component::Normal(s) if s == OsStr::new(app_id)))
}

/// Reject values that would escape their parent once joined onto a path.
fn check_component(what: &'static str, value: &str) -> Result<()> {
    let mut parts = Path::new(value).components();
    match (parts.next(), parts.next()) {
        (Some(Component::Normal(_)), None) if !value.contains(['/', '\\']) => Ok(()),
        _ => Err(Error::fs(what, Path::new(value))(std::io::Error::new(
            IoErrorKind::InvalidInput,
            "not a single path segment",
        ))),
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(Error::fs("setting permissions on", path))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
