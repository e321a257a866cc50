//! Garbage collection of the package tree.
//!
//! Reconciles `packages/` against the registry and sweeps dangling links out
//! of `bin/`. Safe to run repeatedly: a second pass finds nothing to do.

use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::paths::Layout;
use crate::state::Registry;

/// What a cleanup pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Version directories removed.
    pub removed_dirs: usize,
    /// Bytes of files inside the removed directories.
    pub bytes_freed: u64,
    /// Dangling symlinks removed from `bin/`.
    pub dangling_links: usize,
}

impl CleanupReport {
    /// Whether the pass removed nothing.
    pub fn is_empty(&self) -> bool {
        self.removed_dirs == 0 && self.dangling_links == 0
    }
}

/// Remove every version directory that is not the registry's active
/// version, empty orphaned app directories, and dangling `bin/` links.
///
/// # Errors
///
/// Returns a filesystem error if a directory cannot be listed or removed.
pub fn cleanup(layout: &Layout, registry: &Registry) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();
    sweep_packages(layout, registry, &mut report)?;
    sweep_links(layout, &mut report)?;

    info!(
        removed = report.removed_dirs,
        bytes = report.bytes_freed,
        links = report.dangling_links,
        "cleanup complete"
    );
    Ok(report)
}

fn sweep_packages(layout: &Layout, registry: &Registry, report: &mut CleanupReport) -> Result<()> {
    let root = layout.packages_dir();
    let apps = match std::fs::read_dir(&root) {
        Ok(apps) => apps,
        Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::fs("reading packages directory", &root)(e)),
    };

    for app in apps.flatten() {
        let app_dir = app.path();
        if !app_dir.is_dir() {
            continue;
        }
        let app_id = app.file_name().to_string_lossy().into_owned();
        let active = registry.active_version(&app_id);

        let Ok(versions) = std::fs::read_dir(&app_dir) else {
            continue;
        };
        for version in versions.flatten() {
            let version_dir = version.path();
            if !version_dir.is_dir() || version.file_name().to_string_lossy() == active {
                continue;
            }

            let size = dir_size(&version_dir);
            match std::fs::remove_dir_all(&version_dir) {
                Ok(()) => {
                    debug!(path = %version_dir.display(), size, "removed inactive version");
                    report.removed_dirs += 1;
                    report.bytes_freed += size;
                }
                Err(e) => warn!(path = %version_dir.display(), error = %e, "failed to remove"),
            }
        }

        if active.is_empty() && is_empty_dir(&app_dir) {
            debug!(app_id, "removing orphaned app directory");
            if let Err(e) = std::fs::remove_dir(&app_dir) {
                warn!(path = %app_dir.display(), error = %e, "failed to remove");
            }
        }
    }
    Ok(())
}

fn sweep_links(layout: &Layout, report: &mut CleanupReport) -> Result<()> {
    let bin_dir = layout.bin_dir();
    let links = match std::fs::read_dir(&bin_dir) {
        Ok(links) => links,
        Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::fs("reading bin directory", &bin_dir)(e)),
    };

    for link in links.flatten() {
        let path = link.path();
        let Ok(target) = std::fs::read_link(&path) else {
            continue;
        };
        // Relative targets resolve against bin/; absolute ones replace it.
        let resolved = bin_dir.join(&target);
        if std::fs::metadata(&resolved).is_err_and(|e| e.kind() == IoErrorKind::NotFound) {
            std::fs::remove_file(&path).map_err(Error::fs("removing dangling symlink", &path))?;
            debug!(link = %path.display(), target = %target.display(), "removed dangling link");
            report.dangling_links += 1;
        }
    }
    Ok(())
}

/// Total size of regular files under `path`.
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

fn is_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path).is_ok_and(|mut it| it.next().is_none())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::state::InstalledPackage;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    fn layout(tmp: &TempDir) -> Layout {
        Layout::new(tmp.path().join("data"), tmp.path().join("state"))
    }

    fn put(layout: &Layout, app: &str, version: &str, bytes: usize) {
        let dir = layout.version_dir(app, version);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(app), vec![0u8; bytes]).unwrap();
    }

    fn registry_with(app: &str, version: &str) -> Registry {
        let mut reg = Registry::default();
        reg.add(
            app,
            InstalledPackage {
                version: version.into(),
                executables: vec![app.into()],
                ..Default::default()
            },
        );
        reg
    }

    #[test]
    fn test_empty_tree() {
        let tmp = TempDir::new().unwrap();
        let report = cleanup(&layout(&tmp), &Registry::default()).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.bytes_freed, 0);
    }

    #[test]
    fn test_removes_inactive_versions_only() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(&tmp);
        put(&layout, "foo", "1.0.0", 100);
        put(&layout, "foo", "1.1.0", 50);
        put(&layout, "foo", "1.2.0", 10);

        let report = cleanup(&layout, &registry_with("foo", "1.2.0")).unwrap();
        assert_eq!(report.removed_dirs, 2);
        assert_eq!(report.bytes_freed, 150);
        assert!(layout.version_dir("foo", "1.2.0").exists());
        assert!(!layout.version_dir("foo", "1.0.0").exists());
    }

    #[test]
    fn test_orphaned_app_is_removed_entirely() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(&tmp);
        put(&layout, "ghost", "0.1.0", 7);

        let report = cleanup(&layout, &Registry::default()).unwrap();
        assert_eq!(report.removed_dirs, 1);
        assert_eq!(report.bytes_freed, 7);
        assert!(!layout.app_dir("ghost").exists());
    }

    #[test]
    fn test_dangling_links_are_removed() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(&tmp);
        put(&layout, "foo", "1.0.0", 1);
        put(&layout, "foo", "2.0.0", 1);

        let bin = layout.bin_dir();
        std::fs::create_dir_all(&bin).unwrap();
        symlink(Layout::link_target("foo", "1.0.0", "foo"), bin.join("old")).unwrap();
        symlink(Layout::link_target("foo", "2.0.0", "foo"), bin.join("foo")).unwrap();

        let report = cleanup(&layout, &registry_with("foo", "2.0.0")).unwrap();
        assert_eq!(report.removed_dirs, 1);
        assert_eq!(report.dangling_links, 1);
        assert!(std::fs::symlink_metadata(bin.join("old")).is_err());
        assert!(std::fs::symlink_metadata(bin.join("foo")).is_ok());
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(&tmp);
        put(&layout, "foo", "1.0.0", 100);
        put(&layout, "foo", "2.0.0", 100);
        put(&layout, "ghost", "0.1.0", 100);
        let bin = layout.bin_dir();
        std::fs::create_dir_all(&bin).unwrap();
        symlink(Layout::link_target("ghost", "0.1.0", "ghost"), bin.join("ghost")).unwrap();

        let reg = registry_with("foo", "2.0.0");
        let first = cleanup(&layout, &reg).unwrap();
        assert_eq!(first.removed_dirs, 2);
        assert_eq!(first.dangling_links, 1);

        let second = cleanup(&layout, &reg).unwrap();
        assert_eq!(second, CleanupReport::default());
    }

    #[test]
    fn test_dir_size_counts_nested_files() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        std::fs::write(tmp.path().join("a/one"), [0u8; 3]).unwrap();
        std::fs::write(tmp.path().join("a/b/two"), [0u8; 4]).unwrap();
        assert_eq!(dir_size(&tmp.path().join("a")), 7);
    }
}
