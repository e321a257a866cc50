//! Remove flow.

use zapstore_core::{Error, InstalledPackage, Installer, Registry, Result};

/// Delete an installed app's files and links, then drop its record.
pub fn remove_app(
    installer: &Installer,
    registry: &mut Registry,
    app_id: &str,
) -> Result<InstalledPackage> {
    let Some(pkg) = registry.get(app_id) else {
        return Err(Error::NotFound(format!("package '{app_id}' is not installed")));
    };

    installer.uninstall(app_id, &pkg.executables)?;
    Ok(registry.remove(app_id).unwrap_or_default())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use zapstore_core::io::download::http_client;
    use zapstore_core::{ErrorKind, Layout};

    #[test]
    fn test_remove_deletes_files_and_record() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = Layout::new(tmp.path().join("data"), tmp.path().join("state"));

        let dir = layout.version_dir("foo", "1.0.0");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("foo"), "bin").unwrap();
        std::fs::create_dir_all(layout.bin_dir()).unwrap();
        std::os::unix::fs::symlink(
            Layout::link_target("foo", "1.0.0", "foo"),
            layout.bin_dir().join("foo"),
        )
        .unwrap();

        let mut registry = Registry::default();
        registry.add(
            "foo",
            InstalledPackage {
                version: "1.0.0".into(),
                executables: vec!["foo".into()],
                ..Default::default()
            },
        );

        let installer = Installer::new(layout.clone(), http_client().unwrap());
        let removed = remove_app(&installer, &mut registry, "foo").unwrap();

        assert_eq!(removed.version, "1.0.0");
        assert!(registry.is_empty());
        assert!(!layout.app_dir("foo").exists());
        assert!(layout.bin_dir().join("foo").symlink_metadata().is_err());
    }

    #[test]
    fn test_remove_unknown_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = Layout::new(tmp.path().join("data"), tmp.path().join("state"));
        let installer = Installer::new(layout, http_client().unwrap());

        let err = remove_app(&installer, &mut Registry::default(), "ghost").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_install_then_remove_leaves_nothing() {
        use crate::ops::INSTALL_DEADLINE;
        use crate::ops::install::install_app;
        use crate::ops::testing::{context, publish_app, publish_release};
        use tokio::time::Instant;
        use zapstore_core::{MemoryEventSource, NullReporter};

        let tmp = tempfile::tempdir().unwrap();
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/foo")
            .with_body("abc")
            .create_async()
            .await;

        let mut source = MemoryEventSource::new();
        publish_app(&mut source, "foo");
        publish_release(&mut source, "foo", "1.0.0", &server.url());
        let ctx = context(source, &tmp);

        let mut registry = Registry::default();
        let deadline = Instant::now() + INSTALL_DEADLINE;
        install_app(&ctx, &mut registry, "foo", deadline, &NullReporter)
            .await
            .unwrap();
        let link = ctx.layout().bin_dir().join("foo");
        assert!(link.symlink_metadata().is_ok());

        remove_app(&ctx.installer, &mut registry, "foo").unwrap();

        assert!(registry.get("foo").is_none());
        assert!(!ctx.layout().version_dir("foo", "1.0.0").exists());
        assert!(!ctx.layout().app_dir("foo").exists());
        assert!(link.symlink_metadata().is_err());
    }
}
