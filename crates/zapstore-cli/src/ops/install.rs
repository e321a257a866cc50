//! Install flow: resolve, compare against the registry, run the pipeline,
//! record the result.

use tokio::time::Instant;
use zapstore_core::{
    EventSource, InstallRequest, InstalledBinary, InstalledPackage, Registry, Reporter,
    Resolution, Result,
};
use zapstore_schema::version::can_upgrade;

use super::{Context, within};

/// What an install attempt did.
#[derive(Debug)]
pub enum InstallOutcome {
    /// A binary was placed and recorded.
    Installed {
        /// Display name of the app.
        name: String,
        /// Version now active.
        version: String,
        /// Version that was active before, if any.
        previous: Option<String>,
        /// Pipeline result.
        binary: InstalledBinary,
    },
    /// The recorded version is not older than the newest release.
    UpToDate {
        /// Recorded version.
        version: String,
    },
}

/// Resolve `app_id` and install it unless the registry already has an
/// equal or newer version.
pub async fn install_app<S, R>(
    ctx: &Context<S>,
    registry: &mut Registry,
    app_id: &str,
    deadline: Instant,
    reporter: &R,
) -> Result<InstallOutcome>
where
    S: EventSource,
    R: Reporter + ?Sized,
{
    reporter.resolving(app_id);
    let resolution = within(
        deadline,
        || format!("resolving {app_id}"),
        ctx.resolver.resolve(app_id, &ctx.platform),
    )
    .await?;

    let previous = registry.get(app_id).map(|p| p.version.clone());
    let candidate = resolution.release.version.as_str();
    if let Some(installed) = previous.as_deref().filter(|v| !can_upgrade(v, candidate)) {
        return Ok(InstallOutcome::UpToDate {
            version: installed.to_string(),
        });
    }

    let name = resolution.app.name.clone();
    let version = resolution.release.version.as_str().to_string();
    let binary = apply(ctx, registry, &resolution, reporter).await?;

    Ok(InstallOutcome::Installed {
        name,
        version,
        previous,
        binary,
    })
}

/// Run the pipeline for an already resolved candidate and record it.
pub(crate) async fn apply<S, R>(
    ctx: &Context<S>,
    registry: &mut Registry,
    resolution: &Resolution,
    reporter: &R,
) -> Result<InstalledBinary>
where
    S: EventSource,
    R: Reporter + ?Sized,
{
    let Resolution {
        app,
        release,
        asset,
    } = resolution;

    let req = InstallRequest {
        app_id: app.id.clone(),
        version: release.version.as_str().to_string(),
        url: asset.url.clone(),
        expected_hash: asset.hash.clone(),
        filename: asset.filename.clone(),
    };
    let binary = ctx.installer.install(&req, reporter).await?;

    registry.add(
        &app.id,
        InstalledPackage {
            pubkey: app.pubkey.clone(),
            version: req.version,
            installed_at: String::new(),
            executables: vec![binary.binary_name.clone()],
            asset_event_id: asset.event_id.clone(),
        },
    );
    Ok(binary)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::ops::INSTALL_DEADLINE;
    use crate::ops::testing::{OWNER, context, publish_app, publish_release};
    use tempfile::TempDir;
    use zapstore_core::{ErrorKind, MemoryEventSource, NullReporter};

    fn deadline() -> Instant {
        Instant::now() + INSTALL_DEADLINE
    }

    #[tokio::test]
    async fn test_fresh_install_is_recorded() {
        let tmp = TempDir::new().unwrap();
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/foo")
            .with_body("abc")
            .create_async()
            .await;

        let mut source = MemoryEventSource::new();
        publish_app(&mut source, "foo");
        publish_release(&mut source, "foo", "1.0.0", &server.url());
        publish_release(&mut source, "foo", "1.2.0", &server.url());
        let ctx = context(source, &tmp);

        let mut registry = Registry::default();
        let outcome = install_app(&ctx, &mut registry, "foo", deadline(), &NullReporter)
            .await
            .unwrap();

        let InstallOutcome::Installed {
            version, previous, binary, ..
        } = outcome
        else {
            panic!("expected an install");
        };
        assert_eq!(version, "1.2.0");
        assert!(previous.is_none());
        assert!(binary.verified);
        assert_eq!(binary.binary_name, "foo");

        let rec = registry.get("foo").unwrap();
        assert_eq!(rec.version, "1.2.0");
        assert_eq!(rec.pubkey, OWNER);
        assert_eq!(rec.executables, ["foo"]);
        assert_eq!(rec.asset_event_id, "asset-foo-1.2.0");
        assert!(!rec.installed_at.is_empty());
        assert!(ctx.layout().version_dir("foo", "1.2.0").join("foo").exists());
    }

    #[tokio::test]
    async fn test_same_version_is_up_to_date() {
        let tmp = TempDir::new().unwrap();
        let mut source = MemoryEventSource::new();
        publish_app(&mut source, "foo");
        publish_release(&mut source, "foo", "1.0.0", "http://127.0.0.1:1");
        let ctx = context(source, &tmp);

        let mut registry = Registry::default();
        registry.add(
            "foo",
            InstalledPackage {
                version: "v1.0.0".into(),
                ..Default::default()
            },
        );

        let outcome = install_app(&ctx, &mut registry, "foo", deadline(), &NullReporter)
            .await
            .unwrap();
        assert!(matches!(outcome, InstallOutcome::UpToDate { version } if version == "v1.0.0"));
        assert!(!ctx.layout().packages_dir().exists());
    }

    #[tokio::test]
    async fn test_unknown_app_leaves_registry_alone() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(MemoryEventSource::new(), &tmp);

        let mut registry = Registry::default();
        let err = install_app(&ctx, &mut registry, "ghost", deadline(), &NullReporter)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(registry.is_empty());
    }
}
