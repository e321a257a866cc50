//! Per-command flows on top of `zapstore-core`.
//!
//! Each flow mutates a loaded [`Registry`](zapstore_core::Registry) in memory;
//! callers save it once when the flow returns.

pub mod context;
pub mod install;
pub mod remove;
pub mod update;

pub use context::Context;

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, timeout_at};
use zapstore_core::{Error, Result};

/// Resolution deadline for `install`.
pub const INSTALL_DEADLINE: Duration = Duration::from_secs(60);
/// Deadline for `search`.
pub const SEARCH_DEADLINE: Duration = Duration::from_secs(30);
/// Deadline for every resolution in one `update` sweep, combined.
pub const UPDATE_DEADLINE: Duration = Duration::from_secs(120);

/// Run `fut` until `deadline`; running out is a transport failure naming
/// `what`.
pub async fn within<T>(
    deadline: Instant,
    what: impl FnOnce() -> String,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match timeout_at(deadline, fut).await {
        Ok(res) => res,
        Err(elapsed) => Err(Error::transport(format!("{} timed out", what()), elapsed)),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use zapstore_core::io::download::http_client;
    use zapstore_core::{Installer, Layout, MemoryEventSource, Resolver};
    use zapstore_schema::event::{KIND_APP, KIND_ASSET, KIND_RELEASE};
    use zapstore_schema::{Event, Platform};

    use super::Context;

    pub(crate) const OWNER: &str = "owner";
    pub(crate) const LINUX: &str = "linux-x86_64";
    /// SHA-256 of `abc`.
    pub(crate) const ABC_SHA256: &str =
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    fn event(id: String, kind: u32, tags: Vec<Vec<String>>) -> Event {
        Event {
            id,
            pubkey: OWNER.into(),
            kind,
            tags,
            ..Event::default()
        }
    }

    fn tag(name: &str, value: &str) -> Vec<String> {
        vec![name.to_string(), value.to_string()]
    }

    /// App event for `app_id`, available on linux-x86_64.
    pub(crate) fn publish_app(source: &mut MemoryEventSource, app_id: &str) {
        source.push(event(
            format!("app-{app_id}"),
            KIND_APP,
            vec![tag("d", app_id), tag("f", LINUX)],
        ));
    }

    /// Release and asset events for `app_id` at `version`, served from
    /// `{base_url}/{app_id}`.
    pub(crate) fn publish_release(
        source: &mut MemoryEventSource,
        app_id: &str,
        version: &str,
        base_url: &str,
    ) {
        let asset_id = format!("asset-{app_id}-{version}");
        source.push(event(
            format!("rel-{app_id}-{version}"),
            KIND_RELEASE,
            vec![
                tag("d", &format!("@{version}")),
                tag("i", app_id),
                tag("e", &asset_id),
            ],
        ));
        source.push(event(
            asset_id,
            KIND_ASSET,
            vec![
                tag("url", &format!("{base_url}/{app_id}")),
                tag("x", ABC_SHA256),
                tag("f", LINUX),
            ],
        ));
    }

    pub(crate) fn context(
        source: MemoryEventSource,
        tmp: &tempfile::TempDir,
    ) -> Context<MemoryEventSource> {
        let layout = Layout::new(tmp.path().join("data"), tmp.path().join("state"));
        Context::new(
            Resolver::new(source),
            Installer::new(layout, http_client().unwrap()),
            Platform::detect("linux", "x86_64"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zapstore_core::ErrorKind;

    #[tokio::test]
    async fn test_within_passes_through() {
        let deadline = Instant::now() + SEARCH_DEADLINE;
        let got = within(deadline, || "noop".into(), async { Ok(7) }).await;
        assert_eq!(got.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_within_reports_timeout() {
        let deadline = Instant::now() + Duration::from_millis(10);
        let err = within(deadline, || "resolving foo".into(), async {
            std::future::pending::<Result<()>>().await
        })
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().starts_with("resolving foo timed out"));
    }
}
