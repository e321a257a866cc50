//! Resolution chain: app → latest release → platform asset.
//!
//! Each stage issues one query against an [`EventSource`] and fails with
//! [`Error::NotFound`] when nothing usable comes back. A failed stage is
//! never retried with a looser filter.

use tracing::{debug, info};
use zapstore_schema::event::{KIND_APP, KIND_ASSET, KIND_FILE_METADATA, KIND_RELEASE};
use zapstore_schema::{AppDescriptor, AssetDescriptor, Filter, Platform, ReleaseDescriptor};

use crate::error::{Error, Result};
use crate::source::EventSource;

/// Content-addressed store used when an asset has a hash but no URL.
pub const DEFAULT_BLOB_SERVER: &str = "https://cdn.zapstore.dev";

/// Maximum number of search hits requested from the source.
pub const SEARCH_LIMIT: usize = 20;

/// Fully resolved install candidate.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The app.
    pub app: AppDescriptor,
    /// Its newest release.
    pub release: ReleaseDescriptor,
    /// The asset chosen for the caller's platform.
    pub asset: AssetDescriptor,
}

/// Drives the three resolution queries against an event source.
#[derive(Debug)]
pub struct Resolver<S> {
    source: S,
    blob_server: String,
}

impl<S: EventSource> Resolver<S> {
    /// Resolver using the default blob server.
    pub fn new(source: S) -> Self {
        Self {
            source,
            blob_server: DEFAULT_BLOB_SERVER.to_string(),
        }
    }

    /// Override the blob server used for URL fallback.
    pub fn with_blob_server(mut self, blob_server: impl Into<String>) -> Self {
        self.blob_server = blob_server.into();
        self
    }

    /// Stage 1: the app event for `app_id` on `platform`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no app matches.
    pub async fn resolve_app(&self, app_id: &str, platform: &Platform) -> Result<AppDescriptor> {
        let filter = Filter::new()
            .kinds([KIND_APP])
            .tag("d", [app_id])
            .tag("f", [platform.tag()])
            .limit(1);

        debug!(app_id, platform = %platform, "querying app");
        let events = self.source.query(&filter).await?;
        let event = events.first().ok_or_else(|| {
            Error::NotFound(format!("app '{app_id}' not found for {platform}"))
        })?;

        Ok(AppDescriptor::from_event(event))
    }

    /// Stage 2: the highest-versioned release authored by the app's owner.
    ///
    /// Releases without an extractable version are skipped. Equal versions
    /// keep the first one returned by the source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the owner has no versioned release.
    pub async fn resolve_latest_release(&self, app: &AppDescriptor) -> Result<ReleaseDescriptor> {
        let filter = Filter::new()
            .kinds([KIND_RELEASE])
            .authors([app.pubkey.as_str()])
            .tag("i", [app.id.as_str()]);

        debug!(app_id = %app.id, "querying releases");
        let events = self.source.query(&filter).await?;
        if events.is_empty() {
            return Err(Error::NotFound(format!("no releases found for '{}'", app.id)));
        }

        let mut best: Option<ReleaseDescriptor> = None;
        for event in &events {
            let Some(candidate) = ReleaseDescriptor::from_event(event) else {
                debug!(event_id = %event.id, "skipping release without version");
                continue;
            };
            if best.as_ref().is_none_or(|b| candidate.version > b.version) {
                best = Some(candidate);
            }
        }

        let release = best.ok_or_else(|| {
            Error::NotFound(format!("no versioned releases found for '{}'", app.id))
        })?;
        info!(app_id = %app.id, version = %release.version, "selected release");
        Ok(release)
    }

    /// Stage 3: assets referenced by the release that run on `platform`.
    ///
    /// An asset is accepted when its `f` tag equals the platform tag, or
    /// failing that when its `m` tag is one of the platform's MIME types.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no referenced asset runs on `platform`.
    pub async fn resolve_assets(
        &self,
        release: &ReleaseDescriptor,
        platform: &Platform,
    ) -> Result<Vec<AssetDescriptor>> {
        if release.asset_refs.is_empty() {
            return Err(Error::NotFound(format!(
                "release {} references no assets",
                release.version
            )));
        }

        let filter = Filter::new()
            .kinds([KIND_ASSET, KIND_FILE_METADATA])
            .ids(release.asset_refs.iter().map(String::as_str))
            .tag("f", [platform.tag()]);

        debug!(refs = release.asset_refs.len(), platform = %platform, "querying assets");
        let events = self.source.query(&filter).await?;

        let matched: Vec<_> = events
            .iter()
            .map(|e| AssetDescriptor::from_event(e, &self.blob_server))
            .filter(|asset| {
                let ok = asset
                    .platform
                    .as_deref()
                    .is_some_and(|f| platform.matches_platform(f))
                    || asset.mime.as_deref().is_some_and(|m| platform.matches_mime(m));
                if !ok {
                    debug!(event_id = %asset.event_id, "rejecting asset for another platform");
                }
                ok
            })
            .collect();

        if matched.is_empty() {
            return Err(Error::NotFound(format!(
                "no assets found for platform {platform}"
            )));
        }
        Ok(matched)
    }

    /// Full chain. Returns the first accepted asset of the newest release.
    ///
    /// # Errors
    ///
    /// Propagates the first failing stage.
    pub async fn resolve(&self, app_id: &str, platform: &Platform) -> Result<Resolution> {
        let app = self.resolve_app(app_id, platform).await?;
        let release = self.resolve_latest_release(&app).await?;
        let mut assets = self.resolve_assets(&release, platform).await?;
        let asset = assets.swap_remove(0);

        Ok(Resolution {
            app,
            release,
            asset,
        })
    }

    /// Free-text search over apps available for `platform`.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the source cannot be queried.
    pub async fn search(&self, query: &str, platform: &Platform) -> Result<Vec<AppDescriptor>> {
        let filter = Filter::new()
            .kinds([KIND_APP])
            .tag("f", [platform.tag()])
            .search(query)
            .limit(SEARCH_LIMIT);

        let events = self.source.query(&filter).await?;
        Ok(events.iter().map(AppDescriptor::from_event).collect())
    }
}
