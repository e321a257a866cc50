//! Shared installation context.
//!
//! Groups the resolver, installer and detected platform so the per-command
//! flows take one argument instead of three.

use zapstore_core::io::download::http_client;
use zapstore_core::{EventSource, Installer, Layout, RelayClient, Resolver, Result};
use zapstore_schema::Platform;

/// Groups common state used during install, update and remove.
#[derive(Debug)]
pub struct Context<S> {
    pub resolver: Resolver<S>,
    pub installer: Installer,
    pub platform: Platform,
}

impl<S: EventSource> Context<S> {
    pub fn new(resolver: Resolver<S>, installer: Installer, platform: Platform) -> Self {
        Self {
            resolver,
            installer,
            platform,
        }
    }

    pub fn layout(&self) -> &Layout {
        self.installer.layout()
    }
}

impl Context<RelayClient> {
    /// Context for the running machine, querying `relay`.
    pub fn connect(layout: Layout, relay: &str, blob_server: &str) -> Result<Self> {
        let resolver = Resolver::new(RelayClient::new(relay)).with_blob_server(blob_server);
        let installer = Installer::new(layout, http_client()?);
        Ok(Self::new(resolver, installer, Platform::current()))
    }
}
