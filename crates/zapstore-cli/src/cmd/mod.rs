//! Command implementations.
//!
//! Each command loads the registry, runs one flow from [`crate::ops`] and
//! saves the registry if the flow changed it.

pub mod cleanup;
pub mod install;
pub mod list;
pub mod remove;
pub mod search;
pub mod update;

use anyhow::{Context as _, Result};
use zapstore_core::{Layout, Registry};

pub(crate) fn load_registry(layout: &Layout) -> Result<Registry> {
    let path = layout.registry_path();
    Registry::load(&path).with_context(|| format!("Failed to load {}", path.display()))
}

pub(crate) fn save_registry(layout: &Layout, registry: &Registry) -> Result<()> {
    registry
        .save(&layout.registry_path())
        .context("Failed to save package registry")
}
