//! One-time move from `~/.zapstore` to the XDG layout.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::paths::Layout;

const LEGACY_STATE_FILE: &str = "state.json";

/// Move `legacy` into `layout` if it exists and the data root does not.
///
/// `state.json` goes to the state root and everything else (`packages/`,
/// `bin/`) becomes the data root. Returns whether anything was moved.
///
/// # Errors
///
/// Returns a filesystem error if a directory cannot be created or a rename
/// fails.
pub fn migrate_legacy(legacy: &Path, layout: &Layout) -> Result<bool> {
    if !legacy.exists() {
        return Ok(false);
    }
    let data_dir = layout.data_dir();
    if data_dir.exists() {
        debug!(legacy = %legacy.display(), "data directory already present, skipping migration");
        return Ok(false);
    }

    if let Some(parent) = data_dir.parent() {
        std::fs::create_dir_all(parent).map_err(Error::fs("creating data parent directory", parent))?;
    }
    let state_dir = layout.state_dir();
    std::fs::create_dir_all(state_dir).map_err(Error::fs("creating state directory", state_dir))?;

    let old_state = legacy.join(LEGACY_STATE_FILE);
    if old_state.exists() {
        let new_state = layout.registry_path();
        std::fs::rename(&old_state, &new_state).map_err(Error::fs("migrating", &old_state))?;
    }

    std::fs::rename(legacy, data_dir).map_err(Error::fs("migrating", legacy))?;
    info!(from = %legacy.display(), to = %data_dir.display(), "migrated legacy layout");
    Ok(true)
}
