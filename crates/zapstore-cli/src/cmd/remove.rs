//! Remove command

use anyhow::Result;

use super::{load_registry, save_registry};
use crate::ops::remove::remove_app;
use crate::ui::Output;
use zapstore_core::Installer;
use zapstore_core::io::download::http_client;

/// Remove an installed app.
pub fn remove(app_id: &str) -> Result<()> {
    let layout = crate::layout()?;
    let mut registry = load_registry(&layout)?;
    let installer = Installer::new(layout, http_client()?);

    let removed = remove_app(&installer, &mut registry, app_id)?;
    save_registry(installer.layout(), &registry)?;

    Output::new().success(&format!("Removed {app_id} {}", removed.version));
    Ok(())
}
