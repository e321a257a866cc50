//! List command

use anyhow::Result;

use super::load_registry;
use crate::ui::Output;
use crate::ui::list::write_list;

/// List installed packages
pub fn list() -> Result<()> {
    let layout = crate::layout()?;
    let registry = load_registry(&layout)?;

    if registry.is_empty() {
        Output::new().info("No packages installed.");
        return Ok(());
    }

    write_list(&mut std::io::stdout().lock(), &registry.packages)?;
    Ok(())
}
