//! Cleanup command (garbage collection)

use anyhow::Result;
use zapstore_core::cleanup as collect;

use super::load_registry;
use crate::ui::Output;
use crate::ui::theme::format_size;

/// Remove package versions and links the registry no longer references.
pub fn cleanup() -> Result<()> {
    let layout = crate::layout()?;
    let registry = load_registry(&layout)?;
    let output = Output::new();

    let report = collect(&layout, &registry)?;
    if report.is_empty() {
        output.success("System is clean.");
        return Ok(());
    }

    output.success(&format!(
        "Removed {} director{}, freed {}",
        report.removed_dirs,
        if report.removed_dirs == 1 { "y" } else { "ies" },
        format_size(report.bytes_freed)
    ));
    if report.dangling_links > 0 {
        output.info(&format!("Removed {} dangling link(s)", report.dangling_links));
    }
    Ok(())
}
