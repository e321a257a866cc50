//! Update command

use anyhow::{Result, bail};
use tokio::time::Instant;

use super::{load_registry, save_registry};
use crate::GlobalArgs;
use crate::ops::update::{UpdateStatus, targets, update_apps};
use crate::ops::{Context, UPDATE_DEADLINE};
use crate::ui::{Output, Spinner};

/// Update one app, or every installed app when `app_id` is `None`.
pub async fn update(global: &GlobalArgs, app_id: Option<&str>) -> Result<()> {
    let layout = crate::layout()?;
    let mut registry = load_registry(&layout)?;
    let output = Output::new();

    if app_id.is_none() && registry.is_empty() {
        output.info("No packages installed.");
        return Ok(());
    }
    let apps = targets(&registry, app_id)?;

    let ctx = Context::connect(layout, &global.relay, &global.blob_server)?;
    let spinner = Spinner::start("Checking for updates...");
    let deadline = Instant::now() + UPDATE_DEADLINE;

    let report = update_apps(&ctx, &mut registry, &apps, deadline, &spinner, |id, status| {
        spinner.println(match status {
            UpdateStatus::Current { version } => format!("  {id} {version} is up to date"),
            UpdateStatus::Updated { from, to } => format!("  {id} {from} -> {to}"),
            UpdateStatus::Failed(e) => format!("  {id} failed: {e}"),
        });
    })
    .await;

    if report.updated() > 0 {
        save_registry(ctx.layout(), &registry)?;
    }

    let failed = report.failed();
    if !failed.is_empty() {
        spinner.fail(&format!("{} of {} updates failed", failed.len(), apps.len()));
        bail!("update failed for: {}", failed.join(", "));
    }

    match report.updated() {
        0 => spinner.success("Everything is up to date"),
        n => spinner.success(&format!(
            "Updated {n} package{}",
            if n == 1 { "" } else { "s" }
        )),
    }
    Ok(())
}
