//! Install command

use anyhow::Result;
use tokio::time::Instant;

use super::{load_registry, save_registry};
use crate::GlobalArgs;
use crate::ops::install::{InstallOutcome, install_app};
use crate::ops::{Context, INSTALL_DEADLINE};
use crate::ui::{Output, Spinner};

/// Install the newest release of `app_id`.
pub async fn install(global: &GlobalArgs, app_id: &str) -> Result<()> {
    let layout = crate::layout()?;
    let mut registry = load_registry(&layout)?;
    let ctx = Context::connect(layout, &global.relay, &global.blob_server)?;

    let spinner = Spinner::start(format!("Resolving {app_id}..."));
    let deadline = Instant::now() + INSTALL_DEADLINE;
    let outcome = match install_app(&ctx, &mut registry, app_id, deadline, &spinner).await {
        Ok(outcome) => outcome,
        Err(e) => {
            spinner.fail(&format!("{app_id} failed"));
            return Err(e.into());
        }
    };

    match outcome {
        InstallOutcome::UpToDate { version } => {
            spinner.finish();
            Output::new().info(&format!("{app_id} {version} is already up to date"));
        }
        InstallOutcome::Installed {
            name,
            version,
            previous,
            binary,
        } => {
            save_registry(ctx.layout(), &registry)?;
            let from = previous.map(|p| format!(" (was {p})")).unwrap_or_default();
            spinner.success(&format!("{name} {version} installed{from}"));

            let output = Output::new();
            output.info(&format!("Binary: {}", binary.binary_path.display()));
            output.info(&format!("Linked: {}", binary.symlink_path.display()));
            for old in &binary.pruned {
                output.info(&format!("Removed old version {old}"));
            }
        }
    }
    Ok(())
}
