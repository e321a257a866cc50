//! Update sweep over installed apps.
//!
//! Targets are processed in sorted order under one shared deadline. A
//! failure for one app is recorded and the sweep moves on.

use tokio::time::Instant;
use zapstore_core::{Error, EventSource, Registry, Reporter, Result};
use zapstore_schema::version::can_upgrade;

use super::install::apply;
use super::{Context, within};

/// Result for one app in a sweep.
#[derive(Debug)]
pub enum UpdateStatus {
    /// Already on the newest release.
    Current {
        /// Installed version.
        version: String,
    },
    /// Moved to a newer release.
    Updated {
        /// Version before the update.
        from: String,
        /// Version after the update.
        to: String,
    },
    /// Resolution or install failed.
    Failed(Error),
}

/// Per-app results, in the order processed.
#[derive(Debug, Default)]
pub struct UpdateReport {
    pub results: Vec<(String, UpdateStatus)>,
}

impl UpdateReport {
    /// Number of apps moved to a newer release.
    pub fn updated(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, s)| matches!(s, UpdateStatus::Updated { .. }))
            .count()
    }

    /// Ids of apps that failed.
    pub fn failed(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|(_, s)| matches!(s, UpdateStatus::Failed(_)))
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// Which apps to sweep: `only` if given (it must be installed), else every
/// installed app, sorted.
pub fn targets(registry: &Registry, only: Option<&str>) -> Result<Vec<String>> {
    match only {
        Some(id) if registry.get(id).is_none() => {
            Err(Error::NotFound(format!("package '{id}' is not installed")))
        }
        Some(id) => Ok(vec![id.to_string()]),
        // BTreeMap keys are already sorted.
        None => Ok(registry.packages.keys().cloned().collect()),
    }
}

/// Check each target for a newer release and install it. `on_result` is
/// called as each app finishes.
pub async fn update_apps<S, R>(
    ctx: &Context<S>,
    registry: &mut Registry,
    targets: &[String],
    deadline: Instant,
    reporter: &R,
    mut on_result: impl FnMut(&str, &UpdateStatus),
) -> UpdateReport
where
    S: EventSource,
    R: Reporter + ?Sized,
{
    let mut report = UpdateReport::default();

    for app_id in targets {
        let Some(installed) = registry.get(app_id).map(|p| p.version.clone()) else {
            continue;
        };

        reporter.resolving(app_id);
        let status = match within(
            deadline,
            || format!("resolving {app_id}"),
            ctx.resolver.resolve(app_id, &ctx.platform),
        )
        .await
        {
            Err(e) => UpdateStatus::Failed(e),
            Ok(res) if !can_upgrade(&installed, res.release.version.as_str()) => {
                UpdateStatus::Current { version: installed }
            }
            Ok(res) => match apply(ctx, registry, &res, reporter).await {
                Ok(_) => UpdateStatus::Updated {
                    from: installed,
                    to: res.release.version.as_str().to_string(),
                },
                Err(e) => UpdateStatus::Failed(e),
            },
        };

        if let UpdateStatus::Failed(e) = &status {
            tracing::warn!(app_id, error = %e, "update failed");
        }
        on_result(app_id, &status);
        report.results.push((app_id.clone(), status));
    }

    report
}
