//! zapstore CLI

use clap::Parser;
use tracing_subscriber::EnvFilter;

use zapstore_cli::ui::Output;
use zapstore_cli::{Cli, Commands, cmd};
use zapstore_core::Layout;
use zapstore_core::migrate::migrate_legacy;
use zapstore_core::paths::legacy_dir;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    migrate();

    let global = &cli.global;
    let result = match cli.command {
        Commands::Install { app_id } => cmd::install::install(global, &app_id).await,
        Commands::Update { app_id } => cmd::update::update(global, app_id.as_deref()).await,
        Commands::Remove { app_id } => cmd::remove::remove(&app_id),
        Commands::List => cmd::list::list(),
        Commands::Search { query } => cmd::search::search(global, &query).await,
        Commands::Cleanup => cmd::cleanup::cleanup(),
    };

    if let Err(e) = result {
        Output::new().error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

/// Move a `~/.zapstore` tree into the XDG layout. Failure only warns.
fn migrate() {
    let (Some(legacy), Some(layout)) = (legacy_dir(), Layout::from_env()) else {
        return;
    };
    match migrate_legacy(&legacy, &layout) {
        Ok(true) => Output::new().info(&format!(
            "Moved {} to {}",
            legacy.display(),
            layout.data_dir().display()
        )),
        Ok(false) => {}
        Err(e) => {
            tracing::warn!(error = %e, "legacy migration failed");
            Output::new().warning(&format!("Could not migrate {}: {e}", legacy.display()));
        }
    }
}
