//! Search command

use anyhow::Result;
use tokio::time::Instant;
use zapstore_core::{RelayClient, Resolver};
use zapstore_schema::Platform;

use crate::GlobalArgs;
use crate::ops::{SEARCH_DEADLINE, within};
use crate::ui::list::write_search;
use crate::ui::{Output, Spinner};

/// Search published apps for the running platform.
pub async fn search(global: &GlobalArgs, query: &str) -> Result<()> {
    let resolver = Resolver::new(RelayClient::new(&global.relay));
    let platform = Platform::current();

    let spinner = Spinner::start(format!("Searching for '{query}'..."));
    let deadline = Instant::now() + SEARCH_DEADLINE;
    let result = within(
        deadline,
        || format!("searching for '{query}'"),
        resolver.search(query, &platform),
    )
    .await;
    spinner.finish();

    let apps = result?;
    if apps.is_empty() {
        Output::new().info(&format!("No apps found for '{query}' on {platform}"));
        return Ok(());
    }

    write_search(&mut std::io::stdout().lock(), &apps)?;
    Ok(())
}
