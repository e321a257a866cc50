//! zapstore - install CLI tools published on Nostr
//!
//! Resolves an app id to its newest release for the running platform,
//! downloads the binary, verifies it against the published SHA-256 and links
//! it into a single bin directory.
//!
//! # Directory Layout
//!
//! ```text
//! $XDG_DATA_HOME/zapstore/
//! ├── bin/        # Symlinks to active binaries
//! └── packages/   # Binaries by app id and version
//! $XDG_STATE_HOME/zapstore/
//! └── state.json  # Installed package registry
//! ```

#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

pub mod cmd;
pub mod ops;
pub mod ui;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use zapstore_core::{DEFAULT_BLOB_SERVER, DEFAULT_RELAY, Layout};

#[derive(Debug, Parser)]
#[command(name = "zapstore")]
#[command(version = env!("ZAPSTORE_VERSION"))]
#[command(about = "zapstore - install CLI tools published on Nostr")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Relay to query for app, release and asset events
    #[arg(long, global = true, env = "RELAY_URL", default_value = DEFAULT_RELAY)]
    pub relay: String,

    /// Blob server used when an asset has no URL
    #[arg(
        long,
        global = true,
        env = "ZAPSTORE_BLOB_SERVER",
        default_value = DEFAULT_BLOB_SERVER
    )]
    pub blob_server: String,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install an app
    Install {
        /// App identifier
        app_id: String,
    },
    /// Update installed apps to their newest release
    Update {
        /// Only update this app
        app_id: Option<String>,
    },
    /// Remove an installed app
    Remove {
        /// App identifier
        app_id: String,
    },
    /// List installed apps
    List,
    /// Search published apps for this platform
    Search {
        /// Search query
        query: String,
    },
    /// Delete orphaned versions and dangling links
    Cleanup,
}

/// Directory layout for this user.
pub fn layout() -> anyhow::Result<Layout> {
    Layout::from_env().context("could not determine home directory")
}
