//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `regmirror`.
#[derive(Debug, Parser)]
#[command(name = "regmirror", version, about = "Mirror company registry records locally")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the store schema. Run once before the first fetch.
    Init,
    /// Fetch a company record, refreshing the mirror when stale.
    Fetch {
        /// Company name to look up.
        name: String,
        /// Print the record as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// Show the cached record for a name without contacting the registry.
    Show {
        /// Company name to look up in the local mirror.
        name: String,
    },
    /// List archived snapshots for a name, newest first.
    History {
        /// Company name to look up in the local mirror.
        name: String,
    },
}
