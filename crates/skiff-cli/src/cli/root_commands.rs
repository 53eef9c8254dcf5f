use clap::Subcommand;

use crate::cli::subcommands::AuthCommands;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Authenticate with the skiff platform.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
}
