use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `skiff` binary.
#[derive(Debug, Parser)]
#[command(name = "skiff", version, about = "skiff - platform command line")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: text, json
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Quiet mode (errors only in logs)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands, OutputFormat};
    use crate::cli::subcommands::AuthCommands;

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn auth_subcommands_parse() {
        for (word, expected) in [
            ("login", AuthCommands::Login),
            ("logout", AuthCommands::Logout),
            ("token", AuthCommands::Token),
        ] {
            let cli = Cli::try_parse_from(["skiff", "auth", word]).expect("cli should parse");
            let Commands::Auth { action } = cli.command;
            assert_eq!(action, expected);
        }
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["skiff", "--format", "json", "--verbose", "auth", "token"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["skiff", "auth", "logout", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.global_flags().quiet);
    }

    #[test]
    fn auth_commands_take_no_arguments() {
        assert!(Cli::try_parse_from(["skiff", "auth", "login", "extra"]).is_err());
        assert!(Cli::try_parse_from(["skiff", "auth", "token", "abc"]).is_err());
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["skiff", "--format", "xml", "auth", "token"]);
        assert!(parsed.is_err());
    }
}
