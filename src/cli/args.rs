//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Rebuild and restart your app on every change
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: freshet.toml)
    #[arg(short = 'C', long, global = true, default_value = crate::config::DEFAULT_CONFIG_NAME, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Watch, rebuild and restart (default)
    #[command(visible_alias = "r")]
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Write a default freshet.toml in the current directory
    #[command(visible_alias = "i")]
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

/// Overrides for the `run` command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Debounce delay in milliseconds
    #[arg(short, long)]
    pub delay: Option<u64>,

    /// Disable the LiveReload server
    #[arg(long)]
    pub no_reload: bool,

    /// LiveReload port
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Commands::Init { .. }))
    }

    /// Arguments of the `run` command, defaults when no subcommand was given.
    pub fn run_args(&self) -> RunArgs {
        match &self.command {
            Some(Commands::Run { args }) => args.clone(),
            _ => RunArgs::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_run() {
        let cli = Cli::parse_from(["freshet"]);
        assert!(cli.command.is_none());
        assert!(!cli.is_init());
        assert_eq!(cli.config, PathBuf::from("freshet.toml"));
        assert!(cli.run_args().delay.is_none());
    }

    #[test]
    fn test_run_overrides() {
        let cli = Cli::parse_from(["freshet", "run", "--delay", "100", "--no-reload", "-p", "4000"]);
        let args = cli.run_args();
        assert_eq!(args.delay, Some(100));
        assert!(args.no_reload);
        assert_eq!(args.port, Some(4000));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["freshet", "init", "--force", "-C", "dev.toml", "-v"]);
        assert!(cli.is_init());
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("dev.toml"));
    }
}
