//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use calengine_sync::StreamKind;

/// calengine - contacts, tasks and holidays as calendar subscriptions
#[derive(Debug, Parser)]
#[command(name = "calengine")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALENGINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only synchronize one stream
    #[arg(long, value_enum)]
    pub only: Option<StreamArg>,

    /// Log level (overrides `logging.level`)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Stream selector for `--only`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StreamArg {
    Contacts,
    Tasks,
    Holidays,
}

impl From<StreamArg> for StreamKind {
    fn from(arg: StreamArg) -> Self {
        match arg {
            StreamArg::Contacts => StreamKind::Contacts,
            StreamArg::Tasks => StreamKind::Tasks,
            StreamArg::Holidays => StreamKind::Holidays,
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one synchronization (the default)
    Sync,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
