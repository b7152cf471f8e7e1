//! calengine CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use calengine_cli::cli::{Cli, Command, ConfigAction};
use calengine_cli::commands;
use calengine_cli::config::{EngineConfig, LoggingSettings};
use calengine_cli::error::{CliError, CliResult};
use calengine_core::{TracingConfig, TracingOutputFormat, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every stream succeeded.
async fn run(cli: Cli) -> CliResult<bool> {
    let path = cli.config.clone().unwrap_or_else(EngineConfig::default_path);
    let config = if cli.config.is_some() {
        EngineConfig::load_from(&path)?
    } else {
        EngineConfig::load()?
    };

    match cli.command {
        Some(Command::Config { action }) => {
            match action {
                ConfigAction::Dump => commands::config::dump(&config, &path)?,
                ConfigAction::Validate => commands::config::validate(&config)?,
                ConfigAction::Path => commands::config::path(&path)?,
            }
            Ok(true)
        }
        Some(Command::Sync) | None => {
            init_tracing(tracing_config(&config.logging, cli.log_level.as_deref(), cli.verbose)?)?;

            let settings = config.validate()?;
            let report = commands::sync::run(&settings, cli.only.map(Into::into)).await?;
            Ok(report.is_success())
        }
    }
}

fn tracing_config(logging: &LoggingSettings, level: Option<&str>, verbose: bool) -> CliResult<TracingConfig> {
    let mut config = if verbose {
        TracingConfig::debug()
    } else {
        let level = level.unwrap_or(&logging.level);
        let level: Level = level
            .parse()
            .map_err(|_| CliError::config(format!("invalid log level '{}'", level)))?;
        TracingConfig::default().with_level(level)
    };

    let format: TracingOutputFormat = logging
        .format
        .parse()
        .map_err(|e| CliError::config(format!("logging.format: {}", e)))?;
    config = config.with_format(format);

    if let Some(file) = &logging.file {
        config = config.with_log_file(file);
    }
    Ok(config)
}
