//! Configuration commands.

use std::path::Path;

use crate::config::EngineConfig;
use crate::error::{CliError, CliResult};

/// Dump the effective configuration to stdout.
pub fn dump(config: &EngineConfig, path: &Path) -> CliResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| CliError::config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration and list what a sync would do.
pub fn validate(config: &EngineConfig) -> CliResult<()> {
    let settings = config.validate()?;

    println!("timezone: {}", settings.timezone);
    if let Some(contacts) = &settings.contacts {
        println!("contacts: {} (token {})", contacts.output_path.display(), presence(&contacts.token_file));
    }
    if let Some(tasks) = &settings.tasks {
        println!("tasks: {} (token {})", tasks.output_path.display(), presence(&tasks.token_file));
    }
    if let Some(holidays) = &settings.holidays {
        println!(
            "holidays: {} + {} from {}",
            holidays.holidays.path.display(),
            holidays.festivals.path.display(),
            holidays.url
        );
    }

    println!("Configuration is valid.");
    Ok(())
}

fn presence(path: &Path) -> String {
    if path.exists() {
        format!("{}", path.display())
    } else {
        format!("{} missing", path.display())
    }
}

/// Show the configuration file path.
pub fn path(path: &Path) -> CliResult<()> {
    println!("config: {}", path.display());
    Ok(())
}
