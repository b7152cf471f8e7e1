//! Log output for the engine and the `calengine` binary.
//!
//! One console layer in the configured format, plus an optional plain-text
//! file that is appended to across runs. `RUST_LOG` replaces the default
//! `calengine=<level>` directive when set.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

#[derive(Debug, Error)]
pub enum TracingError {
    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("cannot open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Console output format, `logging.format` in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    Pretty,
    #[default]
    Compact,
    /// One JSON object per line, for log collectors.
    Json,
}

impl FromStr for TracingOutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}' (expected compact, pretty or json)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for the `calengine` crates when `RUST_LOG` is unset.
    pub level: Level,
    pub format: TracingOutputFormat,
    /// Show source file and line on console events.
    pub show_location: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingOutputFormat::Compact,
            show_location: false,
            log_file: None,
        }
    }
}

impl TracingConfig {
    /// `-v`: debug level with source locations.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: Level::DEBUG,
            show_location: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_level(self, level: Level) -> Self {
        Self { level, ..self }
    }

    #[must_use]
    pub fn with_format(self, format: TracingOutputFormat) -> Self {
        Self { format, ..self }
    }

    #[must_use]
    pub fn with_log_file(self, path: impl Into<PathBuf>) -> Self {
        Self {
            log_file: Some(path.into()),
            ..self
        }
    }

    pub fn default_directive(&self) -> String {
        format!("calengine={}", self.level.as_str().to_ascii_lowercase())
    }

    fn filter(&self) -> Result<EnvFilter, TracingError> {
        match std::env::var(EnvFilter::DEFAULT_ENV) {
            Ok(directives) if !directives.trim().is_empty() => Ok(EnvFilter::try_new(directives)?),
            _ => Ok(EnvFilter::try_new(self.default_directive())?),
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn console_layer(config: &TracingConfig) -> BoxedLayer {
    let layer = fmt::layer()
        .with_file(config.show_location)
        .with_line_number(config.show_location);
    match config.format {
        TracingOutputFormat::Pretty => layer.pretty().boxed(),
        TracingOutputFormat::Compact => layer.compact().boxed(),
        TracingOutputFormat::Json => layer.json().boxed(),
    }
}

fn open_append(path: &Path) -> Result<File, TracingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| TracingError::LogFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Installs the global subscriber. Call once, before the first sync.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.filter()?;

    let mut layers = vec![console_layer(&config)];
    if let Some(path) = &config.log_file {
        let file = open_append(path)?;
        layers.push(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .boxed(),
        );
    }

    tracing::subscriber::set_global_default(tracing_subscriber::registry().with(layers).with(filter))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_log_engine_crates_at_info() {
        let config = TracingConfig::default();
        assert_eq!(config.format, TracingOutputFormat::Compact);
        assert!(!config.show_location);
        assert_eq!(config.default_directive(), "calengine=info");
    }

    #[test]
    fn verbose_flag_config() {
        let config = TracingConfig::debug().with_format(TracingOutputFormat::Json);
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.show_location);
        assert_eq!(config.format, TracingOutputFormat::Json);
        assert_eq!(config.default_directive(), "calengine=debug");
    }

    #[test]
    fn log_format_names() {
        assert_eq!("JSON".parse::<TracingOutputFormat>(), Ok(TracingOutputFormat::Json));
        assert_eq!(" pretty ".parse::<TracingOutputFormat>(), Ok(TracingOutputFormat::Pretty));
        assert!("syslog".parse::<TracingOutputFormat>().is_err());
    }

    #[test]
    fn unwritable_log_file_is_reported() {
        let dir = std::env::temp_dir().join("calengine-no-such-dir").join("nested");
        let err = open_append(&dir.join("app.log")).unwrap_err();
        assert!(matches!(err, TracingError::LogFile { .. }));
    }
}
