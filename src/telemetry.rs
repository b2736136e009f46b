use std::path::Path;

use anyhow::{Context, Result};
use tracing::metadata::LevelFilter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::{LogFormat, LoggingSettings};

/// Keeps the non-blocking file writer flushing. Hold it until exit.
pub struct TelemetryGuard {
    _guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
}

/// Install the global subscriber: an `EnvFilter` (from `RUST_LOG`, else the
/// configured level, else `debug` under `-v`), a stderr layer in the
/// configured format, and an optional daily-rolling file layer.
pub fn init(settings: &LoggingSettings, verbose: bool) -> Result<TelemetryGuard> {
    let filter = build_filter(settings, verbose)?;

    let mut guards = Vec::new();
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    layers.push(build_stderr_layer(settings.format));

    if let Some(path) = settings.file() {
        let (layer, guard) = build_file_layer(path, settings.format)?;
        layers.push(layer);
        guards.push(guard);
    }

    layers.push(Box::new(filter));

    Registry::default()
        .with(layers)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(TelemetryGuard { _guards: guards })
}

fn build_filter(settings: &LoggingSettings, verbose: bool) -> Result<EnvFilter> {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return Ok(EnvFilter::from_default_env());
    }
    let directive = if verbose {
        LevelFilter::DEBUG.to_string()
    } else {
        settings.level.clone()
    };
    EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log level '{}'", directive))
}

fn build_stderr_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    match format {
        LogFormat::Pretty => Box::new(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_target(true),
        ),
        LogFormat::Json => Box::new(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(true),
        ),
    }
}

fn build_file_layer(
    path: &Path,
    format: LogFormat,
) -> Result<(
    Box<dyn Layer<Registry> + Send + Sync>,
    tracing_appender::non_blocking::WorkerGuard,
)> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(dir, prefix);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match format {
        LogFormat::Pretty => Box::new(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_target(true),
        ),
        LogFormat::Json => Box::new(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(true),
        ),
    };
    Ok((layer, guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_verbose_overrides_configured_level() {
        // Only meaningful when RUST_LOG is not set by the harness
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            return;
        }
        let settings = LoggingSettings::default();
        let filter = build_filter(&settings, true).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

        let filter = build_filter(&settings, false).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            return;
        }
        let settings = LoggingSettings {
            level: "taskboard=loud".to_string(),
            ..LoggingSettings::default()
        };
        assert!(build_filter(&settings, false).is_err());
    }

    #[test]
    fn test_file_layer_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("taskboard.log");
        let (_layer, _guard) = build_file_layer(&path, LogFormat::Json).unwrap();
        assert!(dir.path().join("logs").is_dir());
    }
}
