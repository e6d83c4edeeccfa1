//! Tracing subscriber setup.
//!
//! Logs go to stderr (pretty or JSON) so that `backoffice export` can write
//! documents to stdout. When a log directory is configured, a JSON copy is
//! written to a daily-rolling file through a non-blocking writer; keep the
//! returned guard alive for the life of the process.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_FILTER: &str = "backoffice=info,backoffice_kit=info,tower_http=info";
pub const VERBOSE_FILTER: &str = "backoffice=debug,backoffice_kit=debug,tower_http=debug";

const LOG_FILE_PREFIX: &str = "backoffice.log";

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub json: bool,
    pub dir: Option<PathBuf>,
    pub verbose: bool,
}

/// `RUST_LOG` when set, the built-in default otherwise.
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            VERBOSE_FILTER
        } else {
            DEFAULT_FILTER
        })
    })
}

pub fn init(options: &LogOptions) -> Result<Option<WorkerGuard>> {
    let stderr_layer = if options.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let (file_layer, guard) = match &options.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(options.verbose))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_parse() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        assert!(EnvFilter::try_new(VERBOSE_FILTER).is_ok());
    }

    #[test]
    fn test_log_options_default_is_plain_stderr() {
        let options = LogOptions::default();
        assert!(!options.json);
        assert!(options.dir.is_none());
        assert!(!options.verbose);
    }
}
