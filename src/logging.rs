//! Structured logging via `tracing`. Everything goes to stderr so rendered
//! markup on stdout stays clean.
//!
//! # Log Levels
//!
//! - `error`: the post document failed to load
//! - `warn`: rejected events, unreadable stored preferences
//! - `info`: document loaded, theme toggled
//! - `debug`: one line per render with visible counts and the filter

use std::io;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level used when `RUST_LOG` is unset.
    pub level: Level,
    /// Whether to use ANSI colors in output.
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            with_ansi: true,
        }
    }
}

impl LogConfig {
    /// Create a `LogConfig` from CLI verbosity count.
    ///
    /// - 0 (no `-v`): warn level
    /// - 1 (`-v`): info level
    /// - 2 (`-vv`): debug level
    /// - 3+ (`-vvv`): trace level
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }
}

/// Installs the global subscriber. Call once, at startup.
pub fn init_logging(config: &LogConfig) {
    let layer = fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(false);
    tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(layer.without_time())
        .init();
}

/// Build an `EnvFilter` from the given level, respecting `RUST_LOG`.
fn build_env_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,tagsieve={}", level)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_verbosity() {
        assert_eq!(LogConfig::from_verbosity(0).level, Level::WARN);
        assert_eq!(LogConfig::from_verbosity(2).level, Level::DEBUG);
        assert_eq!(LogConfig::from_verbosity(9).level, Level::TRACE);
        assert!(LogConfig::from_verbosity(0).with_ansi);
        assert!(!LogConfig::from_verbosity(0).with_ansi(false).with_ansi);
    }
}
