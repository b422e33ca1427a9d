//! Configuration presets for common scenarios

use super::{Config, DisplayConfig, Format};
use crate::{LOG_ENV, LOG_FORMAT_ENV};

impl Config {
    /// Create configuration from environment variables
    ///
    /// Reads `TESTBED_LOG` (falling back to `RUST_LOG`), `TESTBED_LOG_FORMAT`
    /// and the `TESTBED_LOG_{TIME,SOURCE,COLORS}` toggles. An unknown format
    /// falls back to compact.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = std::env::var(LOG_ENV) {
            config.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            config.level = level;
        }

        if let Ok(format) = std::env::var(LOG_FORMAT_ENV) {
            config.format = format.parse().unwrap_or(Format::Compact);
        }

        config.display.parse_env();
        config
    }

    /// Development configuration (pretty, debug level)
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: Format::Pretty,
            display: DisplayConfig {
                colors: true,
                source: true,
                ..DisplayConfig::default()
            },
        }
    }

    /// Production configuration (JSON, info level)
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Json,
            display: DisplayConfig {
                colors: false,
                source: false,
                flatten: true,
                ..DisplayConfig::default()
            },
        }
    }
}
