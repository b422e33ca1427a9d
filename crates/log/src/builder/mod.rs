//! Logger builder implementation

#[macro_use]
mod format;

use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Format};
use crate::{Error, Result};

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

/// Guard returned by initialization
///
/// Hold it for the lifetime of the program. An inactive guard means another
/// subscriber was already installed and this configuration was not applied.
#[derive(Debug)]
#[must_use = "dropping the guard immediately is almost certainly a mistake"]
pub struct LoggerGuard {
    active: bool,
}

impl LoggerGuard {
    pub(crate) const fn noop() -> Self {
        Self { active: false }
    }

    /// Whether this guard installed the global subscriber.
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Build and install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Filter string cannot be parsed
    /// - Another subscriber wins a race to be installed
    pub fn build(self) -> Result<LoggerGuard> {
        // Validate the filter before deciding anything else.
        let filter = EnvFilter::try_new(&self.config.level)
            .map_err(|e| Error::Filter(format!("{}: {e}", self.config.level)))?;

        if tracing::dispatcher::has_been_set() {
            return Ok(LoggerGuard::noop());
        }

        let display = &self.config.display;
        let registry = Registry::default().with(filter);
        let installed = match self.config.format {
            Format::Pretty => registry.with(create_fmt_layer!(pretty, display)).try_init(),
            Format::Compact => registry.with(create_fmt_layer!(compact, display)).try_init(),
            Format::Json => registry.with(create_json_layer!(display)).try_init(),
        };
        installed.map_err(|e| Error::Init(e.to_string()))?;

        tracing::debug!(
            level = %self.config.level,
            format = ?self.config.format,
            "Logger initialized"
        );
        Ok(LoggerGuard { active: true })
    }
}
