//! # testbed-log
//!
//! Logging setup for the testbed binaries.
//!
//! ```no_run
//! let _guard = testbed_log::auto_init()?;
//! tracing::info!(port = 8080, "Server starting");
//! # Ok::<(), testbed_log::Error>(())
//! ```
//!
//! Library crates only emit `tracing` events; installing a subscriber is
//! left to whichever binary embeds them.

mod builder;
mod config;
mod format;

pub use builder::{LoggerBuilder, LoggerGuard};
pub use config::{Config, DisplayConfig, Format};

/// Result type for logger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for logger operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filter parsing error
    #[error("Invalid filter: {0}")]
    Filter(String),

    /// Unknown output format name
    #[error("Unknown log format: {0}")]
    Format(String),

    /// The global subscriber could not be installed
    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

/// Environment variable holding the filter directive.
pub const LOG_ENV: &str = "TESTBED_LOG";

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "TESTBED_LOG_FORMAT";

// ============================================================================
// Initialization Functions
// ============================================================================

/// Auto-detect and initialize the best logging configuration
///
/// Uses the environment when `TESTBED_LOG` or `RUST_LOG` is set, otherwise
/// the development preset in debug builds and the production preset in
/// release builds.
pub fn auto_init() -> Result<LoggerGuard> {
    if std::env::var(LOG_ENV).is_ok() || std::env::var("RUST_LOG").is_ok() {
        init_with(Config::from_env())
    } else if cfg!(debug_assertions) {
        init_with(Config::development())
    } else {
        init_with(Config::production())
    }
}

/// Initialize with default configuration
pub fn init() -> Result<LoggerGuard> {
    init_with(Config::default())
}

/// Initialize with custom configuration
///
/// Returns an inactive guard when a global subscriber is already installed.
pub fn init_with(config: Config) -> Result<LoggerGuard> {
    LoggerBuilder::from_config(config).build()
}
