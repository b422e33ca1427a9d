//! Server error types
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Failures starting, running or advertising the server.
///
/// Per-request failures never surface here: they become HTTP status codes
/// or error envelopes.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The listen address could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Requested address
        addr: SocketAddr,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The accept loop stopped with an I/O error
    #[error("Server stopped unexpectedly: {0}")]
    Serve(#[source] std::io::Error),

    /// The discovery file could not be written
    #[error("Failed to write discovery file {}: {source}", path.display())]
    DiscoveryFile {
        /// Target path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The discovery document could not be rendered
    #[error("Failed to render discovery file {}: {source}", path.display())]
    DiscoveryFormat {
        /// Target path
        path: PathBuf,
        /// Serializer error
        #[source]
        source: toml::ser::Error,
    },
}
