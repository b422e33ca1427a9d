//! Error types for the resource cache
use thiserror::Error;

/// Boxed error returned by resource factories and shutdown hooks
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for resource operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for resource cache operations
#[derive(Error, Debug)]
pub enum Error {
    /// The factory for a key failed; the key is left unpopulated
    #[error("Creation failed for resource '{key}': {source}")]
    Creation {
        /// The resource key
        key: String,
        /// The factory error
        #[source]
        source: BoxError,
    },

    /// A shutdown hook failed
    #[error("Shutdown failed for resource '{resource}': {reason}")]
    Shutdown {
        /// Description of the resource
        resource: String,
        /// The failure reason
        reason: String,
    },

    /// The cached instance is not of the requested type
    #[error("Resource '{key}' is not a {expected}")]
    TypeMismatch {
        /// The resource key
        key: String,
        /// The requested type name
        expected: &'static str,
    },

    /// A scope id was blank
    #[error("Invalid scope id '{id}': must not be blank")]
    InvalidScope {
        /// The rejected id
        id: String,
    },
}

impl Error {
    /// Create a shutdown error
    pub fn shutdown(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Shutdown {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// The key this error concerns, when it has one
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Creation { key, .. } | Self::TypeMismatch { key, .. } => Some(key),
            Self::Shutdown { .. } | Self::InvalidScope { .. } => None,
        }
    }
}
