//! Error types for resolvers
use thiserror::Error;

/// Result type for resolver operations
pub type ResolverResult<T> = std::result::Result<T, ResolverError>;

/// Error raised by a resolver while answering a request
///
/// The chain converts it into an error envelope; it never crosses the
/// process boundary as a Rust error.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// Obtaining the cached resource failed
    #[error(transparent)]
    Resource(#[from] testbed_resource::Error),

    /// A container could not be created or queried
    #[error("Container '{name}' failed: {reason}")]
    Container {
        /// Simple name of the container (e.g. `postgres`)
        name: String,
        /// The failure reason
        reason: String,
    },

    /// An image reference could not be parsed
    #[error("Invalid image name '{image}': {reason}")]
    InvalidImage {
        /// The offending reference
        image: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Any other resolver failure
    #[error("{0}")]
    Failed(String),
}

impl ResolverError {
    /// Create a container error
    pub fn container(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Container {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
