//! Error types for the client
use testbed_codec::DecodeError;
use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// I/O-level failure of a remote call
///
/// A call that reached the server and got a non-200 answer is not an error;
/// it comes back as `Ok(None)`.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection or protocol failure
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The call did not complete within the client timeout
    #[error("Request timed out")]
    Timeout,

    /// The response body could not be decoded
    #[error("Malformed response: {0}")]
    Decode(#[from] DecodeError),

    /// The server URI is unusable
    #[error("Invalid server URI: {0}")]
    InvalidUri(String),

    /// Discovery configuration could not be read
    #[error("Discovery failed: {0}")]
    Discovery(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(error)
        }
    }
}
