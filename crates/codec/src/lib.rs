//! # testbed-codec
//!
//! Binary wire format spoken between the testbed client and the resolution
//! server.
//!
//! The codec covers a small closed set of shapes: UTF-8 strings, booleans,
//! lists of strings, mappings of string to [`Value`], and the tri-state
//! [`Envelope`] that wraps every operation outcome. Every value is prefixed
//! with a one-byte [`Tag`]; decoding against the wrong Rust type fails with
//! a [`DecodeError`] naming both the expected and the found shape.
//!
//! ```
//! use testbed_codec::{Envelope, decode, encode};
//!
//! let bytes = encode(&Envelope::Value(vec!["datasources.default.url".to_string()]));
//! let back: Envelope<Vec<String>> = decode(&bytes).unwrap();
//! assert_eq!(back.into_value().unwrap(), vec!["datasources.default.url"]);
//! ```

pub mod envelope;
pub mod error;
pub mod request;
pub mod value;
pub mod wire;

pub use envelope::{Envelope, EnvelopeError};
pub use error::{DecodeError, Result};
pub use request::{ListRequest, ResolveRequest};
pub use value::{PropertyEntries, PropertyMap, Value};
pub use wire::{Tag, Wire, decode, encode};

/// Media type used for both `Content-Type` and `Accept` on every exchange.
pub const MEDIA_TYPE: &str = "application/x-testbed-binary";

/// Header carrying the optional shared access token.
pub const ACCESS_TOKEN_HEADER: &str = "Access-Token";

/// `User-Agent` sent by the client.
pub const USER_AGENT: &str = "testbed-client";

/// Property naming the scope that owns resources created by a `resolve` call.
pub const SCOPE_PROPERTY: &str = "test-resources.scope";
