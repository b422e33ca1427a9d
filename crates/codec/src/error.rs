//! Decode errors

use thiserror::Error;

use crate::wire::describe_tag;

/// Result type for decode operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// A wire payload that is malformed or does not match the expected shape.
///
/// Decode errors are never coerced into a default value; callers always
/// see them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The tag byte does not match the shape being decoded
    #[error("unexpected tag: expected {expected}, found {}", describe_tag(*.found))]
    UnexpectedTag {
        /// Human-readable name of the expected shape
        expected: &'static str,
        /// The tag byte actually read
        found: u8,
    },

    /// Input ended before the value was complete
    #[error("truncated payload: needed {needed} more byte(s) while reading {context}")]
    Truncated {
        /// What was being read
        context: &'static str,
        /// Number of missing bytes
        needed: usize,
    },

    /// A string payload is not valid UTF-8
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    /// A boolean byte other than 0 or 1
    #[error("invalid boolean byte 0x{0:02x}")]
    InvalidBool(u8),

    /// Bytes remain after the top-level value
    #[error("{0} trailing byte(s) after value")]
    TrailingBytes(usize),

    /// Nested mappings exceed the supported depth
    #[error("mapping nesting exceeds {max} levels")]
    TooDeep {
        /// The maximum supported depth
        max: usize,
    },

    /// A request mapping lacks a required field
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    /// A request field holds the wrong kind of value
    #[error("field '{field}' must be {expected}")]
    InvalidField {
        /// The offending field
        field: &'static str,
        /// The expected shape
        expected: &'static str,
    },
}
