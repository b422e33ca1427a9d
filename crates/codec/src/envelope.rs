//! Tri-state result envelope

use thiserror::Error;

/// Outcome of a cross-process operation.
///
/// Exactly one of a value, an explicit "no value" marker, or an error
/// description. Keeping `Empty` separate from `Error` preserves the
/// difference between "nobody could answer" and "the call failed" across
/// the process boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Envelope<T> {
    /// A present value
    Value(T),
    /// No value
    Empty,
    /// The operation failed; carries a description
    Error(String),
}

/// Error surfaced when unwrapping an [`Envelope::Error`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("remote operation failed: {0}")]
pub struct EnvelopeError(pub String);

impl<T> Envelope<T> {
    /// Wrap an optional value: `Some` becomes `Value`, `None` becomes `Empty`.
    pub fn of(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Self::Value)
    }

    /// Build an error envelope.
    pub fn error(description: impl Into<String>) -> Self {
        Self::Error(description.into())
    }

    /// Borrow the value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Take the value, discarding `Empty` and `Error`.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// `true` for the `Empty` variant.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// `true` for the `Error` variant.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Map the carried value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        match self {
            Self::Value(v) => Envelope::Value(f(v)),
            Self::Empty => Envelope::Empty,
            Self::Error(e) => Envelope::Error(e),
        }
    }

    /// Convert into a standard `Result`, keeping emptiness as `None`.
    pub fn into_result(self) -> Result<Option<T>, EnvelopeError> {
        match self {
            Self::Value(v) => Ok(Some(v)),
            Self::Empty => Ok(None),
            Self::Error(e) => Err(EnvelopeError(e)),
        }
    }
}

impl<T> From<Option<T>> for Envelope<T> {
    fn from(value: Option<T>) -> Self {
        Self::of(value)
    }
}

impl<T> Default for Envelope<T> {
    fn default() -> Self {
        Self::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn of_maps_option() {
        assert_eq!(Envelope::of(Some(1)), Envelope::Value(1));
        assert_eq!(Envelope::<i32>::of(None), Envelope::Empty);
    }

    #[test]
    fn into_result_keeps_three_states_apart() {
        assert_eq!(Envelope::Value("x").into_result(), Ok(Some("x")));
        assert_eq!(Envelope::<&str>::Empty.into_result(), Ok(None));
        assert_eq!(
            Envelope::<&str>::error("boom").into_result(),
            Err(EnvelopeError("boom".into()))
        );
    }

    #[test]
    fn map_preserves_variant() {
        assert_eq!(Envelope::Value(2).map(|v| v * 2), Envelope::Value(4));
        assert!(Envelope::<i32>::Empty.map(|v| v * 2).is_empty());
        assert!(Envelope::<i32>::error("e").map(|v| v * 2).is_error());
    }
}
