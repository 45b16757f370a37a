//! Error types for the classifier system.
//!
//! Every variant is a precondition violation surfaced straight to the caller.
//! Ordinary learning noise (wrong anticipations, low quality, population
//! churn) never travels through this type.

use thiserror::Error;

/// Errors raised by the rule model and the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Acs2Error {
    /// A perception, condition or effect had the wrong number of attributes.
    #[error("shape mismatch: expected {expected} attributes, got {actual}")]
    Shape {
        /// Length the operation required.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The operation is not defined in the current mode.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl Acs2Error {
    /// Shape error for a length mismatch.
    #[must_use]
    pub const fn shape(expected: usize, actual: usize) -> Self {
        Self::Shape { expected, actual }
    }

    /// Fail with a shape error unless `actual == expected`.
    ///
    /// # Errors
    ///
    /// Returns [`Acs2Error::Shape`] when the lengths differ.
    pub const fn check_shape(expected: usize, actual: usize) -> Acs2Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::shape(expected, actual))
        }
    }
}

/// Result type used throughout the crate.
pub type Acs2Result<T> = Result<T, Acs2Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_message() {
        let err = Acs2Error::shape(4, 3);
        assert_eq!(err.to_string(), "shape mismatch: expected 4 attributes, got 3");
    }

    #[test]
    fn test_check_shape() {
        assert!(Acs2Error::check_shape(8, 8).is_ok());
        assert_eq!(Acs2Error::check_shape(8, 7), Err(Acs2Error::shape(8, 7)));
    }
}
