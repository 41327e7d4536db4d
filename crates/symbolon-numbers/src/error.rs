//! Errors raised by the numeric layer.

use thiserror::Error;

/// Failures of exact and inexact arithmetic.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NumberError {
    /// A finite value was divided by an exact or inexact zero where no
    /// signed infinity can stand in for the result.
    #[error("division by zero")]
    DivisionByZero,

    /// The operation is undefined for the given operand (square root of a
    /// negative real, logarithm of a non-positive real, an interval
    /// denominator containing zero, ...).
    #[error("domain error: {0}")]
    Domain(String),

    /// A textual number could not be parsed.
    #[error("cannot parse number: {0}")]
    Parse(String),
}

impl NumberError {
    pub(crate) fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }
}
