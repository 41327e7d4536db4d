//! Error type for the expression kernel.

use symbolon_numbers::NumberError;
use thiserror::Error;

use crate::handle::ExprHandle;

/// The abstract kind of a [`CoreError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed arguments, unknown names, non-comparable limits.
    Value,
    /// Assumption conflicts, wrong arity, wrong kind of argument.
    Type,
    /// Division by zero, `log(0)`, intervals containing zero.
    Domain,
    /// A hook that has no rule for the given input.
    NotImplemented,
}

/// A failed kernel operation, carrying the operation attempted and the
/// offending subexpression when there is one.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CoreError {
    /// See [`ErrorKind::Value`].
    #[error("{op}: {message}")]
    Value {
        /// Operation attempted.
        op: &'static str,
        /// Offending subexpression.
        expr: Option<ExprHandle>,
        /// Human readable detail.
        message: String,
    },
    /// See [`ErrorKind::Type`].
    #[error("{op}: {message}")]
    Type {
        /// Operation attempted.
        op: &'static str,
        /// Offending subexpression.
        expr: Option<ExprHandle>,
        /// Human readable detail.
        message: String,
    },
    /// See [`ErrorKind::Domain`].
    #[error("{op}: {message}")]
    Domain {
        /// Operation attempted.
        op: &'static str,
        /// Offending subexpression.
        expr: Option<ExprHandle>,
        /// Human readable detail.
        message: String,
    },
    /// See [`ErrorKind::NotImplemented`].
    #[error("{op}: not implemented: {message}")]
    NotImplemented {
        /// Operation attempted.
        op: &'static str,
        /// Offending subexpression.
        expr: Option<ExprHandle>,
        /// Human readable detail.
        message: String,
    },
}

impl CoreError {
    /// A value-error.
    pub fn value(op: &'static str, expr: impl Into<Option<ExprHandle>>, message: impl Into<String>) -> Self {
        Self::Value {
            op,
            expr: expr.into(),
            message: message.into(),
        }
    }

    /// A type-error.
    pub fn type_error(op: &'static str, expr: impl Into<Option<ExprHandle>>, message: impl Into<String>) -> Self {
        Self::Type {
            op,
            expr: expr.into(),
            message: message.into(),
        }
    }

    /// A domain-error.
    pub fn domain(op: &'static str, expr: impl Into<Option<ExprHandle>>, message: impl Into<String>) -> Self {
        Self::Domain {
            op,
            expr: expr.into(),
            message: message.into(),
        }
    }

    /// A not-implemented error.
    pub fn not_implemented(
        op: &'static str,
        expr: impl Into<Option<ExprHandle>>,
        message: impl Into<String>,
    ) -> Self {
        Self::NotImplemented {
            op,
            expr: expr.into(),
            message: message.into(),
        }
    }

    /// Wraps a numeric failure raised while evaluating `expr`.
    #[must_use]
    pub fn from_number(op: &'static str, expr: impl Into<Option<ExprHandle>>, err: NumberError) -> Self {
        match err {
            NumberError::Parse(msg) => Self::value(op, expr, msg),
            other => Self::domain(op, expr, other.to_string()),
        }
    }

    /// The abstract kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Value { .. } => ErrorKind::Value,
            Self::Type { .. } => ErrorKind::Type,
            Self::Domain { .. } => ErrorKind::Domain,
            Self::NotImplemented { .. } => ErrorKind::NotImplemented,
        }
    }

    /// The operation that failed.
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::Value { op, .. }
            | Self::Type { op, .. }
            | Self::Domain { op, .. }
            | Self::NotImplemented { op, .. } => op,
        }
    }

    /// The offending subexpression, if recorded.
    #[must_use]
    pub fn expr(&self) -> Option<ExprHandle> {
        match self {
            Self::Value { expr, .. }
            | Self::Type { expr, .. }
            | Self::Domain { expr, .. }
            | Self::NotImplemented { expr, .. } => *expr,
        }
    }
}

impl From<NumberError> for CoreError {
    fn from(err: NumberError) -> Self {
        Self::from_number("number", None, err)
    }
}

/// Result alias used throughout the kernel.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let e = CoreError::domain("log", ExprHandle::new(3), "log(0)");
        assert_eq!(e.kind(), ErrorKind::Domain);
        assert_eq!(e.op(), "log");
        assert_eq!(e.expr(), Some(ExprHandle::new(3)));
        assert_eq!(e.to_string(), "log: log(0)");
    }

    #[test]
    fn test_from_number() {
        let e: CoreError = NumberError::DivisionByZero.into();
        assert_eq!(e.kind(), ErrorKind::Domain);
        let e = CoreError::from_number("sympify", None, NumberError::Parse("1.2.3".into()));
        assert_eq!(e.kind(), ErrorKind::Value);
    }
}
