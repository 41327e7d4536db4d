//! Functions: the hook trait registered functions implement, application,
//! lambdas, composition and differentiation.

mod apply;
mod derivative;
pub mod elementary;

use std::fmt;

use symbolon_numbers::{NumberError, Real};

use crate::arena::ExprArena;
use crate::assumptions::{AssumptionSet, Predicate, Truth};
use crate::error::CoreResult;
use crate::handle::ExprHandle;

/// Number of arguments a function accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Exactly this many.
    Exact(usize),
    /// At least this many.
    AtLeast(usize),
    /// Between the two bounds, inclusive.
    Between(usize, usize),
}

impl Arity {
    /// True if `n` arguments are acceptable.
    #[must_use]
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Self::Exact(k) => n == k,
            Self::AtLeast(k) => n >= k,
            Self::Between(lo, hi) => (lo..=hi).contains(&n),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(k) => write!(f, "{k}"),
            Self::AtLeast(k) => write!(f, "at least {k}"),
            Self::Between(lo, hi) => write!(f, "{lo} to {hi}"),
        }
    }
}

/// A defined function: a named class with evaluation hooks.
///
/// Every hook has a default that declines (`Ok(None)` or
/// [`Truth::Unknown`]), so an implementation only writes the rules it
/// has. Hooks receive the arena mutably and may build expressions; the
/// registry hands out clones of the `Arc` so a hook may itself apply
/// functions.
#[allow(unused_variables)]
pub trait FunctionDef: Send + Sync + fmt::Debug {
    /// Name, unique within a registry.
    fn name(&self) -> &str;

    /// Accepted argument counts.
    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    /// Assumptions that hold for every application.
    fn default_assumptions(&self) -> AssumptionSet {
        AssumptionSet::new()
    }

    /// Partial evaluation on specific arguments.
    fn eval_apply(&self, arena: &mut ExprArena, args: &[ExprHandle]) -> CoreResult<Option<ExprHandle>> {
        Ok(None)
    }

    /// Simplification of `f(args)^exp`.
    fn eval_apply_power(
        &self,
        arena: &mut ExprArena,
        args: &[ExprHandle],
        exp: ExprHandle,
    ) -> CoreResult<Option<ExprHandle>> {
        Ok(None)
    }

    /// Substitution of `old` by `new` inside `f(args)` beyond the
    /// argument-wise default.
    fn eval_apply_subs(
        &self,
        arena: &mut ExprArena,
        args: &[ExprHandle],
        old: ExprHandle,
        new: ExprHandle,
    ) -> CoreResult<Option<ExprHandle>> {
        Ok(None)
    }

    /// The partial derivative with respect to argument `argindex`
    /// (zero-based), as a `Lambda`.
    fn fdiff(&self, arena: &mut ExprArena, argindex: usize) -> CoreResult<Option<ExprHandle>> {
        Ok(None)
    }

    /// The `n`-th term of the Taylor series at zero, evaluated at `x`.
    /// `previous` holds the already computed lower terms, latest last.
    fn taylor_term(
        &self,
        arena: &mut ExprArena,
        n: u32,
        x: ExprHandle,
        previous: &[ExprHandle],
    ) -> CoreResult<Option<ExprHandle>> {
        Ok(None)
    }

    /// Series of `f(args)` modulo `order`, for arguments the Taylor driver
    /// cannot handle (arguments not tending to zero).
    fn eval_oseries(
        &self,
        arena: &mut ExprArena,
        args: &[ExprHandle],
        order: ExprHandle,
    ) -> CoreResult<Option<ExprHandle>> {
        Ok(None)
    }

    /// Leading term of `f(args)` as `x` tends to zero.
    fn eval_as_leading_term(
        &self,
        arena: &mut ExprArena,
        args: &[ExprHandle],
        x: ExprHandle,
    ) -> CoreResult<Option<ExprHandle>> {
        Ok(None)
    }

    /// Predicate value of `f(args)`.
    fn eval_is(&self, arena: &mut ExprArena, args: &[ExprHandle], predicate: Predicate) -> Truth {
        Truth::Unknown
    }

    /// Expansion of `f(args)`, whose arguments are already expanded.
    fn eval_expand(&self, arena: &mut ExprArena, args: &[ExprHandle]) -> CoreResult<Option<ExprHandle>> {
        Ok(None)
    }

    /// Numeric value at real arguments, at the ambient precision.
    fn evalf(&self, args: &[Real]) -> Option<Result<Real, NumberError>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity() {
        assert!(Arity::Exact(1).accepts(1));
        assert!(!Arity::Exact(1).accepts(2));
        assert!(Arity::AtLeast(1).accepts(5));
        assert!(Arity::Between(1, 2).accepts(2));
        assert!(!Arity::Between(1, 2).accepts(0));
        assert_eq!(Arity::Between(1, 2).to_string(), "1 to 2");
    }
}
