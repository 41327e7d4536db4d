//! Numeric evaluation of closed expressions.

use symbolon_numbers::{context, Real};

use crate::arena::ExprArena;
use crate::assumptions::{Predicate, Truth};
use crate::error::{CoreError, CoreResult};
use crate::expr::{Constant, ExprNode};
use crate::handle::ExprHandle;

/// Extra bits carried through an evaluation before the final rounding.
const GUARD_BITS: usize = 16;

/// Results smaller than `2^-(prec - SIGN_MARGIN)` may be rounding noise
/// around zero, so their sign is not trusted.
const SIGN_MARGIN: i64 = 8;

impl ExprArena {
    /// Evaluates `h` to a `Real` at the ambient precision.
    ///
    /// Works on numbers, the real constants, sums, products, powers and
    /// applications of functions with an `evalf` hook. Never memoised, as
    /// the result depends on the precision context.
    ///
    /// # Errors
    ///
    /// Returns a value-error for free symbols, infinities and `I`,
    /// not-implemented for functions without a numeric hook, and the
    /// numeric layer's error (as a domain-error) otherwise.
    pub fn evalf(&self, h: ExprHandle) -> CoreResult<Real> {
        let value = context::with_extra_prec(GUARD_BITS, || self.evalf_node(h))?;
        Ok(value.round())
    }

    fn evalf_node(&self, h: ExprHandle) -> CoreResult<Real> {
        match self.get(h) {
            ExprNode::Number(n) => n
                .to_real()
                .ok_or_else(|| CoreError::value("evalf", h, "not a finite number")),
            ExprNode::Constant(c) => match c {
                Constant::E => Ok(Real::e()),
                Constant::Pi => Ok(Real::pi()),
                Constant::EulerGamma => Ok(Real::euler_gamma()),
                Constant::ImaginaryUnit => Err(CoreError::value("evalf", h, "not a real number")),
            },
            ExprNode::Add(terms) => terms.iter().try_fold(Real::zero(), |acc, &t| {
                Ok(acc.add_real(&self.evalf_node(t)?))
            }),
            ExprNode::Mul(factors) => factors.iter().try_fold(Real::from(1), |acc, &f| {
                Ok(acc.mul_real(&self.evalf_node(f)?))
            }),
            ExprNode::Pow { base, exp } => {
                let b = self.evalf_node(*base)?;
                let r = match self.as_i64(*exp) {
                    Some(k) => b.powi(k),
                    None => b.powf(&self.evalf_node(*exp)?),
                };
                r.map_err(|err| CoreError::from_number("evalf", h, err))
            }
            ExprNode::Apply { func, args } => {
                let def = self
                    .function_def(*func)
                    .ok_or_else(|| CoreError::not_implemented("evalf", h, "undefined function"))?;
                let values = args
                    .iter()
                    .map(|&a| self.evalf_node(a))
                    .collect::<CoreResult<Vec<_>>>()?;
                def.evalf(&values)
                    .ok_or_else(|| CoreError::not_implemented("evalf", h, "function has no numeric rule"))?
                    .map_err(|err| CoreError::from_number("evalf", h, err))
            }
            ExprNode::Symbol(_) => Err(CoreError::value("evalf", h, "cannot evaluate a free symbol")),
            _ => Err(CoreError::not_implemented("evalf", h, "no numeric value")),
        }
    }

    /// The sign of `h`: exact for numbers, from assumptions for symbolic
    /// expressions, numeric for closed ones. `None` when undecided,
    /// including values too close to zero at the ambient precision.
    pub fn numeric_sign(&mut self, h: ExprHandle) -> Option<i8> {
        if let Some(n) = self.as_number(h) {
            return n.signum();
        }
        if !self.free_symbols(h).is_empty() {
            for (p, s) in [(Predicate::Positive, 1), (Predicate::Negative, -1), (Predicate::Zero, 0)] {
                if self.ask(h, p) == Truth::True {
                    return Some(s);
                }
            }
            return None;
        }
        let v = self.evalf(h).ok()?;
        let floor = SIGN_MARGIN - i64::try_from(context::getprec()).unwrap_or(i64::MAX);
        if v.is_zero() || v.top() < floor {
            tracing::trace!(?h, "numeric sign too close to zero to decide");
            return None;
        }
        Some(v.signum())
    }
}
