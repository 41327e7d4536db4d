//! Asymptotic comparison classes for limit computation.
//!
//! Two rapidly varying expressions `f, g -> oo` are compared through
//! `L = lim log(f) / log(g)`: `L = 0` means `f` varies more slowly, an
//! infinite `L` means it varies faster, and anything else puts them in the
//! same class.

use std::cmp::Ordering;

use symbolon_core::{functions, ExprHandle, ExprNode};

use crate::gruntz::{Gruntz, LimitError, LimitResult};

/// Asymptotic comparison result between two expressions as x → ∞.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComparisonClass {
    /// log f / log g → 0 (f varies more slowly than g)
    LessThan,
    /// log f / log g → c ≠ 0, ∞ (same comparability class)
    Comparable,
    /// log f / log g → ±∞ (f varies faster than g)
    GreaterThan,
}

impl ComparisonClass {
    /// Returns true if self represents "less than" (slower growth).
    #[must_use]
    pub fn is_less(self) -> bool {
        matches!(self, ComparisonClass::LessThan)
    }

    /// Returns true if self represents "greater than" (faster growth).
    #[must_use]
    pub fn is_greater(self) -> bool {
        matches!(self, ComparisonClass::GreaterThan)
    }

    /// Returns true if the expressions are comparable (same growth rate).
    #[must_use]
    pub fn is_comparable(self) -> bool {
        matches!(self, ComparisonClass::Comparable)
    }

    /// Reverses the comparison (swaps the two expressions).
    #[must_use]
    pub fn reverse(self) -> Self {
        match self {
            ComparisonClass::LessThan => ComparisonClass::GreaterThan,
            ComparisonClass::GreaterThan => ComparisonClass::LessThan,
            ComparisonClass::Comparable => ComparisonClass::Comparable,
        }
    }
}

impl From<ComparisonClass> for Ordering {
    fn from(class: ComparisonClass) -> Self {
        match class {
            ComparisonClass::LessThan => Ordering::Less,
            ComparisonClass::Comparable => Ordering::Equal,
            ComparisonClass::GreaterThan => Ordering::Greater,
        }
    }
}

impl Gruntz<'_> {
    /// Compares the growth of `a` and `b`, both tending to infinity.
    ///
    /// Each call spends one unit of the comparison budget.
    pub(crate) fn compare(&mut self, a: ExprHandle, b: ExprHandle) -> LimitResult<ComparisonClass> {
        self.spend_compare()?;
        let la = self.log_of(a)?;
        let lb = self.log_of(b)?;
        let ratio = self.arena.div(la, lb)?;
        let c = self.limitinf(ratio)?;
        let class = if self.arena.is_zero(c) {
            ComparisonClass::LessThan
        } else if self.is_infinite(c) {
            ComparisonClass::GreaterThan
        } else if self.arena.has_subtree(c, self.x) || self.arena.as_number(c).is_some_and(|n| n.is_nan()) {
            return Err(LimitError::NotComparable { expr: ratio, reason: "ratio of logarithms has no limit" });
        } else {
            ComparisonClass::Comparable
        };
        tracing::debug!(?a, ?b, ?class, "compared growth");
        Ok(class)
    }

    /// `t` for an exponential-like `f = exp(t)`. A power with an exponent
    /// depending on `x` counts as `exp(exp * log(base))`.
    pub(crate) fn exponent_of(&mut self, f: ExprHandle) -> LimitResult<Option<ExprHandle>> {
        match self.arena.get(f).clone() {
            ExprNode::Apply { func, args } if func == functions::EXP => Ok(Some(args[0])),
            ExprNode::Pow { base, exp } if self.arena.has_subtree(exp, self.x) => {
                let l = self.arena.log(base)?;
                Ok(Some(self.arena.mul(&[exp, l])))
            }
            _ => Ok(None),
        }
    }

    // log(f), reading the exponent off exponential-like expressions.
    fn log_of(&mut self, f: ExprHandle) -> LimitResult<ExprHandle> {
        match self.exponent_of(f)? {
            Some(t) => Ok(t),
            None => Ok(self.arena.log(f)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gruntz::LimitConfig;
    use symbolon_core::{ExprArena, Predicate};

    fn setup() -> (ExprArena, ExprHandle) {
        let mut arena = ExprArena::new();
        let x = arena.symbol_with("x", &[(Predicate::Positive, true)]).unwrap();
        (arena, x)
    }

    #[test]
    fn test_comparison_class() {
        assert!(ComparisonClass::LessThan.is_less());
        assert!(ComparisonClass::GreaterThan.is_greater());
        assert!(ComparisonClass::Comparable.is_comparable());

        assert_eq!(
            ComparisonClass::LessThan.reverse(),
            ComparisonClass::GreaterThan
        );
        assert_eq!(Ordering::from(ComparisonClass::Comparable), Ordering::Equal);
    }

    #[test]
    fn test_polynomial_below_exponential() {
        let (mut arena, x) = setup();
        let ex = arena.exp(x).unwrap();
        let mut g = Gruntz::new(&mut arena, x, LimitConfig::default());
        assert_eq!(g.compare(x, ex).unwrap(), ComparisonClass::LessThan);
        assert_eq!(g.compare(ex, x).unwrap(), ComparisonClass::GreaterThan);
    }

    #[test]
    fn test_same_class() {
        let (mut arena, x) = setup();
        let ex = arena.exp(x).unwrap();
        let nx = arena.neg(x);
        let enx = arena.exp(nx).unwrap();
        let two = arena.integer(2);
        let tx = arena.mul(&[two, x]);
        let e2x = arena.exp(tx).unwrap();
        let mut g = Gruntz::new(&mut arena, x, LimitConfig::default());
        assert_eq!(g.compare(ex, enx).unwrap(), ComparisonClass::Comparable);
        assert_eq!(g.compare(ex, e2x).unwrap(), ComparisonClass::Comparable);
    }

    #[test]
    fn test_exponent_of_power() {
        let (mut arena, x) = setup();
        let xx = arena.pow(x, x).unwrap();
        let lx = arena.log(x).unwrap();
        let expected = arena.mul(&[x, lx]);
        let mut g = Gruntz::new(&mut arena, x, LimitConfig::default());
        assert_eq!(g.exponent_of(xx).unwrap(), Some(expected));
        assert_eq!(g.exponent_of(x).unwrap(), None);
    }

    #[test]
    fn test_budget() {
        let (mut arena, x) = setup();
        let ex = arena.exp(x).unwrap();
        let config = LimitConfig { max_compare: 0, ..LimitConfig::default() };
        let mut g = Gruntz::new(&mut arena, x, config);
        assert!(matches!(g.compare(x, ex), Err(LimitError::CompareBudget(0))));
    }
}
