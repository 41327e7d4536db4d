//! Closed intervals of reals with outward rounding.
//!
//! Lower bounds are always rounded toward negative infinity and upper bounds
//! toward positive infinity, whatever the ambient rounding mode is, so the
//! exact result of an operation on members always lies inside the computed
//! interval.

use std::fmt;

use crate::context::{self, RoundingMode};
use crate::error::NumberError;
use crate::{Rational, Real};

/// A closed interval `[lower, upper]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Interval {
    lower: Real,
    upper: Real,
}

fn down() -> (usize, RoundingMode) {
    (context::getprec(), RoundingMode::Floor)
}

fn up() -> (usize, RoundingMode) {
    (context::getprec(), RoundingMode::Ceiling)
}

impl Interval {
    /// Creates `[lower, upper]`.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::Domain`] if `lower > upper`.
    pub fn new(lower: Real, upper: Real) -> Result<Self, NumberError> {
        if lower > upper {
            return Err(NumberError::domain(format!("empty interval [{lower}, {upper}]")));
        }
        let (prec, floor) = down();
        let (_, ceil) = up();
        Ok(Self {
            lower: lower.round_to(prec, floor),
            upper: upper.round_to(prec, ceil),
        })
    }

    /// The degenerate interval `[x, x]`.
    #[must_use]
    pub fn point(x: &Real) -> Self {
        let (prec, floor) = down();
        let (_, ceil) = up();
        Self {
            lower: x.round_to(prec, floor),
            upper: x.round_to(prec, ceil),
        }
    }

    /// The tightest interval around a rational at the ambient precision.
    #[must_use]
    pub fn from_rational(r: &Rational) -> Self {
        let (prec, floor) = down();
        let (_, ceil) = up();
        Self {
            lower: Real::from_rational_with(r, context::PrecisionContext { prec, mode: floor }),
            upper: Real::from_rational_with(r, context::PrecisionContext { prec, mode: ceil }),
        }
    }

    /// Parses `"[a, b]"` or a single decimal.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::Parse`] on malformed input.
    pub fn parse(s: &str) -> Result<Self, NumberError> {
        let t = s.trim();
        if let Some(inner) = t.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
            let (a, b) = inner
                .split_once(',')
                .ok_or_else(|| NumberError::Parse(s.to_string()))?;
            let a = Self::from_rational(&Rational::parse(a)?);
            let b = Self::from_rational(&Rational::parse(b)?);
            return Self::new(a.lower, b.upper);
        }
        Ok(Self::from_rational(&Rational::parse(t)?))
    }

    /// Lower bound.
    #[must_use]
    pub fn lower(&self) -> &Real {
        &self.lower
    }

    /// Upper bound.
    #[must_use]
    pub fn upper(&self) -> &Real {
        &self.upper
    }

    /// Width `upper - lower`, rounded up.
    #[must_use]
    pub fn width(&self) -> Real {
        let (prec, ceil) = up();
        self.upper.add_with(&-&self.lower, prec, ceil)
    }

    /// Midpoint at the ambient precision.
    #[must_use]
    pub fn mid(&self) -> Real {
        (&self.lower + &self.upper).mul_pow2(-1)
    }

    /// True if `x` lies in the interval.
    #[must_use]
    pub fn contains(&self, x: &Real) -> bool {
        &self.lower <= x && x <= &self.upper
    }

    /// True if zero lies in the interval.
    #[must_use]
    pub fn contains_zero(&self) -> bool {
        self.contains(&Real::zero())
    }

    /// `Some(sign)` when every member has the same sign.
    #[must_use]
    pub fn signum(&self) -> Option<i8> {
        if self.lower.is_positive() {
            Some(1)
        } else if self.upper.is_negative() {
            Some(-1)
        } else if self.lower.is_zero() && self.upper.is_zero() {
            Some(0)
        } else {
            None
        }
    }

    /// Negation (exact).
    #[must_use]
    pub fn neg(&self) -> Self {
        Self {
            lower: -&self.upper,
            upper: -&self.lower,
        }
    }

    /// Interval sum.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let (prec, floor) = down();
        let (_, ceil) = up();
        Self {
            lower: self.lower.add_with(&other.lower, prec, floor),
            upper: self.upper.add_with(&other.upper, prec, ceil),
        }
    }

    /// Interval difference.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Interval product.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        let (prec, floor) = down();
        let (_, ceil) = up();
        let pairs = [
            (&self.lower, &other.lower),
            (&self.lower, &other.upper),
            (&self.upper, &other.lower),
            (&self.upper, &other.upper),
        ];
        let lows = pairs.iter().map(|(a, b)| a.mul_with(b, prec, floor));
        let highs = pairs.iter().map(|(a, b)| a.mul_with(b, prec, ceil));
        Self {
            lower: lows.min().unwrap_or_default(),
            upper: highs.max().unwrap_or_default(),
        }
    }

    /// Interval quotient.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::Domain`] when `other` contains zero.
    pub fn div(&self, other: &Self) -> Result<Self, NumberError> {
        if other.contains_zero() {
            return Err(NumberError::domain(format!("division by {other}, which contains zero")));
        }
        let (prec, floor) = down();
        let (_, ceil) = up();
        let pairs = [
            (&self.lower, &other.lower),
            (&self.lower, &other.upper),
            (&self.upper, &other.lower),
            (&self.upper, &other.upper),
        ];
        let mut lows = Vec::with_capacity(4);
        let mut highs = Vec::with_capacity(4);
        for (a, b) in pairs {
            lows.push(a.div_with(b, prec, floor)?);
            highs.push(a.div_with(b, prec, ceil)?);
        }
        Ok(Self {
            lower: lows.into_iter().min().unwrap_or_default(),
            upper: highs.into_iter().max().unwrap_or_default(),
        })
    }

    /// Integer power; even powers of an interval straddling zero start at 0.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::Domain`] for a negative power of an interval
    /// containing zero.
    pub fn powi(&self, k: i64) -> Result<Self, NumberError> {
        if k < 0 {
            let one = Self::point(&Real::from(1));
            return one.div(&self.powi(-k)?);
        }
        if k == 0 {
            return Ok(Self::point(&Real::from(1)));
        }
        let prec = context::getprec();
        let directed = |x: &Real, mode| {
            context::with_context(context::PrecisionContext { prec, mode }, || x.powi(k))
        };
        let (lo, hi) = (&self.lower, &self.upper);
        if k % 2 == 1 || !lo.is_negative() {
            return Ok(Self {
                lower: directed(lo, RoundingMode::Floor)?,
                upper: directed(hi, RoundingMode::Ceiling)?,
            });
        }
        if !hi.is_positive() {
            return Ok(Self {
                lower: directed(hi, RoundingMode::Floor)?,
                upper: directed(lo, RoundingMode::Ceiling)?,
            });
        }
        let upper = directed(lo, RoundingMode::Ceiling)?.max(directed(hi, RoundingMode::Ceiling)?);
        Ok(Self {
            lower: Real::zero(),
            upper,
        })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Number;

    fn iv(a: &str, b: &str) -> Interval {
        Interval::parse(&format!("[{a}, {b}]")).unwrap()
    }

    #[test]
    fn test_encloses_decimal() {
        let tenth = Interval::parse("0.1").unwrap();
        let exact = Rational::from_i64(1, 10);
        assert!(tenth.lower().to_rational() < exact);
        assert!(tenth.upper().to_rational() > exact);
    }

    #[test]
    fn test_arithmetic() {
        let a = iv("1", "2");
        let b = iv("-3", "4");
        assert_eq!(a.add(&b), iv("-2", "6"));
        assert_eq!(a.sub(&b), iv("-3", "5"));
        assert_eq!(a.mul(&b), iv("-6", "8"));
        assert_eq!(a.div(&iv("2", "4")).unwrap(), iv("0.25", "1"));
    }

    #[test]
    fn test_sign_with_zero_endpoint() {
        assert_eq!(iv("0", "1").signum(), None);
        assert_eq!(iv("-1", "0").signum(), None);
        assert_eq!(iv("0", "0").signum(), Some(0));
        assert_eq!(iv("0.5", "1").signum(), Some(1));
        assert!(!Number::Interval(iv("0", "1")).is_positive());
    }

    #[test]
    fn test_division_by_zero_interval() {
        let a = iv("1", "2");
        assert!(matches!(a.div(&iv("-1", "1")), Err(NumberError::Domain(_))));
    }

    #[test]
    fn test_directed_rounding_ignores_ambient_mode() {
        context::setmode(RoundingMode::TowardZero);
        let third = Interval::point(&Real::from(1)).div(&Interval::point(&Real::from(3))).unwrap();
        let exact = Rational::from_i64(1, 3);
        assert!(third.lower().to_rational() < exact);
        assert!(third.upper().to_rational() > exact);
        assert_eq!(context::getmode(), RoundingMode::TowardZero);
    }

    #[test]
    fn test_even_power() {
        let a = iv("-2", "1");
        assert_eq!(a.powi(2).unwrap(), iv("0", "4"));
        assert_eq!(a.powi(3).unwrap(), iv("-8", "1"));
        assert!(a.powi(-1).is_err());
    }

    #[test]
    fn test_sign() {
        assert_eq!(iv("1", "2").signum(), Some(1));
        assert_eq!(iv("-1", "2").signum(), None);
        assert_eq!(iv("1", "2").mid(), Real::parse("1.5").unwrap());
        assert_eq!(iv("1", "2").width(), Real::from(1));
    }
}
