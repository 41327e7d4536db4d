//! The number tower.
//!
//! `Number` joins the exact layers (Integer, Rational), the inexact ones
//! (Real, Interval) and the extended values (signed infinities, NaN) behind
//! one set of operations with the usual promotion rules: exact op exact
//! stays exact, anything op Real is a Real at the ambient precision, and
//! anything op Interval is an Interval with outward rounding.

use num_traits::{One, Zero};
use std::cmp::Ordering;
use std::fmt;

use crate::error::NumberError;
use crate::{Integer, Interval, Rational, Real};

/// A numeric value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Number {
    /// An exact integer.
    Integer(Integer),
    /// An exact rational that is not an integer.
    Rational(Rational),
    /// A binary float.
    Real(Real),
    /// A closed interval.
    Interval(Interval),
    /// Positive infinity.
    Infinity,
    /// Negative infinity.
    NegativeInfinity,
    /// Not a number.
    NaN,
}

/// The common layer two operands are promoted to.
enum Promoted {
    Exact(Rational, Rational),
    Real(Real, Real),
    Interval(Interval, Interval),
}

impl Number {
    /// Integer from an i64.
    #[must_use]
    pub fn integer(n: i64) -> Self {
        Self::Integer(Integer::new(n))
    }

    /// Exact `p/q`; a zero denominator gives a signed infinity, or NaN for
    /// `0/0`.
    #[must_use]
    pub fn rational(p: Integer, q: Integer) -> Self {
        match Rational::checked_new(p.clone(), q) {
            Some(r) => Self::from_rational(r),
            None => match p.signum() {
                1 => Self::Infinity,
                -1 => Self::NegativeInfinity,
                _ => Self::NaN,
            },
        }
    }

    /// `p/q` from machine integers.
    #[must_use]
    pub fn fraction(p: i64, q: i64) -> Self {
        Self::rational(Integer::new(p), Integer::new(q))
    }

    /// Wraps a rational, demoting integer values.
    #[must_use]
    pub fn from_rational(r: Rational) -> Self {
        match r.to_integer() {
            Some(n) => Self::Integer(n),
            None => Self::Rational(r),
        }
    }

    /// Exact zero.
    #[must_use]
    pub fn zero() -> Self {
        Self::Integer(Integer::zero())
    }

    /// Exact one.
    #[must_use]
    pub fn one() -> Self {
        Self::Integer(Integer::one())
    }

    /// Exact minus one.
    #[must_use]
    pub fn minus_one() -> Self {
        Self::integer(-1)
    }

    /// True for an exact or inexact zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Integer(n) => n.is_zero(),
            Self::Real(r) => r.is_zero(),
            Self::Interval(i) => i.lower().is_zero() && i.upper().is_zero(),
            _ => false,
        }
    }

    /// True for the exact integer one.
    #[must_use]
    pub fn is_one(&self) -> bool {
        matches!(self, Self::Integer(n) if n.is_one())
    }

    /// True for the exact integer minus one.
    #[must_use]
    pub fn is_minus_one(&self) -> bool {
        matches!(self, Self::Integer(n) if n == &Integer::new(-1))
    }

    /// True for exact integers.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer(_))
    }

    /// True for exact integers and rationals.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Rational(_))
    }

    /// True for everything but the infinities and NaN.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        !matches!(self, Self::Infinity | Self::NegativeInfinity | Self::NaN)
    }

    /// True for either infinity.
    #[must_use]
    pub fn is_infinite(&self) -> bool {
        matches!(self, Self::Infinity | Self::NegativeInfinity)
    }

    /// True for NaN.
    #[must_use]
    pub fn is_nan(&self) -> bool {
        matches!(self, Self::NaN)
    }

    /// The sign, when it is determined.
    #[must_use]
    pub fn signum(&self) -> Option<i8> {
        match self {
            Self::Integer(n) => Some(n.signum()),
            Self::Rational(r) => Some(r.signum()),
            Self::Real(r) => Some(r.signum()),
            Self::Interval(i) => i.signum(),
            Self::Infinity => Some(1),
            Self::NegativeInfinity => Some(-1),
            Self::NaN => None,
        }
    }

    /// True if known to be strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.signum() == Some(1)
    }

    /// True if known to be strictly negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.signum() == Some(-1)
    }

    /// The exact value, for integers and rationals.
    #[must_use]
    pub fn as_rational(&self) -> Option<Rational> {
        match self {
            Self::Integer(n) => Some(Rational::from_integer(n.clone())),
            Self::Rational(r) => Some(r.clone()),
            _ => None,
        }
    }

    /// The integer value, for exact integers.
    #[must_use]
    pub fn as_integer(&self) -> Option<&Integer> {
        match self {
            Self::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// Small integer value.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        self.as_integer().and_then(Integer::to_i64)
    }

    /// The value as a `Real` at the ambient precision (the midpoint of an
    /// interval); `None` for the infinities and NaN.
    #[must_use]
    pub fn to_real(&self) -> Option<Real> {
        match self {
            Self::Integer(n) => Some(Real::from_integer(n)),
            Self::Rational(r) => Some(Real::from_rational(r)),
            Self::Real(r) => Some(r.round()),
            Self::Interval(i) => Some(i.mid()),
            _ => None,
        }
    }

    fn to_interval(&self) -> Option<Interval> {
        match self {
            Self::Integer(n) => Some(Interval::from_rational(&Rational::from_integer(n.clone()))),
            Self::Rational(r) => Some(Interval::from_rational(r)),
            Self::Real(r) => Some(Interval::point(r)),
            Self::Interval(i) => Some(i.clone()),
            _ => None,
        }
    }

    fn promote(&self, other: &Self) -> Option<Promoted> {
        match (self, other) {
            (Self::Interval(_), _) | (_, Self::Interval(_)) => {
                Some(Promoted::Interval(self.to_interval()?, other.to_interval()?))
            }
            (Self::Real(_), _) | (_, Self::Real(_)) => Some(Promoted::Real(self.to_real()?, other.to_real()?)),
            _ => Some(Promoted::Exact(self.as_rational()?, other.as_rational()?)),
        }
    }

    fn signed_infinity(sign: Option<i8>) -> Self {
        match sign {
            Some(1) => Self::Infinity,
            Some(-1) => Self::NegativeInfinity,
            _ => Self::NaN,
        }
    }

    /// Negation.
    #[must_use]
    pub fn neg(&self) -> Self {
        match self {
            Self::Integer(n) => Self::Integer(-n),
            Self::Rational(r) => Self::Rational(-r),
            Self::Real(r) => Self::Real(-r),
            Self::Interval(i) => Self::Interval(i.neg()),
            Self::Infinity => Self::NegativeInfinity,
            Self::NegativeInfinity => Self::Infinity,
            Self::NaN => Self::NaN,
        }
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        if self.is_negative() {
            self.neg()
        } else {
            self.clone()
        }
    }

    /// Sum.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::NaN, _) | (_, Self::NaN) => Self::NaN,
            (Self::Infinity, Self::NegativeInfinity) | (Self::NegativeInfinity, Self::Infinity) => Self::NaN,
            (Self::Infinity, _) | (_, Self::Infinity) => Self::Infinity,
            (Self::NegativeInfinity, _) | (_, Self::NegativeInfinity) => Self::NegativeInfinity,
            (Self::Integer(a), Self::Integer(b)) => Self::Integer(a + b),
            _ => match self.promote(other) {
                Some(Promoted::Exact(a, b)) => Self::from_rational(a + b),
                Some(Promoted::Real(a, b)) => Self::Real(a.add_real(&b)),
                Some(Promoted::Interval(a, b)) => Self::Interval(a.add(&b)),
                None => Self::NaN,
            },
        }
    }

    /// Difference.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Product.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::NaN, _) | (_, Self::NaN) => Self::NaN,
            (a, b) if a.is_infinite() || b.is_infinite() => {
                let sign = match (a.signum(), b.signum()) {
                    (Some(0), _) | (_, Some(0)) => None,
                    (Some(x), Some(y)) => Some(x * y),
                    _ => None,
                };
                Self::signed_infinity(sign)
            }
            (Self::Integer(a), Self::Integer(b)) => Self::Integer(a * b),
            _ => match self.promote(other) {
                Some(Promoted::Exact(a, b)) => Self::from_rational(a * b),
                Some(Promoted::Real(a, b)) => Self::Real(a.mul_real(&b)),
                Some(Promoted::Interval(a, b)) => Self::Interval(a.mul(&b)),
                None => Self::NaN,
            },
        }
    }

    /// Quotient. A nonzero value over an exact or inexact zero is a signed
    /// infinity, following `Rational(p, 0)`.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::Domain`] when dividing by an interval that
    /// contains zero.
    pub fn div(&self, other: &Self) -> Result<Self, NumberError> {
        if self.is_nan() || other.is_nan() {
            return Ok(Self::NaN);
        }
        if other.is_infinite() {
            return Ok(if self.is_infinite() { Self::NaN } else { Self::zero() });
        }
        if self.is_infinite() {
            let sign = match other.signum() {
                Some(0) => self.signum(),
                Some(s) => self.signum().map(|t| s * t),
                None => None,
            };
            return Ok(Self::signed_infinity(sign));
        }
        if let Self::Interval(i) = other {
            if i.contains_zero() {
                return Err(NumberError::domain(format!("division by {i}, which contains zero")));
            }
        }
        if other.is_zero() {
            return Ok(if self.is_zero() {
                Self::NaN
            } else {
                Self::signed_infinity(self.signum())
            });
        }
        Ok(match self.promote(other) {
            Some(Promoted::Exact(a, b)) => Self::from_rational(a / b),
            Some(Promoted::Real(a, b)) => Self::Real(a.div_real(&b)?),
            Some(Promoted::Interval(a, b)) => Self::Interval(a.div(&b)?),
            None => Self::NaN,
        })
    }

    /// Reciprocal.
    ///
    /// # Errors
    ///
    /// See [`Number::div`].
    pub fn recip(&self) -> Result<Self, NumberError> {
        Self::one().div(self)
    }

    /// Integer power.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::Domain`] for exponents too large to evaluate
    /// and for negative powers of intervals containing zero.
    pub fn powi(&self, k: i64) -> Result<Self, NumberError> {
        if k == 0 {
            return Ok(Self::one());
        }
        match self {
            Self::NaN => Ok(Self::NaN),
            Self::Infinity => Ok(if k > 0 { Self::Infinity } else { Self::zero() }),
            Self::NegativeInfinity => Ok(if k < 0 {
                Self::zero()
            } else if k % 2 == 0 {
                Self::Infinity
            } else {
                Self::NegativeInfinity
            }),
            _ if self.is_zero() && k < 0 && !matches!(self, Self::Interval(_)) => Ok(Self::Infinity),
            Self::Integer(n) if k > 0 => {
                let e = u32::try_from(k).map_err(|_| NumberError::domain("exponent too large"))?;
                Ok(Self::Integer(n.pow(e)))
            }
            Self::Integer(n) => Ok(Self::from_rational(
                Rational::from_integer(n.clone()).powi(k)?,
            )),
            Self::Rational(r) => Ok(Self::from_rational(r.powi(k)?)),
            Self::Real(r) => Ok(Self::Real(r.powi(k)?)),
            Self::Interval(i) => Ok(Self::Interval(i.powi(k)?)),
        }
    }

    /// Compares values; `None` for NaN and overlapping intervals.
    #[must_use]
    pub fn compare_value(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::NaN, _) | (_, Self::NaN) => None,
            (Self::Infinity, Self::Infinity) | (Self::NegativeInfinity, Self::NegativeInfinity) => {
                Some(Ordering::Equal)
            }
            (Self::Infinity, _) | (_, Self::NegativeInfinity) => Some(Ordering::Greater),
            (Self::NegativeInfinity, _) | (_, Self::Infinity) => Some(Ordering::Less),
            (Self::Interval(a), Self::Interval(b)) => {
                if a.upper() < b.lower() {
                    Some(Ordering::Less)
                } else if a.lower() > b.upper() {
                    Some(Ordering::Greater)
                } else if a == b && a.lower() == a.upper() {
                    Some(Ordering::Equal)
                } else {
                    None
                }
            }
            (Self::Interval(_), _) | (_, Self::Interval(_)) => {
                Self::Interval(self.to_interval()?).compare_value(&Self::Interval(other.to_interval()?))
            }
            _ => {
                let a = self.exact_value()?;
                let b = other.exact_value()?;
                Some(a.cmp(&b))
            }
        }
    }

    fn exact_value(&self) -> Option<Rational> {
        match self {
            Self::Real(r) => Some(r.to_rational()),
            _ => self.as_rational(),
        }
    }
}

impl From<Integer> for Number {
    fn from(n: Integer) -> Self {
        Self::Integer(n)
    }
}

impl From<Rational> for Number {
    fn from(r: Rational) -> Self {
        Self::from_rational(r)
    }
}

impl From<Real> for Number {
    fn from(r: Real) -> Self {
        Self::Real(r)
    }
}

impl From<Interval> for Number {
    fn from(i: Interval) -> Self {
        Self::Interval(i)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Self::integer(n)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Rational(r) => write!(f, "{r}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Interval(i) => write!(f, "{i}"),
            Self::Infinity => f.write_str("oo"),
            Self::NegativeInfinity => f.write_str("-oo"),
            Self::NaN => f.write_str("nan"),
        }
    }
}
