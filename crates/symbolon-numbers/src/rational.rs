//! Arbitrary precision rational numbers.
//!
//! Exact quotients kept in lowest terms. A zero denominator is not
//! representable here; the number tower maps it to a signed infinity.

use dashu::base::{Abs, Inverse, Signed as DashuSigned, UnsignedAbs};
use dashu::rational::RBig;
use num_traits::{One, Zero};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::error::NumberError;
use crate::Integer;

/// An arbitrary precision rational number.
///
/// Rationals are always stored in lowest terms with a positive denominator.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Rational(RBig);

impl Rational {
    /// Creates a new rational from numerator and denominator.
    ///
    /// # Panics
    ///
    /// Panics if the denominator is zero.
    #[must_use]
    pub fn new(numerator: Integer, denominator: Integer) -> Self {
        assert!(!denominator.is_zero(), "denominator cannot be zero");
        let negative = denominator.is_negative();
        let r = Self(RBig::from_parts(
            numerator.into_inner(),
            denominator.into_inner().unsigned_abs(),
        ));
        if negative {
            -r
        } else {
            r
        }
    }

    /// Creates `numerator / denominator`, or `None` for a zero denominator.
    #[must_use]
    pub fn checked_new(numerator: Integer, denominator: Integer) -> Option<Self> {
        if denominator.is_zero() {
            return None;
        }
        let negative = denominator.is_negative();
        let r = Self(RBig::from_parts(
            numerator.into_inner(),
            denominator.into_inner().unsigned_abs(),
        ));
        Some(if negative { -r } else { r })
    }

    /// Creates a rational from an integer (denominator = 1).
    #[must_use]
    pub fn from_integer(n: Integer) -> Self {
        Self(RBig::from(n.into_inner()))
    }

    /// Creates a rational from i64 numerator and denominator.
    ///
    /// # Panics
    ///
    /// Panics if the denominator is zero.
    #[must_use]
    pub fn from_i64(numerator: i64, denominator: i64) -> Self {
        Self::new(Integer::new(numerator), Integer::new(denominator))
    }

    /// Returns the numerator.
    #[must_use]
    pub fn numerator(&self) -> Integer {
        Integer::from(self.0.numerator().clone())
    }

    /// Returns the denominator.
    #[must_use]
    pub fn denominator(&self) -> Integer {
        Integer::from(dashu::integer::IBig::from(self.0.denominator().clone()))
    }

    /// Returns true if this rational is an integer.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.0.denominator().is_one()
    }

    /// Converts to an integer if the denominator is 1.
    #[must_use]
    pub fn to_integer(&self) -> Option<Integer> {
        if self.is_integer() {
            Some(self.numerator())
        } else {
            None
        }
    }

    /// Returns the absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.clone().abs())
    }

    /// Returns the reciprocal (1/x).
    ///
    /// # Panics
    ///
    /// Panics if the rational is zero.
    #[must_use]
    pub fn recip(&self) -> Self {
        assert!(!self.is_zero(), "cannot take reciprocal of zero");
        Self(self.0.clone().inv())
    }

    /// Returns the sign: -1, 0, or 1.
    #[must_use]
    pub fn signum(&self) -> i8 {
        if self.0.is_zero() {
            0
        } else if DashuSigned::is_positive(&self.0) {
            1
        } else {
            -1
        }
    }

    /// Returns true if negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        DashuSigned::is_negative(&self.0)
    }

    /// Returns true if strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        // dashu counts zero as positive
        !self.0.is_zero() && DashuSigned::is_positive(&self.0)
    }

    /// Largest integer not greater than `self`.
    #[must_use]
    pub fn floor(&self) -> Integer {
        self.numerator().div_rem_floor(&self.denominator()).0
    }

    /// Smallest integer not less than `self`.
    #[must_use]
    pub fn ceil(&self) -> Integer {
        -(-self).floor()
    }

    /// Parses `"p"`, `"p/q"` or a plain decimal such as `"-1.25"` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::Parse`] on malformed input and
    /// [`NumberError::DivisionByZero`] for `"p/0"`.
    pub fn parse(s: &str) -> Result<Self, NumberError> {
        let s = s.trim();
        if let Some((p, q)) = s.split_once('/') {
            let p = Integer::from_str_radix(p.trim(), 10)?;
            let q = Integer::from_str_radix(q.trim(), 10)?;
            return Self::checked_new(p, q).ok_or(NumberError::DivisionByZero);
        }
        let (mantissa, exp10) = match s.split_once(['e', 'E']) {
            Some((m, e)) => (
                m,
                e.parse::<i64>()
                    .map_err(|_| NumberError::Parse(s.to_string()))?,
            ),
            None => (s, 0),
        };
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int_part.trim_start_matches(['+', '-']).is_empty() && frac_part.is_empty() {
            return Err(NumberError::Parse(s.to_string()));
        }
        let numer = Integer::from_str_radix(&format!("{int_part}{frac_part}"), 10)?;
        let scale = exp10 - i64::try_from(frac_part.len()).unwrap_or(i64::MAX);
        let ten = Self::from(10);
        let value = Self::from_integer(numer);
        let exponent = u32::try_from(scale.unsigned_abs())
            .map_err(|_| NumberError::Parse(s.to_string()))?;
        Ok(if scale >= 0 {
            value * ten.pow(exponent)
        } else {
            value / ten.pow(exponent)
        })
    }

    /// Lossy conversion used for diagnostics and size estimates.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        let (n, d) = (self.numerator(), self.denominator());
        let shift = n.bit_len().saturating_sub(d.bit_len());
        if shift > 60 || d.bit_len() > 60 {
            let scaled = n.shl(64) / d;
            return scaled.to_f64() / 2f64.powi(64);
        }
        n.to_f64() / d.to_f64()
    }

    /// Returns the inner `dashu::RBig`.
    #[must_use]
    pub fn into_inner(self) -> RBig {
        self.0
    }

    /// Returns a reference to the inner `dashu::RBig`.
    #[must_use]
    pub fn as_inner(&self) -> &RBig {
        &self.0
    }

    /// Computes self^exp for non-negative exp.
    #[must_use]
    pub fn pow(&self, exp: u32) -> Self {
        Self(self.0.pow(exp as usize))
    }

    /// Computes self^exp for a signed exponent.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::DivisionByZero`] for a negative power of zero.
    pub fn powi(&self, exp: i64) -> Result<Self, NumberError> {
        let magnitude =
            u32::try_from(exp.unsigned_abs()).map_err(|_| NumberError::domain("exponent too large"))?;
        if exp >= 0 {
            Ok(self.pow(magnitude))
        } else if self.is_zero() {
            Err(NumberError::DivisionByZero)
        } else {
            Ok(self.recip().pow(magnitude))
        }
    }
}

impl Zero for Rational {
    fn zero() -> Self {
        Self(RBig::ZERO)
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl One for Rational {
    fn one() -> Self {
        Self(RBig::ONE)
    }

    fn is_one(&self) -> bool {
        self.0 == RBig::ONE
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({})", self.0)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.numerator())
        } else {
            write!(f, "{}/{}", self.numerator(), self.denominator())
        }
    }
}

// Arithmetic operations
impl Add for Rational {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Add<&Rational> for Rational {
    type Output = Self;

    fn add(self, rhs: &Rational) -> Self::Output {
        Self(self.0 + &rhs.0)
    }
}

impl Add for &Rational {
    type Output = Rational;

    fn add(self, rhs: Self) -> Self::Output {
        Rational(&self.0 + &rhs.0)
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sub<&Rational> for Rational {
    type Output = Self;

    fn sub(self, rhs: &Rational) -> Self::Output {
        Self(self.0 - &rhs.0)
    }
}

impl Sub for &Rational {
    type Output = Rational;

    fn sub(self, rhs: Self) -> Self::Output {
        Rational(&self.0 - &rhs.0)
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl Mul<&Rational> for Rational {
    type Output = Self;

    fn mul(self, rhs: &Rational) -> Self::Output {
        Self(self.0 * &rhs.0)
    }
}

impl Mul for &Rational {
    type Output = Rational;

    fn mul(self, rhs: Self) -> Self::Output {
        Rational(&self.0 * &rhs.0)
    }
}

impl Div for Rational {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Self(self.0 / rhs.0)
    }
}

impl Div<&Rational> for Rational {
    type Output = Self;

    fn div(self, rhs: &Rational) -> Self::Output {
        Self(self.0 / &rhs.0)
    }
}

impl Div for &Rational {
    type Output = Rational;

    fn div(self, rhs: Self) -> Self::Output {
        Rational(&self.0 / &rhs.0)
    }
}

impl Neg for Rational {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Self::Output {
        Rational(-&self.0)
    }
}

impl From<Integer> for Rational {
    fn from(n: Integer) -> Self {
        Self::from_integer(n)
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_integer(Integer::new(n))
    }
}

impl From<i32> for Rational {
    fn from(n: i32) -> Self {
        Self::from_integer(Integer::new(i64::from(n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_ops() {
        let a = Rational::from_i64(1, 2);
        let b = Rational::from_i64(1, 3);

        let sum = a.clone() + b.clone();
        assert_eq!(sum.numerator().to_i64(), Some(5));
        assert_eq!(sum.denominator().to_i64(), Some(6));

        let prod = a.clone() * b.clone();
        assert_eq!(prod.numerator().to_i64(), Some(1));
        assert_eq!(prod.denominator().to_i64(), Some(6));
    }

    #[test]
    fn test_sign_predicates() {
        assert!(!Rational::from_i64(0, 3).is_positive());
        assert!(Rational::from_i64(1, 3).is_positive());
        assert!(Rational::from_i64(-1, 3).is_negative());
    }

    #[test]
    fn test_reduction() {
        let r = Rational::from_i64(4, 6);
        assert_eq!(r.numerator().to_i64(), Some(2));
        assert_eq!(r.denominator().to_i64(), Some(3));
    }

    #[test]
    fn test_negative_denominator() {
        let r = Rational::from_i64(3, -6);
        assert_eq!(r, Rational::from_i64(-1, 2));
        assert!(Rational::checked_new(Integer::new(1), Integer::new(0)).is_none());
    }

    #[test]
    fn test_floor_ceil() {
        let r = Rational::from_i64(-7, 2);
        assert_eq!(r.floor(), Integer::new(-4));
        assert_eq!(r.ceil(), Integer::new(-3));
        assert_eq!(Rational::from_i64(7, 2).floor(), Integer::new(3));
    }

    #[test]
    fn test_parse() {
        assert_eq!(Rational::parse("0.1").unwrap(), Rational::from_i64(1, 10));
        assert_eq!(Rational::parse("-1.25").unwrap(), Rational::from_i64(-5, 4));
        assert_eq!(Rational::parse("3/4").unwrap(), Rational::from_i64(3, 4));
        assert_eq!(Rational::parse("2e3").unwrap(), Rational::from(2000));
        assert_eq!(Rational::parse("1/0"), Err(NumberError::DivisionByZero));
        assert!(Rational::parse("abc").is_err());
    }

    #[test]
    fn test_powi() {
        let half = Rational::from_i64(1, 2);
        assert_eq!(half.powi(-3).unwrap(), Rational::from(8));
        assert!(Rational::from(0).powi(-1).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Rational::from_i64(3, 1).to_string(), "3");
        assert_eq!(Rational::from_i64(2, 3).to_string(), "2/3");
    }
}
