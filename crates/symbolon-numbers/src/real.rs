//! Binary floating point numbers of arbitrary precision.
//!
//! A `Real` is the exact value `mantissa * 2^exponent`. The mantissa is odd
//! (or zero) so every value has exactly one representation, which keeps
//! structural equality and hashing in line with numeric equality. Every
//! arithmetic operation computes enough bits of the exact result to round
//! it once, to the ambient precision with the ambient rounding mode.

use num_traits::{One, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use crate::context::{self, PrecisionContext, RoundingMode};
use crate::error::NumberError;
use crate::{Integer, Rational};

const LOG10_2: f64 = std::f64::consts::LOG10_2;

/// An arbitrary precision binary float.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Real {
    man: Integer,
    exp: i64,
    bc: usize,
}

fn as_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Decides whether a truncated magnitude must be bumped by one unit.
///
/// `half` is the comparison of the discarded part with half a unit.
fn round_away(mode: RoundingMode, negative: bool, odd: bool, half: Ordering, inexact: bool) -> bool {
    match mode {
        RoundingMode::TowardZero => false,
        RoundingMode::AwayFromZero => inexact,
        RoundingMode::Floor => negative && inexact,
        RoundingMode::Ceiling => !negative && inexact,
        RoundingMode::HalfUp => half != Ordering::Less,
        RoundingMode::HalfDown => half == Ordering::Greater,
        RoundingMode::HalfEven => half == Ordering::Greater || (half == Ordering::Equal && odd),
    }
}

impl Real {
    /// The exact zero.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Builds `man * 2^exp` exactly, without rounding.
    #[must_use]
    pub fn from_parts(man: Integer, exp: i64) -> Self {
        if man.is_zero() {
            return Self::zero();
        }
        let tz = man.trailing_zeros();
        let man = man.shr(tz);
        let bc = man.bit_len();
        Self {
            man,
            exp: exp + as_i64(tz),
            bc,
        }
    }

    /// Rounds `man * 2^exp` to `prec` bits.
    ///
    /// `sticky` records that the exact value has nonzero bits beyond `man`
    /// (its magnitude is strictly larger than `|man| * 2^exp`).
    pub(crate) fn round_parts(
        man: Integer,
        exp: i64,
        sticky: bool,
        prec: usize,
        mode: RoundingMode,
    ) -> Self {
        if man.is_zero() {
            return Self::zero();
        }
        let negative = man.is_negative();
        let mut mag = man.abs();
        let mut exp = exp;
        if sticky && mag.bit_len() <= prec + 1 {
            let pad = prec + 2 - mag.bit_len();
            mag = mag.shl(pad);
            exp -= as_i64(pad);
        }
        let bc = mag.bit_len();
        if bc > prec {
            let shift = bc - prec;
            let kept = mag.shr(shift);
            let rem = &mag - &kept.shl(shift);
            let half_unit = Integer::one().shl(shift - 1);
            let half = match rem.cmp(&half_unit) {
                Ordering::Equal if sticky => Ordering::Greater,
                other => other,
            };
            let inexact = sticky || !rem.is_zero();
            mag = if round_away(mode, negative, kept.is_odd(), half, inexact) {
                kept + Integer::one()
            } else {
                kept
            };
            exp += as_i64(shift);
        }
        Self::from_parts(if negative { -mag } else { mag }, exp)
    }

    /// Rounds `n / d * 2^exp` to `prec` bits.
    pub(crate) fn div_parts(n: &Integer, d: &Integer, exp: i64, prec: usize, mode: RoundingMode) -> Self {
        if n.is_zero() {
            return Self::zero();
        }
        let shift = (prec + 3 + d.bit_len()).saturating_sub(n.bit_len());
        let num = n.shl(shift);
        let q = &num / d;
        let sticky = !(&num - &(&q * d)).is_zero();
        Self::round_parts(q, exp - as_i64(shift), sticky, prec, mode)
    }

    /// Rounds `self` to the ambient precision.
    #[must_use]
    pub fn round(&self) -> Self {
        let ctx = context::current();
        self.round_to(ctx.prec, ctx.mode)
    }

    /// Rounds `self` to `prec` bits with `mode`.
    #[must_use]
    pub fn round_to(&self, prec: usize, mode: RoundingMode) -> Self {
        if self.bc <= prec {
            return self.clone();
        }
        Self::round_parts(self.man.clone(), self.exp, false, prec, mode)
    }

    /// Converts an integer at the ambient precision.
    #[must_use]
    pub fn from_integer(n: &Integer) -> Self {
        let ctx = context::current();
        Self::round_parts(n.clone(), 0, false, ctx.prec, ctx.mode)
    }

    /// Converts a rational at the ambient precision.
    #[must_use]
    pub fn from_rational(r: &Rational) -> Self {
        let ctx = context::current();
        Self::from_rational_with(r, ctx)
    }

    pub(crate) fn from_rational_with(r: &Rational, ctx: PrecisionContext) -> Self {
        Self::div_parts(&r.numerator(), &r.denominator(), 0, ctx.prec, ctx.mode)
    }

    /// Converts a machine float exactly, then rounds to the ambient precision.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::Domain`] for NaN and infinite inputs.
    pub fn from_f64(value: f64) -> Result<Self, NumberError> {
        if !value.is_finite() {
            return Err(NumberError::domain(format!("{value} is not a finite real")));
        }
        if value == 0.0 {
            return Ok(Self::zero());
        }
        let bits = value.to_bits();
        let sign = if bits >> 63 == 0 { 1 } else { -1 };
        let biased = i64::try_from((bits >> 52) & 0x7ff).unwrap_or(0);
        let fraction = i64::try_from(bits & ((1u64 << 52) - 1)).unwrap_or(0);
        let (man, exp) = if biased == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1i64 << 52), biased - 1075)
        };
        Ok(Self::from_parts(Integer::new(sign * man), exp).round())
    }

    /// Parses a decimal literal such as `"0.1"` or `"-2.5e-3"`, going through
    /// the exact rational and rounding once.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::Parse`] on malformed input.
    pub fn parse(s: &str) -> Result<Self, NumberError> {
        Rational::parse(s).map(|r| Self::from_rational(&r))
    }

    /// The mantissa (odd, or zero).
    #[must_use]
    pub fn mantissa(&self) -> &Integer {
        &self.man
    }

    /// The binary exponent.
    #[must_use]
    pub fn exponent(&self) -> i64 {
        self.exp
    }

    /// Number of bits in the mantissa.
    #[must_use]
    pub fn bitcount(&self) -> usize {
        self.bc
    }

    /// The smallest `t` with `|self| < 2^t`.
    #[must_use]
    pub fn top(&self) -> i64 {
        self.exp + as_i64(self.bc)
    }

    /// Returns true for the zero value.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.man.is_zero()
    }

    /// Returns true if negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.man.is_negative()
    }

    /// Returns true if strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.man.is_positive()
    }

    /// Returns -1, 0 or 1.
    #[must_use]
    pub fn signum(&self) -> i8 {
        self.man.signum()
    }

    /// Returns true if the value is an integer.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.exp >= 0 || self.is_zero()
    }

    /// Absolute value (exact).
    #[must_use]
    pub fn abs(&self) -> Self {
        Self {
            man: self.man.abs(),
            exp: self.exp,
            bc: self.bc,
        }
    }

    /// Multiplies by `2^k` (exact).
    #[must_use]
    pub fn mul_pow2(&self, k: i64) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        Self {
            man: self.man.clone(),
            exp: self.exp + k,
            bc: self.bc,
        }
    }

    /// The exact rational value.
    #[must_use]
    pub fn to_rational(&self) -> Rational {
        let man = Rational::from_integer(self.man.clone());
        let scale = Rational::from_integer(Integer::one().shl(self.exp.unsigned_abs() as usize));
        if self.exp >= 0 {
            man * scale
        } else {
            man / scale
        }
    }

    /// Largest integer not greater than `self`.
    #[must_use]
    pub fn floor(&self) -> Integer {
        if self.exp >= 0 {
            return self.man.shl(self.exp.unsigned_abs() as usize);
        }
        if self.top() < 0 {
            return if self.is_negative() { -Integer::one() } else { Integer::zero() };
        }
        let divisor = Integer::one().shl(self.exp.unsigned_abs() as usize);
        self.man.div_rem_floor(&divisor).0
    }

    /// `self * 2^wp` truncated toward zero.
    #[must_use]
    pub fn to_fixed(&self, wp: usize) -> Integer {
        let shift = self.exp + as_i64(wp);
        if shift >= 0 {
            self.man.shl(shift.unsigned_abs() as usize)
        } else {
            self.man.shr(shift.unsigned_abs() as usize)
        }
    }

    /// Rounds the fixed point value `v * 2^-wp` to the ambient precision.
    #[must_use]
    pub fn from_fixed(v: Integer, wp: usize) -> Self {
        let ctx = context::current();
        Self::round_parts(v, -as_i64(wp), false, ctx.prec, ctx.mode)
    }

    /// Lossy conversion to a machine float.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let (man, exp) = if self.bc > 62 {
            let shift = self.bc - 62;
            (self.man.shr(shift), self.exp + as_i64(shift))
        } else {
            (self.man.clone(), self.exp)
        };
        let exp = i32::try_from(exp.clamp(-2000, 2000)).unwrap_or(0);
        man.to_f64() * 2f64.powi(exp)
    }

    /// Sum rounded to the ambient precision.
    #[must_use]
    pub fn add_real(&self, other: &Self) -> Self {
        let ctx = context::current();
        self.add_with(other, ctx.prec, ctx.mode)
    }

    pub(crate) fn add_with(&self, other: &Self, prec: usize, mode: RoundingMode) -> Self {
        if other.is_zero() {
            return self.round_to(prec, mode);
        }
        if self.is_zero() {
            return other.round_to(prec, mode);
        }
        let (big, small) = if self.top() >= other.top() {
            (self, other)
        } else {
            (other, self)
        };
        // When the smaller operand lies entirely below the rounding position
        // it only contributes a sticky bit.
        let k = (prec + 3).saturating_sub(big.bc);
        let low = big.exp - as_i64(k);
        if small.top() < low {
            let mut man = big.man.shl(k);
            if small.is_negative() != big.is_negative() {
                man = if man.is_negative() {
                    man + Integer::one()
                } else {
                    man - Integer::one()
                };
            }
            return Self::round_parts(man, low, true, prec, mode);
        }
        let exp = self.exp.min(other.exp);
        let a = self.man.shl((self.exp - exp).unsigned_abs() as usize);
        let b = other.man.shl((other.exp - exp).unsigned_abs() as usize);
        Self::round_parts(a + b, exp, false, prec, mode)
    }

    /// Difference rounded to the ambient precision.
    #[must_use]
    pub fn sub_real(&self, other: &Self) -> Self {
        self.add_real(&-other)
    }

    /// Product rounded to the ambient precision.
    #[must_use]
    pub fn mul_real(&self, other: &Self) -> Self {
        let ctx = context::current();
        self.mul_with(other, ctx.prec, ctx.mode)
    }

    pub(crate) fn mul_with(&self, other: &Self, prec: usize, mode: RoundingMode) -> Self {
        Self::round_parts(&self.man * &other.man, self.exp + other.exp, false, prec, mode)
    }

    /// Quotient rounded to the ambient precision.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::DivisionByZero`] when `other` is zero.
    pub fn div_real(&self, other: &Self) -> Result<Self, NumberError> {
        let ctx = context::current();
        self.div_with(other, ctx.prec, ctx.mode)
    }

    pub(crate) fn div_with(&self, other: &Self, prec: usize, mode: RoundingMode) -> Result<Self, NumberError> {
        if other.is_zero() {
            return Err(NumberError::DivisionByZero);
        }
        Ok(Self::div_parts(&self.man, &other.man, self.exp - other.exp, prec, mode))
    }

    /// Square root rounded to the ambient precision.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::Domain`] for negative input.
    pub fn sqrt(&self) -> Result<Self, NumberError> {
        self.nth_root(2)
    }

    /// Principal real `n`-th root rounded to the ambient precision.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::Domain`] for an even root of a negative value
    /// or `n == 0`.
    pub fn nth_root(&self, n: u32) -> Result<Self, NumberError> {
        if n == 0 {
            return Err(NumberError::domain("zeroth root"));
        }
        if self.is_zero() || n == 1 {
            return Ok(self.round());
        }
        if self.is_negative() {
            if n % 2 == 0 {
                return Err(NumberError::domain("even root of a negative real"));
            }
            return Ok(-self.abs().nth_root(n)?);
        }
        let ctx = context::current();
        let n_bits = n as usize;
        let mut shift = (n_bits * (ctx.prec + 3)).saturating_sub(self.bc);
        let residue = (self.exp - as_i64(shift)).rem_euclid(i64::from(n));
        shift += residue.unsigned_abs() as usize;
        let (root, exact) = self.man.shl(shift).nth_root(n);
        let exp = (self.exp - as_i64(shift)) / i64::from(n);
        Ok(Self::round_parts(root, exp, !exact, ctx.prec, ctx.mode))
    }

    /// Integer power rounded once to the ambient precision.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::DivisionByZero`] for a negative power of zero.
    pub fn powi(&self, k: i64) -> Result<Self, NumberError> {
        if k == 0 {
            return Ok(Self::from_parts(Integer::one(), 0));
        }
        if self.is_zero() {
            return if k < 0 { Err(NumberError::DivisionByZero) } else { Ok(Self::zero()) };
        }
        let ctx = context::current();
        let n = k.unsigned_abs();
        let exact_bits = (self.bc as u64).saturating_mul(n);
        if exact_bits <= 4 * ctx.prec as u64 + 512 {
            let e = u32::try_from(n).map_err(|_| NumberError::domain("exponent too large"))?;
            let man = self.man.pow(e);
            let exp = self.exp * k.abs();
            return Ok(if k > 0 {
                Self::round_parts(man, exp, false, ctx.prec, ctx.mode)
            } else {
                Self::div_parts(&Integer::one(), &man, -exp, ctx.prec, ctx.mode)
            });
        }
        let guard = 64 - u64::leading_zeros(n) as usize + 10;
        let work = PrecisionContext {
            prec: ctx.prec + guard,
            mode: RoundingMode::HalfEven,
        };
        let value = context::with_context(work, || -> Result<Self, NumberError> {
            let mut result = Self::from_parts(Integer::one(), 0);
            let mut base = self.clone();
            let mut e = n;
            while e > 0 {
                if e & 1 == 1 {
                    result = result.mul_real(&base);
                }
                base = base.mul_real(&base);
                e >>= 1;
            }
            if k < 0 {
                result = Self::from_parts(Integer::one(), 0).div_real(&result)?;
            }
            Ok(result)
        })?;
        Ok(value.round())
    }

    /// Decimal rendering with `dps` significant digits.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn to_decimal_string(&self, dps: usize) -> String {
        if self.is_zero() {
            return "0.0".to_string();
        }
        let dps = dps.max(1);
        let value = self.to_rational().abs();
        let upper = Integer::new(10).pow(u32::try_from(dps).unwrap_or(u32::MAX));
        let lower = Integer::new(10).pow(u32::try_from(dps - 1).unwrap_or(u32::MAX));
        let mut e10 = ((self.top() - 1) as f64 * LOG10_2).floor() as i64;
        let mut raised = false;
        let digits = loop {
            let shift = as_i64(dps) - 1 - e10;
            let ten = Rational::from(10);
            let scaled = if shift >= 0 {
                &value * &ten.pow(u32::try_from(shift).unwrap_or(u32::MAX))
            } else {
                &value / &ten.pow(u32::try_from(-shift).unwrap_or(u32::MAX))
            };
            let rounded = (scaled + Rational::from_i64(1, 2)).floor();
            if rounded >= upper {
                e10 += 1;
                raised = true;
            } else if rounded < lower && !raised {
                e10 -= 1;
            } else {
                break rounded;
            }
        };
        let text = digits.to_string();
        let text = text.trim_end_matches('0');
        let text = if text.is_empty() { "0" } else { text };
        let sign = if self.is_negative() { "-" } else { "" };
        let len = as_i64(text.len());
        let body = if (-5..as_i64(dps)).contains(&e10) {
            if e10 >= 0 {
                let int_len = e10 + 1;
                if len > int_len {
                    let split = int_len.unsigned_abs() as usize;
                    format!("{}.{}", &text[..split], &text[split..])
                } else {
                    let zeros = "0".repeat((int_len - len).unsigned_abs() as usize);
                    format!("{text}{zeros}.0")
                }
            } else {
                let zeros = "0".repeat((-e10 - 1).unsigned_abs() as usize);
                format!("0.{zeros}{text}")
            }
        } else {
            let frac = if text.len() > 1 { &text[1..] } else { "0" };
            let exp_sign = if e10 >= 0 { "+" } else { "" };
            format!("{}.{frac}e{exp_sign}{e10}", &text[..1])
        };
        format!("{sign}{body}")
    }
}

impl Ord for Real {
    fn cmp(&self, other: &Self) -> Ordering {
        let (sa, sb) = (self.signum(), other.signum());
        if sa != sb {
            return sa.cmp(&sb);
        }
        if sa == 0 {
            return Ordering::Equal;
        }
        let magnitude = if self.top() == other.top() {
            let exp = self.exp.min(other.exp);
            let a = self.man.abs().shl((self.exp - exp).unsigned_abs() as usize);
            let b = other.man.abs().shl((other.exp - exp).unsigned_abs() as usize);
            a.cmp(&b)
        } else {
            self.top().cmp(&other.top())
        };
        if sa < 0 {
            magnitude.reverse()
        } else {
            magnitude
        }
    }
}

impl PartialOrd for Real {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Neg for Real {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            man: -self.man,
            exp: self.exp,
            bc: self.bc,
        }
    }
}

impl Neg for &Real {
    type Output = Real;

    fn neg(self) -> Self::Output {
        -self.clone()
    }
}

impl Add for &Real {
    type Output = Real;

    fn add(self, rhs: Self) -> Self::Output {
        self.add_real(rhs)
    }
}

impl Add for Real {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.add_real(&rhs)
    }
}

impl Sub for &Real {
    type Output = Real;

    fn sub(self, rhs: Self) -> Self::Output {
        self.sub_real(rhs)
    }
}

impl Sub for Real {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.sub_real(&rhs)
    }
}

impl Mul for &Real {
    type Output = Real;

    fn mul(self, rhs: Self) -> Self::Output {
        self.mul_real(rhs)
    }
}

impl Mul for Real {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.mul_real(&rhs)
    }
}

impl From<i64> for Real {
    fn from(value: i64) -> Self {
        Self::from_integer(&Integer::new(value))
    }
}

impl FromStr for Real {
    type Err = NumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Real({}*2^{})", self.man, self.exp)
    }
}

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string(context::getdps()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{setmode, with_context};

    fn at(prec: usize, mode: RoundingMode) -> PrecisionContext {
        PrecisionContext { prec, mode }
    }

    #[test]
    fn test_normalized_representation() {
        let r = Real::from_parts(Integer::new(12), 0);
        assert_eq!(r.mantissa(), &Integer::new(3));
        assert_eq!(r.exponent(), 2);
        assert_eq!(r.bitcount(), 2);
        assert_eq!(r, Real::from(12));
    }

    #[test]
    fn test_zero_has_no_sign() {
        let zero = Real::zero();
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
        assert_eq!(zero.signum(), 0);
        assert!(Real::from(3).is_positive());
    }

    #[test]
    fn test_rounding_modes() {
        // 11 = 0b1011 rounded to 3 bits sits exactly between 10 and 12.
        let cases = [
            (RoundingMode::TowardZero, 10, -10),
            (RoundingMode::AwayFromZero, 12, -12),
            (RoundingMode::Floor, 10, -12),
            (RoundingMode::Ceiling, 12, -10),
            (RoundingMode::HalfUp, 12, -12),
            (RoundingMode::HalfDown, 10, -10),
            (RoundingMode::HalfEven, 12, -12),
        ];
        for (mode, pos, neg) in cases {
            let up = Real::round_parts(Integer::new(11), 0, false, 3, mode);
            let down = Real::round_parts(Integer::new(-11), 0, false, 3, mode);
            assert_eq!(up, Real::from_parts(Integer::new(pos), 0), "{mode:?}");
            assert_eq!(down, Real::from_parts(Integer::new(neg), 0), "{mode:?}");
        }
    }

    #[test]
    fn test_half_even_ties() {
        // 9 = 0b1001 to 3 bits: tie between 8 and 10, 8 has even mantissa.
        let r = Real::round_parts(Integer::new(9), 0, false, 3, RoundingMode::HalfEven);
        assert_eq!(r, Real::from_parts(Integer::new(8), 0));
        let r = Real::round_parts(Integer::new(9), 0, true, 3, RoundingMode::HalfEven);
        assert_eq!(r, Real::from_parts(Integer::new(10), 0));
    }

    #[test]
    fn test_decimal_sum_at_high_precision() {
        with_context(at(context::dps_to_prec(30), RoundingMode::HalfEven), || {
            let a = Real::parse("0.1").unwrap();
            let b = Real::parse("0.2").unwrap();
            let c = Real::parse("0.3").unwrap();
            let diff = (&(&a + &b) - &c).abs();
            let tolerance = Real::parse("1e-29").unwrap();
            assert!(diff < tolerance);
            assert_eq!((&a + &b).to_decimal_string(30), "0.3");
        });
    }

    #[test]
    fn test_double_precision_matches_ieee() {
        let a = Real::parse("0.1").unwrap();
        let b = Real::parse("0.2").unwrap();
        assert_eq!((&a + &b).to_f64(), 0.1 + 0.2);
        assert_eq!(Real::from_f64(0.1).unwrap(), a);
    }

    #[test]
    fn test_cancellation_is_exact() {
        let a = Real::from(1);
        let tiny = Real::from_parts(Integer::one(), -200);
        let sum = &a + &tiny;
        assert_eq!(sum, a);
        let diff = &a - &tiny;
        assert_eq!(diff, a);
        setmode(RoundingMode::Floor);
        let diff = &a - &tiny;
        assert!(diff < a);
    }

    #[test]
    fn test_division_and_roots() {
        let third = Real::from(1).div_real(&Real::from(3)).unwrap();
        assert!((third.to_f64() - 1.0 / 3.0).abs() < 1e-16);
        assert!(Real::from(1).div_real(&Real::zero()).is_err());
        assert_eq!(Real::from(49).sqrt().unwrap(), Real::from(7));
        assert_eq!(Real::from(-27).nth_root(3).unwrap(), Real::from(-3));
        assert!(Real::from(-4).sqrt().is_err());
        let sqrt2 = Real::from(2).sqrt().unwrap();
        assert_eq!(sqrt2.to_f64(), std::f64::consts::SQRT_2);
    }

    #[test]
    fn test_powi() {
        assert_eq!(Real::from(3).powi(4).unwrap(), Real::from(81));
        assert_eq!(Real::from(2).powi(-2).unwrap(), Real::parse("0.25").unwrap());
        let big = Real::parse("1.0001").unwrap().powi(100_000).unwrap();
        assert!((big.to_f64() - 1.0001f64.powi(100_000)).abs() / big.to_f64() < 1e-9);
    }

    #[test]
    fn test_ordering_and_floor() {
        assert!(Real::from(-3) < Real::from(2));
        assert!(Real::parse("2.5").unwrap() > Real::from(2));
        assert_eq!(Real::parse("-2.5").unwrap().floor(), Integer::new(-3));
        assert_eq!(Real::parse("0.001").unwrap().floor(), Integer::new(0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Real::from(2).to_string(), "2.0");
        assert_eq!(Real::parse("-1.5").unwrap().to_string(), "-1.5");
        assert_eq!(Real::parse("0.001").unwrap().to_decimal_string(5), "0.001");
        assert_eq!(Real::parse("1e20").unwrap().to_decimal_string(5), "1.0e+20");
        assert_eq!(Real::parse("1.5e-7").unwrap().to_decimal_string(5), "1.5e-7");
    }
}
