//! Arbitrary precision integers.
//!
//! A thin wrapper around `dashu::IBig` carrying the operations the
//! canonicaliser and the float layer need: roots, shifts, primality and
//! combinatorial helpers.

use dashu::base::{Abs, BitTest, Gcd, Signed as DashuSigned, UnsignedAbs};
use dashu::integer::IBig;
use num_traits::{One, Zero};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

use crate::error::NumberError;

/// An arbitrary precision integer.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Integer(IBig);

impl Integer {
    /// Creates a new integer from an i64.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(IBig::from(value))
    }

    /// Parses an integer in the given base.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::Parse`] if the string is not a valid integer.
    pub fn from_str_radix(s: &str, radix: u32) -> Result<Self, NumberError> {
        IBig::from_str_radix(s, radix)
            .map(Self)
            .map_err(|_| NumberError::Parse(s.to_string()))
    }

    /// Returns the absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.clone().abs())
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

    /// Returns true if this integer is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        DashuSigned::is_negative(&self.0)
    }

    /// Returns true if this integer is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        // dashu counts zero as positive
        !self.0.is_zero() && DashuSigned::is_positive(&self.0)
    }

    /// Returns true if the lowest bit is clear.
    #[must_use]
    pub fn is_even(&self) -> bool {
        !(&self.0).unsigned_abs().bit(0)
    }

    /// Returns true if the lowest bit is set.
    #[must_use]
    pub fn is_odd(&self) -> bool {
        !self.is_even()
    }

    /// Returns the number of bits of `|self|`.
    #[must_use]
    pub fn bit_len(&self) -> usize {
        (&self.0).unsigned_abs().bit_len()
    }

    /// Number of trailing zero bits of `|self|`; zero for zero.
    #[must_use]
    pub fn trailing_zeros(&self) -> usize {
        if self.is_zero() {
            return 0;
        }
        let magnitude = (&self.0).unsigned_abs();
        let mut count = 0;
        while !magnitude.bit(count) {
            count += 1;
        }
        count
    }

    /// Multiplies by `2^bits`.
    #[must_use]
    pub fn shl(&self, bits: usize) -> Self {
        Self(self.0.clone() << bits)
    }

    /// Divides `|self|` by `2^bits`, truncating, and restores the sign.
    #[must_use]
    pub fn shr(&self, bits: usize) -> Self {
        let magnitude = IBig::from((&self.0).unsigned_abs() >> bits);
        if self.is_negative() {
            Self(-magnitude)
        } else {
            Self(magnitude)
        }
    }

    /// Computes the greatest common divisor.
    #[must_use]
    pub fn gcd(&self, other: &Self) -> Self {
        Self(IBig::from(self.0.clone().gcd(other.0.clone())))
    }

    /// Computes the least common multiple.
    #[must_use]
    pub fn lcm(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let g = self.gcd(other);
        Self(&self.0 / &g.0 * &other.0).abs()
    }

    /// Returns the inner `dashu::IBig`.
    #[must_use]
    pub fn into_inner(self) -> IBig {
        self.0
    }

    /// Returns a reference to the inner `dashu::IBig`.
    #[must_use]
    pub fn as_inner(&self) -> &IBig {
        &self.0
    }

    /// Attempts to convert to an i64.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        self.0.clone().try_into().ok()
    }

    /// Attempts to convert to a u32.
    #[must_use]
    pub fn to_u32(&self) -> Option<u32> {
        self.0.clone().try_into().ok()
    }

    /// Lossy conversion used for diagnostics and size estimates.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        let bits = self.bit_len();
        if bits <= 63 {
            return self.to_i64().map_or(0.0, |v| v as f64);
        }
        let shift = bits - 63;
        let top = self.shr(shift).to_i64().unwrap_or(0) as f64;
        top * 2f64.powi(i32::try_from(shift).unwrap_or(i32::MAX))
    }

    /// Computes self^exp.
    #[must_use]
    pub fn pow(&self, exp: u32) -> Self {
        Self(self.0.pow(exp as usize))
    }

    /// Floor division and remainder with a non-negative remainder.
    #[must_use]
    pub fn div_rem_floor(&self, other: &Self) -> (Self, Self) {
        let q = &self.0 / &other.0;
        let r = &self.0 - &q * &other.0;
        if !r.is_zero() && (DashuSigned::is_negative(&r) != DashuSigned::is_negative(&other.0)) {
            (Self(q - IBig::ONE), Self(r + &other.0))
        } else {
            (Self(q), Self(r))
        }
    }

    /// Rounds `self / other` to the nearest integer, ties away from zero.
    #[must_use]
    pub fn div_round(&self, other: &Self) -> Self {
        let negative = self.is_negative() != other.is_negative();
        let (a, b) = (self.abs(), other.abs());
        let q = (a.shl(1) + &b) / b.shl(1);
        if negative {
            -q
        } else {
            q
        }
    }

    /// Floor of the `n`-th root of a non-negative integer, and whether the
    /// root is exact.
    ///
    /// # Panics
    ///
    /// Panics if `self` is negative or `n` is zero.
    #[must_use]
    pub fn nth_root(&self, n: u32) -> (Self, bool) {
        assert!(!self.is_negative(), "root of a negative integer");
        assert!(n > 0, "zeroth root");
        if n == 1 || self.bit_len() <= 1 {
            return (self.clone(), true);
        }
        let n_big = Self::new(i64::from(n));
        let n_minus_one = Self::new(i64::from(n - 1));
        // Start above the root so Newton's iteration decreases monotonically.
        let mut x = Self::one().shl(self.bit_len() / n as usize + 1);
        loop {
            let y = (&x * &n_minus_one + &(self / &x.pow(n - 1))) / n_big.clone();
            if y >= x {
                break;
            }
            x = y;
        }
        let exact = &x.pow(n) == self;
        (x, exact)
    }

    /// Integer square root (floor).
    #[must_use]
    pub fn isqrt(&self) -> Self {
        self.nth_root(2).0
    }

    /// Modular exponentiation `self^exp mod modulus`.
    #[must_use]
    pub fn pow_mod(&self, exp: &Self, modulus: &Self) -> Self {
        let mut result = Self::one();
        let mut base = self.div_rem_floor(modulus).1;
        let mut e = exp.clone();
        let two = Self::new(2);
        while !e.is_zero() {
            if e.is_odd() {
                result = (&result * &base).div_rem_floor(modulus).1;
            }
            base = (&base * &base).div_rem_floor(modulus).1;
            e = e / two.clone();
        }
        result
    }

    /// Miller-Rabin with the first twelve prime bases; deterministic for
    /// every value below 3.3·10^24 and a strong probable-prime test beyond.
    #[must_use]
    pub fn is_probable_prime(&self) -> bool {
        const BASES: [i64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];
        if self <= &Self::one() {
            return false;
        }
        for &p in &BASES {
            let p = Self::new(p);
            if self == &p {
                return true;
            }
            if self.div_rem_floor(&p).1.is_zero() {
                return false;
            }
        }
        let one = Self::one();
        let n_minus_one = self - &one;
        let s = n_minus_one.trailing_zeros();
        let d = n_minus_one.shr(s);
        'witness: for &a in &BASES {
            let mut x = Self::new(a).pow_mod(&d, self);
            if x == one || x == n_minus_one {
                continue;
            }
            for _ in 1..s {
                x = (&x * &x).div_rem_floor(self).1;
                if x == n_minus_one {
                    continue 'witness;
                }
            }
            return false;
        }
        true
    }

    /// `n!` for small `n`.
    #[must_use]
    pub fn factorial(n: u32) -> Self {
        (2..=i64::from(n)).fold(Self::one(), |acc, k| acc * Self::new(k))
    }

    /// Binomial coefficient `C(n, k)`.
    #[must_use]
    pub fn binomial(n: u32, k: u32) -> Self {
        if k > n {
            return Self::zero();
        }
        let k = k.min(n - k);
        let mut result = Self::one();
        for i in 0..k {
            result = result * Self::new(i64::from(n - i)) / Self::new(i64::from(i + 1));
        }
        result
    }
}

impl Zero for Integer {
    fn zero() -> Self {
        Self(IBig::ZERO)
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl One for Integer {
    fn one() -> Self {
        Self(IBig::ONE)
    }

    fn is_one(&self) -> bool {
        self.0 == IBig::ONE
    }
}

impl fmt::Debug for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Integer({})", self.0)
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Integer {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Add<&Integer> for Integer {
    type Output = Self;

    fn add(self, rhs: &Integer) -> Self::Output {
        Self(self.0 + &rhs.0)
    }
}

impl Add for &Integer {
    type Output = Integer;

    fn add(self, rhs: Self) -> Self::Output {
        Integer(&self.0 + &rhs.0)
    }
}

impl Sub for Integer {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sub<&Integer> for Integer {
    type Output = Self;

    fn sub(self, rhs: &Integer) -> Self::Output {
        Self(self.0 - &rhs.0)
    }
}

impl Sub for &Integer {
    type Output = Integer;

    fn sub(self, rhs: Self) -> Self::Output {
        Integer(&self.0 - &rhs.0)
    }
}

impl Mul for Integer {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl Mul<&Integer> for Integer {
    type Output = Self;

    fn mul(self, rhs: &Integer) -> Self::Output {
        Self(self.0 * &rhs.0)
    }
}

impl Mul for &Integer {
    type Output = Integer;

    fn mul(self, rhs: Self) -> Self::Output {
        Integer(&self.0 * &rhs.0)
    }
}

impl Div for Integer {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Self(self.0 / rhs.0)
    }
}

impl Div<&Integer> for Integer {
    type Output = Self;

    fn div(self, rhs: &Integer) -> Self::Output {
        Self(self.0 / &rhs.0)
    }
}

impl Div for &Integer {
    type Output = Integer;

    fn div(self, rhs: Self) -> Self::Output {
        Integer(&self.0 / &rhs.0)
    }
}

impl Rem for Integer {
    type Output = Self;

    fn rem(self, rhs: Self) -> Self::Output {
        Self(self.0 % rhs.0)
    }
}

impl Neg for Integer {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Neg for &Integer {
    type Output = Integer;

    fn neg(self) -> Self::Output {
        Integer(-&self.0)
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<i32> for Integer {
    fn from(value: i32) -> Self {
        Self::new(i64::from(value))
    }
}

impl From<u32> for Integer {
    fn from(value: u32) -> Self {
        Self::new(i64::from(value))
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Self(IBig::from(value))
    }
}

impl From<IBig> for Integer {
    fn from(value: IBig) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_ops() {
        let a = Integer::new(10);
        let b = Integer::new(3);

        assert_eq!((a.clone() + b.clone()).to_i64(), Some(13));
        assert_eq!((a.clone() - b.clone()).to_i64(), Some(7));
        assert_eq!((a.clone() * b.clone()).to_i64(), Some(30));
        assert_eq!((a.clone() / b.clone()).to_i64(), Some(3));
        assert_eq!((a % b).to_i64(), Some(1));
    }

    #[test]
    fn test_sign_predicates() {
        let zero = Integer::new(0);
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
        assert!(Integer::new(5).is_positive());
        assert!(Integer::new(-5).is_negative());
    }

    #[test]
    fn test_gcd() {
        let a = Integer::new(48);
        let b = Integer::new(18);
        assert_eq!(a.gcd(&b).to_i64(), Some(6));
        assert_eq!(a.lcm(&b).to_i64(), Some(144));
    }

    #[test]
    fn test_nth_root() {
        assert_eq!(Integer::new(27).nth_root(3), (Integer::new(3), true));
        assert_eq!(Integer::new(30).nth_root(3), (Integer::new(3), false));
        assert_eq!(Integer::new(1 << 40).isqrt(), Integer::new(1 << 20));
    }

    #[test]
    fn test_shifts_and_bits() {
        let a = Integer::new(-40);
        assert_eq!(a.trailing_zeros(), 3);
        assert_eq!(a.shr(3), Integer::new(-5));
        assert_eq!(Integer::new(5).shl(2), Integer::new(20));
        assert_eq!(Integer::new(255).bit_len(), 8);
    }

    #[test]
    fn test_floor_division() {
        let (q, r) = Integer::new(-7).div_rem_floor(&Integer::new(2));
        assert_eq!((q, r), (Integer::new(-4), Integer::new(1)));
        assert_eq!(Integer::new(7).div_round(&Integer::new(2)), Integer::new(4));
        assert_eq!(Integer::new(-7).div_round(&Integer::new(2)), Integer::new(-4));
    }

    #[test]
    fn test_primality() {
        let primes: Vec<i64> = (0..40).filter(|&n| Integer::new(n).is_probable_prime()).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37]);
        assert!(Integer::new(1_000_000_007).is_probable_prime());
        assert!(!Integer::new(561).is_probable_prime());
    }

    #[test]
    fn test_combinatorics() {
        assert_eq!(Integer::factorial(5), Integer::new(120));
        assert_eq!(Integer::binomial(6, 2), Integer::new(15));
        assert_eq!(Integer::binomial(2, 6), Integer::new(0));
    }

    #[test]
    fn test_large_numbers() {
        let a = Integer::from_str_radix("123456789012345678901234567890", 10).unwrap();
        let b = Integer::from_str_radix("987654321098765432109876543210", 10).unwrap();
        let sum = a + b;
        assert_eq!(sum.to_string(), "1111111110111111111011111111100");
        assert!(Integer::from_str_radix("12x", 10).is_err());
    }
}
