//! Elementary functions on `Real`.
//!
//! Everything is computed in fixed point: an integer `V` stands for
//! `V * 2^-wp` where `wp` is the working precision plus guard bits. Results
//! are rounded once to the ambient precision.

use num_traits::{One, Zero};

use crate::context;
use crate::error::NumberError;
use crate::{Integer, Real};

const GUARD: usize = 30;

fn one_fixed(wp: usize) -> Integer {
    Integer::one().shl(wp)
}

fn mul_fixed(a: &Integer, b: &Integer, wp: usize) -> Integer {
    (a * b).shr(wp)
}

/// `atanh(1/n)` in fixed point.
fn atanh_inv(n: i64, wp: usize) -> Integer {
    let n_sq = Integer::new(n * n);
    let mut power = one_fixed(wp) / Integer::new(n);
    let mut sum = power.clone();
    let mut k = 1i64;
    loop {
        power = power / n_sq.clone();
        let term = &power / &Integer::new(2 * k + 1);
        if term.is_zero() {
            break sum;
        }
        sum = sum + term;
        k += 1;
    }
}

/// `atan(1/n)` in fixed point.
fn atan_inv(n: i64, wp: usize) -> Integer {
    let n_sq = Integer::new(n * n);
    let mut power = one_fixed(wp) / Integer::new(n);
    let mut sum = power.clone();
    let mut k = 1i64;
    loop {
        power = power / n_sq.clone();
        let term = &power / &Integer::new(2 * k + 1);
        if term.is_zero() {
            break sum;
        }
        sum = if k % 2 == 1 { sum - term } else { sum + term };
        k += 1;
    }
}

/// `ln 2 = 2 atanh(1/3)`.
fn ln2_fixed(wp: usize) -> Integer {
    let extra = wp + 10;
    atanh_inv(3, extra).shl(1).shr(10)
}

/// Machin: `pi = 16 atan(1/5) - 4 atan(1/239)`.
fn pi_fixed(wp: usize) -> Integer {
    let extra = wp + 10;
    let pi = atan_inv(5, extra).shl(4) - atan_inv(239, extra).shl(2);
    pi.shr(10)
}

/// Brent-McMillan with `n = 2^p`.
fn euler_gamma_fixed(wp: usize) -> Integer {
    let wp = wp + GUARD;
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let p = ((wp as f64 / 4.0 * std::f64::consts::LN_2).log2() as usize) + 1;
    let n_sq = Integer::one().shl(2 * p);
    let mut a = -(ln2_fixed(wp) * Integer::new(i64::try_from(p).unwrap_or(i64::MAX)));
    let mut b = one_fixed(wp);
    let mut u = a.clone();
    let mut v = b.clone();
    let hundred = Integer::new(100);
    let mut k = 1i64;
    loop {
        let kk = Integer::new(k);
        b = &b * &n_sq / Integer::new(k * k);
        a = (&a * &n_sq / kk.clone() + &b) / kk;
        u = u + &a;
        v = v + &b;
        if a.abs() < hundred && b.abs() < hundred {
            break;
        }
        k += 1;
    }
    u.shl(wp - GUARD) / v
}

/// Fixed point `exp(r)` for `|r| <= 1`, with `halvings` argument halvings.
fn exp_fixed(r: &Integer, wp: usize, halvings: usize) -> Integer {
    let r = r.shr(halvings);
    let one = one_fixed(wp);
    let mut sum = one.clone();
    let mut term = one;
    let mut k = 1i64;
    loop {
        term = mul_fixed(&term, &r, wp) / Integer::new(k);
        if term.is_zero() {
            break;
        }
        sum = sum + &term;
        k += 1;
    }
    for _ in 0..halvings {
        sum = mul_fixed(&sum, &sum, wp);
    }
    sum
}

/// Fixed point `(sin r, cos r)` for `|r| <= pi/4`.
fn sin_cos_fixed(r: &Integer, wp: usize) -> (Integer, Integer) {
    let r_sq = mul_fixed(r, r, wp);
    let mut sin = r.clone();
    let mut term = r.clone();
    let mut k = 1i64;
    loop {
        term = -(mul_fixed(&term, &r_sq, wp) / Integer::new((2 * k) * (2 * k + 1)));
        if term.is_zero() {
            break;
        }
        sin = sin + &term;
        k += 1;
    }
    let mut cos = one_fixed(wp);
    let mut term = cos.clone();
    let mut k = 1i64;
    loop {
        term = -(mul_fixed(&term, &r_sq, wp) / Integer::new((2 * k - 1) * (2 * k)));
        if term.is_zero() {
            break;
        }
        cos = cos + &term;
        k += 1;
    }
    (sin, cos)
}

fn wp_for(x: &Real) -> usize {
    context::getprec() + GUARD + usize::try_from(x.top().max(0)).unwrap_or(0)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Trig {
    Sin,
    Cos,
}

impl Real {
    /// `pi` at the ambient precision.
    #[must_use]
    pub fn pi() -> Self {
        let wp = context::getprec() + GUARD;
        Self::from_fixed(pi_fixed(wp), wp)
    }

    /// `ln 2` at the ambient precision.
    #[must_use]
    pub fn ln2() -> Self {
        let wp = context::getprec() + GUARD;
        Self::from_fixed(ln2_fixed(wp), wp)
    }

    /// Euler's constant at the ambient precision.
    #[must_use]
    pub fn euler_gamma() -> Self {
        let wp = context::getprec() + GUARD;
        Self::from_fixed(euler_gamma_fixed(wp), wp)
    }

    /// `e` at the ambient precision.
    #[must_use]
    pub fn e() -> Self {
        let wp = context::getprec() + GUARD;
        Self::from_fixed(exp_fixed(&one_fixed(wp), wp, 1), wp)
    }

    /// Exponential function.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::Domain`] when the result exponent would not fit.
    pub fn exp(&self) -> Result<Self, NumberError> {
        if self.is_zero() {
            return Ok(Self::from(1));
        }
        if self.top() > 60 {
            return Err(NumberError::domain("exp overflow"));
        }
        let halvings = 10;
        let wp = wp_for(self) + halvings;
        let x = self.to_fixed(wp);
        let ln2 = ln2_fixed(wp);
        let n = x.div_round(&ln2);
        let r = x - &n * &ln2;
        let value = exp_fixed(&r, wp, halvings);
        let n = n.to_i64().ok_or_else(|| NumberError::domain("exp overflow"))?;
        Ok(Self::from_fixed(value, wp).mul_pow2(n))
    }

    /// Natural logarithm.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::Domain`] for non-positive input.
    pub fn ln(&self) -> Result<Self, NumberError> {
        if !self.is_positive() {
            return Err(NumberError::domain("logarithm of a non-positive real"));
        }
        if self == &Self::from(1) {
            return Ok(Self::zero());
        }
        // Bits lost to cancellation when self is close to 1.
        let cancel = if (0..=1).contains(&self.top()) {
            let exp = self.exponent().min(0);
            let scaled = self.mantissa().shl((self.exponent() - exp).unsigned_abs() as usize);
            let near = Self::from_parts(scaled - Integer::one().shl(exp.unsigned_abs() as usize), exp);
            usize::try_from((-near.top()).max(0)).unwrap_or(0)
        } else {
            0
        };
        let bc = self.bitcount();
        let wp = (context::getprec() + GUARD + cancel).max(bc + 10);
        // self = f * 2^e with f in [0.75, 1.5)
        let mut e = self.top();
        let mut f = self.mantissa().shl(wp - bc);
        let three_quarters = Integer::new(3).shl(wp).shr(2);
        if f < three_quarters {
            f = f.shl(1);
            e -= 1;
        }
        let one_f = one_fixed(wp);
        let z = (&f - &one_f).shl(wp) / (&f + &one_f);
        let z_sq = mul_fixed(&z, &z, wp);
        let mut sum = z.clone();
        let mut power = z;
        let mut k = 1i64;
        loop {
            power = mul_fixed(&power, &z_sq, wp);
            let term = &power / &Integer::new(2 * k + 1);
            if term.is_zero() {
                break;
            }
            sum = sum + term;
            k += 1;
        }
        let value = sum.shl(1) + ln2_fixed(wp) * Integer::new(e);
        Ok(Self::from_fixed(value, wp))
    }

    /// Fixed point value of `which(self)` at `wp` bits.
    fn trig_fixed(&self, which: Trig, wp: usize) -> Integer {
        let x = self.to_fixed(wp);
        let half_pi = pi_fixed(wp).shr(1);
        let n = x.div_round(&half_pi);
        let r = &x - &(&n * &half_pi);
        let (s, c) = sin_cos_fixed(&r, wp);
        let quadrant = n.div_rem_floor(&Integer::new(4)).1.to_i64().unwrap_or(0);
        match (which, quadrant) {
            (Trig::Sin, 0) | (Trig::Cos, 3) => s,
            (Trig::Sin, 1) | (Trig::Cos, 0) => c,
            (Trig::Sin, 2) | (Trig::Cos, 1) => -s,
            _ => -c,
        }
    }

    fn trig(&self, which: Trig) -> Self {
        if self.is_zero() {
            return match which {
                Trig::Sin => Self::zero(),
                Trig::Cos => Self::from(1),
            };
        }
        let wanted = context::getprec() + 10;
        let mut wp = wp_for(self);
        let mut value = self.trig_fixed(which, wp);
        // Near a zero of the function the fixed point result keeps few
        // significant bits; retry with the missing bits added.
        for _ in 0..4 {
            if value.bit_len() >= wanted {
                break;
            }
            wp += wanted - value.bit_len() + GUARD;
            value = self.trig_fixed(which, wp);
        }
        Self::from_fixed(value, wp)
    }

    /// Sine.
    #[must_use]
    pub fn sin(&self) -> Self {
        self.trig(Trig::Sin)
    }

    /// Cosine.
    #[must_use]
    pub fn cos(&self) -> Self {
        self.trig(Trig::Cos)
    }

    /// Tangent.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::DivisionByZero`] if the cosine rounds to zero.
    pub fn tan(&self) -> Result<Self, NumberError> {
        context::with_extra_prec(10, || self.sin().div_real(&self.cos())).map(|t| t.round())
    }

    /// `self^y` for positive `self`, or any `self` when `y` is an integer.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::Domain`] for a non-integer power of a
    /// negative value.
    pub fn powf(&self, y: &Self) -> Result<Self, NumberError> {
        if y.is_integer() {
            if let Some(k) = y.floor().to_i64() {
                return self.powi(k);
            }
        }
        if self.is_zero() {
            return if y.is_positive() {
                Ok(Self::zero())
            } else {
                Err(NumberError::DivisionByZero)
            };
        }
        if self.is_negative() {
            return Err(NumberError::domain("non-integer power of a negative real"));
        }
        let extra = 20 + usize::try_from(y.top().max(0)).unwrap_or(0);
        let value = context::with_extra_prec(extra, || -> Result<Self, NumberError> {
            self.ln()?.mul_real(y).exp()
        })?;
        Ok(value.round())
    }
}
