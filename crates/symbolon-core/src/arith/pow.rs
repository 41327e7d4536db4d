//! Canonical powers.

use num_traits::{One, Zero};
use symbolon_numbers::{Integer, Number, Rational};

use crate::arena::ExprArena;
use crate::assumptions::{Predicate, Truth};
use crate::error::{CoreError, CoreResult};
use crate::expr::{functions, Constant, ExprNode};
use crate::handle::ExprHandle;

/// Trial division stops here; larger cofactors are only tested for being
/// perfect powers.
const TRIAL_LIMIT: u32 = 1 << 12;

/// `m = root^q * rest` with `rest` free of `q`-th powers among its small
/// prime factors; `gcd` is the gcd of the multiplicities left in `rest`
/// (zero when unknown).
struct RootSplit {
    root: Integer,
    rest: Integer,
    gcd: u32,
}

fn gcd_u32(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn split_root(m: &Integer, q: u32) -> RootSplit {
    let mut n = m.clone();
    let mut root = Integer::one();
    let mut rest = Integer::one();
    let mut gcd = 0;
    let mut d: u32 = 2;
    while d <= TRIAL_LIMIT {
        let dd = Integer::from(d);
        if &dd * &dd > n {
            break;
        }
        let mut mult = 0;
        loop {
            let (quot, rem) = n.div_rem_floor(&dd);
            if !rem.is_zero() {
                break;
            }
            n = quot;
            mult += 1;
        }
        if mult > 0 {
            root = root * dd.pow(mult / q);
            if mult % q != 0 {
                rest = rest * dd.pow(mult % q);
                gcd = gcd_u32(gcd, mult % q);
            }
        }
        d = if d == 2 { 3 } else { d + 2 };
    }
    if !n.is_one() {
        let (r, exact) = n.nth_root(q);
        if exact {
            root = root * r;
        } else {
            rest = rest * n;
            gcd = 1;
        }
    }
    RootSplit { root, rest, gcd }
}

impl ExprArena {
    /// The canonical power `base^exp`.
    ///
    /// # Errors
    ///
    /// Returns a domain-error for integer powers too large to evaluate and
    /// for negative powers of intervals containing zero.
    pub fn pow(&mut self, base: ExprHandle, exp: ExprHandle) -> CoreResult<ExprHandle> {
        if self.as_number(base).is_some_and(Number::is_nan) || self.as_number(exp).is_some_and(Number::is_nan) {
            return Ok(self.nan());
        }
        if self.is_zero(exp) && self.as_number(exp).is_some_and(Number::is_exact) {
            return Ok(self.one());
        }
        if self.is_one(exp) {
            return Ok(base);
        }
        if self.is_one(base) {
            return Ok(if self.as_number(exp).is_some_and(Number::is_infinite) {
                self.nan()
            } else {
                base
            });
        }
        if let (Some(b), Some(e)) = (self.as_number(base), self.as_number(exp)) {
            let (b, e) = (b.clone(), e.clone());
            return self.pow_numbers(base, &b, exp, &e);
        }
        match self.get(base).clone() {
            ExprNode::Constant(Constant::E) => self.apply(functions::EXP, &[exp]),
            ExprNode::Constant(Constant::ImaginaryUnit) => match self.as_number(exp) {
                Some(Number::Integer(k)) => {
                    let (_, r) = k.div_rem_floor(&Integer::from(4));
                    Ok(match r.to_i64() {
                        Some(0) => self.one(),
                        Some(1) => base,
                        Some(2) => self.minus_one(),
                        _ => self.neg(base),
                    })
                }
                _ => Ok(self.raw_pow(base, exp)),
            },
            ExprNode::Number(b) => Ok(self.pow_number_symbolic(base, &b, exp)),
            ExprNode::Pow { base: inner, exp: e0 } => self.pow_of_pow(base, inner, e0, exp),
            ExprNode::Mul(factors) => self.pow_of_mul(base, &factors, exp),
            ExprNode::Apply { func, args } => {
                if let Some(def) = self.function_def(func) {
                    if let Some(r) = def.eval_apply_power(self, &args, exp)? {
                        return Ok(r);
                    }
                }
                Ok(self.raw_pow(base, exp))
            }
            ExprNode::Order { expr, vars } if self.ask(exp, Predicate::Positive) == Truth::True => {
                let inner = self.pow(expr, exp)?;
                self.order(inner, &vars)
            }
            _ => Ok(self.raw_pow(base, exp)),
        }
    }

    /// `a^(1/2)`.
    ///
    /// # Errors
    ///
    /// See [`pow`](Self::pow).
    pub fn sqrt(&mut self, a: ExprHandle) -> CoreResult<ExprHandle> {
        let half = self.half();
        self.pow(a, half)
    }

    pub(crate) fn raw_pow(&mut self, base: ExprHandle, exp: ExprHandle) -> ExprHandle {
        self.intern(ExprNode::Pow { base, exp })
    }

    fn pow_number_symbolic(&mut self, base: ExprHandle, b: &Number, exp: ExprHandle) -> ExprHandle {
        let positive = self.ask(exp, Predicate::Positive);
        let negative = self.ask(exp, Predicate::Negative);
        match b {
            _ if b.is_zero() && b.is_exact() => match (positive, negative) {
                (Truth::True, _) => self.zero(),
                (_, Truth::True) => self.infinity(),
                _ => self.raw_pow(base, exp),
            },
            Number::Infinity => match (positive, negative) {
                (Truth::True, _) => self.infinity(),
                (_, Truth::True) => self.zero(),
                _ => self.raw_pow(base, exp),
            },
            _ => self.raw_pow(base, exp),
        }
    }

    fn pow_numbers(&mut self, base: ExprHandle, b: &Number, exp: ExprHandle, e: &Number) -> CoreResult<ExprHandle> {
        let op = "pow";
        match e {
            Number::Infinity | Number::NegativeInfinity => return Ok(self.pow_infinite_exponent(b, e)),
            Number::Integer(k) => {
                return match k.to_i64() {
                    Some(k) => {
                        let value = b.powi(k).map_err(|err| CoreError::from_number(op, base, err))?;
                        Ok(self.number(value))
                    }
                    None => Err(CoreError::domain(op, exp, "exponent too large")),
                };
            }
            _ => {}
        }
        match b {
            Number::Infinity => Ok(if e.is_positive() { self.infinity() } else { self.zero() }),
            Number::NegativeInfinity => {
                if e.is_negative() {
                    return Ok(self.zero());
                }
                let m1 = self.minus_one();
                let phase = self.pow(m1, exp)?;
                let oo = self.infinity();
                Ok(self.mul(&[phase, oo]))
            }
            _ if b.is_zero() && b.is_exact() => Ok(if e.is_positive() { self.zero() } else { self.infinity() }),
            Number::Integer(_) | Number::Rational(_) => match e {
                Number::Rational(r) => self.pow_rational(base, b, r),
                Number::Real(y) if b.is_positive() => {
                    let x = b.to_real().ok_or_else(|| CoreError::domain(op, base, "not a finite value"))?;
                    let value = x.powf(y).map_err(|err| CoreError::from_number(op, base, err))?;
                    Ok(self.real(value))
                }
                _ => Ok(self.raw_pow(base, exp)),
            },
            Number::Real(x) if x.is_positive() => match e.to_real() {
                Some(y) if !matches!(e, Number::Interval(_)) => {
                    let value = x.powf(&y).map_err(|err| CoreError::from_number(op, base, err))?;
                    Ok(self.real(value))
                }
                _ => Ok(self.raw_pow(base, exp)),
            },
            _ => Ok(self.raw_pow(base, exp)),
        }
    }

    fn pow_infinite_exponent(&mut self, b: &Number, e: &Number) -> ExprHandle {
        let one = Number::one();
        let magnitude = b.abs().compare_value(&one);
        let positive_exp = matches!(e, Number::Infinity);
        match (magnitude, positive_exp) {
            (Some(std::cmp::Ordering::Greater), true) if b.is_positive() => self.infinity(),
            (Some(std::cmp::Ordering::Less), true) => self.zero(),
            (Some(std::cmp::Ordering::Greater), false) => self.zero(),
            (Some(std::cmp::Ordering::Less), false) if b.is_positive() || b.is_zero() => self.infinity(),
            _ => self.nan(),
        }
    }

    // An exact base to a non-integer rational exponent.
    fn pow_rational(&mut self, base: ExprHandle, b: &Number, e: &Rational) -> CoreResult<ExprHandle> {
        let exp_handle = self.rational_value(e.clone());
        if b.is_negative() {
            if b.is_minus_one() {
                return self.pow_minus_one(base, e);
            }
            let m1 = self.minus_one();
            let phase = self.pow(m1, exp_handle)?;
            let magnitude = self.number(b.abs());
            let rest = self.pow(magnitude, exp_handle)?;
            return Ok(self.mul(&[phase, rest]));
        }
        let Some(r) = b.as_rational() else {
            return Ok(self.raw_pow(base, exp_handle));
        };
        let num = self.pow_positive_integer(&r.numerator(), e)?;
        let den = r.denominator();
        if den.is_one() {
            return Ok(num);
        }
        let den = self.pow_positive_integer(&den, &-e)?;
        Ok(self.mul(&[num, den]))
    }

    // (-1)^(p/q) with the exponent reduced into (-1, 1].
    fn pow_minus_one(&mut self, base: ExprHandle, e: &Rational) -> CoreResult<ExprHandle> {
        let (p, q) = (e.numerator(), e.denominator());
        if q == Integer::from(2) {
            let i = self.imaginary_unit();
            let p = self.big_integer(p);
            return self.pow(i, p);
        }
        let period = &q * &Integer::from(2);
        let (_, mut reduced) = p.div_rem_floor(&period);
        if reduced > q {
            reduced = reduced - &period;
        }
        let e2 = Rational::new(reduced, q);
        let exp = self.rational_value(e2);
        Ok(self.raw_pow(base, exp))
    }

    // m^e for an integer m >= 1 and a rational e, with perfect powers
    // pulled out of the radical.
    fn pow_positive_integer(&mut self, m: &Integer, e: &Rational) -> CoreResult<ExprHandle> {
        let exp_handle = self.rational_value(e.clone());
        if m.is_one() {
            return Ok(self.one());
        }
        if e.is_integer() {
            let base = self.big_integer(m.clone());
            return self.pow(base, exp_handle);
        }
        let (p, q_big) = (e.numerator(), e.denominator());
        let Some(q) = q_big.to_u32() else {
            let base = self.big_integer(m.clone());
            return Ok(self.raw_pow(base, exp_handle));
        };
        let (k, r) = p.div_rem_floor(&q_big);
        let (Some(k), Some(r)) = (k.to_i64(), r.to_u32()) else {
            let base = self.big_integer(m.clone());
            return Ok(self.raw_pow(base, exp_handle));
        };
        let split = split_root(m, q);
        let whole = Number::Integer(m.clone())
            .powi(k)
            .map_err(|err| CoreError::from_number("pow", None, err))?;
        let pulled = Number::Integer(split.root.pow(r));
        let coeff = self.number(whole.mul(&pulled));
        if split.rest.is_one() {
            return Ok(coeff);
        }
        let leftover = if split.gcd > 1 {
            let g = split.gcd;
            let (reduced, _) = split.rest.nth_root(g);
            let base = self.big_integer(reduced);
            let exp = self.rational_value(Rational::new(Integer::from(g * r), q_big));
            self.pow(base, exp)?
        } else {
            let base = self.big_integer(split.rest);
            let exp = self.rational_value(Rational::new(Integer::from(r), q_big));
            self.raw_pow(base, exp)
        };
        Ok(self.mul(&[coeff, leftover]))
    }

    fn pow_of_pow(
        &mut self,
        whole: ExprHandle,
        inner: ExprHandle,
        e0: ExprHandle,
        exp: ExprHandle,
    ) -> CoreResult<ExprHandle> {
        let combined = |arena: &mut Self, b: ExprHandle| -> CoreResult<ExprHandle> {
            let e = arena.mul(&[e0, exp]);
            arena.pow(b, e)
        };
        if self.as_number(exp).is_some_and(Number::is_integer) {
            return combined(self, inner);
        }
        if self.ask(exp, Predicate::Real) != Truth::True || self.ask(e0, Predicate::Real) != Truth::True {
            return Ok(self.raw_pow(whole, exp));
        }
        let mut b = inner;
        if self.ask(e0, Predicate::Even) == Truth::True && self.ask(inner, Predicate::Real) == Truth::True {
            b = self.apply(functions::ABS, &[inner])?;
        }
        let small = self.as_number(e0).is_some_and(|n| {
            n.abs().compare_value(&Number::one()) == Some(std::cmp::Ordering::Less)
        });
        if small || self.ask(b, Predicate::Nonnegative) == Truth::True {
            return combined(self, b);
        }
        Ok(self.raw_pow(whole, exp))
    }

    fn pow_of_mul(&mut self, whole: ExprHandle, factors: &[ExprHandle], exp: ExprHandle) -> CoreResult<ExprHandle> {
        let all_commutative = factors.iter().all(|&f| self.is_commutative(f));
        if !all_commutative {
            return Ok(self.raw_pow(whole, exp));
        }
        if self.as_number(exp).is_some_and(Number::is_integer) {
            let mut parts = Vec::with_capacity(factors.len());
            for &f in factors {
                parts.push(self.pow(f, exp)?);
            }
            return Ok(self.mul(&parts));
        }
        let mut pulled = Vec::new();
        let mut kept = Vec::new();
        for &f in factors {
            match self.as_number(f).cloned() {
                Some(c) if c.is_exact() && c.is_negative() => {
                    if !c.is_minus_one() {
                        pulled.push(self.number(c.neg()));
                    }
                    kept.push(self.minus_one());
                }
                Some(c) if c.is_positive() && !c.is_infinite() => pulled.push(f),
                _ if self.ask(f, Predicate::Positive) == Truth::True => pulled.push(f),
                _ => kept.push(f),
            }
        }
        if pulled.is_empty() {
            return Ok(self.raw_pow(whole, exp));
        }
        let mut parts = Vec::with_capacity(pulled.len() + 1);
        for f in pulled {
            parts.push(self.pow(f, exp)?);
        }
        let rest = self.mul(&kept);
        parts.push(self.pow(rest, exp)?);
        Ok(self.mul(&parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivial_exponents() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let zero = arena.zero();
        let one = arena.one();
        assert_eq!(arena.pow(x, zero).unwrap(), one);
        assert_eq!(arena.pow(x, one).unwrap(), x);
        assert_eq!(arena.pow(one, x).unwrap(), one);
        let oo = arena.infinity();
        let nan = arena.nan();
        assert_eq!(arena.pow(one, oo).unwrap(), nan);
    }

    #[test]
    fn test_perfect_powers() {
        let mut arena = ExprArena::new();
        let eight = arena.integer(8);
        let third = arena.rational(1, 3);
        assert_eq!(arena.pow(eight, third).unwrap(), arena.integer(2));

        let twelve = arena.integer(12);
        let half = arena.half();
        let s = arena.pow(twelve, half).unwrap();
        let two = arena.integer(2);
        let three = arena.integer(3);
        let sqrt3 = arena.raw_pow(three, half);
        assert_eq!(s, arena.mul(&[two, sqrt3]));

        let four = arena.integer(4);
        let sixth = arena.rational(1, 6);
        let r = arena.pow(four, sixth).unwrap();
        assert_eq!(r, arena.raw_pow(two, third));
    }

    #[test]
    fn test_rational_base() {
        let mut arena = ExprArena::new();
        let quarter = arena.rational(1, 4);
        let half = arena.half();
        assert_eq!(arena.pow(quarter, half).unwrap(), arena.half());
        let two = arena.integer(2);
        let m_half = arena.rational(-1, 2);
        let r = arena.pow(two, m_half).unwrap();
        let sqrt2 = arena.raw_pow(two, half);
        assert_eq!(r, arena.mul(&[half, sqrt2]));
    }

    #[test]
    fn test_negative_bases() {
        let mut arena = ExprArena::new();
        let m1 = arena.minus_one();
        let half = arena.half();
        let i = arena.imaginary_unit();
        assert_eq!(arena.pow(m1, half).unwrap(), i);
        let m4 = arena.integer(-4);
        let r = arena.pow(m4, half).unwrap();
        let two = arena.integer(2);
        assert_eq!(r, arena.mul(&[two, i]));
        let three = arena.integer(3);
        let minus_i = arena.neg(i);
        assert_eq!(arena.pow(i, three).unwrap(), minus_i);
    }

    #[test]
    fn test_integer_powers() {
        let mut arena = ExprArena::new();
        let two = arena.integer(2);
        let ten = arena.integer(10);
        assert_eq!(arena.pow(two, ten).unwrap(), arena.integer(1024));
        let m1 = arena.minus_one();
        assert_eq!(arena.pow(two, m1).unwrap(), arena.half());
        let zero = arena.zero();
        let oo = arena.infinity();
        assert_eq!(arena.pow(zero, m1).unwrap(), oo);
    }

    #[test]
    fn test_nested_powers() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let two = arena.integer(2);
        let three = arena.integer(3);
        let half = arena.half();
        let x2 = arena.pow(x, two).unwrap();
        let x6 = arena.pow(x2, three).unwrap();
        let six = arena.integer(6);
        assert_eq!(x6, arena.pow(x, six).unwrap());

        let unchanged = arena.pow(x2, half).unwrap();
        assert_eq!(arena.get(unchanged), &ExprNode::Pow { base: x2, exp: half });

        let r = arena.symbol_with("r", &[(Predicate::Real, true)]).unwrap();
        let r2 = arena.pow(r, two).unwrap();
        let abs_r = arena.abs(r).unwrap();
        assert_eq!(arena.pow(r2, half).unwrap(), abs_r);

        let p = arena.symbol_with("p", &[(Predicate::Positive, true)]).unwrap();
        let p2 = arena.pow(p, two).unwrap();
        assert_eq!(arena.pow(p2, half).unwrap(), p);
    }

    #[test]
    fn test_product_bases() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let two = arena.integer(2);
        let xy = arena.mul(&[x, y]);
        let sq = arena.pow(xy, two).unwrap();
        let x2 = arena.pow(x, two).unwrap();
        let y2 = arena.pow(y, two).unwrap();
        assert_eq!(sq, arena.mul(&[x2, y2]));

        let four = arena.integer(4);
        let four_x = arena.mul(&[four, x]);
        let half = arena.half();
        let root = arena.sqrt(four_x).unwrap();
        let sqrt_x = arena.raw_pow(x, half);
        assert_eq!(root, arena.mul(&[two, sqrt_x]));
    }

    #[test]
    fn test_e_power_is_exp() {
        let mut arena = ExprArena::new();
        let e = arena.e();
        let x = arena.symbol("x");
        let p = arena.pow(e, x).unwrap();
        assert_eq!(p, arena.exp(x).unwrap());
    }
}
