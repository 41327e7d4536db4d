//! Structural accessors on sums, products and powers.

use symbolon_numbers::Number;

use crate::arena::ExprArena;
use crate::error::CoreResult;
use crate::expr::{functions, Args, ExprNode};
use crate::handle::ExprHandle;

impl ExprArena {
    /// `(b, e)` with `b^e == h`; `exp(a)` reads as `(E, a)`.
    pub fn as_base_exp(&mut self, h: ExprHandle) -> (ExprHandle, ExprHandle) {
        match self.get(h) {
            ExprNode::Pow { base, exp } => (*base, *exp),
            ExprNode::Apply { func, args } if *func == functions::EXP && args.len() == 1 => {
                let a = args[0];
                (self.e(), a)
            }
            _ => (h, self.one()),
        }
    }

    /// The numeric coefficient of a term and the rest: `2*x*y` gives
    /// `(2, x*y)`.
    pub fn split_coeff(&mut self, h: ExprHandle) -> (Number, ExprHandle) {
        match self.get(h) {
            ExprNode::Number(n) => {
                let n = n.clone();
                (n, self.one())
            }
            ExprNode::Mul(args) => match args.first().and_then(|&a| self.as_number(a)) {
                Some(c) => {
                    let c = c.clone();
                    let rest: Args = args[1..].iter().copied().collect();
                    let rest = if rest.len() == 1 {
                        rest[0]
                    } else {
                        self.intern(ExprNode::Mul(rest))
                    };
                    (c, rest)
                }
                None => (Number::one(), h),
            },
            _ => (Number::one(), h),
        }
    }

    /// `(c, [t1, ...])` with `c * t1 * ... == h`. Without `x`, `c` is the
    /// numeric coefficient; with `x`, `c` collects every factor free of `x`.
    pub fn as_coeff_terms(&mut self, h: ExprHandle, x: Option<ExprHandle>) -> (ExprHandle, Vec<ExprHandle>) {
        let factors: Vec<ExprHandle> = match self.get(h) {
            ExprNode::Mul(args) => args.to_vec(),
            _ => vec![h],
        };
        let mut coeff = Vec::new();
        let mut terms = Vec::new();
        for f in factors {
            let independent = match x {
                None => self.is_number(f),
                Some(x) => !self.has_subtree(f, x),
            };
            if independent {
                coeff.push(f);
            } else {
                terms.push(f);
            }
        }
        (self.mul(&coeff), terms)
    }

    /// `(c, [f1, ...])` with `c + f1 + ... == h`; the additive analogue of
    /// [`as_coeff_terms`](Self::as_coeff_terms).
    pub fn as_coeff_factors(&mut self, h: ExprHandle, x: Option<ExprHandle>) -> (ExprHandle, Vec<ExprHandle>) {
        let terms: Vec<ExprHandle> = match self.get(h) {
            ExprNode::Add(args) => args.to_vec(),
            _ => vec![h],
        };
        let mut coeff = Vec::new();
        let mut rest = Vec::new();
        for t in terms {
            let independent = match x {
                None => self.is_number(t),
                Some(x) => !self.has_subtree(t, x),
            };
            if independent {
                coeff.push(t);
            } else {
                rest.push(t);
            }
        }
        (self.add(&coeff), rest)
    }

    /// `(n, d)` with `n / d == h`; negative exponents go to the
    /// denominator and sums are brought over a common denominator.
    ///
    /// # Errors
    ///
    /// Propagates power errors from rebuilding the parts.
    pub fn as_numer_denom(&mut self, h: ExprHandle) -> CoreResult<(ExprHandle, ExprHandle)> {
        match self.get(h).clone() {
            ExprNode::Number(Number::Rational(r)) => {
                let n = self.big_integer(r.numerator());
                let d = self.big_integer(r.denominator());
                Ok((n, d))
            }
            ExprNode::Pow { base, exp } => {
                let negative = match self.as_number(exp) {
                    Some(n) => n.is_negative(),
                    None => {
                        let (c, _) = self.split_coeff(exp);
                        c.is_negative()
                    }
                };
                if negative {
                    let e = self.neg(exp);
                    let d = self.pow(base, e)?;
                    Ok((self.one(), d))
                } else {
                    Ok((h, self.one()))
                }
            }
            ExprNode::Apply { func, args } if func == functions::EXP => {
                let (c, _) = self.split_coeff(args[0]);
                if c.is_negative() {
                    let a = self.neg(args[0]);
                    let d = self.exp(a)?;
                    Ok((self.one(), d))
                } else {
                    Ok((h, self.one()))
                }
            }
            ExprNode::Mul(args) => {
                let mut numers = Vec::with_capacity(args.len());
                let mut denoms = Vec::with_capacity(args.len());
                for a in args {
                    let (n, d) = self.as_numer_denom(a)?;
                    numers.push(n);
                    denoms.push(d);
                }
                Ok((self.mul(&numers), self.mul(&denoms)))
            }
            ExprNode::Add(args) => {
                let mut parts = Vec::with_capacity(args.len());
                for a in args {
                    parts.push(self.as_numer_denom(a)?);
                }
                let mut numers = Vec::with_capacity(parts.len());
                for (i, (n, _)) in parts.iter().enumerate() {
                    let mut factors = vec![*n];
                    factors.extend(parts.iter().enumerate().filter(|(j, _)| *j != i).map(|(_, (_, d))| *d));
                    numers.push(self.mul(&factors));
                }
                let denoms: Vec<ExprHandle> = parts.iter().map(|(_, d)| *d).collect();
                Ok((self.add(&numers), self.mul(&denoms)))
            }
            _ => Ok((h, self.one())),
        }
    }

    /// `(c, e)` with `c * x^e == h` for a monomial in `x`; `None` when `h`
    /// is not one.
    pub fn as_coeff_exponent(&mut self, h: ExprHandle, x: ExprHandle) -> Option<(ExprHandle, ExprHandle)> {
        let (c, terms) = self.as_coeff_terms(h, Some(x));
        match terms.as_slice() {
            [] => Some((c, self.zero())),
            [t] => {
                let (b, e) = self.as_base_exp(*t);
                (b == x && !self.has_subtree(e, x)).then_some((c, e))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_coeff() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let three = arena.integer(3);
        let t = arena.mul(&[three, x, y]);
        let (c, rest) = arena.split_coeff(t);
        assert_eq!(c, Number::integer(3));
        assert_eq!(rest, arena.mul(&[x, y]));
        let (c, rest) = arena.split_coeff(x);
        assert!(c.is_one());
        assert_eq!(rest, x);
    }

    #[test]
    fn test_base_exp() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let three = arena.integer(3);
        let p = arena.pow(x, three).unwrap();
        assert_eq!(arena.as_base_exp(p), (x, three));
        let ex = arena.exp(x).unwrap();
        let e = arena.e();
        assert_eq!(arena.as_base_exp(ex), (e, x));
        let one = arena.one();
        assert_eq!(arena.as_base_exp(x), (x, one));
    }

    #[test]
    fn test_coeff_terms_round_trip() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let five = arena.integer(5);
        let t = arena.mul(&[five, x, y]);
        let (c, terms) = arena.as_coeff_terms(t, Some(x));
        assert_eq!(terms, vec![x]);
        assert_eq!(c, arena.mul(&[five, y]));
        let mut all = vec![c];
        all.extend(terms);
        assert_eq!(arena.mul(&all), t);
    }

    #[test]
    fn test_coeff_factors_round_trip() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let two = arena.integer(2);
        let s = arena.add(&[two, x, y]);
        let (c, rest) = arena.as_coeff_factors(s, None);
        assert_eq!(c, two);
        assert_eq!(rest.len(), 2);
        let (c, rest) = arena.as_coeff_factors(s, Some(x));
        assert_eq!(c, arena.add(&[two, y]));
        assert_eq!(rest, vec![x]);
    }

    #[test]
    fn test_numer_denom() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let q = arena.div(x, y).unwrap();
        assert_eq!(arena.as_numer_denom(q).unwrap(), (x, y));

        let half = arena.half();
        let hx = arena.mul(&[half, x]);
        let two = arena.integer(2);
        assert_eq!(arena.as_numer_denom(hx).unwrap(), (x, two));

        let inv_x = arena.div(half, x).unwrap();
        let inv_y = arena.div(half, y).unwrap();
        let s = arena.add(&[inv_x, inv_y]);
        let (n, d) = arena.as_numer_denom(s).unwrap();
        let back = arena.div(n, d).unwrap();
        let expanded = arena.expand(back).unwrap();
        assert_eq!(expanded, arena.expand(s).unwrap());
    }

    #[test]
    fn test_coeff_exponent() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let three = arena.integer(3);
        let two = arena.integer(2);
        let x2 = arena.pow(x, two).unwrap();
        let t = arena.mul(&[three, x2]);
        assert_eq!(arena.as_coeff_exponent(t, x), Some((three, two)));
        let y = arena.symbol("y");
        let zero = arena.zero();
        assert_eq!(arena.as_coeff_exponent(y, x), Some((y, zero)));
        let s = arena.add(&[x, y]);
        assert_eq!(arena.as_coeff_exponent(s, x), None);
    }
}
