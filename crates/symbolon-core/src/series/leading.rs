//! Leading terms around `x = 0`.

use std::cmp::Ordering;

use crate::arena::ExprArena;
use crate::assumptions::Truth;
use crate::error::{CoreError, CoreResult};
use crate::expr::{functions, ExprNode};
use crate::handle::ExprHandle;

/// `coeff * x^exp * log(x)^logs`, `coeff` free of `x`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Monomial {
    pub coeff: ExprHandle,
    pub exp: ExprHandle,
    pub logs: i64,
}

impl ExprArena {
    /// The dominant part of `expr` as `x -> 0`.
    ///
    /// Sums whose terms are plain monomials keep their terms of lowest
    /// degree; other sums are expanded in series until a term survives
    /// cancellation.
    ///
    /// # Errors
    ///
    /// Returns a type-error if `x` is not a symbol and not-implemented if
    /// every series up to the configured number of rounds vanishes.
    pub fn as_leading_term(&mut self, expr: ExprHandle, x: ExprHandle) -> CoreResult<ExprHandle> {
        if !self.is_symbol(x) {
            return Err(CoreError::type_error("as_leading_term", x, "expected a symbol"));
        }
        if !self.has_subtree(expr, x) {
            return Ok(expr);
        }
        match self.get(expr).clone() {
            ExprNode::Add(terms) => self.add_leading_term(expr, &terms, x),
            ExprNode::Mul(factors) => {
                let mut parts = Vec::with_capacity(factors.len());
                for f in factors {
                    parts.push(self.as_leading_term(f, x)?);
                }
                Ok(self.mul(&parts))
            }
            ExprNode::Pow { base, exp } => {
                if !self.has_subtree(exp, x) {
                    let lb = self.as_leading_term(base, x)?;
                    return self.pow(lb, exp);
                }
                let log_b = self.log(base)?;
                let m = self.mul(&[exp, log_b]);
                let rewritten = self.exp(m)?;
                if rewritten == expr {
                    return Ok(expr);
                }
                self.as_leading_term(rewritten, x)
            }
            ExprNode::Apply { func, args } => match self.function_def(func) {
                Some(def) => Ok(def.eval_as_leading_term(self, &args, x)?.unwrap_or(expr)),
                None => Ok(expr),
            },
            _ => Ok(expr),
        }
    }

    fn add_leading_term(&mut self, expr: ExprHandle, terms: &[ExprHandle], x: ExprHandle) -> CoreResult<ExprHandle> {
        let mut monomials = Vec::with_capacity(terms.len());
        for &t in terms {
            match self.monomial_split(t, x) {
                Some(m) => monomials.push((t, m)),
                None => return self.leading_term_from_series(expr, x),
            }
        }
        match self.lowest_group(&monomials) {
            Some(lowest) if !self.is_zero(lowest) => Ok(lowest),
            _ => self.leading_term_from_series(expr, x),
        }
    }

    // Sum of the terms of lowest degree, the highest log power winning a
    // tie; `None` if two degrees cannot be compared.
    fn lowest_group(&mut self, monomials: &[(ExprHandle, Monomial)]) -> Option<ExprHandle> {
        let mut best: Option<Monomial> = None;
        let mut picked: Vec<ExprHandle> = Vec::new();
        for &(t, m) in monomials {
            let ordering = match best {
                None => Ordering::Less,
                Some(b) => match self.compare_exponents(m.exp, b.exp)? {
                    Ordering::Equal => b.logs.cmp(&m.logs),
                    other => other,
                },
            };
            match ordering {
                Ordering::Less => {
                    best = Some(m);
                    picked = vec![t];
                }
                Ordering::Equal => picked.push(t),
                Ordering::Greater => {}
            }
        }
        Some(self.add(&picked))
    }

    /// Leading term by expanding `expr` in ever longer series.
    pub(crate) fn leading_term_from_series(&mut self, expr: ExprHandle, x: ExprHandle) -> CoreResult<ExprHandle> {
        let start = self.series_start(expr, x);
        let rounds = self.series_config().max_leading_rounds;
        for round in 0..rounds {
            let n = start + i64::from(round);
            let s = self.series(expr, x, n)?;
            let rest = self.remove_order(s);
            if self.is_zero(rest) {
                continue;
            }
            tracing::trace!(n, "leading term found in series");
            let terms: Vec<ExprHandle> = match self.get(rest) {
                ExprNode::Add(terms) => terms.to_vec(),
                _ => vec![rest],
            };
            let mut monomials = Vec::with_capacity(terms.len());
            for t in terms {
                let m = self.leading_monomial(t, x).ok_or_else(|| {
                    CoreError::not_implemented("as_leading_term", expr, "series term is not a monomial")
                })?;
                monomials.push((t, m));
            }
            if let Some(lowest) = self.lowest_group(&monomials) {
                if !self.is_zero(lowest) {
                    return Ok(lowest);
                }
            }
        }
        Err(CoreError::not_implemented(
            "as_leading_term",
            expr,
            "every series within the configured rounds vanishes",
        ))
    }

    // First series order worth trying: one past the smallest degree among
    // the terms whose degree is known.
    fn series_start(&mut self, expr: ExprHandle, x: ExprHandle) -> i64 {
        let terms: Vec<ExprHandle> = match self.get(expr) {
            ExprNode::Add(terms) => terms.to_vec(),
            _ => vec![expr],
        };
        let mut lowest: Option<f64> = None;
        for t in terms {
            let degree = self
                .monomial_split(t, x)
                .and_then(|m| self.evalf(m.exp).ok())
                .map(|r| r.to_f64());
            if let Some(d) = degree {
                lowest = Some(lowest.map_or(d, |l| l.min(d)));
            }
        }
        match lowest {
            Some(d) if d.is_finite() => (d.floor() as i64 + 1).max(1),
            _ => 1,
        }
    }

    /// `(c, e)` with `c * x^e` the leading term of `expr`.
    ///
    /// # Errors
    ///
    /// Returns a value-error if the leading term is not of that shape,
    /// e.g. when it carries `log(x)`.
    pub fn leadterm(&mut self, expr: ExprHandle, x: ExprHandle) -> CoreResult<(ExprHandle, ExprHandle)> {
        let lt = self.as_leading_term(expr, x)?;
        match self.monomial_split(lt, x) {
            Some(m) if m.logs == 0 => Ok((m.coeff, m.exp)),
            _ => Err(CoreError::value("leadterm", expr, "cannot split the leading term into c*x^e")),
        }
    }

    /// Whether `h -> 0` as `x -> 0` from its leading term; `log(x)`
    /// factors only matter when the power of `x` is zero.
    pub(crate) fn tends_to_zero(&mut self, h: ExprHandle, x: ExprHandle) -> CoreResult<Truth> {
        if self.is_zero(h) {
            return Ok(Truth::True);
        }
        if !self.has_subtree(h, x) {
            return Ok(Truth::False);
        }
        let lt = self.as_leading_term(h, x)?;
        let Some(m) = self.monomial_split(lt, x) else {
            return Ok(Truth::Unknown);
        };
        if self.is_zero(m.coeff) {
            return Ok(Truth::True);
        }
        Ok(match self.numeric_sign(m.exp) {
            Some(s) if s > 0 => Truth::True,
            Some(s) if s < 0 => Truth::False,
            Some(_) => Truth::from_bool(m.logs < 0),
            None => Truth::Unknown,
        })
    }

    /// The leading term of `h` split as a monomial.
    pub(crate) fn leading_monomial(&mut self, h: ExprHandle, x: ExprHandle) -> Option<Monomial> {
        if !self.has_subtree(h, x) {
            return Some(Monomial {
                coeff: h,
                exp: self.zero(),
                logs: 0,
            });
        }
        let lt = self.as_leading_term(h, x).ok()?;
        self.monomial_split(lt, x)
    }

    /// `h` as `c * x^e * log(x)^k`, or `None` if some factor is of another
    /// shape.
    pub(crate) fn monomial_split(&mut self, h: ExprHandle, x: ExprHandle) -> Option<Monomial> {
        let factors: Vec<ExprHandle> = match self.get(h) {
            ExprNode::Mul(args) => args.to_vec(),
            _ => vec![h],
        };
        let mut coeff = Vec::new();
        let mut exps = Vec::new();
        let mut logs = 0i64;
        for f in factors {
            if !self.has_subtree(f, x) {
                coeff.push(f);
                continue;
            }
            if f == x {
                exps.push(self.one());
                continue;
            }
            if self.is_log_of(f, x) {
                logs += 1;
                continue;
            }
            match self.get(f).clone() {
                ExprNode::Pow { base, exp } if base == x && !self.has_subtree(exp, x) => exps.push(exp),
                ExprNode::Pow { base, exp } if self.is_log_of(base, x) => logs += self.as_i64(exp)?,
                _ => return None,
            }
        }
        Some(Monomial {
            coeff: self.mul(&coeff),
            exp: self.add(&exps),
            logs,
        })
    }

    fn is_log_of(&self, h: ExprHandle, x: ExprHandle) -> bool {
        matches!(self.get(h), ExprNode::Apply { func, args } if *func == functions::LOG && args.as_slice() == [x])
    }

    /// Compares two exponents numerically; `None` if their difference has
    /// no known sign.
    pub(crate) fn compare_exponents(&mut self, a: ExprHandle, b: ExprHandle) -> Option<Ordering> {
        if a == b {
            return Some(Ordering::Equal);
        }
        let d = self.sub(a, b);
        self.numeric_sign(d).map(|s| s.cmp(&0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polynomial_leading_term() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let two = arena.integer(2);
        let three = arena.integer(3);
        let x2 = arena.pow(x, two).unwrap();
        let tx = arena.mul(&[three, x]);
        let p = arena.add(&[x2, tx]);
        assert_eq!(arena.as_leading_term(p, x).unwrap(), tx);
        let one = arena.one();
        let q = arena.add(&[one, x]);
        assert_eq!(arena.as_leading_term(q, x).unwrap(), one);
    }

    #[test]
    fn test_cancellation_uses_series() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let s = arena.sin(x).unwrap();
        let d = arena.sub(s, x);
        let lt = arena.as_leading_term(d, x).unwrap();
        let three = arena.integer(3);
        let x3 = arena.pow(x, three).unwrap();
        let c = arena.rational(-1, 6);
        assert_eq!(lt, arena.mul(&[c, x3]));
    }

    #[test]
    fn test_leadterm() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let three = arena.integer(3);
        let p = arena.add(&[three, x]);
        let (c, e) = arena.leadterm(p, x).unwrap();
        assert_eq!(c, three);
        assert!(arena.is_zero(e));
        let lx = arena.log(x).unwrap();
        assert!(arena.leadterm(lx, x).is_err());
    }

    #[test]
    fn test_tends_to_zero() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        assert_eq!(arena.tends_to_zero(x, x).unwrap(), Truth::True);
        let one = arena.one();
        let p = arena.add(&[one, x]);
        assert_eq!(arena.tends_to_zero(p, x).unwrap(), Truth::False);
        let lx = arena.log(x).unwrap();
        let xlx = arena.mul(&[x, lx]);
        assert_eq!(arena.tends_to_zero(xlx, x).unwrap(), Truth::True);
        assert_eq!(arena.tends_to_zero(lx, x).unwrap(), Truth::False);
    }

    #[test]
    fn test_monomial_split() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let half = arena.half();
        let root = arena.pow(x, half).unwrap();
        let lx = arena.log(x).unwrap();
        let two = arena.integer(2);
        let l2 = arena.pow(lx, two).unwrap();
        let t = arena.mul(&[y, root, l2]);
        let m = arena.monomial_split(t, x).unwrap();
        assert_eq!(m.coeff, y);
        assert_eq!(m.exp, half);
        assert_eq!(m.logs, 2);
        let e = arena.exp(x).unwrap();
        assert!(arena.monomial_split(e, x).is_none());
    }
}
