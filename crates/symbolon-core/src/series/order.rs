//! `O(f)` terms.

use std::cmp::Ordering;

use crate::arena::ExprArena;
use crate::assumptions::Truth;
use crate::error::{CoreError, CoreResult};
use crate::expr::{ExprNode, FnArgs};
use crate::handle::ExprHandle;

impl ExprArena {
    /// `O(expr)` as each of `vars` tends to zero; with no `vars`, the free
    /// symbols of `expr` are used.
    ///
    /// The bounding expression is normalised: constant factors are
    /// dropped, a sum keeps only its dominant terms, and with a single
    /// symbol the leading term is taken (`O(5*x + x^2) = O(x)`).
    /// `O(0)` is zero.
    ///
    /// # Errors
    ///
    /// Returns a type-error if one of `vars` is not a symbol.
    pub fn order(&mut self, expr: ExprHandle, vars: &[ExprHandle]) -> CoreResult<ExprHandle> {
        if let Some(&bad) = vars.iter().find(|&&v| !self.is_symbol(v)) {
            return Err(CoreError::type_error("order", bad, "order symbols must be symbols"));
        }
        let mut symbols: FnArgs = if vars.is_empty() {
            self.free_symbols(expr).iter().copied().collect()
        } else {
            let mut unique = FnArgs::new();
            for &v in vars {
                if !unique.contains(&v) {
                    unique.push(v);
                }
            }
            unique
        };
        self.sort_canonical(&mut symbols);

        if self.is_zero(expr) {
            return Ok(self.zero());
        }
        if let ExprNode::Order { expr: inner, vars: existing } = self.get(expr).clone() {
            if vars.is_empty() || existing == symbols {
                return Ok(expr);
            }
            return self.order(inner, &symbols);
        }
        let body = if symbols.is_empty() {
            self.one()
        } else {
            self.order_body(expr, &symbols)?
        };
        if self.is_zero(body) {
            return Ok(self.zero());
        }
        Ok(self.intern(ExprNode::Order { expr: body, vars: symbols }))
    }

    fn order_body(&mut self, expr: ExprHandle, vars: &[ExprHandle]) -> CoreResult<ExprHandle> {
        if let [x] = vars {
            let x = *x;
            if let Some(lowest) = self.lowest_monomials(expr, x) {
                return Ok(self.strip_constant_factors(lowest, vars));
            }
            let lt = match self.as_leading_term(expr, x) {
                Ok(lt) => lt,
                Err(err) => {
                    tracing::debug!(%err, "no leading term, keeping the order body as given");
                    expr
                }
            };
            return Ok(self.strip_constant_factors(lt, vars));
        }
        let ExprNode::Add(terms) = self.get(expr).clone() else {
            return Ok(self.strip_constant_factors(expr, vars));
        };
        let mut kept: Vec<ExprHandle> = Vec::new();
        for t in terms {
            let body = self.strip_constant_factors(t, vars);
            if kept.contains(&body) {
                continue;
            }
            if kept.iter().any(|&k| self.monomial_dominates(k, body, vars) == Truth::True) {
                continue;
            }
            kept.retain(|&k| self.monomial_dominates(body, k, vars) != Truth::True);
            kept.push(body);
        }
        Ok(self.add(&kept))
    }

    // For a sum of monomials in `x`, the terms of lowest degree with
    // their coefficients, or `None` if some term is not a monomial or the
    // degrees cannot be compared.
    fn lowest_monomials(&mut self, expr: ExprHandle, x: ExprHandle) -> Option<ExprHandle> {
        let terms: Vec<ExprHandle> = match self.get(expr) {
            ExprNode::Add(terms) => terms.to_vec(),
            _ => return None,
        };
        let mut lowest: Option<ExprHandle> = None;
        let mut picked: Vec<ExprHandle> = Vec::new();
        for t in terms {
            let (_, e) = self.as_coeff_exponent(t, x)?;
            match lowest {
                None => {
                    lowest = Some(e);
                    picked.push(t);
                }
                Some(l) => match self.compare_exponents(e, l)? {
                    Ordering::Less => {
                        lowest = Some(e);
                        picked = vec![t];
                    }
                    Ordering::Equal => picked.push(t),
                    Ordering::Greater => {}
                },
            }
        }
        let sum = self.add(&picked);
        (!self.is_zero(sum)).then_some(sum)
    }

    fn strip_constant_factors(&mut self, expr: ExprHandle, vars: &[ExprHandle]) -> ExprHandle {
        let factors: Vec<ExprHandle> = match self.get(expr) {
            ExprNode::Mul(args) => args.to_vec(),
            _ => vec![expr],
        };
        let kept: Vec<ExprHandle> = factors
            .into_iter()
            .filter(|&f| vars.iter().any(|&v| self.has_subtree(f, v)))
            .collect();
        self.mul(&kept)
    }

    /// The bounding expression and symbols of an `Order` node.
    pub(crate) fn order_parts(&self, o: ExprHandle) -> Option<(ExprHandle, FnArgs)> {
        match self.get(o) {
            ExprNode::Order { expr, vars } => Some((*expr, vars.clone())),
            _ => None,
        }
    }

    /// Whether `g` (an expression or another `Order`) is contained in the
    /// order term `o`, i.e. `g / f` stays bounded as the symbols of
    /// `o = O(f)` tend to zero.
    pub fn order_contains(&mut self, o: ExprHandle, g: ExprHandle) -> Truth {
        let Some((f, vars)) = self.order_parts(o) else {
            return Truth::Unknown;
        };
        if self.is_zero(g) {
            return Truth::True;
        }
        let h = match self.get(g).clone() {
            ExprNode::Order { expr, vars: other } => {
                if other != vars {
                    return Truth::Unknown;
                }
                expr
            }
            ExprNode::Add(terms) => {
                let mut all = Truth::True;
                for t in terms {
                    all = all.and(self.order_contains(o, t));
                    if all == Truth::False {
                        break;
                    }
                }
                return all;
            }
            _ => g,
        };
        if self.as_number(h).is_some_and(|n| n.is_nan()) {
            return Truth::False;
        }
        match vars.as_slice() {
            [] => Truth::True,
            [x] => self.contains_single(f, h, *x),
            _ => self.monomial_dominates(f, h, &vars),
        }
    }

    fn contains_single(&mut self, f: ExprHandle, h: ExprHandle, x: ExprHandle) -> Truth {
        let (Some(fm), Some(hm)) = (self.leading_monomial(f, x), self.leading_monomial(h, x)) else {
            return Truth::Unknown;
        };
        match self.compare_exponents(hm.exp, fm.exp) {
            Some(Ordering::Greater) => Truth::True,
            Some(Ordering::Less) => Truth::False,
            // Same power: log(x) factors decide, log(x) being unbounded.
            Some(Ordering::Equal) => Truth::from_bool(hm.logs <= fm.logs),
            None => Truth::Unknown,
        }
    }

    // `g/f` bounded, factor by factor, for monomials in several symbols.
    fn monomial_dominates(&mut self, f: ExprHandle, g: ExprHandle, vars: &[ExprHandle]) -> Truth {
        let mut result = Truth::True;
        for &v in vars {
            let (Some((_, ef)), Some((_, eg))) = (self.as_coeff_exponent(f, v), self.as_coeff_exponent(g, v)) else {
                return Truth::Unknown;
            };
            match self.compare_exponents(eg, ef) {
                Some(Ordering::Less) => return Truth::False,
                Some(_) => {}
                None => result = Truth::Unknown,
            }
        }
        result
    }

    /// Drops every order term dominated by another one.
    pub(crate) fn dominant_orders(&mut self, orders: Vec<ExprHandle>) -> Vec<ExprHandle> {
        let mut kept: Vec<ExprHandle> = Vec::with_capacity(orders.len());
        for o in orders {
            if self.is_zero(o) {
                continue;
            }
            if kept.iter().any(|&k| self.order_contains(k, o) == Truth::True) {
                continue;
            }
            let mut survivors = Vec::with_capacity(kept.len() + 1);
            for k in kept {
                if self.order_contains(o, k) != Truth::True {
                    survivors.push(k);
                }
            }
            survivors.push(o);
            kept = survivors;
        }
        kept
    }
}
