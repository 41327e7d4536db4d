//! Truncated series modulo an order term.

use crate::arena::ExprArena;
use crate::assumptions::Truth;
use crate::error::{CoreError, CoreResult};
use crate::expr::{ExprNode, FunctionId};
use crate::handle::ExprHandle;

impl ExprArena {
    /// The series of `expr` modulo `order`, without the order term itself.
    ///
    /// `order` must be an `O(x^n)` term in a single symbol. Terms contained
    /// in `order` are dropped; an expression wholly contained in it gives
    /// zero.
    ///
    /// # Errors
    ///
    /// Returns a value-error if `order` is not an order term, and
    /// not-implemented when an expansion would need more terms than
    /// [`SeriesConfig`](crate::SeriesConfig) allows.
    pub fn oseries(&mut self, expr: ExprHandle, order: ExprHandle) -> CoreResult<ExprHandle> {
        let Some((_, vars)) = self.order_parts(order) else {
            return Err(CoreError::value("oseries", order, "expected an order term"));
        };
        if self.order_contains(order, expr) == Truth::True {
            return Ok(self.zero());
        }
        let [x] = vars.as_slice() else {
            return Ok(expr);
        };
        let x = *x;
        if !self.has_subtree(expr, x) {
            return Ok(expr);
        }
        match self.get(expr).clone() {
            ExprNode::Add(terms) => {
                let mut parts = Vec::with_capacity(terms.len());
                for t in terms {
                    parts.push(self.oseries(t, order)?);
                }
                let sum = self.add(&parts);
                Ok(self.drop_contained(sum, order))
            }
            ExprNode::Mul(factors) => self.mul_oseries(expr, &factors, order, x),
            ExprNode::Pow { base, exp } => self.pow_oseries(expr, base, exp, order, x),
            ExprNode::Apply { func, args } => self.apply_oseries(expr, func, &args, order, x),
            _ => Ok(expr),
        }
    }

    /// `oseries(expr, O(x^n)) + O(x^n)`.
    ///
    /// # Errors
    ///
    /// Returns a type-error if `x` is not a symbol, and whatever
    /// [`oseries`](Self::oseries) returns.
    pub fn series(&mut self, expr: ExprHandle, x: ExprHandle, n: i64) -> CoreResult<ExprHandle> {
        if !self.is_symbol(x) {
            return Err(CoreError::type_error("series", x, "expected a symbol"));
        }
        let k = self.integer(n);
        let xn = self.pow(x, k)?;
        let order = self.order(xn, &[x])?;
        let s = self.oseries(expr, order)?;
        Ok(self.add(&[s, order]))
    }

    /// `expr` without its order terms.
    pub fn remove_order(&mut self, expr: ExprHandle) -> ExprHandle {
        match self.get(expr) {
            ExprNode::Order { .. } => self.zero(),
            ExprNode::Add(terms) => {
                let kept: Vec<ExprHandle> = terms
                    .iter()
                    .copied()
                    .filter(|&t| !matches!(self.get(t), ExprNode::Order { .. }))
                    .collect();
                self.add(&kept)
            }
            _ => expr,
        }
    }

    /// How many powers `arg^k` fall outside `order`: `ceil(n / p)` for
    /// `order = O(x^n)` and `arg ~ x^p`.
    ///
    /// # Errors
    ///
    /// Returns a domain-error if `arg` does not tend to zero, and
    /// not-implemented past the configured term limit.
    pub(crate) fn series_terms(&mut self, arg: ExprHandle, order: ExprHandle) -> CoreResult<u32> {
        let Some(x) = self.order_parts(order).and_then(|(_, vars)| vars.first().copied()) else {
            return Err(CoreError::value("series_terms", order, "expected an order term"));
        };
        let n = self.order_exponent(order, x)?;
        let p = self
            .leading_monomial(arg, x)
            .map(|m| m.exp)
            .ok_or_else(|| CoreError::not_implemented("series_terms", arg, "no leading power"))?;
        let ratio = self.div(n, p)?;
        let (n_val, p_val, ratio_val) = match (self.evalf(n), self.evalf(p), self.evalf(ratio)) {
            (Ok(n), Ok(p), Ok(r)) => (n.to_f64(), p.to_f64(), r.to_f64()),
            _ => return Err(CoreError::not_implemented("series_terms", arg, "symbolic series order")),
        };
        if p_val <= 0.0 {
            return Err(CoreError::domain("series_terms", arg, "argument does not tend to zero"));
        }
        if n_val <= 0.0 {
            return Ok(0);
        }
        let count = ratio_val.ceil();
        let limit = self.series_config().max_taylor_terms;
        if count > f64::from(limit) {
            return Err(CoreError::not_implemented(
                "series_terms",
                arg,
                format!("more than {limit} terms needed"),
            ));
        }
        Ok(count as u32)
    }

    // `n` for `O(x^n)`.
    fn order_exponent(&mut self, order: ExprHandle, x: ExprHandle) -> CoreResult<ExprHandle> {
        let Some((f, _)) = self.order_parts(order) else {
            return Err(CoreError::value("oseries", order, "expected an order term"));
        };
        match self.monomial_split(f, x) {
            Some(m) if m.logs == 0 => Ok(m.exp),
            _ => Err(CoreError::not_implemented("oseries", order, "order term is not a power of the symbol")),
        }
    }

    fn drop_contained(&mut self, h: ExprHandle, order: ExprHandle) -> ExprHandle {
        let terms: Vec<ExprHandle> = match self.get(h) {
            ExprNode::Add(terms) => terms.to_vec(),
            _ => vec![h],
        };
        let kept: Vec<ExprHandle> = terms
            .into_iter()
            .filter(|&t| self.order_contains(order, t) != Truth::True)
            .collect();
        self.add(&kept)
    }

    fn shifted_order(&mut self, x: ExprHandle, n: ExprHandle) -> CoreResult<ExprHandle> {
        let xn = self.pow(x, n)?;
        self.order(xn, &[x])
    }

    fn mul_oseries(
        &mut self,
        expr: ExprHandle,
        factors: &[ExprHandle],
        order: ExprHandle,
        x: ExprHandle,
    ) -> CoreResult<ExprHandle> {
        let mut monomial = Vec::new();
        let mut others = Vec::new();
        for &f in factors {
            match self.monomial_split(f, x) {
                Some(m) if m.logs == 0 => monomial.push(f),
                _ => others.push(f),
            }
        }
        if others.is_empty() {
            return Ok(expr);
        }
        let m = self.mul(&monomial);
        let me = self.monomial_split(m, x).map_or_else(|| self.zero(), |s| s.exp);
        let n = self.order_exponent(order, x)?;
        let target = self.sub(n, me);

        // Each factor is expanded to the order left over once the leading
        // powers of the others are accounted for.
        let mut leads = Vec::with_capacity(others.len());
        for &g in &others {
            match self.leading_monomial(g, x) {
                Some(l) => leads.push(l.exp),
                None => return self.naive_product_oseries(expr, &others, m, order),
            }
        }
        let total = self.add(&leads);
        let mut expanded = Vec::with_capacity(others.len());
        for (&g, &p) in others.iter().zip(&leads) {
            let rest = self.sub(total, p);
            let bound = self.sub(target, rest);
            let o = self.shifted_order(x, bound)?;
            expanded.push(self.oseries(g, o)?);
        }
        let product = self.distribute(&expanded);
        let within = self.shifted_order(x, target)?;
        let product = self.drop_contained(product, within);
        let r = self.distribute(&[m, product]);
        Ok(self.drop_contained(r, order))
    }

    fn naive_product_oseries(
        &mut self,
        expr: ExprHandle,
        others: &[ExprHandle],
        m: ExprHandle,
        order: ExprHandle,
    ) -> CoreResult<ExprHandle> {
        tracing::debug!(?expr, "factor without a leading power, expanding the product naively");
        let mut expanded = Vec::with_capacity(others.len() + 1);
        expanded.push(m);
        for &g in others {
            expanded.push(self.oseries(g, order)?);
        }
        let product = self.distribute(&expanded);
        Ok(self.drop_contained(product, order))
    }

    fn pow_oseries(
        &mut self,
        expr: ExprHandle,
        base: ExprHandle,
        exp: ExprHandle,
        order: ExprHandle,
        x: ExprHandle,
    ) -> CoreResult<ExprHandle> {
        if self.has_subtree(exp, x) {
            let log_b = self.log(base)?;
            let m = self.mul(&[exp, log_b]);
            let rewritten = self.exp(m)?;
            if rewritten == expr {
                return Ok(expr);
            }
            return self.oseries(rewritten, order);
        }
        if base == x || self.is_log_of_symbol(base, x) {
            return Ok(expr);
        }
        if matches!(self.get(base), ExprNode::Add(_)) && self.as_i64(exp).is_some_and(|k| k > 0) {
            let expanded = self.expand(expr)?;
            if expanded != expr {
                return self.oseries(expanded, order);
            }
        }

        // b^e = (c0 x^p)^e (1 + t)^e with t -> 0
        let Some(lead) = self.leading_monomial(base, x).filter(|m| m.logs == 0) else {
            return Ok(expr);
        };
        let (c0, p) = (lead.coeff, lead.exp);
        let xp = self.pow(x, p)?;
        let lt = self.mul(&[c0, xp]);
        let pe = self.mul(&[p, exp]);
        let n = self.order_exponent(order, x)?;
        let target = self.sub(n, pe);
        let within = self.shifted_order(x, target)?;

        let ratio = self.div(base, lt)?;
        let ratio = self.oseries(ratio, within)?;
        let m1 = self.minus_one();
        let t = self.add(&[ratio, m1]);
        let t = self.expand(t)?;
        let t = self.drop_contained(t, within);

        let mut terms = vec![self.one()];
        if !self.is_zero(t) {
            let count = self.series_terms(t, within)?;
            let mut coeff = self.one();
            let mut power = self.one();
            for k in 1..count {
                let shift = self.integer(1 - i64::from(k));
                let factor = self.add(&[exp, shift]);
                let inv_k = self.rational(1, i64::from(k));
                coeff = self.mul(&[coeff, factor, inv_k]);
                let next = self.distribute(&[power, t]);
                power = self.drop_contained(next, within);
                terms.push(self.distribute(&[coeff, power]));
            }
        }
        let sum = self.add(&terms);
        let sum = self.drop_contained(sum, within);
        let scale_c = self.pow(c0, exp)?;
        let scale_x = self.pow(x, pe)?;
        let r = self.distribute(&[scale_c, scale_x, sum]);
        Ok(self.drop_contained(r, order))
    }

    fn is_log_of_symbol(&self, h: ExprHandle, x: ExprHandle) -> bool {
        matches!(self.get(h), ExprNode::Apply { func, args }
            if *func == crate::expr::functions::LOG && args.as_slice() == [x])
    }

    fn apply_oseries(
        &mut self,
        expr: ExprHandle,
        func: FunctionId,
        args: &[ExprHandle],
        order: ExprHandle,
        x: ExprHandle,
    ) -> CoreResult<ExprHandle> {
        let Some(def) = self.function_def(func) else {
            return Ok(expr);
        };
        if let [a] = args {
            let a = *a;
            if self.tends_to_zero(a, x)? == Truth::True {
                if let Some(r) = self.taylor_oseries(&*def, a, order)? {
                    return Ok(r);
                }
            }
        }
        match def.eval_oseries(self, args, order)? {
            Some(r) => {
                let r = self.expand(r)?;
                Ok(self.drop_contained(r, order))
            }
            None => Ok(expr),
        }
    }

    // Sums `taylor_term(n, arg)` over the terms that survive `order`.
    fn taylor_oseries(
        &mut self,
        def: &dyn crate::function::FunctionDef,
        a: ExprHandle,
        order: ExprHandle,
    ) -> CoreResult<Option<ExprHandle>> {
        let count = self.series_terms(a, order)?;
        let arg = self.oseries(a, order)?;
        let mut previous = Vec::with_capacity(count as usize);
        let mut terms = Vec::with_capacity(count as usize);
        for n in 0..count {
            let Some(term) = def.taylor_term(self, n, arg, &previous)? else {
                return Ok(None);
            };
            previous.push(term);
            let t = self.expand(term)?;
            terms.push(self.drop_contained(t, order));
        }
        tracing::trace!(function = def.name(), terms = count, "taylor expansion");
        let sum = self.add(&terms);
        Ok(Some(self.drop_contained(sum, order)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn power(arena: &mut ExprArena, x: ExprHandle, n: i64) -> ExprHandle {
        let n = arena.integer(n);
        arena.pow(x, n).unwrap()
    }

    fn order_of(arena: &mut ExprArena, x: ExprHandle, n: i64) -> ExprHandle {
        let p = power(arena, x, n);
        arena.order(p, &[x]).unwrap()
    }

    #[test]
    fn test_sin_series() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let s = arena.sin(x).unwrap();
        let o = order_of(&mut arena, x, 5);
        let r = arena.oseries(s, o).unwrap();
        let x3 = power(&mut arena, x, 3);
        let c = arena.rational(-1, 6);
        let t = arena.mul(&[c, x3]);
        assert_eq!(r, arena.add(&[x, t]));
    }

    #[test]
    fn test_geometric_series() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let one = arena.one();
        let m1 = arena.minus_one();
        let b = arena.add(&[one, x]);
        let inv = arena.pow(b, m1).unwrap();
        let o = order_of(&mut arena, x, 4);
        let r = arena.oseries(inv, o).unwrap();
        let x2 = power(&mut arena, x, 2);
        let x3 = power(&mut arena, x, 3);
        let nx = arena.neg(x);
        let nx3 = arena.neg(x3);
        assert_eq!(r, arena.add(&[one, nx, x2, nx3]));
    }

    #[test]
    fn test_exp_series_with_order() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let e = arena.exp(x).unwrap();
        let s = arena.series(e, x, 3).unwrap();
        let one = arena.one();
        let x2 = power(&mut arena, x, 2);
        let half = arena.half();
        let hx2 = arena.mul(&[half, x2]);
        let o = order_of(&mut arena, x, 3);
        assert_eq!(s, arena.add(&[one, x, hx2, o]));
        assert_eq!(arena.remove_order(s), arena.add(&[one, x, hx2]));
    }

    #[test]
    fn test_contained_is_zero() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let x5 = power(&mut arena, x, 5);
        let o = order_of(&mut arena, x, 3);
        assert_eq!(arena.oseries(x5, o).unwrap(), arena.zero());
        let y = arena.symbol("y");
        assert_eq!(arena.oseries(y, o).unwrap(), y);
    }

    #[test]
    fn test_product_shifts_orders() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let s = arena.sin(x).unwrap();
        let p = arena.mul(&[x, s]);
        let o = order_of(&mut arena, x, 4);
        let r = arena.oseries(p, o).unwrap();
        assert_eq!(r, power(&mut arena, x, 2));
    }

    #[test]
    fn test_too_many_terms() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let e = arena.exp(x).unwrap();
        let o = order_of(&mut arena, x, 1000);
        let err = arena.oseries(e, o).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotImplemented);
    }
}
