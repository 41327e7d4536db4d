//! Substitution.

use rustc_hash::FxHashMap;

use crate::arena::ExprArena;
use crate::error::{CoreError, CoreResult};
use crate::expr::ExprNode;
use crate::handle::ExprHandle;
use crate::memo::MemoOp;

impl ExprArena {
    /// Replaces `old` by `new` in `expr`.
    ///
    /// Besides exact occurrences, a sum `old` replaces a sub-sum
    /// (`(a+b+c).subs(a+c, z) = b+z`), a commutative product `old`
    /// replaces a sub-product, `x^4` with `old = x^2` becomes `new^2`, and
    /// functions get their own rule through
    /// [`FunctionDef::eval_apply_subs`](crate::FunctionDef::eval_apply_subs).
    /// Variables bound by a `Lambda` are not replaced.
    ///
    /// # Errors
    ///
    /// Propagates errors from rebuilding the result, e.g. a division by
    /// zero that substitution creates.
    pub fn subs(&mut self, expr: ExprHandle, old: ExprHandle, new: ExprHandle) -> CoreResult<ExprHandle> {
        if expr == old {
            return Ok(new);
        }
        if old == new || self.get(expr).is_atom() {
            return Ok(expr);
        }
        let structural = matches!(
            self.get(old),
            ExprNode::Add(_) | ExprNode::Mul(_) | ExprNode::Pow { .. } | ExprNode::Apply { .. }
        );
        if !structural && !self.has_subtree(expr, old) {
            return Ok(expr);
        }
        let key = [expr, old, new];
        if let Some(r) = self.memo.get(MemoOp::Subs, key) {
            return Ok(r);
        }
        let r = self.subs_node(expr, old, new)?;
        self.memo.insert(MemoOp::Subs, key, r);
        Ok(r)
    }

    fn subs_node(&mut self, expr: ExprHandle, old: ExprHandle, new: ExprHandle) -> CoreResult<ExprHandle> {
        let node = self.get(expr).clone();
        match (&node, self.get(old).clone()) {
            (ExprNode::Add(terms), ExprNode::Add(old_terms)) => {
                if let Some(rest) = remove_all(terms, &old_terms) {
                    let rest = self.add(&rest);
                    let rest = self.subs(rest, old, new)?;
                    return Ok(self.add(&[rest, new]));
                }
            }
            (ExprNode::Mul(factors), ExprNode::Mul(old_factors)) if self.is_commutative(expr) => {
                if let Some(rest) = remove_all(factors, &old_factors) {
                    let rest = self.mul(&rest);
                    let rest = self.subs(rest, old, new)?;
                    return Ok(self.mul(&[rest, new]));
                }
            }
            (ExprNode::Pow { base, exp }, ExprNode::Pow { base: ob, exp: oe }) if *base == ob => {
                let ratio = self.div(*exp, oe)?;
                if self.as_number(ratio).is_some_and(|n| n.is_integer()) {
                    return self.pow(new, ratio);
                }
            }
            (ExprNode::Apply { func, args }, _) => {
                if let Some(def) = self.function_def(*func) {
                    if let Some(r) = def.eval_apply_subs(self, args, old, new)? {
                        return Ok(r);
                    }
                }
            }
            (ExprNode::Lambda { vars, .. }, _) if vars.contains(&old) => return Ok(expr),
            _ => {}
        }
        let children = node.children();
        let mut replaced = Vec::with_capacity(children.len());
        for &c in &children {
            replaced.push(self.subs(c, old, new)?);
        }
        if replaced.as_slice() == children.as_slice() {
            return Ok(expr);
        }
        self.rebuild(expr, &replaced)
    }

    /// Simultaneous structural replacement: every occurrence of each `old`
    /// is replaced by its `new`, and replacements are not substituted into
    /// again. The result is rebuilt canonically.
    ///
    /// # Errors
    ///
    /// Propagates errors from rebuilding the result.
    pub fn subs_dict(&mut self, expr: ExprHandle, pairs: &[(ExprHandle, ExprHandle)]) -> CoreResult<ExprHandle> {
        let table: FxHashMap<ExprHandle, ExprHandle> = pairs.iter().copied().collect();
        let mut done = FxHashMap::default();
        self.replace_all(expr, &table, &mut done)
    }

    fn replace_all(
        &mut self,
        h: ExprHandle,
        table: &FxHashMap<ExprHandle, ExprHandle>,
        done: &mut FxHashMap<ExprHandle, ExprHandle>,
    ) -> CoreResult<ExprHandle> {
        if let Some(&n) = table.get(&h) {
            return Ok(n);
        }
        if let Some(&r) = done.get(&h) {
            return Ok(r);
        }
        let node = self.get(h).clone();
        if node.is_atom() {
            return Ok(h);
        }
        let children = node.children();
        let mut replaced = Vec::with_capacity(children.len());
        for &c in &children {
            replaced.push(self.replace_all(c, table, done)?);
        }
        let r = if replaced.as_slice() == children.as_slice() {
            h
        } else {
            self.rebuild(h, &replaced)?
        };
        done.insert(h, r);
        Ok(r)
    }

    /// The node `h` with its children replaced by `children`, through the
    /// canonical constructors.
    ///
    /// # Errors
    ///
    /// Returns the constructor's error, e.g. a type-error when a
    /// differentiation or order variable was replaced by a non-symbol.
    pub fn rebuild(&mut self, h: ExprHandle, children: &[ExprHandle]) -> CoreResult<ExprHandle> {
        match self.get(h).clone() {
            ExprNode::Add(_) => Ok(self.add(children)),
            ExprNode::Mul(_) => Ok(self.mul(children)),
            ExprNode::Pow { .. } => self.pow(children[0], children[1]),
            ExprNode::Apply { func, .. } => self.apply(func, children),
            ExprNode::Lambda { .. } => {
                let (body, vars) = children.split_last().ok_or_else(|| CoreError::value("rebuild", h, "empty lambda"))?;
                self.lambda(vars, *body)
            }
            ExprNode::FApply { .. } => self.call(children[0], &children[1..]),
            ExprNode::Composition(_) => self.compose(children),
            ExprNode::Derivative { .. } => self.derivative(children[0], &children[1..]),
            ExprNode::Order { .. } => self.order(children[0], &children[1..]),
            _ => Ok(h),
        }
    }
}

// `items` without one occurrence of each of `remove`, or `None` if some
// element is missing.
fn remove_all(items: &[ExprHandle], remove: &[ExprHandle]) -> Option<Vec<ExprHandle>> {
    let mut rest = items.to_vec();
    for r in remove {
        let i = rest.iter().position(|x| x == r)?;
        rest.remove(i);
    }
    Some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_sum() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let z = arena.symbol("z");
        let s = arena.add(&[x, y]);
        assert_eq!(arena.subs(s, s, z).unwrap(), z);
    }

    #[test]
    fn test_sub_sum() {
        let mut arena = ExprArena::new();
        let [a, b, c, d, x] = ["a", "b", "c", "d", "x"].map(|n| arena.symbol(n));
        let whole = arena.add(&[a, b, c, d]);
        let old = arena.add(&[b, c]);
        let r = arena.subs(whole, old, x).unwrap();
        assert_eq!(r, arena.add(&[a, x, d]));
    }

    #[test]
    fn test_power_of_old() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let two = arena.integer(2);
        let four = arena.integer(4);
        let x4 = arena.pow(x, four).unwrap();
        let x2 = arena.pow(x, two).unwrap();
        let r = arena.subs(x4, x2, y).unwrap();
        assert_eq!(r, arena.pow(y, two).unwrap());
    }

    #[test]
    fn test_recanonicalises() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let s = arena.add(&[x, y]);
        let ny = arena.neg(y);
        assert_eq!(arena.subs(s, x, ny).unwrap(), arena.zero());
        let zero = arena.zero();
        let sx = arena.sin(x).unwrap();
        assert_eq!(arena.subs(sx, x, zero).unwrap(), zero);
    }

    #[test]
    fn test_simultaneous() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let two = arena.integer(2);
        let x2 = arena.pow(x, two).unwrap();
        let e = arena.add(&[x2, y]);
        let r = arena.subs_dict(e, &[(x, y), (y, x)]).unwrap();
        let y2 = arena.pow(y, two).unwrap();
        assert_eq!(r, arena.add(&[y2, x]));
    }

    #[test]
    fn test_bound_variable_kept() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let body = arena.add(&[x, y]);
        let lambda = arena.lambda(&[x], body).unwrap();
        assert_eq!(arena.subs(lambda, x, y).unwrap(), lambda);
    }
}
