//! Symbolic differentiation.

use smallvec::SmallVec;

use crate::arena::ExprArena;
use crate::error::{CoreError, CoreResult};
use crate::expr::{ExprNode, FnArgs, FunctionId};
use crate::handle::ExprHandle;
use crate::memo::MemoOp;

impl ExprArena {
    /// `d expr / d x`.
    ///
    /// Sums and products use linearity and the product rule (keeping the
    /// order of non-commutative factors), applications use the chain rule
    /// through [`FunctionDef::fdiff`](crate::FunctionDef::fdiff), and
    /// whatever cannot be differentiated is kept as a `Derivative`.
    ///
    /// # Errors
    ///
    /// Returns a type-error if `x` is not a symbol.
    pub fn diff(&mut self, expr: ExprHandle, x: ExprHandle) -> CoreResult<ExprHandle> {
        if !self.is_symbol(x) {
            return Err(CoreError::type_error("diff", x, "can only differentiate with respect to a symbol"));
        }
        if expr == x {
            return Ok(self.one());
        }
        if !self.has_subtree(expr, x) {
            return Ok(self.zero());
        }
        let key = [expr, x, x];
        if let Some(r) = self.memo.get(MemoOp::Diff, key) {
            return Ok(r);
        }
        let r = self.diff_node(expr, x)?;
        self.memo.insert(MemoOp::Diff, key, r);
        Ok(r)
    }

    /// Differentiates `expr` by each of `vars` in turn.
    ///
    /// # Errors
    ///
    /// Returns a type-error if any of `vars` is not a symbol.
    pub fn derivative(&mut self, expr: ExprHandle, vars: &[ExprHandle]) -> CoreResult<ExprHandle> {
        vars.iter().try_fold(expr, |e, &v| self.diff(e, v))
    }

    fn diff_node(&mut self, expr: ExprHandle, x: ExprHandle) -> CoreResult<ExprHandle> {
        match self.get(expr).clone() {
            ExprNode::Add(terms) => {
                let mut parts = Vec::with_capacity(terms.len());
                for t in terms {
                    parts.push(self.diff(t, x)?);
                }
                Ok(self.add(&parts))
            }
            ExprNode::Mul(factors) => {
                let mut parts = Vec::with_capacity(factors.len());
                for (i, &f) in factors.iter().enumerate() {
                    let df = self.diff(f, x)?;
                    if self.is_zero(df) {
                        continue;
                    }
                    let mut term: Vec<ExprHandle> = factors.to_vec();
                    term[i] = df;
                    parts.push(self.mul(&term));
                }
                Ok(self.add(&parts))
            }
            ExprNode::Pow { base, exp } => self.diff_pow(base, exp, x),
            ExprNode::Apply { func, args } => self.diff_apply(expr, func, &args, x),
            ExprNode::FApply { func, args } => self.diff_fapply(expr, func, &args, x),
            ExprNode::Derivative { expr: inner, vars } => Ok(self.merge_derivative(inner, &vars, x)),
            ExprNode::Order { expr: inner, vars } => {
                let d = self.diff(inner, x)?;
                self.order(d, &vars)
            }
            _ => Ok(self.unevaluated_derivative(expr, x)),
        }
    }

    fn diff_pow(&mut self, base: ExprHandle, exp: ExprHandle, x: ExprHandle) -> CoreResult<ExprHandle> {
        let db = self.diff(base, x)?;
        if !self.has_subtree(exp, x) {
            // e * b^(e-1) * b'
            let m1 = self.minus_one();
            let e1 = self.add(&[exp, m1]);
            let p = self.pow(base, e1)?;
            return Ok(self.mul(&[exp, p, db]));
        }
        // b^e * (e' * log(b) + e * b' / b)
        let de = self.diff(exp, x)?;
        let whole = self.pow(base, exp)?;
        let log_b = self.log(base)?;
        let first = self.mul(&[de, log_b]);
        let ratio = self.div(db, base)?;
        let second = self.mul(&[exp, ratio]);
        let inner = self.add(&[first, second]);
        Ok(self.mul(&[whole, inner]))
    }

    fn diff_apply(
        &mut self,
        expr: ExprHandle,
        func: FunctionId,
        args: &[ExprHandle],
        x: ExprHandle,
    ) -> CoreResult<ExprHandle> {
        if self.is_undefined_function(func) && args.iter().all(|&a| self.is_symbol(a)) {
            return Ok(self.unevaluated_derivative(expr, x));
        }
        let def = self.function_def(func);
        let mut parts = Vec::with_capacity(args.len());
        for (i, &a) in args.iter().enumerate() {
            let da = self.diff(a, x)?;
            if self.is_zero(da) {
                continue;
            }
            let partial = match &def {
                Some(def) => match def.fdiff(self, i)? {
                    Some(lambda) => self.call(lambda, args)?,
                    None => self.fderivative_apply(func, smallvec::smallvec![index_u32(i)?], args),
                },
                None => self.fderivative_apply(func, smallvec::smallvec![index_u32(i)?], args),
            };
            parts.push(self.mul(&[partial, da]));
        }
        Ok(self.add(&parts))
    }

    fn diff_fapply(
        &mut self,
        expr: ExprHandle,
        func: ExprHandle,
        args: &[ExprHandle],
        x: ExprHandle,
    ) -> CoreResult<ExprHandle> {
        let ExprNode::FDerivative { func: f, indices } = self.get(func).clone() else {
            return Ok(self.unevaluated_derivative(expr, x));
        };
        let mut parts = Vec::with_capacity(args.len());
        for (i, &a) in args.iter().enumerate() {
            let da = self.diff(a, x)?;
            if self.is_zero(da) {
                continue;
            }
            let mut more = indices.clone();
            more.push(index_u32(i)?);
            more.sort_unstable();
            let partial = self.fderivative_apply(f, more, args);
            parts.push(self.mul(&[partial, da]));
        }
        Ok(self.add(&parts))
    }

    fn fderivative_apply(&mut self, func: FunctionId, indices: SmallVec<[u32; 2]>, args: &[ExprHandle]) -> ExprHandle {
        let fd = self.intern(ExprNode::FDerivative { func, indices });
        self.intern(ExprNode::FApply {
            func: fd,
            args: args.iter().copied().collect(),
        })
    }

    fn unevaluated_derivative(&mut self, expr: ExprHandle, x: ExprHandle) -> ExprHandle {
        self.intern(ExprNode::Derivative {
            expr,
            vars: smallvec::smallvec![x],
        })
    }

    fn merge_derivative(&mut self, inner: ExprHandle, vars: &[ExprHandle], x: ExprHandle) -> ExprHandle {
        let mut merged: FnArgs = vars.iter().copied().collect();
        merged.push(x);
        self.sort_canonical(&mut merged);
        self.intern(ExprNode::Derivative { expr: inner, vars: merged })
    }
}

fn index_u32(i: usize) -> CoreResult<u32> {
    u32::try_from(i).map_err(|_| CoreError::value("diff", None, "argument index out of range"))
}

#[cfg(test)]
mod tests {
    use crate::function::Arity;
    use crate::{ErrorKind, ExprArena, ExprNode};

    #[test]
    fn test_polynomial() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let three = arena.integer(3);
        let two = arena.integer(2);
        let x3 = arena.pow(x, three).unwrap();
        let tx = arena.mul(&[two, x]);
        let p = arena.add(&[x3, tx]);
        let d = arena.diff(p, x).unwrap();
        let x2 = arena.pow(x, two).unwrap();
        let t = arena.mul(&[three, x2]);
        assert_eq!(d, arena.add(&[t, two]));
        let y = arena.symbol("y");
        assert_eq!(arena.diff(p, y).unwrap(), arena.zero());
    }

    #[test]
    fn test_chain_rule() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let two = arena.integer(2);
        let x2 = arena.pow(x, two).unwrap();
        let s = arena.sin(x2).unwrap();
        let d = arena.diff(s, x).unwrap();
        let c = arena.cos(x2).unwrap();
        assert_eq!(d, arena.mul(&[two, x, c]));
    }

    #[test]
    fn test_symbolic_exponent() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let xx = arena.pow(x, x).unwrap();
        let d = arena.diff(xx, x).unwrap();
        let one = arena.one();
        let lx = arena.log(x).unwrap();
        let s = arena.add(&[one, lx]);
        assert_eq!(d, arena.mul(&[xx, s]));
    }

    #[test]
    fn test_product_rule_keeps_order() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let a = arena.noncommutative_symbol("A");
        let two = arena.integer(2);
        let x2 = arena.pow(x, two).unwrap();
        let p = arena.mul(&[x2, a]);
        let d = arena.diff(p, x).unwrap();
        assert_eq!(d, arena.mul(&[two, x, a]));
    }

    #[test]
    fn test_undefined_functions() {
        let mut arena = ExprArena::new();
        let f = arena.function("f", Arity::Exact(1)).unwrap();
        let x = arena.symbol("x");
        let fx = arena.apply(f, &[x]).unwrap();
        let d = arena.diff(fx, x).unwrap();
        assert!(matches!(arena.get(d), ExprNode::Derivative { .. }));
        let dd = arena.diff(d, x).unwrap();
        match arena.get(dd) {
            ExprNode::Derivative { expr, vars } => {
                assert_eq!(*expr, fx);
                assert_eq!(vars.as_slice(), &[x, x]);
            }
            other => panic!("unexpected {other:?}"),
        }
        let two = arena.integer(2);
        let tx = arena.mul(&[two, x]);
        let f2x = arena.apply(f, &[tx]).unwrap();
        let d = arena.diff(f2x, x).unwrap();
        let args = arena.args(d);
        assert_eq!(args[0], two);
        assert!(matches!(arena.get(args[1]), ExprNode::FApply { .. }));
    }

    #[test]
    fn test_mixed_partials_sorted() {
        let mut arena = ExprArena::new();
        let g = arena.function("g", Arity::Exact(2)).unwrap();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let gxy = arena.apply(g, &[x, y]).unwrap();
        let a = arena.derivative(gxy, &[y, x]).unwrap();
        let b = arena.derivative(gxy, &[x, y]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_requires_symbol() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let two = arena.integer(2);
        let err = arena.diff(x, two).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }
}
