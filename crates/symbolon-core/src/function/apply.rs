//! Application of functions, lambdas and compositions.

use smallvec::SmallVec;

use crate::arena::ExprArena;
use crate::error::{CoreError, CoreResult};
use crate::expr::{functions, ExprNode, FnArgs, FunctionId};
use crate::function::Arity;
use crate::handle::ExprHandle;

impl ExprArena {
    /// `func(args)`: checks the arity, expands `O`-term arguments, then
    /// runs the function's `eval_apply` hook and keeps an `Apply` node when
    /// it declines.
    ///
    /// # Errors
    ///
    /// Returns a value-error for an unknown function, a type-error for a
    /// wrong argument count, and whatever the hook raises (`log(0)` is a
    /// domain-error).
    pub fn apply(&mut self, func: FunctionId, args: &[ExprHandle]) -> CoreResult<ExprHandle> {
        let op = "apply";
        let entry = self
            .registry()
            .function(func)
            .ok_or_else(|| CoreError::value(op, None, format!("unknown function id {func}")))?;
        let arity = entry.arity();
        if !arity.accepts(args.len()) {
            return Err(CoreError::type_error(
                op,
                None,
                format!("{} takes {arity} arguments, got {}", entry.name(), args.len()),
            ));
        }
        let Some(def) = self.function_def(func) else {
            return Ok(self.intern(ExprNode::Apply {
                func,
                args: args.iter().copied().collect(),
            }));
        };
        if args.iter().any(|&a| self.as_number(a).is_some_and(symbolon_numbers::Number::is_nan)) {
            return Ok(self.nan());
        }
        if let [arg] = args {
            if let Some(r) = self.apply_with_order_argument(func, *arg)? {
                return Ok(r);
            }
        }
        if let Some(r) = def.eval_apply(self, args)? {
            return Ok(r);
        }
        Ok(self.intern(ExprNode::Apply {
            func,
            args: args.iter().copied().collect(),
        }))
    }

    // f(g + O(h)) = f(g) + f^(n)(g) * O(h)^n for the first n with a
    // nonzero derivative.
    fn apply_with_order_argument(&mut self, func: FunctionId, arg: ExprHandle) -> CoreResult<Option<ExprHandle>> {
        let (regular, orders): (Vec<ExprHandle>, Vec<ExprHandle>) = match self.get(arg) {
            ExprNode::Order { .. } => (Vec::new(), vec![arg]),
            ExprNode::Add(terms) if terms.iter().any(|&t| matches!(self.get(t), ExprNode::Order { .. })) => {
                terms.iter().copied().partition(|&t| !matches!(self.get(t), ExprNode::Order { .. }))
            }
            _ => return Ok(None),
        };
        let Some(def) = self.function_def(func) else {
            return Ok(None);
        };
        let g = self.add(&regular);
        let o = self.add(&orders);
        let value = self.apply(func, &[g])?;
        let Some(mut derivative) = def.fdiff(self, 0)? else {
            return Ok(None);
        };
        let limit = self.series_config().max_taylor_terms;
        for n in 1..=limit {
            let at_g = self.call(derivative, &[g])?;
            if !self.is_zero(at_g) {
                let power = self.integer(i64::from(n));
                let on = self.pow(o, power)?;
                let correction = self.mul(&[at_g, on]);
                return Ok(Some(self.add(&[value, correction])));
            }
            derivative = self.lambda_derivative(derivative)?;
        }
        Err(CoreError::not_implemented(
            "apply",
            arg,
            "every derivative vanished within the configured term limit",
        ))
    }

    fn lambda_derivative(&mut self, lambda: ExprHandle) -> CoreResult<ExprHandle> {
        match self.get(lambda).clone() {
            ExprNode::Lambda { vars, body } if vars.len() == 1 => {
                let d = self.diff(body, vars[0])?;
                self.lambda(&vars, d)
            }
            _ => Err(CoreError::type_error("diff", lambda, "expected a one-argument lambda")),
        }
    }

    /// `Lambda(vars, body)`.
    ///
    /// # Errors
    ///
    /// Returns a type-error if a bound variable is not a symbol.
    pub fn lambda(&mut self, vars: &[ExprHandle], body: ExprHandle) -> CoreResult<ExprHandle> {
        if let Some(&bad) = vars.iter().find(|&&v| !self.is_symbol(v)) {
            return Err(CoreError::type_error("lambda", bad, "lambda variables must be symbols"));
        }
        Ok(self.intern(ExprNode::Lambda {
            vars: vars.iter().copied().collect(),
            body,
        }))
    }

    /// Applies a function-valued expression: a function object, a lambda,
    /// a composition or a function derivative. Anything else is kept as
    /// `FApply`.
    ///
    /// # Errors
    ///
    /// Returns a type-error for argument count mismatches and propagates
    /// errors from evaluation.
    pub fn call(&mut self, f: ExprHandle, args: &[ExprHandle]) -> CoreResult<ExprHandle> {
        match self.get(f).clone() {
            ExprNode::Function(id) => self.apply(id, args),
            ExprNode::Lambda { vars, body } => {
                if vars.len() != args.len() {
                    return Err(CoreError::type_error(
                        "call",
                        f,
                        format!("lambda takes {} arguments, got {}", vars.len(), args.len()),
                    ));
                }
                let pairs: Vec<(ExprHandle, ExprHandle)> = vars.iter().copied().zip(args.iter().copied()).collect();
                self.subs_dict(body, &pairs)
            }
            ExprNode::Composition(fs) => {
                let mut values: SmallVec<[ExprHandle; 2]> = args.iter().copied().collect();
                for &g in fs.iter().rev() {
                    let v = self.call(g, &values)?;
                    values = smallvec::smallvec![v];
                }
                Ok(values[0])
            }
            ExprNode::FDerivative { func, indices } if indices.len() == 1 => {
                let index = indices[0] as usize;
                if let Some(def) = self.function_def(func) {
                    if let Some(lambda) = def.fdiff(self, index)? {
                        return self.call(lambda, args);
                    }
                }
                Ok(self.intern(ExprNode::FApply {
                    func: f,
                    args: args.iter().copied().collect(),
                }))
            }
            _ => Ok(self.intern(ExprNode::FApply {
                func: f,
                args: args.iter().copied().collect(),
            })),
        }
    }

    /// `f∘g∘...`, outermost first; nested compositions are flattened.
    ///
    /// # Errors
    ///
    /// Returns a value-error for an empty list.
    pub fn compose(&mut self, fs: &[ExprHandle]) -> CoreResult<ExprHandle> {
        let mut flat = FnArgs::new();
        for &f in fs {
            match self.get(f) {
                ExprNode::Composition(inner) => flat.extend(inner.iter().copied()),
                _ => flat.push(f),
            }
        }
        match flat.len() {
            0 => Err(CoreError::value("compose", None, "nothing to compose")),
            1 => Ok(flat[0]),
            _ => Ok(self.intern(ExprNode::Composition(flat))),
        }
    }

    /// The partial derivative of `func` along the given argument positions,
    /// as a function object. A single position of a function with an
    /// `fdiff` rule yields that rule's lambda.
    ///
    /// # Errors
    ///
    /// Returns a value-error if a position is out of range for the
    /// function's arity.
    pub fn function_derivative(&mut self, func: FunctionId, indices: &[u32]) -> CoreResult<ExprHandle> {
        let entry = self
            .registry()
            .function(func)
            .ok_or_else(|| CoreError::value("function_derivative", None, format!("unknown function id {func}")))?;
        let bound = match entry.arity() {
            Arity::Exact(k) | Arity::Between(_, k) => Some(k),
            Arity::AtLeast(_) => None,
        };
        if let Some(&bad) = indices.iter().find(|&&i| bound.is_some_and(|k| i as usize >= k)) {
            return Err(CoreError::value(
                "function_derivative",
                None,
                format!("argument index {bad} out of range"),
            ));
        }
        if let [index] = indices {
            if let Some(def) = self.function_def(func) {
                if let Some(lambda) = def.fdiff(self, *index as usize)? {
                    return Ok(lambda);
                }
            }
        }
        let mut sorted: SmallVec<[u32; 2]> = indices.iter().copied().collect();
        sorted.sort_unstable();
        Ok(self.intern(ExprNode::FDerivative { func, indices: sorted }))
    }

    /// `exp(a)`.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn exp(&mut self, a: ExprHandle) -> CoreResult<ExprHandle> {
        self.apply(functions::EXP, &[a])
    }

    /// Natural logarithm.
    ///
    /// # Errors
    ///
    /// Domain-error for `log(0)`.
    pub fn log(&mut self, a: ExprHandle) -> CoreResult<ExprHandle> {
        self.apply(functions::LOG, &[a])
    }

    /// Sine.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn sin(&mut self, a: ExprHandle) -> CoreResult<ExprHandle> {
        self.apply(functions::SIN, &[a])
    }

    /// Cosine.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn cos(&mut self, a: ExprHandle) -> CoreResult<ExprHandle> {
        self.apply(functions::COS, &[a])
    }

    /// Tangent.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn tan(&mut self, a: ExprHandle) -> CoreResult<ExprHandle> {
        self.apply(functions::TAN, &[a])
    }

    /// Absolute value.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn abs(&mut self, a: ExprHandle) -> CoreResult<ExprHandle> {
        self.apply(functions::ABS, &[a])
    }

    /// Sign.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn sign(&mut self, a: ExprHandle) -> CoreResult<ExprHandle> {
        self.apply(functions::SIGN, &[a])
    }
}

#[cfg(test)]
mod tests {
    use crate::function::Arity;
    use crate::{ErrorKind, ExprArena, ExprNode};

    #[test]
    fn test_undefined_application() {
        let mut arena = ExprArena::new();
        let f = arena.function("f", Arity::Exact(1)).unwrap();
        let x = arena.symbol("x");
        let fx = arena.apply(f, &[x]).unwrap();
        assert!(matches!(arena.get(fx), ExprNode::Apply { .. }));
        assert_eq!(arena.apply(f, &[x]).unwrap(), fx);
        let err = arena.apply(f, &[x, x]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn test_lambda_application() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let two = arena.integer(2);
        let body = arena.pow(x, two).unwrap();
        let square = arena.lambda(&[x], body).unwrap();
        let three = arena.integer(3);
        assert_eq!(arena.call(square, &[three]).unwrap(), arena.integer(9));
        let y2 = arena.pow(y, two).unwrap();
        assert_eq!(arena.call(square, &[y]).unwrap(), y2);
        assert!(arena.call(square, &[x, y]).is_err());
        assert!(arena.lambda(&[two], body).is_err());
    }

    #[test]
    fn test_composition() {
        let mut arena = ExprArena::new();
        let sin = arena.function_value(crate::functions::SIN);
        let exp = arena.function_value(crate::functions::EXP);
        let c = arena.compose(&[sin, exp]).unwrap();
        let x = arena.symbol("x");
        let ex = arena.exp(x).unwrap();
        let expected = arena.sin(ex).unwrap();
        assert_eq!(arena.call(c, &[x]).unwrap(), expected);
        let nested = arena.compose(&[c, sin]).unwrap();
        assert_eq!(arena.args(nested).len(), 3);
    }

    #[test]
    fn test_order_argument() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let o = arena.order(x, &[x]).unwrap();
        let e = arena.exp(o).unwrap();
        let one = arena.one();
        assert_eq!(e, arena.add(&[one, o]));

        let two = arena.integer(2);
        let x2 = arena.pow(x, two).unwrap();
        let o2 = arena.order(x2, &[x]).unwrap();
        let c = arena.cos(o).unwrap();
        assert_eq!(c, arena.add(&[one, o2]));
    }

    #[test]
    fn test_function_derivative_object() {
        let mut arena = ExprArena::new();
        let f = arena.function("f", Arity::Exact(2)).unwrap();
        let d = arena.function_derivative(f, &[1, 0]).unwrap();
        match arena.get(d) {
            ExprNode::FDerivative { indices, .. } => assert_eq!(indices.as_slice(), &[0, 1]),
            other => panic!("unexpected {other:?}"),
        }
        let cos_lambda = arena.function_derivative(crate::functions::SIN, &[0]).unwrap();
        let x = arena.symbol("x");
        let cx = arena.cos(x).unwrap();
        assert_eq!(arena.call(cos_lambda, &[x]).unwrap(), cx);
    }
}
