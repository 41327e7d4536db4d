//! Distribution of products over sums.

use symbolon_numbers::Number;

use crate::arena::ExprArena;
use crate::arith::SumBuilder;
use crate::error::{CoreError, CoreResult};
use crate::expr::ExprNode;
use crate::handle::ExprHandle;
use crate::memo::MemoOp;

impl ExprArena {
    /// Multiplies out products and positive integer powers of sums,
    /// recursively, and applies each function's expansion rule.
    ///
    /// # Errors
    ///
    /// Propagates errors from rebuilding powers and applications.
    pub fn expand(&mut self, h: ExprHandle) -> CoreResult<ExprHandle> {
        if self.get(h).is_atom() {
            return Ok(h);
        }
        let key = [h, h, h];
        if let Some(r) = self.memo.get(MemoOp::Expand, key) {
            return Ok(r);
        }
        let r = self.expand_node(h)?;
        self.memo.insert(MemoOp::Expand, key, r);
        Ok(r)
    }

    fn expand_node(&mut self, h: ExprHandle) -> CoreResult<ExprHandle> {
        match self.get(h).clone() {
            ExprNode::Add(args) => {
                let mut builder = SumBuilder::new();
                for a in args {
                    let t = self.expand(a)?;
                    builder.push(self, t);
                }
                Ok(builder.canonical(self))
            }
            ExprNode::Mul(args) => {
                let mut factors = Vec::with_capacity(args.len());
                for a in args {
                    factors.push(self.expand(a)?);
                }
                Ok(self.distribute(&factors))
            }
            ExprNode::Pow { base, exp } => {
                let b = self.expand(base)?;
                let e = self.expand(exp)?;
                if matches!(self.get(b), ExprNode::Add(_)) {
                    if let Some(n) = self.as_i64(e) {
                        if n > 0 {
                            return self.expand_power_of_sum(b, n.unsigned_abs());
                        }
                        if n < 0 {
                            let p = self.expand_power_of_sum(b, n.unsigned_abs())?;
                            let m1 = self.minus_one();
                            return self.pow(p, m1);
                        }
                    }
                }
                let p = self.pow(b, e)?;
                match self.get(p).clone() {
                    ExprNode::Mul(factors) if p != h => {
                        let mut expanded = Vec::with_capacity(factors.len());
                        for f in factors {
                            expanded.push(self.expand(f)?);
                        }
                        Ok(self.distribute(&expanded))
                    }
                    _ => Ok(p),
                }
            }
            ExprNode::Apply { func, args } => {
                let mut expanded = Vec::with_capacity(args.len());
                for a in args {
                    expanded.push(self.expand(a)?);
                }
                if let Some(def) = self.function_def(func) {
                    if let Some(r) = def.eval_expand(self, &expanded)? {
                        return Ok(r);
                    }
                }
                self.apply(func, &expanded)
            }
            ExprNode::Order { expr, vars } => {
                let e = self.expand(expr)?;
                self.order(e, &vars)
            }
            _ => Ok(h),
        }
    }

    // Multiplies already expanded factors out into a sum of products,
    // keeping the left-to-right order of non-commutative factors.
    pub(crate) fn distribute(&mut self, factors: &[ExprHandle]) -> ExprHandle {
        let mut terms = vec![self.one()];
        for &f in factors {
            let parts: Vec<ExprHandle> = match self.get(f) {
                ExprNode::Add(args) => args.to_vec(),
                _ => vec![f],
            };
            let mut next = Vec::with_capacity(terms.len() * parts.len());
            for &t in &terms {
                for &p in &parts {
                    next.push(self.mul(&[t, p]));
                }
            }
            terms = next;
        }
        let mut builder = SumBuilder::new();
        builder.extend(self, terms);
        builder.canonical(self)
    }

    fn expand_power_of_sum(&mut self, sum: ExprHandle, n: u64) -> CoreResult<ExprHandle> {
        let terms = self.args(sum);
        let constant = self.as_number(terms[0]).cloned();
        let commutative = terms.iter().all(|&t| self.is_commutative(t));
        if let (Some(t0), true) = (constant, commutative) {
            if t0.is_exact() && !t0.is_zero() {
                return self.miller_power(&t0, &terms[1..], n);
            }
        }
        let mut result = self.one();
        let mut square = sum;
        let mut k = n;
        while k > 0 {
            if k & 1 == 1 {
                result = self.distribute(&[result, square]);
            }
            k >>= 1;
            if k > 0 {
                square = self.distribute(&[square, square]);
            }
        }
        Ok(result)
    }

    // J.C.P. Miller's recurrence for the coefficients of
    // (t0 + t1 z + ... + tm z^m)^n, summed at z = 1:
    //   c_0 = t0^n,  c_k = 1/(k t0) * sum_{j=1}^{min(k,m)} ((n+1) j - k) t_j c_{k-j}
    fn miller_power(&mut self, t0: &Number, rest: &[ExprHandle], n: u64) -> CoreResult<ExprHandle> {
        let op = "expand";
        let n_i = i64::try_from(n).map_err(|_| CoreError::domain(op, None, "exponent too large"))?;
        let m = rest.len();
        let degree = usize::try_from(n).map_err(|_| CoreError::domain(op, None, "exponent too large"))? * m;
        let first = t0.powi(n_i).map_err(|err| CoreError::from_number(op, None, err))?;
        let mut coeffs: Vec<ExprHandle> = Vec::with_capacity(degree + 1);
        coeffs.push(self.number(first));
        for k in 1..=degree {
            let k_i = i64::try_from(k).map_err(|_| CoreError::domain(op, None, "exponent too large"))?;
            let scale = Number::integer(k_i)
                .mul(t0)
                .recip()
                .map_err(|err| CoreError::from_number(op, None, err))?;
            let mut builder = SumBuilder::new();
            for j in 1..=k.min(m) {
                let j_i = i64::try_from(j).map_err(|_| CoreError::domain(op, None, "too many terms"))?;
                let weight = (n_i + 1) * j_i - k_i;
                if weight == 0 {
                    continue;
                }
                let product = self.distribute(&[rest[j - 1], coeffs[k - j]]);
                builder.push_scaled(self, &Number::integer(weight).mul(&scale), product);
            }
            coeffs.push(builder.canonical(self));
        }
        let mut total = SumBuilder::new();
        total.extend(self, coeffs);
        Ok(total.canonical(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binomial_square() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let two = arena.integer(2);
        let s = arena.add(&[x, y]);
        let sq = arena.pow(s, two).unwrap();
        let expanded = arena.expand(sq).unwrap();
        let x2 = arena.pow(x, two).unwrap();
        let y2 = arena.pow(y, two).unwrap();
        let xy = arena.mul(&[two, x, y]);
        assert_eq!(expanded, arena.add(&[x2, xy, y2]));
    }

    #[test]
    fn test_cube_with_constant() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let one = arena.one();
        let three = arena.integer(3);
        let s = arena.add(&[x, one]);
        let cube = arena.pow(s, three).unwrap();
        let expanded = arena.expand(cube).unwrap();
        let two = arena.integer(2);
        let x2 = arena.pow(x, two).unwrap();
        let x3 = arena.pow(x, three).unwrap();
        let t2 = arena.mul(&[three, x2]);
        let t1 = arena.mul(&[three, x]);
        assert_eq!(expanded, arena.add(&[one, t1, t2, x3]));
    }

    #[test]
    fn test_product_of_sums() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let m1 = arena.minus_one();
        let a = arena.add(&[x, y]);
        let ny = arena.mul(&[m1, y]);
        let b = arena.add(&[x, ny]);
        let p = arena.mul(&[a, b]);
        let expanded = arena.expand(p).unwrap();
        let two = arena.integer(2);
        let x2 = arena.pow(x, two).unwrap();
        let y2 = arena.pow(y, two).unwrap();
        let my2 = arena.neg(y2);
        assert_eq!(expanded, arena.add(&[x2, my2]));
    }

    #[test]
    fn test_noncommutative_order() {
        let mut arena = ExprArena::new();
        let a = arena.noncommutative_symbol("A");
        let b = arena.noncommutative_symbol("B");
        let two = arena.integer(2);
        let s = arena.add(&[a, b]);
        let sq = arena.pow(s, two).unwrap();
        let expanded = arena.expand(sq).unwrap();
        let ab = arena.mul(&[a, b]);
        let ba = arena.mul(&[b, a]);
        assert_ne!(ab, ba);
        let args = arena.args(expanded);
        assert_eq!(args.len(), 4);
        assert!(args.contains(&ab));
        assert!(args.contains(&ba));
    }

    #[test]
    fn test_memoised() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let one = arena.one();
        let two = arena.integer(2);
        let s = arena.add(&[x, one]);
        let sq = arena.pow(s, two).unwrap();
        let first = arena.expand(sq).unwrap();
        let before = arena.memo_len();
        assert_eq!(arena.expand(sq).unwrap(), first);
        assert_eq!(arena.memo_len(), before);
    }
}
