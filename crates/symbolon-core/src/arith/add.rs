//! Canonical sums.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use symbolon_numbers::Number;

use crate::arena::ExprArena;
use crate::assumptions::{Predicate, Truth};
use crate::expr::{Args, ExprNode};
use crate::handle::ExprHandle;

/// The mutable half of a sum: a term map from signature to accumulated
/// coefficient. [`SumBuilder::canonical`] consumes the builder and
/// returns the frozen node.
#[derive(Debug, Clone)]
pub struct SumBuilder {
    constant: Number,
    coefficients: FxHashMap<ExprHandle, Number>,
    signatures: Vec<ExprHandle>,
    orders: Vec<ExprHandle>,
}

impl Default for SumBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SumBuilder {
    /// An empty sum.
    #[must_use]
    pub fn new() -> Self {
        Self {
            constant: Number::zero(),
            coefficients: FxHashMap::default(),
            signatures: Vec::new(),
            orders: Vec::new(),
        }
    }

    /// Adds `term`, flattening nested sums.
    pub fn push(&mut self, arena: &mut ExprArena, term: ExprHandle) {
        let mut stack: SmallVec<[ExprHandle; 8]> = smallvec::smallvec![term];
        while let Some(t) = stack.pop() {
            match arena.get(t) {
                ExprNode::Add(args) => stack.extend(args.iter().rev().copied()),
                ExprNode::Number(n) => self.constant = self.constant.add(n),
                ExprNode::Order { .. } => self.orders.push(t),
                _ => {
                    let (c, sig) = arena.split_coeff(t);
                    self.accumulate(c, sig);
                }
            }
        }
    }

    /// Adds `coeff * term`.
    pub fn push_scaled(&mut self, arena: &mut ExprArena, coeff: &Number, term: ExprHandle) {
        let scaled = arena.number(coeff.clone());
        let product = arena.mul(&[scaled, term]);
        self.push(arena, product);
    }

    /// Adds every item of `terms`.
    pub fn extend(&mut self, arena: &mut ExprArena, terms: impl IntoIterator<Item = ExprHandle>) {
        for t in terms {
            self.push(arena, t);
        }
    }

    fn accumulate(&mut self, c: Number, sig: ExprHandle) {
        match self.coefficients.get_mut(&sig) {
            Some(acc) => *acc = acc.add(&c),
            None => {
                self.coefficients.insert(sig, c);
                self.signatures.push(sig);
            }
        }
    }

    /// True if nothing has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constant.is_zero() && self.signatures.is_empty() && self.orders.is_empty()
    }

    /// Freezes the builder into a canonical expression.
    pub fn canonical(self, arena: &mut ExprArena) -> ExprHandle {
        let Self {
            constant,
            mut coefficients,
            signatures,
            orders,
        } = self;
        if constant.is_nan() {
            return arena.nan();
        }
        let mut terms: Vec<(ExprHandle, Number)> = Vec::with_capacity(signatures.len());
        for sig in signatures {
            let Some(c) = coefficients.remove(&sig) else { continue };
            if c.is_nan() {
                return arena.nan();
            }
            if !c.is_zero() {
                terms.push((sig, c));
            }
        }

        if constant.is_infinite() {
            terms.retain(|(sig, c)| c.is_infinite() || arena.ask(*sig, Predicate::Bounded) != Truth::True);
        }
        terms.sort_by(|a, b| arena.compare(a.0, b.0));
        let mut term_handles: Vec<ExprHandle> = terms.iter().map(|(sig, c)| arena.coeff_times(c, *sig)).collect();

        let orders = arena.dominant_orders(orders);
        let mut constant = constant;
        if !orders.is_empty() {
            if !constant.is_zero() {
                let k = arena.number(constant.clone());
                if orders.iter().any(|&o| arena.order_contains(o, k) == Truth::True) {
                    constant = Number::zero();
                }
            }
            term_handles.retain(|&t| !orders.iter().any(|&o| arena.order_contains(o, t) == Truth::True));
        }

        let mut args: Args = Args::new();
        if !constant.is_zero() {
            args.push(arena.number(constant));
        }
        args.extend(term_handles);
        args.extend(orders);
        match args.len() {
            0 => arena.zero(),
            1 => args[0],
            _ => arena.intern(ExprNode::Add(args)),
        }
    }
}

impl ExprArena {
    /// The canonical sum of `args`.
    pub fn add(&mut self, args: &[ExprHandle]) -> ExprHandle {
        match args {
            [] => self.zero(),
            [a] => *a,
            _ => {
                let mut builder = SumBuilder::new();
                builder.extend(self, args.iter().copied());
                builder.canonical(self)
            }
        }
    }

    /// `a - b`.
    pub fn sub(&mut self, a: ExprHandle, b: ExprHandle) -> ExprHandle {
        let nb = self.neg(b);
        self.add(&[a, nb])
    }

    /// `c * sig` for a coefficient split off by [`split_coeff`](Self::split_coeff).
    pub(crate) fn coeff_times(&mut self, c: &Number, sig: ExprHandle) -> ExprHandle {
        if c.is_one() {
            return sig;
        }
        let k = self.number(c.clone());
        match self.get(sig) {
            ExprNode::Mul(factors) => {
                let mut args: Args = Args::with_capacity(factors.len() + 1);
                args.push(k);
                args.extend(factors.iter().copied());
                self.intern(ExprNode::Mul(args))
            }
            _ => self.intern(ExprNode::Mul(smallvec::smallvec![k, sig])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_collapse() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let one = arena.integer(1);
        let two = arena.integer(2);
        let sum = arena.add(&[one, two, x]);
        let three = arena.integer(3);
        let args = arena.args(sum);
        assert_eq!(args.len(), 2);
        assert!(args.contains(&three));
        assert!(args.contains(&x));
    }

    #[test]
    fn test_like_terms_combine() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let two = arena.integer(2);
        let two_x = arena.mul(&[two, x]);
        let sum = arena.add(&[x, two_x]);
        let three = arena.integer(3);
        let expected = arena.mul(&[three, x]);
        assert_eq!(sum, expected);
        let neg = arena.neg(sum);
        assert_eq!(arena.add(&[sum, neg]), arena.zero());
    }

    #[test]
    fn test_flattening_is_order_independent() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let z = arena.symbol("z");
        let xy = arena.add(&[x, y]);
        let left = arena.add(&[xy, z]);
        let yz = arena.add(&[y, z]);
        let right = arena.add(&[x, yz]);
        assert_eq!(left, right);
        assert_eq!(arena.args(left).len(), 3);
    }

    #[test]
    fn test_infinities() {
        let mut arena = ExprArena::new();
        let oo = arena.infinity();
        let noo = arena.neg_infinity();
        let five = arena.integer(5);
        assert_eq!(arena.add(&[oo, five]), oo);
        let nan = arena.nan();
        assert_eq!(arena.add(&[oo, noo]), nan);
        let x = arena.symbol("x");
        assert_eq!(arena.add(&[nan, x]), nan);
        let b = arena.symbol_with("b", &[(Predicate::Bounded, true)]).unwrap();
        assert_eq!(arena.add(&[oo, b]), oo);
        let kept = arena.add(&[oo, x]);
        assert_eq!(arena.args(kept).len(), 2);
    }

    #[test]
    fn test_builder_matches_add() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let mut builder = SumBuilder::new();
        for _ in 0..4 {
            builder.push(&mut arena, x);
        }
        builder.push_scaled(&mut arena, &Number::integer(-2), y);
        let built = builder.canonical(&mut arena);
        let four = arena.integer(4);
        let m2 = arena.integer(-2);
        let fx = arena.mul(&[four, x]);
        let my = arena.mul(&[m2, y]);
        assert_eq!(built, arena.add(&[fx, my]));
    }
}
