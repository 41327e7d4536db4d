//! Canonical products.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use symbolon_numbers::Number;

use crate::arena::ExprArena;
use crate::assumptions::{Predicate, Truth};
use crate::expr::{Args, ExprNode, FnArgs};
use crate::handle::ExprHandle;

/// Exponents collected for one base, with the factor that contributed
/// them when there was exactly one.
#[derive(Debug, Clone)]
struct PowerEntry {
    exps: SmallVec<[ExprHandle; 2]>,
    original: Option<ExprHandle>,
}

/// The mutable half of a product: a power map from base to accumulated
/// exponent, plus the ordered non-commutative factors.
#[derive(Debug, Clone)]
pub struct ProductBuilder {
    coeff: Number,
    powers: FxHashMap<ExprHandle, PowerEntry>,
    bases: Vec<ExprHandle>,
    noncommutative: Vec<(ExprHandle, ExprHandle)>,
    orders: Vec<ExprHandle>,
}

impl Default for ProductBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductBuilder {
    /// The empty product.
    #[must_use]
    pub fn new() -> Self {
        Self {
            coeff: Number::one(),
            powers: FxHashMap::default(),
            bases: Vec::new(),
            noncommutative: Vec::new(),
            orders: Vec::new(),
        }
    }

    /// Multiplies by `factor`, flattening nested products.
    pub fn push(&mut self, arena: &mut ExprArena, factor: ExprHandle) {
        match arena.get(factor) {
            ExprNode::Mul(args) => {
                let args = args.clone();
                for a in args {
                    self.push(arena, a);
                }
            }
            ExprNode::Number(n) => self.coeff = self.coeff.mul(n),
            ExprNode::Order { .. } => self.orders.push(factor),
            _ => {
                let (base, exp) = arena.as_base_exp(factor);
                if arena.is_commutative(factor) {
                    self.accumulate(base, exp, factor);
                } else {
                    match self.noncommutative.last_mut() {
                        Some((b, e)) if *b == base => *e = arena.add(&[*e, exp]),
                        _ => self.noncommutative.push((base, exp)),
                    }
                }
            }
        }
    }

    /// Multiplies by every item of `factors`.
    pub fn extend(&mut self, arena: &mut ExprArena, factors: impl IntoIterator<Item = ExprHandle>) {
        for f in factors {
            self.push(arena, f);
        }
    }

    fn accumulate(&mut self, base: ExprHandle, exp: ExprHandle, original: ExprHandle) {
        match self.powers.get_mut(&base) {
            Some(entry) => {
                entry.exps.push(exp);
                entry.original = None;
            }
            None => {
                self.powers.insert(
                    base,
                    PowerEntry {
                        exps: smallvec::smallvec![exp],
                        original: Some(original),
                    },
                );
                self.bases.push(base);
            }
        }
    }

    /// Freezes the builder into a canonical expression.
    pub fn canonical(self, arena: &mut ExprArena) -> ExprHandle {
        let Self {
            mut coeff,
            mut powers,
            bases,
            noncommutative,
            orders,
        } = self;

        let mut factors: Vec<ExprHandle> = Vec::with_capacity(bases.len());
        let mut redo: Vec<ExprHandle> = Vec::new();
        for base in bases {
            let Some(entry) = powers.remove(&base) else { continue };
            let p = match entry.original {
                Some(original) => original,
                None => {
                    let exp = arena.add(&entry.exps);
                    if arena.is_zero(exp) {
                        continue;
                    }
                    arena.pow_or_keep(base, exp)
                }
            };
            match arena.get(p) {
                ExprNode::Number(n) => coeff = coeff.mul(n),
                ExprNode::Mul(args) => redo.extend(args.iter().copied()),
                _ => factors.push(p),
            }
        }
        if !redo.is_empty() {
            // A power split into several factors (perfect-power extraction,
            // distribution over a product); fold them in again.
            let mut again = ProductBuilder::new();
            again.coeff = coeff;
            again.extend(arena, factors.into_iter().chain(redo));
            again.noncommutative = noncommutative;
            again.orders = orders;
            return again.canonical(arena);
        }

        let mut tail: Vec<ExprHandle> = Vec::with_capacity(noncommutative.len());
        for (base, exp) in noncommutative {
            if arena.is_zero(exp) {
                continue;
            }
            tail.push(arena.pow_or_keep(base, exp));
        }

        if coeff.is_nan() {
            return arena.nan();
        }
        if coeff.is_zero() {
            let unbounded = factors
                .iter()
                .chain(&tail)
                .any(|&f| arena.ask(f, Predicate::Bounded) == Truth::False);
            return if unbounded {
                arena.nan()
            } else if coeff.is_exact() {
                arena.zero()
            } else {
                arena.number(coeff)
            };
        }
        if coeff.is_infinite() && !factors.is_empty() && tail.is_empty() {
            let mut sign = coeff.signum().unwrap_or(1);
            let mut all_known = true;
            for &f in &factors {
                if arena.ask(f, Predicate::Positive) == Truth::True {
                    continue;
                }
                if arena.ask(f, Predicate::Negative) == Truth::True {
                    sign = -sign;
                    continue;
                }
                all_known = false;
                break;
            }
            if all_known {
                return if sign > 0 { arena.infinity() } else { arena.neg_infinity() };
            }
        }

        if !orders.is_empty() {
            return arena.multiply_orders(&coeff, &factors, &tail, &orders);
        }

        if coeff.is_exact() && !coeff.is_one() && factors.len() == 1 && tail.is_empty() {
            if let ExprNode::Add(terms) = arena.get(factors[0]) {
                let terms = terms.clone();
                let k = arena.number(coeff.clone());
                let scaled: Vec<ExprHandle> = terms.iter().map(|&t| arena.mul(&[k, t])).collect();
                return arena.add(&scaled);
            }
        }

        arena.sort_canonical(&mut factors);
        let mut args: Args = Args::with_capacity(factors.len() + tail.len() + 1);
        if !coeff.is_one() {
            args.push(arena.number(coeff));
        }
        args.extend(factors);
        args.extend(tail);
        match args.len() {
            0 => arena.one(),
            1 => args[0],
            _ => arena.intern(ExprNode::Mul(args)),
        }
    }
}

impl ExprArena {
    /// The canonical product of `args`.
    pub fn mul(&mut self, args: &[ExprHandle]) -> ExprHandle {
        match args {
            [] => self.one(),
            [a] => *a,
            _ => {
                let mut builder = ProductBuilder::new();
                builder.extend(self, args.iter().copied());
                builder.canonical(self)
            }
        }
    }

    /// `-a`.
    pub fn neg(&mut self, a: ExprHandle) -> ExprHandle {
        let m1 = self.minus_one();
        self.mul(&[m1, a])
    }

    /// `a / b`.
    ///
    /// # Errors
    ///
    /// Propagates domain errors from inverting `b` (an interval containing
    /// zero).
    pub fn div(&mut self, a: ExprHandle, b: ExprHandle) -> crate::CoreResult<ExprHandle> {
        let m1 = self.minus_one();
        let inv = self.pow(b, m1)?;
        Ok(self.mul(&[a, inv]))
    }

    /// True unless `h` is known to be non-commutative.
    pub fn is_commutative(&mut self, h: ExprHandle) -> bool {
        self.ask(h, Predicate::Commutative) != Truth::False
    }

    // `pow`, keeping the raw node when evaluation fails; used while
    // recombining powers, where a failure only means no simplification.
    pub(crate) fn pow_or_keep(&mut self, base: ExprHandle, exp: ExprHandle) -> ExprHandle {
        match self.pow(base, exp) {
            Ok(p) => p,
            Err(err) => {
                tracing::debug!(%err, "keeping unevaluated power");
                self.intern(ExprNode::Pow { base, exp })
            }
        }
    }

    fn multiply_orders(
        &mut self,
        coeff: &Number,
        factors: &[ExprHandle],
        tail: &[ExprHandle],
        orders: &[ExprHandle],
    ) -> ExprHandle {
        let mut parts: Vec<ExprHandle> = Vec::with_capacity(factors.len() + orders.len() + 1);
        parts.push(self.number(coeff.clone()));
        parts.extend_from_slice(factors);
        let mut vars: FnArgs = FnArgs::new();
        for &o in orders {
            if let ExprNode::Order { expr, vars: ov } = self.get(o) {
                parts.push(*expr);
                for v in ov {
                    if !vars.contains(v) {
                        vars.push(*v);
                    }
                }
            }
        }
        let product = self.mul(&parts);
        let order = match self.order(product, &vars) {
            Ok(o) => o,
            Err(err) => {
                tracing::debug!(%err, "keeping unsimplified order product");
                self.sort_canonical(&mut vars);
                self.intern(ExprNode::Order { expr: product, vars })
            }
        };
        if tail.is_empty() {
            order
        } else {
            let mut args: Args = Args::new();
            args.push(order);
            args.extend(tail.iter().copied());
            self.intern(ExprNode::Mul(args))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_powers_combine() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let x2 = arena.mul(&[x, x]);
        let two = arena.integer(2);
        assert_eq!(x2, arena.pow(x, two).unwrap());
        let inv = arena.div(x, x).unwrap();
        assert_eq!(inv, arena.one());
    }

    #[test]
    fn test_coefficients_multiply() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let two = arena.integer(2);
        let third = arena.rational(1, 3);
        let p = arena.mul(&[two, x, third]);
        let args = arena.args(p);
        assert_eq!(args[0], arena.rational(2, 3));
        assert_eq!(args[1], x);
    }

    #[test]
    fn test_zero_annihilates() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let zero = arena.zero();
        assert_eq!(arena.mul(&[zero, x]), zero);
        let oo = arena.infinity();
        let nan = arena.nan();
        assert_eq!(arena.mul(&[zero, oo]), nan);
    }

    #[test]
    fn test_infinity_times_signed() {
        let mut arena = ExprArena::new();
        let p = arena.symbol_with("p", &[(Predicate::Positive, true)]).unwrap();
        let n = arena.symbol_with("n", &[(Predicate::Negative, true)]).unwrap();
        let oo = arena.infinity();
        assert_eq!(arena.mul(&[oo, p]), oo);
        let noo = arena.neg_infinity();
        assert_eq!(arena.mul(&[oo, n]), noo);
        let m2 = arena.integer(-2);
        assert_eq!(arena.mul(&[oo, m2]), noo);
    }

    #[test]
    fn test_distributes_rational_over_sum() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let sum = arena.add(&[x, y]);
        let two = arena.integer(2);
        let prod = arena.mul(&[two, sum]);
        let tx = arena.mul(&[two, x]);
        let ty = arena.mul(&[two, y]);
        assert_eq!(prod, arena.add(&[tx, ty]));
    }

    #[test]
    fn test_noncommutative_order_kept() {
        let mut arena = ExprArena::new();
        let a = arena.noncommutative_symbol("A");
        let b = arena.noncommutative_symbol("B");
        let x = arena.symbol("x");
        let ab = arena.mul(&[a, x, b]);
        let ba = arena.mul(&[b, x, a]);
        assert_ne!(ab, ba);
        assert_eq!(arena.args(ab).as_slice(), &[x, a, b]);
        let aa = arena.mul(&[a, a]);
        let two = arena.integer(2);
        assert_eq!(aa, arena.pow(a, two).unwrap());
    }

    #[test]
    fn test_exp_products_merge() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let ex = arena.exp(x).unwrap();
        let ey = arena.exp(y).unwrap();
        let prod = arena.mul(&[ex, ey]);
        let sum = arena.add(&[x, y]);
        assert_eq!(prod, arena.exp(sum).unwrap());
        let nx = arena.neg(x);
        let enx = arena.exp(nx).unwrap();
        assert_eq!(arena.mul(&[ex, enx]), arena.one());
    }
}
