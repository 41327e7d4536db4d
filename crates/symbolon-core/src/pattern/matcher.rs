//! Structural matching against patterns with wildcards.

use rustc_hash::FxHashMap;

use crate::arena::ExprArena;
use crate::expr::{functions, ExprNode};
use crate::handle::ExprHandle;
use crate::symbol::SymbolKind;

/// Wildcard to value.
pub type Bindings = FxHashMap<ExprHandle, ExprHandle>;

impl ExprArena {
    /// Matches `pattern` against `expr`, extending `bindings`.
    ///
    /// Wildcards bind any subexpression that contains none of their
    /// exclusions, and a wildcard bound twice must bind equal values. Sums
    /// and products match up to reordering; the exact part of a sum
    /// pattern is subtracted from `expr` before the wildcard part is
    /// matched (and likewise divided out of products), so
    /// `(a + b*w).matches(0)` binds `w` to `-a/b`. With `evaluate`, the
    /// existing bindings are substituted into `pattern` first.
    ///
    /// Returns `None` if there is no match.
    pub fn matches(
        &mut self,
        pattern: ExprHandle,
        expr: ExprHandle,
        bindings: Option<Bindings>,
        evaluate: bool,
    ) -> Option<Bindings> {
        let bindings = bindings.unwrap_or_default();
        let pattern = if evaluate && !bindings.is_empty() {
            let pairs: Vec<(ExprHandle, ExprHandle)> = bindings.iter().map(|(&w, &v)| (w, v)).collect();
            self.subs_dict(pattern, &pairs).ok()?
        } else {
            pattern
        };
        self.match_into(pattern, expr, bindings)
    }

    /// Checks if `h` contains a wildcard.
    #[must_use]
    pub fn has_wild(&self, h: ExprHandle) -> bool {
        self.collect_atoms(h).into_iter().any(|a| self.is_wild(a))
    }

    fn match_into(&mut self, p: ExprHandle, e: ExprHandle, bindings: Bindings) -> Option<Bindings> {
        if self.is_wild(p) {
            return self.bind(p, e, bindings);
        }
        if p == e {
            return Some(bindings);
        }
        if !self.has_wild(p) {
            return None;
        }
        match self.get(p).clone() {
            ExprNode::Add(terms) => self.match_sum(&terms, e, bindings),
            ExprNode::Mul(factors) if self.is_commutative(p) => self.match_product(&factors, e, bindings),
            ExprNode::Pow { base, exp } => self.match_power(base, exp, e, bindings),
            pnode => {
                let enode = self.get(e).clone();
                if std::mem::discriminant(&pnode) != std::mem::discriminant(&enode) {
                    return None;
                }
                if let (ExprNode::Apply { func: pf, .. }, ExprNode::Apply { func: ef, .. }) = (&pnode, &enode) {
                    if pf != ef {
                        return None;
                    }
                }
                self.match_children(&pnode.children(), &enode.children(), bindings)
            }
        }
    }

    fn match_children(&mut self, ps: &[ExprHandle], es: &[ExprHandle], bindings: Bindings) -> Option<Bindings> {
        if ps.len() != es.len() {
            return None;
        }
        ps.iter()
            .zip(es)
            .try_fold(bindings, |b, (&p, &e)| self.match_into(p, e, b))
    }

    fn bind(&mut self, w: ExprHandle, e: ExprHandle, mut bindings: Bindings) -> Option<Bindings> {
        if let Some(&bound) = bindings.get(&w) {
            return (bound == e).then_some(bindings);
        }
        if let Some(SymbolKind::Wild { exclude, .. }) = self.symbol_data(w).map(|d| &d.kind) {
            if exclude.iter().any(|&x| self.has_subtree(e, x)) {
                return None;
            }
        }
        bindings.insert(w, e);
        Some(bindings)
    }

    fn match_sum(&mut self, terms: &[ExprHandle], e: ExprHandle, bindings: Bindings) -> Option<Bindings> {
        let (exact, wild): (Vec<ExprHandle>, Vec<ExprHandle>) =
            terms.iter().copied().partition(|&t| !self.has_wild(t));
        let c = self.add(&exact);
        let target = self.sub(e, c);
        self.match_parts(&wild, target, bindings, Combine::Sum)
    }

    fn match_product(&mut self, factors: &[ExprHandle], e: ExprHandle, bindings: Bindings) -> Option<Bindings> {
        let (exact, wild): (Vec<ExprHandle>, Vec<ExprHandle>) =
            factors.iter().copied().partition(|&f| !self.has_wild(f));
        let c = self.mul(&exact);
        let target = self.div(e, c).ok()?;
        self.match_parts(&wild, target, bindings, Combine::Product)
    }

    // Matches each of `parts` against a piece of `target`, the last one
    // taking whatever remains. Parts that are not bare wildcards go first
    // so the wildcards see the smallest remainder.
    fn match_parts(
        &mut self,
        parts: &[ExprHandle],
        target: ExprHandle,
        bindings: Bindings,
        combine: Combine,
    ) -> Option<Bindings> {
        let mut ordered = parts.to_vec();
        ordered.sort_by_key(|&p| self.is_wild(p));
        self.match_parts_ordered(&ordered, target, bindings, combine)
    }

    fn match_parts_ordered(
        &mut self,
        parts: &[ExprHandle],
        target: ExprHandle,
        bindings: Bindings,
        combine: Combine,
    ) -> Option<Bindings> {
        let Some((&first, rest)) = parts.split_first() else {
            return combine.is_identity(self, target).then_some(bindings);
        };
        if rest.is_empty() {
            return self.match_into(first, target, bindings);
        }
        let pieces: Vec<ExprHandle> = match (combine, self.get(target)) {
            (Combine::Sum, ExprNode::Add(args)) | (Combine::Product, ExprNode::Mul(args)) => args.to_vec(),
            _ => vec![target],
        };
        for piece in pieces {
            let Some(b) = self.match_into(first, piece, bindings.clone()) else {
                continue;
            };
            let remaining = match combine {
                Combine::Sum => self.sub(target, piece),
                Combine::Product => match self.div(target, piece) {
                    Ok(r) => r,
                    Err(_) => continue,
                },
            };
            if let Some(b) = self.match_parts_ordered(rest, remaining, b, combine) {
                return Some(b);
            }
        }
        None
    }

    fn match_power(&mut self, base: ExprHandle, exp: ExprHandle, e: ExprHandle, bindings: Bindings) -> Option<Bindings> {
        match self.get(e).clone() {
            ExprNode::Pow { base: eb, exp: ee } => {
                let b = self.match_into(base, eb, bindings)?;
                self.match_into(exp, ee, b)
            }
            // b^w against exp(t): w = t / log(b) once b is known.
            ExprNode::Apply { func, args } if func == functions::EXP && !self.has_wild(base) => {
                let log_b = self.log(base).ok()?;
                let ratio = self.div(args[0], log_b).ok()?;
                self.match_into(exp, ratio, bindings)
            }
            _ => {
                let b = self.match_into(base, e, bindings)?;
                let one = self.one();
                self.match_into(exp, one, b)
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Combine {
    Sum,
    Product,
}

impl Combine {
    fn is_identity(self, arena: &ExprArena, h: ExprHandle) -> bool {
        match self {
            Self::Sum => arena.is_zero(h),
            Self::Product => arena.is_one(h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_pattern_against_zero() {
        let mut arena = ExprArena::new();
        let a = arena.symbol("a");
        let b = arena.symbol("b");
        let x = arena.wild("x");
        let bx = arena.mul(&[b, x]);
        let pattern = arena.add(&[a, bx]);
        let zero = arena.zero();
        let m = arena.matches(pattern, zero, None, false).unwrap();
        let na = arena.neg(a);
        let expected = arena.div(na, b).unwrap();
        assert_eq!(m.len(), 1);
        assert_eq!(m[&x], expected);
        let back = arena.subs_dict(pattern, &[(x, expected)]).unwrap();
        assert_eq!(back, zero);
    }

    #[test]
    fn test_repeated_wild() {
        let mut arena = ExprArena::new();
        let w = arena.wild("w");
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let sw = arena.sin(w).unwrap();
        let cw = arena.cos(w).unwrap();
        let pattern = arena.mul(&[sw, cw]);
        let sx = arena.sin(x).unwrap();
        let cx = arena.cos(x).unwrap();
        let good = arena.mul(&[sx, cx]);
        assert_eq!(arena.matches(pattern, good, None, false).unwrap()[&w], x);
        let cy = arena.cos(y).unwrap();
        let bad = arena.mul(&[sx, cy]);
        assert!(arena.matches(pattern, bad, None, false).is_none());
    }

    #[test]
    fn test_exclusions() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let c = arena.wild_excluding("c", &[x]);
        let pattern = arena.mul(&[c, x]);
        let two = arena.integer(2);
        let t = arena.mul(&[two, y, x]);
        let m = arena.matches(pattern, t, None, false).unwrap();
        assert_eq!(m[&c], arena.mul(&[two, y]));
        let x2 = arena.pow(x, two).unwrap();
        assert!(arena.matches(pattern, x2, None, false).is_none());
    }

    #[test]
    fn test_power_patterns() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let w = arena.wild("w");
        let pattern = arena.pow(x, w).unwrap();
        let three = arena.integer(3);
        let x3 = arena.pow(x, three).unwrap();
        assert_eq!(arena.matches(pattern, x3, None, false).unwrap()[&w], three);
        assert_eq!(arena.matches(pattern, x, None, false).unwrap()[&w], arena.one());
        // x^(2y) written as exp(2y log x)
        let two = arena.integer(2);
        let lx = arena.log(x).unwrap();
        let t = arena.mul(&[two, y, lx]);
        let e = arena.exp(t).unwrap();
        let m = arena.matches(pattern, e, None, false).unwrap();
        assert_eq!(m[&w], arena.mul(&[two, y]));
    }

    #[test]
    fn test_evaluate_uses_bindings() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let w = arena.wild("w");
        let v = arena.wild("v");
        let pattern = arena.add(&[w, v]);
        let one = arena.one();
        let target = arena.add(&[x, one]);
        let mut seed = Bindings::default();
        seed.insert(w, x);
        let m = arena.matches(pattern, target, Some(seed), true).unwrap();
        assert_eq!(m[&v], one);
        assert_eq!(m[&w], x);
    }
}
