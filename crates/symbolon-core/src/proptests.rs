//! Property-based tests for the expression core.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::arena::ExprArena;
    use crate::expr::ExprNode;
    use crate::handle::ExprHandle;

    const NAMES: [&str; 3] = ["x", "y", "z"];

    // A recipe for an expression, built through the canonical constructors.
    #[derive(Clone, Debug)]
    enum Shape {
        Int(i64),
        Sym(usize),
        Add(Box<Shape>, Box<Shape>),
        Mul(Box<Shape>, Box<Shape>),
        Pow(Box<Shape>, u32),
    }

    impl Shape {
        fn build(&self, arena: &mut ExprArena) -> ExprHandle {
            match self {
                Self::Int(n) => arena.integer(*n),
                Self::Sym(i) => arena.symbol(NAMES[*i]),
                Self::Add(a, b) => {
                    let (a, b) = (a.build(arena), b.build(arena));
                    arena.add(&[a, b])
                }
                Self::Mul(a, b) => {
                    let (a, b) = (a.build(arena), b.build(arena));
                    arena.mul(&[a, b])
                }
                Self::Pow(b, k) => {
                    let b = b.build(arena);
                    let k = arena.integer(i64::from(*k));
                    arena.pow(b, k).unwrap()
                }
            }
        }

        fn swapped(&self) -> Self {
            match self {
                Self::Add(a, b) => Self::Add(Box::new(b.swapped()), Box::new(a.swapped())),
                Self::Mul(a, b) => Self::Mul(Box::new(b.swapped()), Box::new(a.swapped())),
                Self::Pow(b, k) => Self::Pow(Box::new(b.swapped()), *k),
                leaf => leaf.clone(),
            }
        }

        // An upper bound on the degree in any symbol.
        fn degree_bound(&self) -> u32 {
            match self {
                Self::Int(_) => 0,
                Self::Sym(_) => 1,
                Self::Add(a, b) => a.degree_bound().max(b.degree_bound()),
                Self::Mul(a, b) => a.degree_bound() + b.degree_bound(),
                Self::Pow(b, k) => b.degree_bound() * k,
            }
        }
    }

    // Strategy for polynomial shapes over x, y, z with small coefficients
    fn shape(symbols: usize, depth: u32) -> impl Strategy<Value = Shape> {
        let leaf = prop_oneof![(-5i64..=5).prop_map(Shape::Int), (0..symbols).prop_map(Shape::Sym)];
        leaf.prop_recursive(depth, 16, 2, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Shape::Add(Box::new(a), Box::new(b))),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Shape::Mul(Box::new(a), Box::new(b))),
                (inner, 1u32..=2).prop_map(|(b, k)| Shape::Pow(Box::new(b), k)),
            ]
        })
    }

    fn terms(arena: &ExprArena, h: ExprHandle) -> Vec<ExprHandle> {
        match arena.get(h) {
            ExprNode::Add(args) => args.to_vec(),
            _ if arena.is_zero(h) => Vec::new(),
            _ => vec![h],
        }
    }

    proptest! {
        // Canonical form

        #[test]
        fn construction_is_hash_consed(s in shape(3, 3)) {
            let mut arena = ExprArena::new();
            let a = s.build(&mut arena);
            let b = s.build(&mut arena);
            prop_assert_eq!(a, b);
            prop_assert_eq!(arena.add(&[a]), a);
            prop_assert_eq!(arena.mul(&[a]), a);
        }

        #[test]
        fn operand_order_is_irrelevant(s in shape(3, 3)) {
            let mut arena = ExprArena::new();
            let a = s.build(&mut arena);
            let b = s.swapped().build(&mut arena);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn expand_is_idempotent(s in shape(2, 3)) {
            let mut arena = ExprArena::new();
            let e = s.build(&mut arena);
            let once = arena.expand(e).unwrap();
            prop_assert_eq!(arena.expand(once).unwrap(), once);
        }

        // Accessors

        #[test]
        fn coeff_terms_rebuild(s in shape(3, 3)) {
            let mut arena = ExprArena::new();
            let e = s.build(&mut arena);
            let (c, ts) = arena.as_coeff_terms(e, None);
            let mut parts = vec![c];
            parts.extend(ts);
            prop_assert_eq!(arena.mul(&parts), e);
            let (c, fs) = arena.as_coeff_factors(e, None);
            let mut parts = vec![c];
            parts.extend(fs);
            prop_assert_eq!(arena.add(&parts), e);
        }

        // Substitution

        #[test]
        fn subs_fixpoints(s in shape(2, 3)) {
            let mut arena = ExprArena::new();
            let e = s.build(&mut arena);
            let x = arena.symbol("x");
            let unused = arena.symbol("z");
            let y = arena.symbol("y");
            prop_assert_eq!(arena.subs(e, x, x).unwrap(), e);
            prop_assert_eq!(arena.subs(e, unused, y).unwrap(), e);
        }

        #[test]
        fn subs_renaming_round_trips(s in shape(2, 3)) {
            let mut arena = ExprArena::new();
            let e = s.build(&mut arena);
            let x = arena.symbol("x");
            let t = arena.symbol("t");
            let renamed = arena.subs(e, x, t).unwrap();
            prop_assert!(!arena.has_subtree(renamed, x));
            prop_assert_eq!(arena.subs(renamed, t, x).unwrap(), e);
        }

        // Differentiation

        #[test]
        fn diff_is_linear(a in shape(2, 2), b in shape(2, 2), k in -4i64..=4) {
            let mut arena = ExprArena::new();
            let x = arena.symbol("x");
            let (ea, eb) = (a.build(&mut arena), b.build(&mut arena));
            let k = arena.integer(k);
            let kb = arena.mul(&[k, eb]);
            let sum = arena.add(&[ea, kb]);
            let lhs = arena.diff(sum, x).unwrap();
            let lhs = arena.expand(lhs).unwrap();
            let da = arena.diff(ea, x).unwrap();
            let db = arena.diff(eb, x).unwrap();
            let kdb = arena.mul(&[k, db]);
            let rhs = arena.add(&[da, kdb]);
            prop_assert_eq!(lhs, arena.expand(rhs).unwrap());
        }

        #[test]
        fn diff_of_free_expression_vanishes(s in shape(2, 3)) {
            let mut arena = ExprArena::new();
            let e = s.build(&mut arena);
            let z = arena.symbol("z");
            let d = arena.diff(e, z).unwrap();
            prop_assert!(arena.is_zero(d));
        }

        // Order terms

        #[test]
        fn order_absorbs_higher_powers(k in 1i64..5, extra in 0i64..4, c in 1i64..10) {
            let mut arena = ExprArena::new();
            let x = arena.symbol("x");
            let kk = arena.integer(k);
            let xk = arena.pow(x, kk).unwrap();
            let o = arena.order(xk, &[x]).unwrap();
            let n = arena.integer(k + extra);
            let xn = arena.pow(x, n).unwrap();
            let c = arena.integer(c);
            let t = arena.mul(&[c, xn]);
            prop_assert_eq!(arena.add(&[o, t]), o);
            prop_assert_eq!(arena.mul(&[c, o]), o);
        }

        // Matching

        #[test]
        fn matches_are_sound(s in shape(2, 2), t in shape(2, 2)) {
            let mut arena = ExprArena::new();
            let w = arena.wild("w");
            let y = arena.symbol("y");
            let target = t.build(&mut arena);
            let fixed = s.build(&mut arena);
            let wy = arena.mul(&[w, y]);
            let pattern = arena.add(&[wy, fixed]);
            if let Some(bindings) = arena.matches(pattern, target, None, false) {
                let pairs: Vec<_> = bindings.iter().map(|(&k, &v)| (k, v)).collect();
                let back = arena.subs_dict(pattern, &pairs).unwrap();
                let back = arena.expand(back).unwrap();
                prop_assert_eq!(back, arena.expand(target).unwrap());
            }
        }

        // Series

        #[test]
        fn series_truncates_polynomials(s in shape(2, 2), n in 1i64..5) {
            let mut arena = ExprArena::new();
            let x = arena.symbol("x");
            let p = s.build(&mut arena);
            let full = arena.expand(p).unwrap();
            let mut kept = Vec::new();
            for t in terms(&arena, full) {
                let (_, e) = arena.as_coeff_exponent(t, x).unwrap();
                if arena.as_i64(e).unwrap() < n {
                    kept.push(t);
                }
            }
            let expected = arena.add(&kept);
            let ser = arena.series(p, x, n).unwrap();
            let body = arena.remove_order(ser);
            prop_assert_eq!(arena.expand(body).unwrap(), expected);
        }

        #[test]
        fn long_series_recovers_polynomials(s in shape(2, 2)) {
            let mut arena = ExprArena::new();
            let x = arena.symbol("x");
            let p = s.build(&mut arena);
            let n = i64::from(s.degree_bound()) + 1;
            let ser = arena.series(p, x, n).unwrap();
            let body = arena.remove_order(ser);
            let lhs = arena.expand(body).unwrap();
            prop_assert_eq!(lhs, arena.expand(p).unwrap());
        }
    }
}
