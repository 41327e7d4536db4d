//! Property-based tests for the number tower.

#[cfg(test)]
mod tests {
    use num_traits::Zero;
    use proptest::prelude::*;

    use crate::context::{with_context, PrecisionContext, RoundingMode};
    use crate::{Integer, Interval, Number, Rational, Real};

    // Strategy for generating small integers
    fn small_int() -> impl Strategy<Value = i64> {
        -1000i64..1000i64
    }

    // Strategy for generating non-zero integers
    fn non_zero_int() -> impl Strategy<Value = i64> {
        prop_oneof![(-1000i64..=-1i64), (1i64..=1000i64)]
    }

    fn rounding_mode() -> impl Strategy<Value = RoundingMode> {
        prop_oneof![
            Just(RoundingMode::TowardZero),
            Just(RoundingMode::AwayFromZero),
            Just(RoundingMode::Floor),
            Just(RoundingMode::Ceiling),
            Just(RoundingMode::HalfUp),
            Just(RoundingMode::HalfDown),
            Just(RoundingMode::HalfEven),
        ]
    }

    proptest! {
        #[test]
        fn integer_distributive(a in small_int(), b in small_int(), c in small_int()) {
            let a = Integer::new(a);
            let b = Integer::new(b);
            let c = Integer::new(c);
            prop_assert_eq!(
                a.clone() * (b.clone() + c.clone()),
                a.clone() * b.clone() + a.clone() * c.clone()
            );
        }

        #[test]
        fn gcd_divides_both(a in non_zero_int(), b in non_zero_int()) {
            let a = Integer::new(a);
            let b = Integer::new(b);
            let g = a.gcd(&b);
            prop_assert!((a.clone() % g.clone()).is_zero());
            prop_assert!((b.clone() % g.clone()).is_zero());
        }

        #[test]
        fn nth_root_brackets(n in 0i64..1_000_000, k in 1u32..6) {
            let n = Integer::new(n);
            let (root, exact) = n.nth_root(k);
            prop_assert!(root.pow(k) <= n);
            prop_assert!((root.clone() + Integer::new(1)).pow(k) > n);
            prop_assert_eq!(exact, root.pow(k) == n);
        }

        #[test]
        fn rational_always_reduced(num in small_int(), den in non_zero_int()) {
            let r = Rational::from_i64(num, den);
            prop_assert!(r.denominator().is_positive());
            prop_assert_eq!(r.numerator().gcd(&r.denominator()).to_i64(), Some(1));
        }

        #[test]
        fn rational_distributive(
            num_a in small_int(),
            den_a in non_zero_int(),
            num_b in small_int(),
            den_b in non_zero_int(),
            num_c in small_int(),
            den_c in non_zero_int()
        ) {
            let a = Rational::from_i64(num_a, den_a);
            let b = Rational::from_i64(num_b, den_b);
            let c = Rational::from_i64(num_c, den_c);
            prop_assert_eq!(
                a.clone() * (b.clone() + c.clone()),
                a.clone() * b.clone() + a.clone() * c.clone()
            );
        }

        #[test]
        fn rational_multiplicative_inverse(num in non_zero_int(), den in non_zero_int()) {
            use num_traits::One;
            let a = Rational::from_i64(num, den);
            let inv = a.recip();
            prop_assert!((a * inv).is_one());
        }

        // Directed modes bracket the exact quotient; nearest modes land
        // within half an ulp.
        #[test]
        fn real_rounding_brackets_exact(
            num in non_zero_int(),
            den in 1i64..1000,
            prec in 2usize..80,
            mode in rounding_mode()
        ) {
            let exact = Rational::from_i64(num, den);
            let ctx = PrecisionContext { prec, mode };
            let r = with_context(ctx, || Real::from_rational(&exact));
            prop_assert!(r.bitcount() <= prec);
            let value = r.to_rational();
            match mode {
                RoundingMode::Floor => { prop_assert!(value <= exact); }
                RoundingMode::Ceiling => { prop_assert!(value >= exact); }
                RoundingMode::TowardZero => { prop_assert!(value.abs() <= exact.abs()); }
                RoundingMode::AwayFromZero => { prop_assert!(value.abs() >= exact.abs()); }
                _ => {
                    let ulp = Real::from_parts(Integer::new(1), r.top() - i64::try_from(prec).unwrap_or(0));
                    let err = (value - exact).abs();
                    prop_assert!(err <= ulp.to_rational() / Rational::from(2));
                }
            }
        }

        #[test]
        fn real_add_is_correctly_rounded(a in small_int(), b in small_int(), sa in -80i64..80, sb in -80i64..80) {
            let x = Real::from_parts(Integer::new(a), sa);
            let y = Real::from_parts(Integer::new(b), sb);
            let exact = x.to_rational() + y.to_rational();
            prop_assert_eq!(&x + &y, Real::from_rational(&exact));
        }

        #[test]
        fn interval_add_encloses(a in small_int(), b in non_zero_int(), c in small_int(), d in non_zero_int()) {
            let p = Rational::from_i64(a, b);
            let q = Rational::from_i64(c, d);
            let sum = Interval::from_rational(&p).add(&Interval::from_rational(&q));
            let exact = p + q;
            prop_assert!(sum.lower().to_rational() <= exact);
            prop_assert!(sum.upper().to_rational() >= exact);
        }

        #[test]
        fn number_add_commutative(a in small_int(), b in non_zero_int(), c in small_int()) {
            let x = Number::fraction(a, b);
            let y = Number::integer(c);
            prop_assert_eq!(x.add(&y), y.add(&x));
        }
    }
}
