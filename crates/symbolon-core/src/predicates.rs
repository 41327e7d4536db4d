//! Three-valued predicate queries.
//!
//! Each node's facts are derived once from its children and cached as a
//! closed [`AssumptionSet`]; `ask` reads one predicate out of it. Leaves
//! contribute what their value or declaration says, sums and products
//! combine sign, realness, boundedness and parity information, and
//! applications defer to the function's `eval_is` hook and class
//! defaults.

use symbolon_numbers::Number;

use crate::arena::ExprArena;
use crate::assumptions::{AssumptionSet, Predicate, Truth};
use crate::expr::{Constant, ExprNode, FunctionId};
use crate::handle::ExprHandle;

use Predicate as P;

type Fact = (Predicate, bool);

fn close_facts(facts: &[Fact]) -> AssumptionSet {
    match AssumptionSet::from_facts(facts) {
        Ok(set) => set,
        Err(conflict) => {
            tracing::debug!(%conflict, "dropping conflicting derived facts");
            let mut set = AssumptionSet::new();
            for &(p, v) in facts {
                if let Ok(next) = set.with(p, v) {
                    set = next;
                }
            }
            set
        }
    }
}

fn sign_fact(sign: i8) -> Fact {
    match sign {
        1 => (P::Positive, true),
        -1 => (P::Negative, true),
        _ => (P::Zero, true),
    }
}

fn number_facts(n: &Number) -> Vec<Fact> {
    let mut facts = vec![(P::Commutative, true)];
    match n {
        Number::NaN => return facts,
        Number::Infinity | Number::NegativeInfinity => {
            facts.push(sign_fact(if n.is_positive() { 1 } else { -1 }));
            facts.push((P::Bounded, false));
            facts.push((P::Integer, false));
            facts.push((P::Infinitesimal, false));
            facts.push((P::Comparable, true));
            return facts;
        }
        Number::Integer(k) => {
            facts.push((P::Integer, true));
            facts.push((P::Even, k.is_even()));
            let prime = k > &symbolon_numbers::Integer::from(1) && k.is_probable_prime();
            facts.push((P::Prime, prime));
            facts.push((P::Composite, k > &symbolon_numbers::Integer::from(1) && !prime));
        }
        Number::Rational(_) => {
            facts.push((P::Rational, true));
            facts.push((P::Integer, false));
        }
        Number::Real(_) | Number::Interval(_) => facts.push((P::Real, true)),
    }
    if let Some(s) = n.signum() {
        facts.push(sign_fact(s));
    }
    facts.push((P::Bounded, true));
    facts.push((P::Infinitesimal, n.is_zero()));
    facts.push((P::Comparable, true));
    facts
}

fn constant_facts(c: Constant) -> Vec<Fact> {
    let mut facts = vec![(P::Commutative, true), (P::Bounded, true), (P::Infinitesimal, false)];
    match c {
        Constant::E | Constant::Pi => {
            facts.extend([(P::Positive, true), (P::Irrational, true), (P::Comparable, true)]);
        }
        Constant::EulerGamma => facts.extend([(P::Positive, true), (P::Comparable, true)]),
        Constant::ImaginaryUnit => facts.extend([(P::Imaginary, true), (P::Comparable, false)]),
    }
    facts
}

/// Counts of children for which a predicate is true, false, unknown.
struct Tally {
    yes: usize,
    no: usize,
    total: usize,
}

impl Tally {
    fn of(sets: &[AssumptionSet], p: Predicate) -> Self {
        let mut tally = Self {
            yes: 0,
            no: 0,
            total: sets.len(),
        };
        for s in sets {
            match s.get(p) {
                Truth::True => tally.yes += 1,
                Truth::False => tally.no += 1,
                Truth::Unknown => {}
            }
        }
        tally
    }

    fn all(&self) -> bool {
        self.yes == self.total
    }

    fn single_exception(&self) -> bool {
        self.no == 1 && self.yes + 1 == self.total
    }
}

fn commutative_fact(sets: &[AssumptionSet], facts: &mut Vec<Fact>) {
    let c = Tally::of(sets, P::Commutative);
    if c.all() {
        facts.push((P::Commutative, true));
    } else if c.no > 0 {
        facts.push((P::Commutative, false));
    }
}

fn add_facts(sets: &[AssumptionSet]) -> Vec<Fact> {
    let mut facts = Vec::new();
    commutative_fact(sets, &mut facts);

    let bounded = Tally::of(sets, P::Bounded);
    if bounded.all() {
        facts.push((P::Bounded, true));
    } else if bounded.single_exception() {
        facts.push((P::Bounded, false));
        // The unbounded term decides the sign.
        if let Some(s) = sets.iter().find(|s| s.get(P::Bounded) == Truth::False) {
            if sets.iter().all(|t| t.get(P::Real) == Truth::True) {
                if s.get(P::Positive) == Truth::True {
                    facts.push((P::Positive, true));
                } else if s.get(P::Negative) == Truth::True {
                    facts.push((P::Negative, true));
                }
            }
        }
    }
    if Tally::of(sets, P::Infinitesimal).all() {
        facts.push((P::Infinitesimal, true));
    }

    let real = Tally::of(sets, P::Real);
    if real.all() {
        facts.push((P::Real, true));
    } else if real.single_exception() {
        facts.push((P::Real, false));
    }
    let rational = Tally::of(sets, P::Rational);
    if rational.all() {
        facts.push((P::Rational, true));
    } else if rational.yes + 1 == rational.total && Tally::of(sets, P::Irrational).yes == 1 {
        facts.push((P::Irrational, true));
    }
    if Tally::of(sets, P::Integer).all() {
        facts.push((P::Integer, true));
        let odd = Tally::of(sets, P::Odd);
        if odd.yes + odd.no == odd.total {
            facts.push((P::Odd, odd.yes % 2 == 1));
        }
    }

    let nonneg = Tally::of(sets, P::Nonnegative);
    if nonneg.all() {
        facts.push((P::Nonnegative, true));
        if Tally::of(sets, P::Positive).yes > 0 {
            facts.push((P::Positive, true));
        }
    }
    let nonpos = Tally::of(sets, P::Nonpositive);
    if nonpos.all() {
        facts.push((P::Nonpositive, true));
        if Tally::of(sets, P::Negative).yes > 0 {
            facts.push((P::Negative, true));
        }
    }
    facts
}

fn mul_facts(sets: &[AssumptionSet], numeric: &[bool]) -> Vec<Fact> {
    let mut facts = Vec::new();
    commutative_fact(sets, &mut facts);

    let bounded = Tally::of(sets, P::Bounded);
    let zero = Tally::of(sets, P::Zero);
    if zero.yes > 0 && bounded.all() {
        facts.push((P::Zero, true));
    } else if zero.no == zero.total {
        facts.push((P::Zero, false));
    }
    if bounded.all() {
        facts.push((P::Bounded, true));
    } else if bounded.no > 0
        && sets
            .iter()
            .zip(numeric)
            .all(|(s, &num)| s.get(P::Bounded) == Truth::False || (num && s.get(P::Zero) == Truth::False))
    {
        facts.push((P::Bounded, false));
    }
    if Tally::of(sets, P::Infinitesimal).yes > 0 && bounded.all() {
        facts.push((P::Infinitesimal, true));
    }

    let real = Tally::of(sets, P::Real);
    if real.all() {
        facts.push((P::Real, true));
    } else {
        let imaginary = Tally::of(sets, P::Imaginary);
        let rest_ok = sets
            .iter()
            .filter(|s| s.get(P::Imaginary) != Truth::True)
            .all(|s| s.get(P::Real) == Truth::True && s.get(P::Zero) == Truth::False);
        if rest_ok && imaginary.yes == 1 {
            facts.push((P::Imaginary, true));
        } else if rest_ok && imaginary.yes == 2 {
            facts.push((P::Real, true));
        }
    }

    if real.all() {
        let mut negative = false;
        let mut strict = true;
        let mut known = true;
        for s in sets {
            let sign = [P::Positive, P::Negative, P::Nonnegative, P::Nonpositive]
                .into_iter()
                .find(|&p| s.get(p) == Truth::True);
            match sign {
                Some(P::Positive) => {}
                Some(P::Negative) => negative = !negative,
                Some(P::Nonnegative) => strict = false,
                Some(_) => {
                    negative = !negative;
                    strict = false;
                }
                None => {
                    known = false;
                    break;
                }
            }
        }
        if known {
            facts.push(match (negative, strict) {
                (false, true) => (P::Positive, true),
                (true, true) => (P::Negative, true),
                (false, false) => (P::Nonnegative, true),
                (true, false) => (P::Nonpositive, true),
            });
        }
    }

    let integer = Tally::of(sets, P::Integer);
    if integer.all() {
        facts.push((P::Integer, true));
        if Tally::of(sets, P::Even).yes > 0 {
            facts.push((P::Even, true));
        } else if Tally::of(sets, P::Odd).all() {
            facts.push((P::Odd, true));
        }
    }
    let rational = Tally::of(sets, P::Rational);
    if rational.all() {
        facts.push((P::Rational, true));
    } else if Tally::of(sets, P::Irrational).yes == 1
        && sets
            .iter()
            .filter(|s| s.get(P::Irrational) != Truth::True)
            .all(|s| s.get(P::Rational) == Truth::True && s.get(P::Zero) == Truth::False)
    {
        facts.push((P::Irrational, true));
    }
    facts
}

fn pow_facts(b: AssumptionSet, e: AssumptionSet, exp: Option<&Number>, integer_base: bool) -> Vec<Fact> {
    let mut facts = Vec::new();
    commutative_fact(&[b, e], &mut facts);
    if b.get(P::Zero) == Truth::False {
        facts.push((P::Zero, false));
    }
    let is = |s: AssumptionSet, p: Predicate| s.get(p) == Truth::True;
    match exp {
        Some(Number::Integer(k)) => {
            let even = k.is_even();
            let positive = k.is_positive();
            if is(b, P::Real) {
                facts.push((P::Real, true));
            }
            if even {
                if is(b, P::Real) && b.get(P::Zero) == Truth::False {
                    facts.push((P::Positive, true));
                } else if is(b, P::Real) {
                    facts.push((P::Nonnegative, true));
                }
            } else {
                for p in [P::Positive, P::Negative, P::Nonnegative, P::Nonpositive] {
                    if is(b, p) && (positive || b.get(P::Zero) == Truth::False) {
                        facts.push((p, true));
                        break;
                    }
                }
            }
            if positive {
                for p in [P::Integer, P::Rational, P::Bounded, P::Infinitesimal] {
                    if is(b, p) {
                        facts.push((p, true));
                    }
                }
                if b.get(P::Bounded) == Truth::False {
                    facts.push((P::Bounded, false));
                }
                if is(b, P::Even) {
                    facts.push((P::Even, true));
                } else if is(b, P::Odd) {
                    facts.push((P::Odd, true));
                }
            } else {
                if is(b, P::Rational) && b.get(P::Zero) == Truth::False {
                    facts.push((P::Rational, true));
                }
                if b.get(P::Bounded) == Truth::False {
                    facts.push((P::Infinitesimal, true));
                }
            }
        }
        _ => {
            if is(b, P::Positive) && is(e, P::Real) {
                facts.push((P::Positive, true));
            }
            if is(e, P::Positive) {
                if is(b, P::Bounded) {
                    facts.push((P::Bounded, true));
                }
                if is(b, P::Infinitesimal) {
                    facts.push((P::Infinitesimal, true));
                }
                if b.get(P::Bounded) == Truth::False {
                    facts.push((P::Bounded, false));
                }
            }
            if is(e, P::Negative) {
                if b.get(P::Bounded) == Truth::False {
                    facts.push((P::Infinitesimal, true));
                }
                if is(b, P::Infinitesimal) && b.get(P::Zero) == Truth::False {
                    facts.push((P::Bounded, false));
                }
            }
            if integer_base && is(b, P::Positive) && matches!(exp, Some(Number::Rational(_))) {
                facts.push((P::Irrational, true));
            }
        }
    }
    facts
}

impl ExprArena {
    /// The three-valued answer to "is `h` `p`?".
    pub fn ask(&mut self, h: ExprHandle, p: Predicate) -> Truth {
        self.facts(h).get(p)
    }

    /// Every known fact about `h`, closed under the implication rules.
    pub fn facts(&mut self, h: ExprHandle) -> AssumptionSet {
        if let Some(set) = self.predicate_cache.get(&h) {
            return *set;
        }
        let set = self.derive_facts(h);
        self.predicate_cache.insert(h, set);
        set
    }

    fn derive_facts(&mut self, h: ExprHandle) -> AssumptionSet {
        let mut facts = match self.get(h).clone() {
            ExprNode::Number(n) => return close_facts(&number_facts(&n)),
            ExprNode::Constant(c) => return close_facts(&constant_facts(c)),
            ExprNode::Symbol(_) => {
                let Some(data) = self.symbol_data(h) else {
                    return close_facts(&[(P::Commutative, true)]);
                };
                let set = data.assumptions;
                if set.get(P::Comparable) == Truth::Unknown {
                    return set.with(P::Comparable, false).unwrap_or(set);
                }
                return set;
            }
            ExprNode::Add(args) => {
                let sets: Vec<AssumptionSet> = args.iter().map(|&a| self.facts(a)).collect();
                add_facts(&sets)
            }
            ExprNode::Mul(args) => {
                let sets: Vec<AssumptionSet> = args.iter().map(|&a| self.facts(a)).collect();
                let numeric: Vec<bool> = args
                    .iter()
                    .map(|&a| matches!(self.get(a), ExprNode::Number(_) | ExprNode::Constant(_)))
                    .collect();
                mul_facts(&sets, &numeric)
            }
            ExprNode::Pow { base, exp } => {
                let b = self.facts(base);
                let e = self.facts(exp);
                let exp_number = self.as_number(exp).cloned();
                let integer_base = self.as_number(base).is_some_and(Number::is_integer);
                pow_facts(b, e, exp_number.as_ref(), integer_base)
            }
            ExprNode::Apply { func, args } => self.apply_facts(func, &args),
            _ => vec![(P::Commutative, true)],
        };
        if self.free_symbols(h).is_empty() {
            facts.push((P::Comparable, self.evalf(h).is_ok()));
        } else {
            facts.push((P::Comparable, false));
        }
        close_facts(&facts)
    }

    fn apply_facts(&mut self, func: FunctionId, args: &[ExprHandle]) -> Vec<Fact> {
        let mut facts = Vec::new();
        let Some(def) = self.function_def(func) else {
            facts.push((P::Commutative, true));
            return facts;
        };
        for p in Predicate::ALL {
            if p == P::Comparable {
                continue;
            }
            if let Some(v) = def.eval_is(self, args, p).known() {
                facts.push((p, v));
            }
        }
        let class = self.function_name(func).to_string();
        if let Some(defaults) = self.registry().class_defaults(&class) {
            facts.extend(defaults.facts());
        }
        if !facts.iter().any(|(p, _)| *p == P::Commutative) {
            facts.push((P::Commutative, true));
        }
        facts
    }
}
