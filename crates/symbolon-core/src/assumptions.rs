//! Three-valued assumptions.
//!
//! An [`AssumptionSet`] stores known predicate values as two bitmasks and
//! is always closed under the implication rules below, so a lookup never
//! has to chase implications.

use std::fmt;

/// A three-valued truth value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Truth {
    /// Known to hold.
    True,
    /// Known not to hold.
    False,
    /// Not known.
    Unknown,
}

impl Truth {
    /// Lifts a boolean.
    #[must_use]
    pub fn from_bool(b: bool) -> Self {
        if b {
            Self::True
        } else {
            Self::False
        }
    }

    /// True for [`Truth::True`].
    #[must_use]
    pub fn is_true(self) -> bool {
        self == Self::True
    }

    /// True for [`Truth::False`].
    #[must_use]
    pub fn is_false(self) -> bool {
        self == Self::False
    }

    /// `Some(b)` when known.
    #[must_use]
    pub fn known(self) -> Option<bool> {
        match self {
            Self::True => Some(true),
            Self::False => Some(false),
            Self::Unknown => None,
        }
    }

    /// Kleene negation.
    #[must_use]
    pub fn not(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Unknown => Self::Unknown,
        }
    }

    /// Kleene conjunction.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::True, Self::True) => Self::True,
            _ => Self::Unknown,
        }
    }

    /// Kleene disjunction.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::True, _) | (_, Self::True) => Self::True,
            (Self::False, Self::False) => Self::False,
            _ => Self::Unknown,
        }
    }
}

/// The predicates the kernel reasons about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Predicate {
    Positive,
    Negative,
    Nonpositive,
    Nonnegative,
    Zero,
    Real,
    Imaginary,
    Integer,
    Rational,
    Irrational,
    Even,
    Odd,
    Prime,
    Composite,
    Commutative,
    Bounded,
    Unbounded,
    Infinitesimal,
    Comparable,
    Finite,
    Complex,
}

impl Predicate {
    /// Every predicate.
    pub const ALL: [Self; 21] = [
        Self::Positive,
        Self::Negative,
        Self::Nonpositive,
        Self::Nonnegative,
        Self::Zero,
        Self::Real,
        Self::Imaginary,
        Self::Integer,
        Self::Rational,
        Self::Irrational,
        Self::Even,
        Self::Odd,
        Self::Prime,
        Self::Composite,
        Self::Commutative,
        Self::Bounded,
        Self::Unbounded,
        Self::Infinitesimal,
        Self::Comparable,
        Self::Finite,
        Self::Complex,
    ];

    /// Lower-case name, as used in `is_<name>`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Nonpositive => "nonpositive",
            Self::Nonnegative => "nonnegative",
            Self::Zero => "zero",
            Self::Real => "real",
            Self::Imaginary => "imaginary",
            Self::Integer => "integer",
            Self::Rational => "rational",
            Self::Irrational => "irrational",
            Self::Even => "even",
            Self::Odd => "odd",
            Self::Prime => "prime",
            Self::Composite => "composite",
            Self::Commutative => "commutative",
            Self::Bounded => "bounded",
            Self::Unbounded => "unbounded",
            Self::Infinitesimal => "infinitesimal",
            Self::Comparable => "comparable",
            Self::Finite => "finite",
            Self::Complex => "complex",
        }
    }

    /// Looks a predicate up by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

use Predicate as P;

type Fact = (Predicate, bool);

// Single-premise implications; each is also applied in contrapositive form.
const IMPLICATIONS: &[(Fact, Fact)] = &[
    ((P::Positive, true), (P::Real, true)),
    ((P::Positive, true), (P::Nonnegative, true)),
    ((P::Positive, true), (P::Negative, false)),
    ((P::Positive, true), (P::Zero, false)),
    ((P::Positive, true), (P::Nonpositive, false)),
    ((P::Negative, true), (P::Real, true)),
    ((P::Negative, true), (P::Nonpositive, true)),
    ((P::Negative, true), (P::Zero, false)),
    ((P::Negative, true), (P::Nonnegative, false)),
    ((P::Zero, true), (P::Nonnegative, true)),
    ((P::Zero, true), (P::Nonpositive, true)),
    ((P::Zero, true), (P::Even, true)),
    ((P::Zero, true), (P::Infinitesimal, true)),
    ((P::Nonnegative, true), (P::Real, true)),
    ((P::Nonpositive, true), (P::Real, true)),
    ((P::Even, true), (P::Integer, true)),
    ((P::Odd, true), (P::Integer, true)),
    ((P::Odd, true), (P::Even, false)),
    ((P::Integer, true), (P::Rational, true)),
    ((P::Rational, true), (P::Real, true)),
    ((P::Rational, true), (P::Irrational, false)),
    ((P::Irrational, true), (P::Real, true)),
    ((P::Prime, true), (P::Integer, true)),
    ((P::Prime, true), (P::Positive, true)),
    ((P::Composite, true), (P::Integer, true)),
    ((P::Composite, true), (P::Positive, true)),
    ((P::Composite, true), (P::Prime, false)),
    ((P::Real, true), (P::Complex, true)),
    ((P::Imaginary, true), (P::Complex, true)),
    ((P::Imaginary, true), (P::Real, false)),
    ((P::Bounded, true), (P::Unbounded, false)),
    ((P::Unbounded, false), (P::Bounded, true)),
    ((P::Infinitesimal, true), (P::Bounded, true)),
    ((P::Finite, true), (P::Bounded, true)),
    ((P::Bounded, true), (P::Finite, true)),
    ((P::Comparable, true), (P::Real, true)),
];

// Rules with several premises; applied forward only.
const COMBINED: &[(&[Fact], Fact)] = &[
    (&[(P::Nonnegative, true), (P::Zero, false)], (P::Positive, true)),
    (&[(P::Nonpositive, true), (P::Zero, false)], (P::Negative, true)),
    (&[(P::Nonnegative, true), (P::Nonpositive, true)], (P::Zero, true)),
    (&[(P::Real, true), (P::Negative, false)], (P::Nonnegative, true)),
    (&[(P::Real, true), (P::Positive, false)], (P::Nonpositive, true)),
    (&[(P::Integer, true), (P::Even, false)], (P::Odd, true)),
    (&[(P::Integer, true), (P::Odd, false)], (P::Even, true)),
    (&[(P::Real, true), (P::Rational, false)], (P::Irrational, true)),
    (&[(P::Real, true), (P::Irrational, false)], (P::Rational, true)),
];

/// Setting a predicate contradicted a fact already in the set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssumptionConflict {
    /// The predicate that received both values.
    pub predicate: Predicate,
}

impl fmt::Display for AssumptionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inconsistent assumptions on `{}`", self.predicate)
    }
}

/// A closed set of known predicate values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AssumptionSet {
    known: u32,
    value: u32,
}

impl AssumptionSet {
    /// The empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and closes a set from facts.
    ///
    /// # Errors
    ///
    /// Returns the first predicate that ends up both true and false.
    pub fn from_facts(facts: &[(Predicate, bool)]) -> Result<Self, AssumptionConflict> {
        let mut set = Self::new();
        for &(p, v) in facts {
            set.put(p, v)?;
        }
        set.close()?;
        Ok(set)
    }

    /// The value of `p`.
    #[must_use]
    pub fn get(&self, p: Predicate) -> Truth {
        if self.known & p.bit() == 0 {
            Truth::Unknown
        } else {
            Truth::from_bool(self.value & p.bit() != 0)
        }
    }

    /// A copy with `p = v` added and closed.
    ///
    /// # Errors
    ///
    /// Returns a conflict if the new fact contradicts the set.
    pub fn with(mut self, p: Predicate, v: bool) -> Result<Self, AssumptionConflict> {
        self.put(p, v)?;
        self.close()?;
        Ok(self)
    }

    /// Union of two sets, closed.
    ///
    /// # Errors
    ///
    /// Returns a conflict if the sets disagree.
    pub fn merge(mut self, other: &Self) -> Result<Self, AssumptionConflict> {
        for (p, v) in other.facts() {
            self.put(p, v)?;
        }
        self.close()?;
        Ok(self)
    }

    /// The known facts.
    pub fn facts(&self) -> impl Iterator<Item = (Predicate, bool)> + '_ {
        Predicate::ALL
            .into_iter()
            .filter_map(|p| self.get(p).known().map(|v| (p, v)))
    }

    /// True if nothing is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.known == 0
    }

    fn holds(&self, (p, v): Fact) -> bool {
        self.get(p) == Truth::from_bool(v)
    }

    // Returns whether the set changed.
    fn put(&mut self, p: Predicate, v: bool) -> Result<bool, AssumptionConflict> {
        match self.get(p).known() {
            Some(old) if old == v => Ok(false),
            Some(_) => Err(AssumptionConflict { predicate: p }),
            None => {
                self.known |= p.bit();
                if v {
                    self.value |= p.bit();
                }
                Ok(true)
            }
        }
    }

    fn close(&mut self) -> Result<(), AssumptionConflict> {
        loop {
            let mut changed = false;
            for &(premise, conclusion) in IMPLICATIONS {
                if self.holds(premise) {
                    changed |= self.put(conclusion.0, conclusion.1)?;
                }
                if self.holds((conclusion.0, !conclusion.1)) {
                    changed |= self.put(premise.0, !premise.1)?;
                }
            }
            for &(premises, conclusion) in COMBINED {
                if premises.iter().all(|&f| self.holds(f)) {
                    changed |= self.put(conclusion.0, conclusion.1)?;
                }
            }
            if !changed {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_closure() {
        let s = AssumptionSet::from_facts(&[(P::Positive, true)]).unwrap();
        assert_eq!(s.get(P::Real), Truth::True);
        assert_eq!(s.get(P::Nonnegative), Truth::True);
        assert_eq!(s.get(P::Negative), Truth::False);
        assert_eq!(s.get(P::Zero), Truth::False);
        assert_eq!(s.get(P::Complex), Truth::True);
        assert_eq!(s.get(P::Integer), Truth::Unknown);
    }

    #[test]
    fn test_contrapositive() {
        let s = AssumptionSet::from_facts(&[(P::Real, false)]).unwrap();
        assert_eq!(s.get(P::Positive), Truth::False);
        assert_eq!(s.get(P::Integer), Truth::False);
        let s = AssumptionSet::from_facts(&[(P::Unbounded, true)]).unwrap();
        assert_eq!(s.get(P::Bounded), Truth::False);
        assert_eq!(s.get(P::Infinitesimal), Truth::False);
    }

    #[test]
    fn test_odd_and_even() {
        let s = AssumptionSet::from_facts(&[(P::Odd, true)]).unwrap();
        assert_eq!(s.get(P::Even), Truth::False);
        assert_eq!(s.get(P::Rational), Truth::True);
        let s = AssumptionSet::from_facts(&[(P::Integer, true), (P::Even, false)]).unwrap();
        assert_eq!(s.get(P::Odd), Truth::True);
    }

    #[test]
    fn test_combined_rules() {
        let s = AssumptionSet::from_facts(&[(P::Nonnegative, true), (P::Zero, false)]).unwrap();
        assert_eq!(s.get(P::Positive), Truth::True);
        let s = AssumptionSet::from_facts(&[(P::Real, true), (P::Positive, false), (P::Negative, false)]).unwrap();
        assert_eq!(s.get(P::Zero), Truth::True);
    }

    #[test]
    fn test_conflict() {
        let err = AssumptionSet::from_facts(&[(P::Positive, true), (P::Negative, true)]).unwrap_err();
        assert!(matches!(err.predicate, P::Negative | P::Positive));
        assert!(AssumptionSet::from_facts(&[(P::Even, true), (P::Integer, false)]).is_err());
    }

    #[test]
    fn test_truth_logic() {
        assert_eq!(Truth::True.and(Truth::Unknown), Truth::Unknown);
        assert_eq!(Truth::False.and(Truth::Unknown), Truth::False);
        assert_eq!(Truth::True.or(Truth::Unknown), Truth::True);
        assert_eq!(Truth::Unknown.not(), Truth::Unknown);
        assert_eq!(Predicate::from_name("bounded"), Some(P::Bounded));
    }
}
