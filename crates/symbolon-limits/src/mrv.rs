//! Most Rapidly Varying (MRV) subexpression detection.
//!
//! The MRV set contains the subexpressions that vary fastest as x → ∞.
//! This is the key insight of the Gruntz algorithm: by rewriting in terms
//! of one fastest-varying subexpression, the problem reduces to a series
//! expansion in a single infinitesimal.

use rustc_hash::FxHashSet;
use symbolon_core::{ExprArena, ExprHandle, ExprNode};

use crate::comparison::ComparisonClass;
use crate::gruntz::{Gruntz, LimitConfig, LimitError, LimitResult};

/// A set of Most Rapidly Varying subexpressions, all in one
/// comparability class.
///
/// Every member is either the limit variable itself or exponential-like
/// (`exp(t)`, or a power with a variable exponent) with `t -> ±oo`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MrvSet {
    exprs: Vec<ExprHandle>,
}

impl MrvSet {
    /// Creates an empty MRV set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a singleton MRV set.
    #[must_use]
    pub fn singleton(expr: ExprHandle) -> Self {
        Self { exprs: vec![expr] }
    }

    pub(crate) fn from_exprs(exprs: Vec<ExprHandle>) -> Self {
        let mut set = Self::empty();
        for e in exprs {
            set.insert(e);
        }
        set
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    /// Returns the expressions in the MRV set, in discovery order.
    #[must_use]
    pub fn exprs(&self) -> &[ExprHandle] {
        &self.exprs
    }

    /// Checks membership.
    #[must_use]
    pub fn contains(&self, e: ExprHandle) -> bool {
        self.exprs.contains(&e)
    }

    /// Checks if the two sets share an element.
    #[must_use]
    pub fn meets(&self, other: &Self) -> bool {
        let mine: FxHashSet<ExprHandle> = self.exprs.iter().copied().collect();
        other.exprs.iter().any(|e| mine.contains(e))
    }

    /// Merges `other` into `self`, keeping the first occurrence of each
    /// element.
    #[must_use]
    pub fn union(mut self, other: Self) -> Self {
        for e in other.exprs {
            self.insert(e);
        }
        self
    }

    fn insert(&mut self, e: ExprHandle) {
        if !self.exprs.contains(&e) {
            self.exprs.push(e);
        }
    }

    // The element compared on behalf of the whole class.
    fn representative(&self) -> Option<ExprHandle> {
        self.exprs.first().copied()
    }

    fn is_variable(&self, x: ExprHandle) -> bool {
        self.exprs.as_slice() == [x]
    }
}

/// Finds the MRV set of `expr` as `x -> oo`.
///
/// `x` should carry a positive assumption so logarithms and powers of it
/// simplify; [`limit`](crate::limit) arranges this itself.
///
/// # Errors
///
/// Returns [`LimitError::NotComparable`] for subexpressions whose growth
/// cannot be classified, and the errors of the nested limit computations.
pub fn find_mrv(arena: &mut ExprArena, expr: ExprHandle, x: ExprHandle) -> LimitResult<MrvSet> {
    Gruntz::new(arena, x, LimitConfig::default()).mrv(expr)
}

impl Gruntz<'_> {
    /// The MRV set of `e`.
    pub(crate) fn mrv(&mut self, e: ExprHandle) -> LimitResult<MrvSet> {
        let x = self.x;
        if !self.arena.has_subtree(e, x) {
            return Ok(MrvSet::empty());
        }
        if e == x {
            return Ok(MrvSet::singleton(x));
        }
        if let Some(t) = self.exponent_of(e)? {
            let inner = self.mrv(t)?;
            let li = self.limitinf(t)?;
            if self.is_infinite(li) {
                return self.mrv_max(MrvSet::singleton(e), inner);
            }
            return Ok(inner);
        }
        match self.arena.get(e).clone() {
            ExprNode::Add(args) | ExprNode::Mul(args) => self.mrv_all(&args),
            ExprNode::Pow { base, .. } => self.mrv(base),
            ExprNode::Apply { args, .. } => self.mrv_all(&args),
            _ => Err(LimitError::NotComparable { expr: e, reason: "no growth rule for this expression" }),
        }
    }

    fn mrv_all(&mut self, args: &[ExprHandle]) -> LimitResult<MrvSet> {
        let mut acc = MrvSet::empty();
        for &a in args {
            let s = self.mrv(a)?;
            acc = self.mrv_max(acc, s)?;
        }
        Ok(acc)
    }

    /// The faster varying of two MRV sets, or their union when they are in
    /// the same class.
    pub(crate) fn mrv_max(&mut self, f: MrvSet, g: MrvSet) -> LimitResult<MrvSet> {
        if f.is_empty() {
            return Ok(g);
        }
        if g.is_empty() {
            return Ok(f);
        }
        if f.meets(&g) {
            return Ok(f.union(g));
        }
        if f.is_variable(self.x) {
            return Ok(g);
        }
        if g.is_variable(self.x) {
            return Ok(f);
        }
        let (Some(a), Some(b)) = (f.representative(), g.representative()) else {
            return Ok(f.union(g));
        };
        Ok(match self.compare(a, b)? {
            ComparisonClass::GreaterThan => f,
            ComparisonClass::LessThan => g,
            ComparisonClass::Comparable => f.union(g),
        })
    }
}
