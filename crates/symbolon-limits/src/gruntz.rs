//! The Gruntz algorithm for computing limits.
//!
//! This implements the algorithm from:
//! "On Computing Limits in a Symbolic Manipulation System" by Dominik
//! Gruntz (1996)
//!
//! The algorithm works by:
//! 1. Finding the Most Rapidly Varying (MRV) subexpressions
//! 2. Rewriting the expression in terms of a new variable ω where ω → 0
//! 3. Computing the leading term of a series expansion in ω
//! 4. Extracting the limit from the leading term, recursing on its
//!    coefficient when the exponent is zero

use std::cmp::Reverse;

use rustc_hash::FxHashMap;
use symbolon_core::{functions, CoreError, ErrorKind, ExprArena, ExprHandle, ExprNode, Predicate};
use symbolon_numbers::Number;
use thiserror::Error;

use crate::mrv::MrvSet;

/// The direction of a limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Limit {
    /// x → +∞
    PosInfinity,
    /// x → -∞
    NegInfinity,
    /// x → a from the right (x → a⁺)
    Right(ExprHandle),
    /// x → a from the left (x → a⁻)
    Left(ExprHandle),
    /// x → a (two-sided)
    TwoSided(ExprHandle),
}

impl Limit {
    /// Returns true if this is a limit at infinity.
    #[must_use]
    pub fn is_infinity(&self) -> bool {
        matches!(self, Limit::PosInfinity | Limit::NegInfinity)
    }
}

/// Bounds on the work a single limit may do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LimitConfig {
    /// Deepest nesting of limit and sign computations.
    pub max_depth: u32,
    /// Most growth comparisons one limit may perform.
    pub max_compare: u32,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_compare: 256,
        }
    }
}

/// Errors that can occur during limit computation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LimitError {
    /// A kernel operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Nested limit computations went deeper than
    /// [`LimitConfig::max_depth`].
    #[error("limit recursion exceeded depth {0}")]
    RecursionLimit(u32),

    /// A subexpression has no determinable asymptotic behaviour, e.g. it
    /// oscillates without decaying.
    #[error("cannot compare asymptotic behaviour of {expr:?}: {reason}")]
    NotComparable {
        /// Offending subexpression.
        expr: ExprHandle,
        /// What could not be decided.
        reason: &'static str,
    },

    /// More than [`LimitConfig::max_compare`] comparisons were needed.
    #[error("comparison budget of {0} exhausted")]
    CompareBudget(u32),
}

impl LimitError {
    /// The abstract error kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            LimitError::Core(err) => err.kind(),
            LimitError::RecursionLimit(_) | LimitError::NotComparable { .. } => ErrorKind::Value,
            LimitError::CompareBudget(_) => ErrorKind::NotImplemented,
        }
    }
}

/// Result alias for limit computations.
pub type LimitResult<T> = Result<T, LimitError>;

/// Computes the limit of `expr` as `x` approaches `to`.
///
/// Infinite results are the arena's `oo` and `-oo`.
///
/// # Errors
///
/// Returns a type-error if `x` is not a symbol, a value-error when a
/// two-sided limit has different one-sided values, and
/// [`LimitError`]s from the algorithm itself.
pub fn limit(arena: &mut ExprArena, expr: ExprHandle, x: ExprHandle, to: Limit) -> LimitResult<ExprHandle> {
    limit_with(arena, expr, x, to, LimitConfig::default())
}

/// [`limit`] with explicit bounds.
///
/// # Errors
///
/// See [`limit`].
pub fn limit_with(
    arena: &mut ExprArena,
    expr: ExprHandle,
    x: ExprHandle,
    to: Limit,
    config: LimitConfig,
) -> LimitResult<ExprHandle> {
    if !arena.is_symbol(x) {
        return Err(CoreError::type_error("limit", x, "limit variable must be a symbol").into());
    }
    let oo = arena.infinity();
    let neg_oo = arena.neg_infinity();
    let to = match to {
        Limit::Right(a) | Limit::TwoSided(a) if a == oo => Limit::PosInfinity,
        Limit::Left(a) | Limit::TwoSided(a) if a == neg_oo => Limit::NegInfinity,
        other => other,
    };
    // The variable runs through a fresh positive dummy tending to +oo.
    let p = arena.dummy_with("x", &[(Predicate::Positive, true)])?;
    let inv = {
        let m1 = arena.minus_one();
        arena.pow(p, m1)?
    };
    let at_infinity = |arena: &mut ExprArena, replacement: ExprHandle| -> LimitResult<ExprHandle> {
        let e = arena.subs(expr, x, replacement)?;
        Gruntz::new(arena, p, config).limitinf(e)
    };
    match to {
        Limit::PosInfinity => at_infinity(arena, p),
        Limit::NegInfinity => {
            let np = arena.neg(p);
            at_infinity(arena, np)
        }
        Limit::Right(a) => {
            let r = arena.add(&[a, inv]);
            at_infinity(arena, r)
        }
        Limit::Left(a) => {
            let r = arena.sub(a, inv);
            at_infinity(arena, r)
        }
        Limit::TwoSided(a) => {
            let r = arena.add(&[a, inv]);
            let right = at_infinity(arena, r)?;
            let l = arena.sub(a, inv);
            let left = at_infinity(arena, l)?;
            if right != left {
                return Err(CoreError::value("limit", expr, "one-sided limits differ").into());
            }
            Ok(right)
        }
    }
}

/// State of one limit computation: the variable, tending to `+oo`, and
/// the spent budgets.
pub(crate) struct Gruntz<'a> {
    pub(crate) arena: &'a mut ExprArena,
    pub(crate) x: ExprHandle,
    config: LimitConfig,
    depth: u32,
    compares: u32,
}

impl<'a> Gruntz<'a> {
    pub(crate) fn new(arena: &'a mut ExprArena, x: ExprHandle, config: LimitConfig) -> Self {
        Self {
            arena,
            x,
            config,
            depth: 0,
            compares: 0,
        }
    }

    fn descend<T>(&mut self, f: impl FnOnce(&mut Self) -> LimitResult<T>) -> LimitResult<T> {
        if self.depth >= self.config.max_depth {
            tracing::debug!(depth = self.depth, "limit recursion limit reached");
            return Err(LimitError::RecursionLimit(self.config.max_depth));
        }
        self.depth += 1;
        let r = f(self);
        self.depth -= 1;
        r
    }

    pub(crate) fn spend_compare(&mut self) -> LimitResult<()> {
        if self.compares >= self.config.max_compare {
            return Err(LimitError::CompareBudget(self.config.max_compare));
        }
        self.compares += 1;
        Ok(())
    }

    pub(crate) fn is_infinite(&self, h: ExprHandle) -> bool {
        self.arena.as_number(h).is_some_and(Number::is_infinite)
    }

    /// `lim e` as `x -> oo`.
    pub(crate) fn limitinf(&mut self, e: ExprHandle) -> LimitResult<ExprHandle> {
        if !self.arena.has_subtree(e, self.x) {
            return Ok(e);
        }
        if e == self.x {
            return Ok(self.arena.infinity());
        }
        self.descend(|g| {
            let (c0, e0) = g.mrv_leadterm(e)?;
            tracing::debug!(?e, ?c0, ?e0, depth = g.depth, "leading term");
            match g.sign(e0)? {
                1 => Ok(g.arena.zero()),
                -1 => match g.sign(c0)? {
                    1 => Ok(g.arena.infinity()),
                    -1 => Ok(g.arena.neg_infinity()),
                    _ => Err(LimitError::NotComparable { expr: c0, reason: "leading coefficient vanishes" }),
                },
                _ => g.limitinf(c0),
            }
        })
    }

    /// The eventual sign of `e` as `x -> oo`.
    pub(crate) fn sign(&mut self, e: ExprHandle) -> LimitResult<i8> {
        if !self.arena.has_subtree(e, self.x) {
            return self
                .arena
                .numeric_sign(e)
                .ok_or(LimitError::NotComparable { expr: e, reason: "sign cannot be decided" });
        }
        if e == self.x {
            return Ok(1);
        }
        match self.arena.get(e).clone() {
            ExprNode::Mul(factors) => {
                let mut s = 1;
                for f in factors {
                    s *= self.sign(f)?;
                }
                return Ok(s);
            }
            ExprNode::Apply { func, .. } if func == functions::EXP => return Ok(1),
            ExprNode::Apply { func, args } if func == functions::LOG => {
                let m1 = self.arena.minus_one();
                let shifted = self.arena.add(&[args[0], m1]);
                return self.sign(shifted);
            }
            ExprNode::Pow { base, exp } => {
                let s = self.sign(base)?;
                if s == 1 {
                    return Ok(1);
                }
                if let Some(k) = self.arena.as_i64(exp) {
                    return Ok(if k % 2 == 0 { s * s } else { s });
                }
            }
            _ => {}
        }
        self.descend(|g| {
            let (c0, _) = g.mrv_leadterm(e)?;
            g.sign(c0)
        })
    }

    /// `(c0, e0)` with `e ~ c0 * w^e0`, where `w -> 0+` stands for the
    /// fastest varying subexpression of `e`.
    pub(crate) fn mrv_leadterm(&mut self, e: ExprHandle) -> LimitResult<(ExprHandle, ExprHandle)> {
        let mut omega = self.mrv(e)?;
        if omega.is_empty() {
            return Ok((e, self.arena.zero()));
        }
        let mut e = e;
        if omega.contains(self.x) {
            // x -> exp(x) leaves the limit unchanged and makes every
            // member exponential.
            let up = self.arena.exp(self.x)?;
            e = self.arena.subs(e, self.x, up)?;
            let mut moved = Vec::with_capacity(omega.exprs().len());
            for &f in omega.exprs() {
                moved.push(self.arena.subs(f, self.x, up)?);
            }
            omega = MrvSet::from_exprs(moved);
        }
        let w = self.arena.dummy_with("w", &[(Predicate::Positive, true)])?;
        let (f, logw) = self.rewrite(e, &omega, w)?;
        let f = self.split_logs(f, w, logw, &mut FxHashMap::default())?;
        let lt = self.arena.as_leading_term(f, w)?;
        let lt = self.resolve_logs(lt, w, logw)?;
        self.arena
            .as_coeff_exponent(lt, w)
            .ok_or(LimitError::NotComparable { expr: lt, reason: "leading term is not a monomial" })
    }

    /// Rewrites `e` in terms of `w`, replacing every member of `omega`.
    /// Returns the rewritten expression and `log(w)` in terms of `x`.
    fn rewrite(&mut self, e: ExprHandle, omega: &MrvSet, w: ExprHandle) -> LimitResult<(ExprHandle, ExprHandle)> {
        let mut nodes = Vec::with_capacity(omega.exprs().len());
        for &f in omega.exprs() {
            let s = self
                .exponent_of(f)?
                .ok_or(LimitError::NotComparable { expr: f, reason: "not an exponential" })?;
            nodes.push((f, s));
        }
        // Enclosing members are replaced before the ones inside them.
        nodes.sort_by_key(|&(f, _)| Reverse(self.arena.count_ops(f)));
        let Some(&(g, t)) = nodes.last() else {
            return Ok((e, self.arena.zero()));
        };
        // g = w when g -> 0, g = 1/w when g -> oo.
        let (gw, logw) = match self.sign(t)? {
            -1 => (w, t),
            1 => {
                let m1 = self.arena.minus_one();
                (self.arena.pow(w, m1)?, self.arena.neg(t))
            }
            _ => return Err(LimitError::NotComparable { expr: g, reason: "representative does not vary" }),
        };
        let mut f = e;
        for (node, s) in nodes {
            let ratio = self.arena.div(s, t)?;
            let c = self.limitinf(ratio)?;
            if self.arena.has_subtree(c, self.x) || self.arena.as_number(c).is_some_and(|n| !n.is_finite()) {
                return Err(LimitError::NotComparable { expr: node, reason: "not in the class of the representative" });
            }
            // node = exp(s - c*t) * g^c
            let ct = self.arena.mul(&[c, t]);
            let rest = self.arena.sub(s, ct);
            let rest = self.arena.expand(rest)?;
            let a = self.arena.exp(rest)?;
            let wc = self.arena.pow(gw, c)?;
            let replacement = self.arena.mul(&[a, wc]);
            f = self.arena.subs(f, node, replacement)?;
        }
        tracing::trace!(?e, ?f, "rewrote in the mrv variable");
        Ok((f, logw))
    }

    // Writes each `log(u)` depending on `w` as
    // `log(c) + k*log(w) + log(u/(c*w^k))` with `c*w^k` the leading term of
    // `u`, and `log(w)` as `logw`. Bare `x` left by moving up then cancels
    // against the logarithms before the leading term is taken.
    fn split_logs(
        &mut self,
        h: ExprHandle,
        w: ExprHandle,
        logw: ExprHandle,
        done: &mut FxHashMap<ExprHandle, ExprHandle>,
    ) -> LimitResult<ExprHandle> {
        if !self.arena.has_subtree(h, w) {
            return Ok(h);
        }
        if let Some(&r) = done.get(&h) {
            return Ok(r);
        }
        let children = self.arena.args(h);
        let mut mapped = Vec::with_capacity(children.len());
        for &c in &children {
            mapped.push(self.split_logs(c, w, logw, done)?);
        }
        let r = match self.arena.get(h).clone() {
            ExprNode::Apply { func, .. } if func == functions::LOG => {
                let u = mapped[0];
                match self.arena.leadterm(u, w) {
                    Ok((c, k)) => {
                        let log_c = self.arena.log(c)?;
                        let klogw = self.arena.mul(&[k, logw]);
                        let wk = self.arena.pow(w, k)?;
                        let lead = self.arena.mul(&[c, wk]);
                        let ratio = self.arena.div(u, lead)?;
                        let ratio = self.arena.expand(ratio)?;
                        let rest = self.arena.log(ratio)?;
                        self.arena.add(&[log_c, klogw, rest])
                    }
                    Err(err) => {
                        tracing::trace!(?u, %err, "logarithm left for the leading term");
                        self.arena.log(u)?
                    }
                }
            }
            _ if mapped.as_slice() == children.as_slice() => h,
            _ => self.arena.rebuild(h, &mapped)?,
        };
        done.insert(h, r);
        Ok(r)
    }

    // Splits `log(c*w^k)` into `log(c) + k*log(w)` and then writes `log(w)`
    // in terms of `x`.
    fn resolve_logs(&mut self, h: ExprHandle, w: ExprHandle, logw: ExprHandle) -> LimitResult<ExprHandle> {
        let mut logs = Vec::new();
        self.collect_logs(h, w, &mut logs);
        if logs.is_empty() {
            return Ok(h);
        }
        let mut pairs = Vec::with_capacity(logs.len());
        for l in logs {
            let arg = self.arena.args(l)[0];
            let Some((c, k)) = self.arena.as_coeff_exponent(arg, w) else {
                continue;
            };
            let log_c = self.arena.log(c)?;
            let klogw = self.arena.mul(&[k, logw]);
            pairs.push((l, self.arena.add(&[log_c, klogw])));
        }
        Ok(self.arena.subs_dict(h, &pairs)?)
    }

    fn collect_logs(&self, h: ExprHandle, w: ExprHandle, out: &mut Vec<ExprHandle>) {
        if !self.arena.has_subtree(h, w) {
            return;
        }
        let node = self.arena.get(h);
        if let ExprNode::Apply { func, .. } = node {
            if *func == functions::LOG {
                if !out.contains(&h) {
                    out.push(h);
                }
                return;
            }
        }
        for c in node.children() {
            self.collect_logs(c, w, out);
        }
    }
}
