//! The elementary functions every arena registers: `exp`, `log`, `sin`,
//! `cos`, `tan`, `abs` and `sign`.
//!
//! Each one is a unit struct implementing [`FunctionDef`]. Their ids are
//! fixed by registration order and exported as [`crate::functions`].

use std::sync::Arc;

use num_traits::Zero;

use symbolon_numbers::{Integer, Number, NumberError, Rational, Real};

use crate::arena::ExprArena;
use crate::assumptions::{AssumptionSet, Predicate, Truth};
use crate::error::{CoreError, CoreResult};
use crate::expr::{functions, Constant, ExprNode, FunctionId};
use crate::function::FunctionDef;
use crate::handle::ExprHandle;
use crate::registry::{FunctionEntry, Registry};

/// Registers the elementary functions in the order of their ids.
pub(crate) fn register_builtins(registry: &mut Registry) {
    let defs: [(FunctionId, Arc<dyn FunctionDef>); 7] = [
        (functions::EXP, Arc::new(Exp)),
        (functions::LOG, Arc::new(Log)),
        (functions::SIN, Arc::new(Sin)),
        (functions::COS, Arc::new(Cos)),
        (functions::TAN, Arc::new(Tan)),
        (functions::ABS, Arc::new(Abs)),
        (functions::SIGN, Arc::new(Sign)),
    ];
    for (expected, def) in defs {
        let id = registry.add_function(FunctionEntry::Defined(def));
        debug_assert_eq!(id.ok(), Some(expected));
    }
}

// Helpers shared by the definitions.

fn unary_lambda(
    arena: &mut ExprArena,
    body: impl FnOnce(&mut ExprArena, ExprHandle) -> CoreResult<ExprHandle>,
) -> CoreResult<Option<ExprHandle>> {
    let t = arena.dummy("t");
    let b = body(arena, t)?;
    arena.lambda(&[t], b).map(Some)
}

fn numeric(op: &'static str, r: Result<Real, NumberError>) -> CoreResult<Real> {
    r.map_err(|e| CoreError::from_number(op, None, e))
}

fn order_symbol(arena: &ExprArena, order: ExprHandle) -> Option<ExprHandle> {
    match arena.get(order) {
        ExprNode::Order { vars, .. } => vars.first().copied(),
        _ => None,
    }
}

/// `r` with `r * pi == a`, when `a` is a rational multiple of `pi`.
fn pi_coefficient(arena: &ExprArena, a: ExprHandle) -> Option<Rational> {
    match arena.get(a) {
        ExprNode::Constant(Constant::Pi) => Some(Rational::from_i64(1, 1)),
        ExprNode::Number(n) if n.is_exact() && n.is_zero() => Some(Rational::from_i64(0, 1)),
        ExprNode::Mul(args) if args.len() == 2 => match (arena.get(args[0]), arena.get(args[1])) {
            (ExprNode::Number(c), ExprNode::Constant(Constant::Pi)) => c.as_rational(),
            _ => None,
        },
        _ => None,
    }
}

/// `r` with `r * i * pi == a`.
fn i_pi_coefficient(arena: &ExprArena, a: ExprHandle) -> Option<Rational> {
    let ExprNode::Mul(args) = arena.get(a) else {
        return None;
    };
    let (coeff, rest) = match arena.as_number(args[0]) {
        Some(c) => (c.as_rational()?, &args[1..]),
        None => (Rational::from_i64(1, 1), &args[..]),
    };
    match rest {
        [p, i] if matches!(arena.get(*p), ExprNode::Constant(Constant::Pi))
            && matches!(arena.get(*i), ExprNode::Constant(Constant::ImaginaryUnit)) =>
        {
            Some(coeff)
        }
        _ => None,
    }
}

/// `r mod m` in `[0, m)`.
fn reduce_mod(r: &Rational, m: i64) -> Rational {
    let m = Rational::from(m);
    let q = (r / &m).floor();
    r - &(Rational::from_integer(q) * &m)
}

fn small_fraction(r: &Rational) -> Option<(i64, i64)> {
    Some((r.numerator().to_i64()?, r.denominator().to_i64()?))
}

/// `(p/q) * sqrt(n)`.
fn surd(arena: &mut ExprArena, p: i64, q: i64, n: i64) -> CoreResult<ExprHandle> {
    let k = arena.rational(p, q);
    let n = arena.integer(n);
    let root = arena.sqrt(n)?;
    Ok(arena.mul(&[k, root]))
}

/// True if `-h` reads more naturally than `h`: a negative number, a
/// product with a negative coefficient, or a sum with more negative terms
/// than positive ones (ties go to the first term).
fn could_extract_minus_sign(arena: &mut ExprArena, h: ExprHandle) -> bool {
    match arena.get(h).clone() {
        ExprNode::Number(n) => n.is_negative(),
        ExprNode::Mul(args) => arena.as_number(args[0]).is_some_and(Number::is_negative),
        ExprNode::Add(terms) => {
            let negative: Vec<bool> = terms.iter().map(|&t| arena.split_coeff(t).0.is_negative()).collect();
            let n = negative.iter().filter(|&&b| b).count();
            let p = negative.len() - n;
            n > p || (n == p && negative[0])
        }
        _ => false,
    }
}

/// `(c, r)` with `a == c + r`, `c` free of `x` and `r -> 0` as `x -> 0`.
fn split_at_zero(arena: &mut ExprArena, a: ExprHandle, x: ExprHandle) -> CoreResult<Option<(ExprHandle, ExprHandle)>> {
    let (c, rest) = arena.as_coeff_factors(a, Some(x));
    let r = arena.add(&rest);
    if arena.tends_to_zero(r, x)? == Truth::True {
        Ok(Some((c, r)))
    } else {
        Ok(None)
    }
}

/// `n`-th Bernoulli number (with `B1 = +1/2`), Akiyama-Tanigawa.
fn bernoulli(n: usize) -> Rational {
    let mut a: Vec<Rational> = Vec::with_capacity(n + 1);
    for m in 0..=n {
        a.push(Rational::from_i64(1, m as i64 + 1));
        for j in (1..=m).rev() {
            let diff = &a[j - 1] - &a[j];
            a[j - 1] = Rational::from(j as i64) * &diff;
        }
    }
    a[0].clone()
}

// Leading term of `f(arg)` when `arg` is free of `x` after taking its
// own leading term; falls back to series when the value vanishes.
fn leading_at_constant(
    arena: &mut ExprArena,
    func: FunctionId,
    arg: ExprHandle,
    lt: ExprHandle,
    x: ExprHandle,
) -> CoreResult<Option<ExprHandle>> {
    if arena.has_subtree(lt, x) {
        return Ok(None);
    }
    let value = arena.apply(func, &[lt])?;
    if !arena.is_zero(value) {
        return Ok(Some(value));
    }
    let whole = arena.apply(func, &[arg])?;
    arena.leading_term_from_series(whole, x).map(Some)
}

/// `exp`.
#[derive(Debug, Clone, Copy)]
pub struct Exp;

impl Exp {
    fn eval_number(arena: &mut ExprArena, n: &Number) -> CoreResult<Option<ExprHandle>> {
        Ok(match n {
            Number::Integer(_) if n.is_zero() => Some(arena.one()),
            Number::Integer(_) if n.is_one() => Some(arena.e()),
            Number::Infinity => Some(arena.infinity()),
            Number::NegativeInfinity => Some(arena.zero()),
            Number::Real(r) => Some(arena.real(numeric("exp", r.exp())?)),
            _ => None,
        })
    }

    // c*log(y) as (Some(c), y) for an exact c, log(y) as (None, y).
    fn as_log_multiple(arena: &ExprArena, t: ExprHandle) -> Option<(Option<ExprHandle>, ExprHandle)> {
        let log_arg = |h: ExprHandle| match arena.get(h) {
            ExprNode::Apply { func, args } if *func == functions::LOG => Some(args[0]),
            _ => None,
        };
        match arena.get(t) {
            ExprNode::Mul(args) if args.len() == 2 => {
                arena.as_number(args[0]).filter(|c| c.is_exact())?;
                log_arg(args[1]).map(|y| (Some(args[0]), y))
            }
            _ => log_arg(t).map(|y| (None, y)),
        }
    }

    fn pull_logs(arena: &mut ExprArena, a: ExprHandle) -> CoreResult<Option<ExprHandle>> {
        let terms: Vec<ExprHandle> = match arena.get(a) {
            ExprNode::Add(terms) => terms.to_vec(),
            _ => vec![a],
        };
        let mut factors = Vec::new();
        let mut rest = Vec::new();
        for t in terms {
            match Self::as_log_multiple(arena, t) {
                Some((None, y)) => factors.push(y),
                Some((Some(c), y)) => factors.push(arena.pow(y, c)?),
                None => rest.push(t),
            }
        }
        if factors.is_empty() {
            return Ok(None);
        }
        let r = arena.add(&rest);
        factors.push(arena.exp(r)?);
        Ok(Some(arena.mul(&factors)))
    }
}

impl FunctionDef for Exp {
    fn name(&self) -> &str {
        "exp"
    }

    fn eval_apply(&self, arena: &mut ExprArena, args: &[ExprHandle]) -> CoreResult<Option<ExprHandle>> {
        let a = args[0];
        if let Some(n) = arena.as_number(a).cloned() {
            return Self::eval_number(arena, &n);
        }
        if let Some(k) = i_pi_coefficient(arena, a) {
            let twice = &k * &Rational::from(2);
            if let Some(m) = twice.to_integer() {
                let i = arena.imaginary_unit();
                let m = arena.big_integer(m);
                return arena.pow(i, m).map(Some);
            }
        }
        Self::pull_logs(arena, a)
    }

    fn eval_apply_power(
        &self,
        arena: &mut ExprArena,
        args: &[ExprHandle],
        exp: ExprHandle,
    ) -> CoreResult<Option<ExprHandle>> {
        let a = args[0];
        let safe = arena.ask(exp, Predicate::Integer) == Truth::True
            || (arena.ask(a, Predicate::Real) == Truth::True && arena.ask(exp, Predicate::Real) == Truth::True);
        if !safe {
            return Ok(None);
        }
        let product = arena.mul(&[a, exp]);
        arena.exp(product).map(Some)
    }

    fn eval_apply_subs(
        &self,
        arena: &mut ExprArena,
        args: &[ExprHandle],
        old: ExprHandle,
        new: ExprHandle,
    ) -> CoreResult<Option<ExprHandle>> {
        let t = match arena.get(old) {
            ExprNode::Apply { func, args } if *func == functions::EXP => args[0],
            _ => return Ok(None),
        };
        let a = args[0];
        let ratio = arena.div(a, t)?;
        if arena.as_number(ratio).is_some_and(Number::is_exact) {
            return arena.pow(new, ratio).map(Some);
        }
        let ExprNode::Add(terms) = arena.get(a).clone() else {
            return Ok(None);
        };
        let mut factors = Vec::new();
        let mut rest = Vec::new();
        for s in terms {
            let r = arena.div(s, t)?;
            if arena.as_number(r).is_some_and(Number::is_exact) {
                factors.push(arena.pow(new, r)?);
            } else {
                rest.push(s);
            }
        }
        if factors.is_empty() {
            return Ok(None);
        }
        let r = arena.add(&rest);
        let r = arena.subs(r, old, new)?;
        factors.push(arena.exp(r)?);
        Ok(Some(arena.mul(&factors)))
    }

    fn fdiff(&self, arena: &mut ExprArena, argindex: usize) -> CoreResult<Option<ExprHandle>> {
        if argindex != 0 {
            return Ok(None);
        }
        unary_lambda(arena, |arena, t| arena.exp(t))
    }

    fn taylor_term(
        &self,
        arena: &mut ExprArena,
        n: u32,
        x: ExprHandle,
        previous: &[ExprHandle],
    ) -> CoreResult<Option<ExprHandle>> {
        if let (Some(&last), true) = (previous.last(), n > 0) {
            let k = arena.rational(1, i64::from(n));
            return Ok(Some(arena.mul(&[last, x, k])));
        }
        let e = arena.integer(i64::from(n));
        let p = arena.pow(x, e)?;
        let f = arena.big_integer(Integer::factorial(n));
        arena.div(p, f).map(Some)
    }

    fn eval_oseries(
        &self,
        arena: &mut ExprArena,
        args: &[ExprHandle],
        order: ExprHandle,
    ) -> CoreResult<Option<ExprHandle>> {
        let Some(x) = order_symbol(arena, order) else {
            return Ok(None);
        };
        let Some((c, r)) = split_at_zero(arena, args[0], x)? else {
            return Ok(None);
        };
        if arena.is_zero(c) {
            return Ok(None);
        }
        let ec = arena.exp(c)?;
        let er = arena.exp(r)?;
        let sr = arena.oseries(er, order)?;
        Ok(Some(arena.distribute(&[ec, sr])))
    }

    fn eval_as_leading_term(
        &self,
        arena: &mut ExprArena,
        args: &[ExprHandle],
        x: ExprHandle,
    ) -> CoreResult<Option<ExprHandle>> {
        let a = args[0];
        if let ExprNode::Add(terms) = arena.get(a).clone() {
            let mut parts = Vec::with_capacity(terms.len());
            for t in terms {
                let e = arena.exp(t)?;
                parts.push(arena.as_leading_term(e, x)?);
            }
            return Ok(Some(arena.mul(&parts)));
        }
        let lt = arena.as_leading_term(a, x)?;
        if arena.tends_to_zero(lt, x)? == Truth::True {
            return Ok(Some(arena.one()));
        }
        arena.exp(lt).map(Some)
    }

    fn eval_is(&self, arena: &mut ExprArena, args: &[ExprHandle], predicate: Predicate) -> Truth {
        let a = args[0];
        match predicate {
            Predicate::Positive | Predicate::Nonnegative | Predicate::Real => {
                if arena.ask(a, Predicate::Real) == Truth::True {
                    Truth::True
                } else {
                    Truth::Unknown
                }
            }
            Predicate::Negative | Predicate::Nonpositive => {
                if arena.ask(a, Predicate::Real) == Truth::True {
                    Truth::False
                } else {
                    Truth::Unknown
                }
            }
            Predicate::Zero => {
                if arena.ask(a, Predicate::Bounded) == Truth::True {
                    Truth::False
                } else {
                    Truth::Unknown
                }
            }
            Predicate::Bounded => {
                if arena.ask(a, Predicate::Bounded) == Truth::True {
                    Truth::True
                } else {
                    Truth::Unknown
                }
            }
            _ => Truth::Unknown,
        }
    }

    fn evalf(&self, args: &[Real]) -> Option<Result<Real, NumberError>> {
        Some(args[0].exp())
    }
}

/// Natural logarithm.
#[derive(Debug, Clone, Copy)]
pub struct Log;

impl Log {
    fn eval_number(arena: &mut ExprArena, a: ExprHandle, n: &Number) -> CoreResult<Option<ExprHandle>> {
        if n.is_zero() {
            return Err(CoreError::domain("log", a, "logarithm of zero"));
        }
        if n.is_one() {
            return Ok(Some(arena.zero()));
        }
        match n {
            Number::Infinity => Ok(Some(arena.infinity())),
            Number::Real(r) if r.is_positive() => Ok(Some(arena.real(numeric("log", r.ln())?))),
            Number::Real(r) if r.is_negative() => {
                let l = numeric("log", r.abs().ln())?;
                let l = arena.real(l);
                let ipi = Self::i_pi(arena);
                Ok(Some(arena.add(&[l, ipi])))
            }
            Number::Integer(_) | Number::Rational(_) if n.is_negative() => {
                let m = arena.number(n.neg());
                let l = arena.log(m)?;
                let ipi = Self::i_pi(arena);
                Ok(Some(arena.add(&[l, ipi])))
            }
            Number::Rational(r) if r.numerator() == Integer::from(1) => {
                let q = arena.big_integer(r.denominator());
                let l = arena.log(q)?;
                Ok(Some(arena.neg(l)))
            }
            _ => Ok(None),
        }
    }

    fn i_pi(arena: &mut ExprArena) -> ExprHandle {
        let i = arena.imaginary_unit();
        let pi = arena.pi();
        arena.mul(&[i, pi])
    }
}

impl FunctionDef for Log {
    fn name(&self) -> &str {
        "log"
    }

    fn eval_apply(&self, arena: &mut ExprArena, args: &[ExprHandle]) -> CoreResult<Option<ExprHandle>> {
        let a = args[0];
        if let Some(n) = arena.as_number(a).cloned() {
            return Self::eval_number(arena, a, &n);
        }
        match arena.get(a).clone() {
            ExprNode::Constant(Constant::E) => Ok(Some(arena.one())),
            ExprNode::Constant(Constant::ImaginaryUnit) => {
                let ipi = Self::i_pi(arena);
                let half = arena.half();
                Ok(Some(arena.mul(&[half, ipi])))
            }
            ExprNode::Apply { func, args } if func == functions::EXP => {
                if arena.ask(args[0], Predicate::Real) == Truth::True {
                    Ok(Some(args[0]))
                } else {
                    Ok(None)
                }
            }
            ExprNode::Pow { base, exp } => {
                if arena.ask(base, Predicate::Positive) == Truth::True && arena.ask(exp, Predicate::Real) == Truth::True
                {
                    let l = arena.log(base)?;
                    Ok(Some(arena.mul(&[exp, l])))
                } else {
                    Ok(None)
                }
            }
            _ => Ok(None),
        }
    }

    fn fdiff(&self, arena: &mut ExprArena, argindex: usize) -> CoreResult<Option<ExprHandle>> {
        if argindex != 0 {
            return Ok(None);
        }
        unary_lambda(arena, |arena, t| {
            let m1 = arena.minus_one();
            arena.pow(t, m1)
        })
    }

    fn eval_oseries(
        &self,
        arena: &mut ExprArena,
        args: &[ExprHandle],
        order: ExprHandle,
    ) -> CoreResult<Option<ExprHandle>> {
        let Some(x) = order_symbol(arena, order) else {
            return Ok(None);
        };
        let a = args[0];
        // log(c*x^e*(1 + t)) = log(c) + e*log(x) + t - t^2/2 + ...
        let (c, e) = arena.leadterm(a, x)?;
        let xe = arena.pow(x, e)?;
        let lt = arena.mul(&[c, xe]);
        let ratio = arena.div(a, lt)?;
        let ratio = arena.oseries(ratio, order)?;
        let m1 = arena.minus_one();
        let t = arena.add(&[ratio, m1]);
        let t = arena.expand(t)?;
        let log_c = arena.log(c)?;
        let log_x = arena.log(x)?;
        let elx = arena.mul(&[e, log_x]);
        if arena.is_zero(t) {
            return Ok(Some(arena.add(&[log_c, elx])));
        }
        let count = arena.series_terms(t, order)?;
        let mut parts = vec![log_c, elx];
        let mut power = t;
        for k in 1..count {
            let sign = if k % 2 == 1 { 1 } else { -1 };
            let coeff = arena.rational(sign, i64::from(k));
            parts.push(arena.mul(&[coeff, power]));
            let next = arena.mul(&[power, t]);
            power = arena.expand(next)?;
        }
        let sum = arena.add(&parts);
        let sum = arena.expand(sum)?;
        arena.oseries(sum, order).map(Some)
    }

    fn eval_as_leading_term(
        &self,
        arena: &mut ExprArena,
        args: &[ExprHandle],
        x: ExprHandle,
    ) -> CoreResult<Option<ExprHandle>> {
        let a = args[0];
        let lt = arena.as_leading_term(a, x)?;
        if arena.is_one(lt) {
            let m1 = arena.minus_one();
            let shifted = arena.add(&[a, m1]);
            return arena.as_leading_term(shifted, x).map(Some);
        }
        arena.log(lt).map(Some)
    }

    fn eval_is(&self, arena: &mut ExprArena, args: &[ExprHandle], predicate: Predicate) -> Truth {
        match predicate {
            Predicate::Real => {
                if arena.ask(args[0], Predicate::Positive) == Truth::True {
                    Truth::True
                } else {
                    Truth::Unknown
                }
            }
            _ => Truth::Unknown,
        }
    }

    fn eval_expand(&self, arena: &mut ExprArena, args: &[ExprHandle]) -> CoreResult<Option<ExprHandle>> {
        let ExprNode::Mul(factors) = arena.get(args[0]).clone() else {
            return Ok(None);
        };
        let mut logs = Vec::new();
        let mut rest = Vec::new();
        for f in factors {
            if arena.ask(f, Predicate::Positive) == Truth::True {
                logs.push(arena.log(f)?);
            } else {
                rest.push(f);
            }
        }
        if logs.is_empty() {
            return Ok(None);
        }
        if !rest.is_empty() {
            let r = arena.mul(&rest);
            logs.push(arena.log(r)?);
        }
        let sum = arena.add(&logs);
        arena.expand(sum).map(Some)
    }

    fn evalf(&self, args: &[Real]) -> Option<Result<Real, NumberError>> {
        Some(args[0].ln())
    }
}

/// Which of the three trigonometric functions; they share most rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trig {
    Sin,
    Cos,
    Tan,
}

impl Trig {
    fn id(self) -> FunctionId {
        match self {
            Self::Sin => functions::SIN,
            Self::Cos => functions::COS,
            Self::Tan => functions::TAN,
        }
    }

    fn at(self, arena: &mut ExprArena, a: ExprHandle) -> CoreResult<ExprHandle> {
        arena.apply(self.id(), &[a])
    }

    fn table(self, arena: &mut ExprArena, r: &Rational) -> CoreResult<Option<ExprHandle>> {
        let Some(key) = small_fraction(r) else {
            return Ok(None);
        };
        let value = match (self, key) {
            (Self::Sin | Self::Tan, (0, 1)) | (Self::Cos, (1, 2)) => arena.zero(),
            (Self::Sin, (1, 2)) | (Self::Cos, (0, 1)) | (Self::Tan, (1, 4)) => arena.one(),
            (Self::Sin, (1, 6)) | (Self::Cos, (1, 3)) => arena.half(),
            (Self::Sin | Self::Cos, (1, 4)) => surd(arena, 1, 2, 2)?,
            (Self::Sin, (1, 3)) | (Self::Cos, (1, 6)) => surd(arena, 1, 2, 3)?,
            (Self::Tan, (1, 6)) => surd(arena, 1, 3, 3)?,
            (Self::Tan, (1, 3)) => surd(arena, 1, 1, 3)?,
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    // f(r*pi) via the period and the reflections into [0, pi/2].
    fn at_pi_multiple(self, arena: &mut ExprArena, r: &Rational) -> CoreResult<Option<ExprHandle>> {
        let half = Rational::from_i64(1, 2);
        let one = Rational::from(1);
        let (negate, reduced) = match self {
            Self::Sin => {
                let mut r = reduce_mod(r, 2);
                let mut negate = false;
                if r >= one {
                    r = &r - &one;
                    negate = true;
                }
                if r > half {
                    r = &one - &r;
                }
                (negate, r)
            }
            Self::Cos => {
                let mut r = reduce_mod(r, 2);
                if r > one {
                    r = &Rational::from(2) - &r;
                }
                if r > half {
                    (true, &one - &r)
                } else {
                    (false, r)
                }
            }
            Self::Tan => {
                let r = reduce_mod(r, 1);
                if r == half {
                    return Ok(None);
                }
                if r > half {
                    (true, &one - &r)
                } else {
                    (false, r)
                }
            }
        };
        let value = match self.table(arena, &reduced)? {
            Some(v) => v,
            None if negate || &reduced != r => {
                let k = arena.rational_value(reduced);
                let pi = arena.pi();
                let arg = arena.mul(&[k, pi]);
                self.at(arena, arg)?
            }
            None => return Ok(None),
        };
        Ok(Some(if negate { arena.neg(value) } else { value }))
    }

    // f(x + m*pi/2) for a sum with a half-integer multiple of pi.
    fn rotate(self, arena: &mut ExprArena, a: ExprHandle) -> CoreResult<Option<ExprHandle>> {
        let ExprNode::Add(terms) = arena.get(a).clone() else {
            return Ok(None);
        };
        let view: &ExprArena = arena;
        let Some((t, c)) = terms
            .iter()
            .find_map(|&t| pi_coefficient(view, t).filter(|c| !c.is_zero()).map(|c| (t, c)))
        else {
            return Ok(None);
        };
        let rest = arena.sub(a, t);
        let twice = &c * &Rational::from(2);
        let Some(m) = twice.to_integer() else {
            let period = if self == Self::Tan { 1 } else { 2 };
            let reduced = reduce_mod(&c, period);
            if reduced == c {
                return Ok(None);
            }
            let k = arena.rational_value(reduced);
            let pi = arena.pi();
            let shift = arena.mul(&[k, pi]);
            let arg = arena.add(&[rest, shift]);
            return self.at(arena, arg).map(Some);
        };
        let quarter = m.div_rem_floor(&Integer::from(4)).1.to_i64().unwrap_or(0);
        let value = match (self, quarter) {
            (Self::Sin, 0) => Self::Sin.at(arena, rest)?,
            (Self::Sin, 1) | (Self::Cos, 0) => Self::Cos.at(arena, rest)?,
            (Self::Sin, 2) | (Self::Cos, 1) => {
                let s = Self::Sin.at(arena, rest)?;
                arena.neg(s)
            }
            (Self::Sin, _) | (Self::Cos, 2) => {
                let s = Self::Cos.at(arena, rest)?;
                arena.neg(s)
            }
            (Self::Cos, _) => Self::Sin.at(arena, rest)?,
            (Self::Tan, q) if q % 2 == 0 => Self::Tan.at(arena, rest)?,
            (Self::Tan, _) => {
                let tn = Self::Tan.at(arena, rest)?;
                let m1 = arena.minus_one();
                let inv = arena.pow(tn, m1)?;
                arena.neg(inv)
            }
        };
        Ok(Some(value))
    }

    fn eval_apply(self, arena: &mut ExprArena, a: ExprHandle) -> CoreResult<Option<ExprHandle>> {
        if let Some(n) = arena.as_number(a).cloned() {
            match &n {
                Number::Real(r) => {
                    let v = match self {
                        Self::Sin => r.sin(),
                        Self::Cos => r.cos(),
                        Self::Tan => numeric("tan", r.tan())?,
                    };
                    return Ok(Some(arena.real(v)));
                }
                _ if n.is_zero() => return Ok(Some(if self == Self::Cos { arena.one() } else { arena.zero() })),
                _ if !n.is_exact() => return Ok(None),
                _ => {}
            }
        }
        if let Some(r) = pi_coefficient(arena, a) {
            return self.at_pi_multiple(arena, &r);
        }
        if could_extract_minus_sign(arena, a) {
            let na = arena.neg(a);
            let v = self.at(arena, na)?;
            return Ok(Some(if self == Self::Cos { v } else { arena.neg(v) }));
        }
        self.rotate(arena, a)
    }

    fn fdiff(self, arena: &mut ExprArena) -> CoreResult<Option<ExprHandle>> {
        unary_lambda(arena, |arena, t| match self {
            Self::Sin => arena.cos(t),
            Self::Cos => {
                let s = arena.sin(t)?;
                Ok(arena.neg(s))
            }
            Self::Tan => {
                let tn = arena.tan(t)?;
                let two = arena.integer(2);
                let sq = arena.pow(tn, two)?;
                let one = arena.one();
                Ok(arena.add(&[one, sq]))
            }
        })
    }

    fn taylor_term(self, arena: &mut ExprArena, n: u32, x: ExprHandle) -> CoreResult<ExprHandle> {
        let odd = n % 2 == 1;
        let coeff = match self {
            Self::Sin if odd => {
                let sign = if (n / 2) % 2 == 0 { 1 } else { -1 };
                Rational::new(Integer::from(sign), Integer::factorial(n))
            }
            Self::Cos if !odd => {
                let sign = if (n / 2) % 2 == 0 { 1 } else { -1 };
                Rational::new(Integer::from(sign), Integer::factorial(n))
            }
            Self::Tan if odd => {
                // (-1)^(k-1) 4^k (4^k - 1) B_2k / (2k)! with n = 2k - 1
                let k = (n + 1) / 2;
                let four_k = Integer::from(4).pow(k);
                let sign = if k % 2 == 1 { 1 } else { -1 };
                let top = Rational::from_integer(Integer::from(sign) * &four_k * &(&four_k - &Integer::from(1)));
                let b = bernoulli(2 * k as usize);
                &(&top * &b) / &Rational::from_integer(Integer::factorial(2 * k))
            }
            _ => return Ok(arena.zero()),
        };
        let c = arena.rational_value(coeff);
        let e = arena.integer(i64::from(n));
        let p = arena.pow(x, e)?;
        Ok(arena.mul(&[c, p]))
    }

    fn eval_oseries(self, arena: &mut ExprArena, a: ExprHandle, order: ExprHandle) -> CoreResult<Option<ExprHandle>> {
        let Some(x) = order_symbol(arena, order) else {
            return Ok(None);
        };
        if self == Self::Tan {
            let s = arena.sin(a)?;
            let s = arena.oseries(s, order)?;
            let c = arena.cos(a)?;
            let c = arena.oseries(c, order)?;
            let q = arena.div(s, c)?;
            return arena.oseries(q, order).map(Some);
        }
        let Some((c, r)) = split_at_zero(arena, a, x)? else {
            return Ok(None);
        };
        if arena.is_zero(c) {
            return Ok(None);
        }
        // sin(c + r) = sin(c)cos(r) + cos(c)sin(r)
        // cos(c + r) = cos(c)cos(r) - sin(c)sin(r)
        let sc = arena.sin(c)?;
        let cc = arena.cos(c)?;
        let sr = arena.sin(r)?;
        let sr = arena.oseries(sr, order)?;
        let cr = arena.cos(r)?;
        let cr = arena.oseries(cr, order)?;
        let (first, second) = match self {
            Self::Sin => (arena.distribute(&[sc, cr]), arena.distribute(&[cc, sr])),
            _ => {
                let p = arena.distribute(&[sc, sr]);
                (arena.distribute(&[cc, cr]), arena.neg(p))
            }
        };
        Ok(Some(arena.add(&[first, second])))
    }

    fn eval_as_leading_term(self, arena: &mut ExprArena, a: ExprHandle, x: ExprHandle) -> CoreResult<Option<ExprHandle>> {
        let lt = arena.as_leading_term(a, x)?;
        if arena.tends_to_zero(lt, x)? == Truth::True {
            return Ok(Some(if self == Self::Cos { arena.one() } else { lt }));
        }
        leading_at_constant(arena, self.id(), a, lt, x)
    }

    fn eval_is(self, arena: &mut ExprArena, a: ExprHandle, predicate: Predicate) -> Truth {
        match predicate {
            Predicate::Real => {
                if arena.ask(a, Predicate::Real) == Truth::True {
                    Truth::True
                } else {
                    Truth::Unknown
                }
            }
            Predicate::Bounded if self != Self::Tan => {
                if arena.ask(a, Predicate::Real) == Truth::True {
                    Truth::True
                } else {
                    Truth::Unknown
                }
            }
            _ => Truth::Unknown,
        }
    }

    fn evalf(self, x: &Real) -> Result<Real, NumberError> {
        match self {
            Self::Sin => Ok(x.sin()),
            Self::Cos => Ok(x.cos()),
            Self::Tan => x.tan(),
        }
    }
}

macro_rules! trig_function {
    ($ty:ident, $variant:ident, $name:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy)]
        pub struct $ty;

        impl FunctionDef for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn eval_apply(&self, arena: &mut ExprArena, args: &[ExprHandle]) -> CoreResult<Option<ExprHandle>> {
                Trig::$variant.eval_apply(arena, args[0])
            }

            fn fdiff(&self, arena: &mut ExprArena, argindex: usize) -> CoreResult<Option<ExprHandle>> {
                if argindex != 0 {
                    return Ok(None);
                }
                Trig::$variant.fdiff(arena)
            }

            fn taylor_term(
                &self,
                arena: &mut ExprArena,
                n: u32,
                x: ExprHandle,
                _previous: &[ExprHandle],
            ) -> CoreResult<Option<ExprHandle>> {
                Trig::$variant.taylor_term(arena, n, x).map(Some)
            }

            fn eval_oseries(
                &self,
                arena: &mut ExprArena,
                args: &[ExprHandle],
                order: ExprHandle,
            ) -> CoreResult<Option<ExprHandle>> {
                Trig::$variant.eval_oseries(arena, args[0], order)
            }

            fn eval_as_leading_term(
                &self,
                arena: &mut ExprArena,
                args: &[ExprHandle],
                x: ExprHandle,
            ) -> CoreResult<Option<ExprHandle>> {
                Trig::$variant.eval_as_leading_term(arena, args[0], x)
            }

            fn eval_is(&self, arena: &mut ExprArena, args: &[ExprHandle], predicate: Predicate) -> Truth {
                Trig::$variant.eval_is(arena, args[0], predicate)
            }

            fn evalf(&self, args: &[Real]) -> Option<Result<Real, NumberError>> {
                Some(Trig::$variant.evalf(&args[0]))
            }
        }
    };
}

trig_function!(Sin, Sin, "sin", "Sine.");
trig_function!(Cos, Cos, "cos", "Cosine.");
trig_function!(Tan, Tan, "tan", "Tangent.");

/// Absolute value.
#[derive(Debug, Clone, Copy)]
pub struct Abs;

impl FunctionDef for Abs {
    fn name(&self) -> &str {
        "abs"
    }

    fn default_assumptions(&self) -> AssumptionSet {
        AssumptionSet::from_facts(&[(Predicate::Nonnegative, true)]).unwrap_or_default()
    }

    fn eval_apply(&self, arena: &mut ExprArena, args: &[ExprHandle]) -> CoreResult<Option<ExprHandle>> {
        let a = args[0];
        match arena.get(a).clone() {
            ExprNode::Number(n) => return Ok(n.signum().map(|_| arena.number(n.abs()))),
            ExprNode::Constant(Constant::ImaginaryUnit) => return Ok(Some(arena.one())),
            ExprNode::Constant(_) => return Ok(Some(a)),
            ExprNode::Mul(factors) => {
                if let Some(c) = arena.as_number(factors[0]).filter(|c| c.signum().is_some()).cloned() {
                    let rest = arena.mul(&factors[1..]);
                    let k = arena.number(c.abs());
                    let inner = arena.abs(rest)?;
                    return Ok(Some(arena.mul(&[k, inner])));
                }
            }
            _ => {}
        }
        if arena.ask(a, Predicate::Nonnegative) == Truth::True {
            return Ok(Some(a));
        }
        if arena.ask(a, Predicate::Nonpositive) == Truth::True {
            return Ok(Some(arena.neg(a)));
        }
        Ok(None)
    }

    fn eval_apply_power(
        &self,
        arena: &mut ExprArena,
        args: &[ExprHandle],
        exp: ExprHandle,
    ) -> CoreResult<Option<ExprHandle>> {
        let even = arena.as_number(exp).and_then(Number::as_integer).is_some_and(Integer::is_even);
        if even && arena.ask(args[0], Predicate::Real) == Truth::True {
            return arena.pow(args[0], exp).map(Some);
        }
        Ok(None)
    }

    fn fdiff(&self, arena: &mut ExprArena, argindex: usize) -> CoreResult<Option<ExprHandle>> {
        if argindex != 0 {
            return Ok(None);
        }
        unary_lambda(arena, |arena, t| arena.sign(t))
    }

    fn eval_oseries(
        &self,
        arena: &mut ExprArena,
        args: &[ExprHandle],
        order: ExprHandle,
    ) -> CoreResult<Option<ExprHandle>> {
        let Some(x) = order_symbol(arena, order) else {
            return Ok(None);
        };
        let (c, _) = arena.leadterm(args[0], x)?;
        let s = match arena.numeric_sign(c) {
            Some(s) if s != 0 => s,
            _ => return Ok(None),
        };
        let series = arena.oseries(args[0], order)?;
        Ok(Some(if s > 0 { series } else { arena.neg(series) }))
    }

    fn eval_as_leading_term(
        &self,
        arena: &mut ExprArena,
        args: &[ExprHandle],
        x: ExprHandle,
    ) -> CoreResult<Option<ExprHandle>> {
        let lt = arena.as_leading_term(args[0], x)?;
        arena.abs(lt).map(Some)
    }

    fn eval_is(&self, arena: &mut ExprArena, args: &[ExprHandle], predicate: Predicate) -> Truth {
        let a = args[0];
        match predicate {
            Predicate::Zero => arena.ask(a, Predicate::Zero),
            Predicate::Positive => arena.ask(a, Predicate::Zero).not(),
            Predicate::Bounded | Predicate::Integer | Predicate::Rational | Predicate::Even => arena.ask(a, predicate),
            _ => Truth::Unknown,
        }
    }

    fn evalf(&self, args: &[Real]) -> Option<Result<Real, NumberError>> {
        Some(Ok(args[0].abs()))
    }
}

/// The sign of a real or complex value.
#[derive(Debug, Clone, Copy)]
pub struct Sign;

impl FunctionDef for Sign {
    fn name(&self) -> &str {
        "sign"
    }

    fn default_assumptions(&self) -> AssumptionSet {
        AssumptionSet::from_facts(&[(Predicate::Bounded, true)]).unwrap_or_default()
    }

    fn eval_apply(&self, arena: &mut ExprArena, args: &[ExprHandle]) -> CoreResult<Option<ExprHandle>> {
        let a = args[0];
        match arena.get(a).clone() {
            ExprNode::Number(n) => return Ok(n.signum().map(|s| arena.integer(i64::from(s)))),
            ExprNode::Constant(Constant::ImaginaryUnit) => return Ok(Some(a)),
            ExprNode::Constant(_) => return Ok(Some(arena.one())),
            ExprNode::Mul(factors) => {
                if let Some(s) = arena.as_number(factors[0]).and_then(Number::signum) {
                    let rest = arena.mul(&factors[1..]);
                    let k = arena.integer(i64::from(s));
                    let inner = arena.sign(rest)?;
                    return Ok(Some(arena.mul(&[k, inner])));
                }
            }
            _ => {}
        }
        for (p, value) in [(Predicate::Positive, 1), (Predicate::Negative, -1), (Predicate::Zero, 0)] {
            if arena.ask(a, p) == Truth::True {
                return Ok(Some(arena.integer(value)));
            }
        }
        Ok(None)
    }

    fn fdiff(&self, arena: &mut ExprArena, argindex: usize) -> CoreResult<Option<ExprHandle>> {
        if argindex != 0 {
            return Ok(None);
        }
        unary_lambda(arena, |arena, _| Ok(arena.zero()))
    }

    fn eval_as_leading_term(
        &self,
        arena: &mut ExprArena,
        args: &[ExprHandle],
        x: ExprHandle,
    ) -> CoreResult<Option<ExprHandle>> {
        let lt = arena.as_leading_term(args[0], x)?;
        arena.sign(lt).map(Some)
    }

    fn eval_is(&self, arena: &mut ExprArena, args: &[ExprHandle], predicate: Predicate) -> Truth {
        let a = args[0];
        match predicate {
            Predicate::Integer | Predicate::Real => {
                if arena.ask(a, Predicate::Real) == Truth::True {
                    Truth::True
                } else {
                    Truth::Unknown
                }
            }
            Predicate::Zero | Predicate::Positive | Predicate::Negative => arena.ask(a, predicate),
            _ => Truth::Unknown,
        }
    }

    fn evalf(&self, args: &[Real]) -> Option<Result<Real, NumberError>> {
        let s = Integer::from(i64::from(args[0].signum()));
        Some(Ok(Real::from_integer(&s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqrt_of(arena: &mut ExprArena, n: i64) -> ExprHandle {
        let n = arena.integer(n);
        arena.sqrt(n).unwrap()
    }

    #[test]
    fn test_exp_values() {
        let mut arena = ExprArena::new();
        let zero = arena.zero();
        assert_eq!(arena.exp(zero).unwrap(), arena.one());
        let one = arena.one();
        assert_eq!(arena.exp(one).unwrap(), arena.e());
        let x = arena.symbol("x");
        let lx = arena.log(x).unwrap();
        assert_eq!(arena.exp(lx).unwrap(), x);
        let two = arena.integer(2);
        let two_lx = arena.mul(&[two, lx]);
        let s = arena.add(&[two_lx, x]);
        let x2 = arena.pow(x, two).unwrap();
        let ex = arena.exp(x).unwrap();
        assert_eq!(arena.exp(s).unwrap(), arena.mul(&[x2, ex]));
    }

    #[test]
    fn test_exp_of_i_pi() {
        let mut arena = ExprArena::new();
        let i = arena.imaginary_unit();
        let pi = arena.pi();
        let ipi = arena.mul(&[i, pi]);
        assert_eq!(arena.exp(ipi).unwrap(), arena.minus_one());
        let half = arena.half();
        let h = arena.mul(&[half, i, pi]);
        assert_eq!(arena.exp(h).unwrap(), i);
    }

    #[test]
    fn test_log_values() {
        let mut arena = ExprArena::new();
        let zero = arena.zero();
        let err = arena.log(zero).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Domain);
        let real_zero = arena.real(Real::zero());
        let err = arena.log(real_zero).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Domain);
        let one = arena.one();
        assert_eq!(arena.log(one).unwrap(), arena.zero());
        let e = arena.e();
        assert_eq!(arena.log(e).unwrap(), arena.one());
        let third = arena.rational(1, 3);
        let three = arena.integer(3);
        let l3 = arena.log(three).unwrap();
        assert_eq!(arena.log(third).unwrap(), arena.neg(l3));

        let p = arena.symbol_with("p", &[(Predicate::Positive, true)]).unwrap();
        let seven = arena.integer(7);
        let p7 = arena.pow(p, seven).unwrap();
        let lp = arena.log(p).unwrap();
        assert_eq!(arena.log(p7).unwrap(), arena.mul(&[seven, lp]));
        let r = arena.symbol_with("r", &[(Predicate::Real, true)]).unwrap();
        let er = arena.exp(r).unwrap();
        assert_eq!(arena.log(er).unwrap(), r);
    }

    #[test]
    fn test_trig_table() {
        let mut arena = ExprArena::new();
        let pi = arena.pi();
        assert_eq!(arena.sin(pi).unwrap(), arena.zero());
        assert_eq!(arena.cos(pi).unwrap(), arena.minus_one());
        let sixth = arena.rational(1, 6);
        let a = arena.mul(&[sixth, pi]);
        assert_eq!(arena.sin(a).unwrap(), arena.half());
        let s3 = sqrt_of(&mut arena, 3);
        let half = arena.half();
        let expected = arena.mul(&[half, s3]);
        assert_eq!(arena.cos(a).unwrap(), expected);
        let seven_sixths = arena.rational(7, 6);
        let b = arena.mul(&[seven_sixths, pi]);
        let mh = arena.rational(-1, 2);
        assert_eq!(arena.sin(b).unwrap(), mh);
        let quarter = arena.rational(1, 4);
        let c = arena.mul(&[quarter, pi]);
        assert_eq!(arena.tan(c).unwrap(), arena.one());
    }

    #[test]
    fn test_trig_symmetry() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let nx = arena.neg(x);
        let sx = arena.sin(x).unwrap();
        assert_eq!(arena.sin(nx).unwrap(), arena.neg(sx));
        let cx = arena.cos(x).unwrap();
        assert_eq!(arena.cos(nx).unwrap(), cx);
        let pi = arena.pi();
        let half = arena.half();
        let hp = arena.mul(&[half, pi]);
        let shifted = arena.add(&[x, hp]);
        assert_eq!(arena.sin(shifted).unwrap(), cx);
        let y = arena.symbol("y");
        let d = arena.sub(y, x);
        let e = arena.sub(x, y);
        let sd = arena.sin(d).unwrap();
        let se = arena.sin(e).unwrap();
        assert_eq!(sd, arena.neg(se));
    }

    #[test]
    fn test_tan_taylor_coefficients() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let t3 = Trig::Tan.taylor_term(&mut arena, 3, x).unwrap();
        let third = arena.rational(1, 3);
        let three = arena.integer(3);
        let x3 = arena.pow(x, three).unwrap();
        assert_eq!(t3, arena.mul(&[third, x3]));
        let t5 = Trig::Tan.taylor_term(&mut arena, 5, x).unwrap();
        let k = arena.rational(2, 15);
        let five = arena.integer(5);
        let x5 = arena.pow(x, five).unwrap();
        assert_eq!(t5, arena.mul(&[k, x5]));
        assert_eq!(bernoulli(4), Rational::from_i64(-1, 30));
    }

    #[test]
    fn test_abs_and_sign() {
        let mut arena = ExprArena::new();
        let m3 = arena.integer(-3);
        assert_eq!(arena.abs(m3).unwrap(), arena.integer(3));
        assert_eq!(arena.sign(m3).unwrap(), arena.minus_one());
        let p = arena.symbol_with("p", &[(Predicate::Positive, true)]).unwrap();
        assert_eq!(arena.abs(p).unwrap(), p);
        let x = arena.symbol("x");
        let m2 = arena.integer(-2);
        let t = arena.mul(&[m2, x]);
        let ax = arena.abs(x).unwrap();
        let two = arena.integer(2);
        assert_eq!(arena.abs(t).unwrap(), arena.mul(&[two, ax]));
        assert_eq!(arena.ask(ax, Predicate::Nonnegative), Truth::True);
        let r = arena.symbol_with("r", &[(Predicate::Real, true)]).unwrap();
        let ar = arena.abs(r).unwrap();
        let sq = arena.pow(ar, two).unwrap();
        assert_eq!(sq, arena.pow(r, two).unwrap());
    }

    #[test]
    fn test_exp_subs_by_ratio() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let three = arena.integer(3);
        let two = arena.integer(2);
        let x3 = arena.mul(&[three, x]);
        let x2 = arena.mul(&[two, x]);
        let e3 = arena.exp(x3).unwrap();
        let e2 = arena.exp(x2).unwrap();
        let r = arena.subs(e2, e3, y).unwrap();
        let k = arena.rational(2, 3);
        assert_eq!(r, arena.pow(y, k).unwrap());
    }

    #[test]
    fn test_numeric_evaluation() {
        let mut arena = ExprArena::new();
        let half = arena.real(Real::parse("0.5").unwrap());
        let s = arena.sin(half).unwrap();
        let v = arena.as_number(s).and_then(Number::to_real).unwrap();
        assert!((v.to_f64() - 0.5f64.sin()).abs() < 1e-12);
    }
}
