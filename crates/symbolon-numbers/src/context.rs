//! The ambient working precision.
//!
//! Every `Real` operation rounds its result once, to the precision and with
//! the rounding mode found on top of a per-thread context stack. `store`
//! pushes a copy of the current context, `revert` pops it again, so inner
//! computations can raise precision without leaking the change.

use std::cell::RefCell;

/// Default working precision in bits (IEEE double).
pub const DEFAULT_PREC: usize = 53;

/// log2(10)
const LOG2_10: f64 = std::f64::consts::LOG2_10;

/// How a result that is not exactly representable is rounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RoundingMode {
    /// Truncate toward zero.
    TowardZero,
    /// Round away from zero.
    AwayFromZero,
    /// Round toward negative infinity.
    Floor,
    /// Round toward positive infinity.
    Ceiling,
    /// Nearest, ties away from zero.
    HalfUp,
    /// Nearest, ties toward zero.
    HalfDown,
    /// Nearest, ties to the even neighbour.
    #[default]
    HalfEven,
}

/// One entry of the context stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrecisionContext {
    /// Working precision in bits.
    pub prec: usize,
    /// Rounding mode.
    pub mode: RoundingMode,
}

impl Default for PrecisionContext {
    fn default() -> Self {
        Self {
            prec: DEFAULT_PREC,
            mode: RoundingMode::HalfEven,
        }
    }
}

thread_local! {
    static STACK: RefCell<Vec<PrecisionContext>> = RefCell::new(vec![PrecisionContext::default()]);
}

fn with_top<R>(f: impl FnOnce(&mut PrecisionContext) -> R) -> R {
    STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        if stack.is_empty() {
            stack.push(PrecisionContext::default());
        }
        let last = stack.len() - 1;
        f(&mut stack[last])
    })
}

/// Returns the current context.
#[must_use]
pub fn current() -> PrecisionContext {
    with_top(|ctx| *ctx)
}

/// Sets the working precision in bits (at least 2).
pub fn setprec(bits: usize) {
    with_top(|ctx| ctx.prec = bits.max(2));
}

/// Sets the working precision in decimal digits.
pub fn setdps(digits: usize) {
    setprec(dps_to_prec(digits));
}

/// Current working precision in bits.
#[must_use]
pub fn getprec() -> usize {
    current().prec
}

/// Current working precision in decimal digits.
#[must_use]
pub fn getdps() -> usize {
    prec_to_dps(getprec())
}

/// Sets the rounding mode.
pub fn setmode(mode: RoundingMode) {
    with_top(|ctx| ctx.mode = mode);
}

/// Current rounding mode.
#[must_use]
pub fn getmode() -> RoundingMode {
    current().mode
}

/// Pushes a copy of the current context.
pub fn store() {
    let top = current();
    STACK.with(|stack| stack.borrow_mut().push(top));
}

/// Pops the context pushed by the matching [`store`]. The bottom entry is
/// never removed.
pub fn revert() {
    STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        if stack.len() > 1 {
            stack.pop();
        } else {
            tracing::warn!("revert() without matching store()");
        }
    });
}

struct Restore;

impl Drop for Restore {
    fn drop(&mut self) {
        revert();
    }
}

/// Runs `f` with the given context pushed, restoring the previous context
/// afterwards even if `f` unwinds.
pub fn with_context<R>(ctx: PrecisionContext, f: impl FnOnce() -> R) -> R {
    store();
    let _guard = Restore;
    with_top(|top| *top = ctx);
    f()
}

/// Runs `f` at `bits` of precision, keeping the current rounding mode.
pub fn with_prec<R>(bits: usize, f: impl FnOnce() -> R) -> R {
    with_context(
        PrecisionContext {
            prec: bits.max(2),
            mode: getmode(),
        },
        f,
    )
}

/// Runs `f` with an extra `bits` of guard precision.
pub fn with_extra_prec<R>(bits: usize, f: impl FnOnce() -> R) -> R {
    with_prec(getprec() + bits, f)
}

/// Converts decimal digits to bits: `round((dps + 1) * log2(10))`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn dps_to_prec(dps: usize) -> usize {
    (((dps + 1) as f64) * LOG2_10).round().max(2.0) as usize
}

/// Converts bits to decimal digits: `round(prec / log2(10)) - 1`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn prec_to_dps(prec: usize) -> usize {
    ((prec as f64) / LOG2_10).round().max(1.0) as usize - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(getprec(), 53);
        assert_eq!(getdps(), 15);
        assert_eq!(getmode(), RoundingMode::HalfEven);
    }

    #[test]
    fn test_dps_conversion() {
        assert_eq!(dps_to_prec(15), 53);
        assert_eq!(dps_to_prec(30), 103);
        assert_eq!(prec_to_dps(103), 30);
    }

    #[test]
    fn test_store_revert() {
        store();
        setdps(50);
        setmode(RoundingMode::Floor);
        assert_eq!(getdps(), 50);
        revert();
        assert_eq!(getprec(), 53);
        assert_eq!(getmode(), RoundingMode::HalfEven);
    }

    #[test]
    fn test_with_context_restores() {
        let inner = with_prec(200, || {
            with_extra_prec(10, getprec)
        });
        assert_eq!(inner, 210);
        assert_eq!(getprec(), 53);
    }

    #[test]
    fn test_revert_keeps_bottom() {
        revert();
        assert_eq!(current(), PrecisionContext::default());
    }
}
