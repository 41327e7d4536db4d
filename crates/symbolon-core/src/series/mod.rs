//! Asymptotic machinery around zero.
//!
//! - `Order` terms: construction, containment, domination
//! - `oseries`/`series`: truncated power series modulo an order term, with
//!   a Taylor driver for functions whose argument tends to zero
//! - Leading terms: `as_leading_term` and `leadterm`
//!
//! Every routine expands around `x -> 0`; limits at infinity substitute
//! first.

mod leading;
mod order;
mod oseries;

/// Bounds on the iterative parts of the series code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeriesConfig {
    /// How many times a leading-term computation may raise the series
    /// order looking for a term that does not cancel.
    pub max_leading_rounds: u32,
    /// The most terms the Taylor driver and the binomial expansion
    /// produce for one call.
    pub max_taylor_terms: u32,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            max_leading_rounds: 10,
            max_taylor_terms: 100,
        }
    }
}
