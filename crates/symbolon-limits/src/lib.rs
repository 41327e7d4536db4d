//! Symbolic limit computation for the Symbolon computer algebra system.
//!
//! This crate implements the Gruntz algorithm for computing limits of
//! expressions as a variable approaches infinity (or, by substitution,
//! a finite point from either side).
//!
//! # Algorithm Overview
//!
//! The Gruntz algorithm works by:
//! 1. Finding the Most Rapidly Varying (MRV) subexpressions
//! 2. Rewriting the expression in terms of a single dominant subexpression
//! 3. Computing the leading term of a series expansion
//! 4. Extracting the limit from the leading term
//!
//! # Example
//!
//! ```
//! use symbolon_core::ExprArena;
//! use symbolon_limits::{limit, Limit};
//!
//! let mut arena = ExprArena::new();
//! let x = arena.symbol("x");
//! let e = arena.parse("(x + 1)/x").unwrap();
//! let l = limit(&mut arena, e, x, Limit::PosInfinity).unwrap();
//! assert_eq!(l, arena.one());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod comparison;
pub mod gruntz;
pub mod mrv;

pub use comparison::ComparisonClass;
pub use gruntz::{limit, limit_with, Limit, LimitConfig, LimitError, LimitResult};
pub use mrv::{find_mrv, MrvSet};
