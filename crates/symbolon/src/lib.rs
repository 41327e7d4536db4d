//! # Symbolon
//!
//! A symbolic algebra kernel written in Rust.
//!
//! Symbolon provides the core of a computer algebra system: canonical
//! expressions over an exact and arbitrary-precision number tower,
//! substitution and pattern matching, truncated series, and limits by the
//! Gruntz algorithm.
//!
//! ## Features
//!
//! - **Hash-Consed Core**: every expression is stored once in an arena and
//!   compared by handle
//! - **Number Tower**: big integers, rationals, binary floats with a
//!   precision context, and intervals with directed rounding
//! - **Canonical Arithmetic**: flattened, sorted sums and products with
//!   collected coefficients and exponents
//! - **Series & Limits**: order terms, Taylor expansion and MRV-based
//!   limits at infinity
//!
//! ## Quick Start
//!
//! ```
//! use symbolon::prelude::*;
//!
//! let mut arena = ExprArena::new();
//! let e = arena.parse("(x + 1)^2").unwrap();
//! let expanded = arena.expand(e).unwrap();
//! assert_eq!(expanded, arena.parse("x^2 + 2*x + 1").unwrap());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub use symbolon_core as core;
pub use symbolon_limits as limits;
pub use symbolon_numbers as numbers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use symbolon_core::{
        Bindings, CoreError, CoreResult, ErrorKind, ExprArena, ExprHandle, ExprNode, Predicate, SeriesConfig,
        Sympify, Truth,
    };
    pub use symbolon_limits::{limit, Limit, LimitConfig, LimitError};
    pub use symbolon_numbers::{Integer, Number, Rational, Real};
}
