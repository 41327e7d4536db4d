//! # symbolon-numbers
//!
//! The number tower underneath the symbolon kernel.
//!
//! - Arbitrary precision integers (`Integer`) and rationals (`Rational`),
//!   wrapping `dashu`
//! - Binary floats (`Real`) rounded once per operation to the ambient
//!   precision, with the seven standard rounding modes
//! - Outward-rounded intervals (`Interval`)
//! - `Number`, the tagged union the expression kernel stores
//!
//! The ambient precision lives on a per-thread stack, see [`context`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod context;
mod elementary;
pub mod error;
pub mod integer;
pub mod interval;
pub mod number;
pub mod rational;
pub mod real;

#[cfg(test)]
mod proptests;

pub use context::{
    getdps, getmode, getprec, revert, setdps, setmode, setprec, store, with_context, PrecisionContext,
    RoundingMode,
};
pub use error::NumberError;
pub use integer::Integer;
pub use interval::Interval;
pub use number::Number;
pub use rational::Rational;
pub use real::Real;
