//! # symbolon-core
//!
//! Core expression engine for the Symbolon computer algebra system.
//!
//! This crate provides:
//! - Arena-allocated, hash-consed expression storage behind 32-bit handles
//! - Canonical sums, products and powers with an explicit total order
//! - Symbols with assumptions, and a three-valued predicate query
//! - The function layer: elementary functions, lambdas, composition and
//!   derivatives of function objects
//! - Substitution, pattern matching with wildcards, and structural queries
//! - Order terms, truncated series and leading terms
//! - Parsing of strings and host values into expressions
//!
//! ## Design Principles
//!
//! - **Hash-Consing**: every structurally unique expression is stored once,
//!   so equality is a handle comparison
//! - **Single Owner**: all expressions, caches and registries live in one
//!   [`ExprArena`]; operations take `&mut ExprArena` and return handles
//! - **Typed Failures**: fallible operations return [`CoreResult`] with an
//!   [`ErrorKind`] the caller can branch on

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
mod arith;
pub mod assumptions;
pub mod display;
pub mod error;
mod evalf;
pub mod expr;
pub mod function;
pub mod handle;
pub mod intern;
mod memo;
mod ordering;
pub mod pattern;
mod predicates;
mod query;
pub mod registry;
pub mod series;
pub mod symbol;
pub mod sympify;

#[cfg(test)]
mod proptests;

pub use arena::ExprArena;
pub use arith::{ProductBuilder, SumBuilder};
pub use assumptions::{AssumptionSet, Predicate, Truth};
pub use display::ExprDisplay;
pub use error::{CoreError, CoreResult, ErrorKind};
pub use expr::{functions, Constant, ExprNode, FunctionId, SymbolId};
pub use function::{Arity, FunctionDef};
pub use handle::ExprHandle;
pub use pattern::Bindings;
pub use query::AtomKind;
pub use series::SeriesConfig;
pub use sympify::Sympify;
