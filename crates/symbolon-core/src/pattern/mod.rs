//! Pattern matching and substitution.
//!
//! Patterns are ordinary expressions containing wildcards (see
//! [`ExprArena::wild`](crate::ExprArena::wild)); matching produces
//! [`Bindings`] that [`ExprArena::subs_dict`](crate::ExprArena::subs_dict)
//! substitutes back.

mod matcher;
mod subs;

pub use matcher::Bindings;
