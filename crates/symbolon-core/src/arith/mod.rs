//! The associative-commutative engine: canonical `Add`, `Mul` and `Pow`,
//! their builders, structural accessors and expansion.

mod accessors;
mod add;
mod expand;
mod mul;
mod pow;

pub use add::SumBuilder;
pub use mul::ProductBuilder;
