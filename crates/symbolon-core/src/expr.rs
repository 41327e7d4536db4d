//! Expression node types.

use smallvec::SmallVec;
use symbolon_numbers::Number;

use crate::handle::ExprHandle;

/// Index into the arena's symbol table.
pub type SymbolId = u32;

/// Index into the registry's function table.
pub type FunctionId = u32;

/// Children of `Add` and `Mul`.
pub type Args = SmallVec<[ExprHandle; 4]>;

/// Arguments of applied functions, lambda parameters, derivative
/// variables and order symbols.
pub type FnArgs = SmallVec<[ExprHandle; 2]>;

/// Named irrational constants and the imaginary unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constant {
    /// Euler's number `e`.
    E,
    /// `pi`.
    Pi,
    /// The Euler-Mascheroni constant.
    EulerGamma,
    /// `i`, the principal square root of `-1`.
    ImaginaryUnit,
}

impl Constant {
    /// Printed name, also the singleton name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::E => "E",
            Self::Pi => "pi",
            Self::EulerGamma => "EulerGamma",
            Self::ImaginaryUnit => "I",
        }
    }

    /// Class name used by the ordering table.
    #[must_use]
    pub fn class_name(self) -> &'static str {
        match self {
            Self::E => "Exp1",
            Self::Pi => "Pi",
            Self::EulerGamma => "EulerGamma",
            Self::ImaginaryUnit => "ImaginaryUnit",
        }
    }
}

/// One canonical node. Nodes are created only through the arena, which
/// guarantees the invariants documented on each variant.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExprNode {
    /// A number, including the infinities and NaN.
    Number(Number),
    /// A named symbol, dummy or wildcard.
    Symbol(SymbolId),
    /// `e`, `pi`, `EulerGamma` or `i`.
    Constant(Constant),
    /// A flattened sum: at most one numeric term, first, the remaining
    /// terms sorted, then `Order` terms.
    Add(Args),
    /// A flattened product: at most one numeric factor, first, then sorted
    /// commutative factors, then non-commutative factors in input order.
    Mul(Args),
    /// `base^exp`, never with a zero or unit exponent.
    Pow {
        /// Base.
        base: ExprHandle,
        /// Exponent.
        exp: ExprHandle,
    },
    /// A registered or undefined function applied to arguments.
    Apply {
        /// Function.
        func: FunctionId,
        /// Arguments.
        args: FnArgs,
    },
    /// A function as a value, e.g. the `f` in `f∘g`.
    Function(FunctionId),
    /// `Lambda((vars), body)`.
    Lambda {
        /// Bound symbols.
        vars: FnArgs,
        /// Body.
        body: ExprHandle,
    },
    /// The partial derivative of a function object with respect to the
    /// listed argument positions (sorted, repeats allowed).
    FDerivative {
        /// Function.
        func: FunctionId,
        /// Zero-based argument positions.
        indices: SmallVec<[u32; 2]>,
    },
    /// `f∘g∘...`, outermost first.
    Composition(FnArgs),
    /// A function-valued expression applied to arguments, kept when it
    /// cannot be reduced (e.g. `f'(2*x)`).
    FApply {
        /// Function-valued expression.
        func: ExprHandle,
        /// Arguments.
        args: FnArgs,
    },
    /// Unevaluated derivative; `vars` is sorted.
    Derivative {
        /// Differentiated expression.
        expr: ExprHandle,
        /// Differentiation symbols.
        vars: FnArgs,
    },
    /// `O(expr)` as `vars` tend to zero.
    Order {
        /// Bounding expression.
        expr: ExprHandle,
        /// Order symbols, sorted.
        vars: FnArgs,
    },
}

impl ExprNode {
    /// True for leaves.
    #[must_use]
    pub fn is_atom(&self) -> bool {
        matches!(
            self,
            Self::Number(_) | Self::Symbol(_) | Self::Constant(_) | Self::Function(_) | Self::FDerivative { .. }
        )
    }

    /// True for numeric leaves.
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// The number, for numeric leaves.
    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    /// The ordered child tuple.
    #[must_use]
    pub fn children(&self) -> Args {
        match self {
            Self::Number(_) | Self::Symbol(_) | Self::Constant(_) | Self::Function(_) | Self::FDerivative { .. } => {
                SmallVec::new()
            }
            Self::Add(args) | Self::Mul(args) => args.clone(),
            Self::Pow { base, exp } => smallvec::smallvec![*base, *exp],
            Self::Apply { args, .. } | Self::Composition(args) => args.iter().copied().collect(),
            Self::Lambda { vars, body } => vars.iter().copied().chain(std::iter::once(*body)).collect(),
            Self::FApply { func, args } => std::iter::once(*func).chain(args.iter().copied()).collect(),
            Self::Derivative { expr, vars } | Self::Order { expr, vars } => {
                std::iter::once(*expr).chain(vars.iter().copied()).collect()
            }
        }
    }
}

/// Ids of the functions every arena registers first, in this order.
pub mod functions {
    use super::FunctionId;

    /// `exp`.
    pub const EXP: FunctionId = 0;
    /// Natural logarithm.
    pub const LOG: FunctionId = 1;
    /// Sine.
    pub const SIN: FunctionId = 2;
    /// Cosine.
    pub const COS: FunctionId = 3;
    /// Tangent.
    pub const TAN: FunctionId = 4;
    /// Absolute value.
    pub const ABS: FunctionId = 5;
    /// Sign.
    pub const SIGN: FunctionId = 6;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_order() {
        let a = ExprHandle::new(1);
        let b = ExprHandle::new(2);
        let pow = ExprNode::Pow { base: a, exp: b };
        assert_eq!(pow.children().as_slice(), &[a, b]);
        let d = ExprNode::Derivative {
            expr: a,
            vars: smallvec::smallvec![b, b],
        };
        assert_eq!(d.children().as_slice(), &[a, b, b]);
        assert!(ExprNode::Number(Number::integer(3)).is_atom());
        assert!(!pow.is_atom());
    }
}
