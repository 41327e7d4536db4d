//! The canonical total order on expressions.
//!
//! Classes are ranked by the registry's ordering table; within a class,
//! atoms compare by value or name and composites by arity, then
//! lexicographically on children. Two distinct handles never compare
//! equal.

use std::cmp::Ordering;

use symbolon_numbers::Number;

use crate::arena::ExprArena;
use crate::expr::ExprNode;
use crate::handle::ExprHandle;

fn number_class(n: &Number) -> &'static str {
    match n {
        Number::Integer(_) => "Integer",
        Number::Rational(_) => "Rational",
        Number::Real(_) => "Real",
        Number::Interval(_) => "Interval",
        Number::Infinity => "Infinity",
        Number::NegativeInfinity => "NegativeInfinity",
        Number::NaN => "NaN",
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    match a.compare_value(b) {
        Some(Ordering::Equal) | None => a.to_string().cmp(&b.to_string()),
        Some(ord) => ord,
    }
}

impl ExprArena {
    /// The class name of a node: `"Integer"`, `"Symbol"`, `"Add"`, the
    /// function name for applications of defined functions, `"Apply"` for
    /// undefined ones.
    #[must_use]
    pub fn class_name(&self, h: ExprHandle) -> &str {
        match self.get(h) {
            ExprNode::Number(n) => number_class(n),
            ExprNode::Symbol(_) => self.symbol_data(h).map_or("Symbol", |d| d.class_name()),
            ExprNode::Constant(c) => c.class_name(),
            ExprNode::Add(_) => "Add",
            ExprNode::Mul(_) => "Mul",
            ExprNode::Pow { .. } => "Pow",
            ExprNode::Apply { func, .. } => {
                if self.is_undefined_function(*func) {
                    "Apply"
                } else {
                    self.function_name(*func)
                }
            }
            ExprNode::Function(_) => "Function",
            ExprNode::Lambda { .. } => "Lambda",
            ExprNode::FDerivative { .. } => "FDerivative",
            ExprNode::Composition(_) => "Composition",
            ExprNode::FApply { .. } => "FApply",
            ExprNode::Derivative { .. } => "Derivative",
            ExprNode::Order { .. } => "Order",
        }
    }

    /// Total order used to sort the children of `Add` and `Mul`.
    #[must_use]
    pub fn compare(&self, a: ExprHandle, b: ExprHandle) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let (ca, cb) = (self.class_name(a), self.class_name(b));
        if ca != cb {
            let registry = self.registry();
            return match (registry.class_rank_or_warn(ca), registry.class_rank_or_warn(cb)) {
                (Some(x), Some(y)) => x.cmp(&y).then_with(|| ca.cmp(cb)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => ca.cmp(cb),
            };
        }
        self.compare_same_class(a, b).then_with(|| a.cmp(&b))
    }

    fn compare_same_class(&self, a: ExprHandle, b: ExprHandle) -> Ordering {
        match (self.get(a), self.get(b)) {
            (ExprNode::Number(x), ExprNode::Number(y)) => compare_numbers(x, y),
            (ExprNode::Symbol(i), ExprNode::Symbol(j)) => match (self.symbol_data(a), self.symbol_data(b)) {
                (Some(x), Some(y)) => x.name.cmp(&y.name).then(x.tag().cmp(&y.tag())).then(i.cmp(j)),
                _ => i.cmp(j),
            },
            (ExprNode::Constant(x), ExprNode::Constant(y)) => x.cmp(y),
            (ExprNode::Function(f), ExprNode::Function(g)) => self.function_name(*f).cmp(self.function_name(*g)),
            (
                ExprNode::FDerivative { func: f, indices: fi },
                ExprNode::FDerivative { func: g, indices: gi },
            ) => self
                .function_name(*f)
                .cmp(self.function_name(*g))
                .then_with(|| fi.len().cmp(&gi.len()))
                .then_with(|| fi.cmp(gi)),
            (ExprNode::Apply { func: f, args: fa }, ExprNode::Apply { func: g, args: ga }) => self
                .function_name(*f)
                .cmp(self.function_name(*g))
                .then_with(|| self.compare_children(fa, ga)),
            (x, y) => self.compare_children(&x.children(), &y.children()),
        }
    }

    fn compare_children(&self, xs: &[ExprHandle], ys: &[ExprHandle]) -> Ordering {
        xs.len().cmp(&ys.len()).then_with(|| {
            xs.iter()
                .zip(ys)
                .map(|(x, y)| self.compare(*x, *y))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    }

    /// Sorts handles in canonical order.
    pub fn sort_canonical(&self, items: &mut [ExprHandle]) {
        items.sort_by(|a, b| self.compare(*a, *b));
    }
}
