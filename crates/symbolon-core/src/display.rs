//! Plain-text rendering of expressions, for diagnostics and tests.

use std::fmt;

use symbolon_numbers::Number;

use crate::arena::ExprArena;
use crate::expr::ExprNode;
use crate::handle::ExprHandle;

const PREC_ADD: u8 = 10;
const PREC_MUL: u8 = 20;
const PREC_POW: u8 = 30;
const PREC_ATOM: u8 = 40;

/// An expression paired with its arena, implementing [`fmt::Display`].
pub struct ExprDisplay<'a> {
    arena: &'a ExprArena,
    handle: ExprHandle,
}

impl ExprArena {
    /// Renders `h` as text: `x^2 + 2*x + 1`, `sin(x)/y`, `O(x^3)`.
    #[must_use]
    pub fn display(&self, h: ExprHandle) -> ExprDisplay<'_> {
        ExprDisplay { arena: self, handle: h }
    }
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printer { arena: self.arena }.write(f, self.handle, 0)
    }
}

impl fmt::Debug for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

struct Printer<'a> {
    arena: &'a ExprArena,
}

impl Printer<'_> {
    fn precedence(&self, h: ExprHandle) -> u8 {
        match self.arena.get(h) {
            ExprNode::Add(_) => PREC_ADD,
            ExprNode::Mul(_) => PREC_MUL,
            ExprNode::Number(n) if n.is_negative() || matches!(n, Number::Rational(_)) => PREC_MUL,
            ExprNode::Pow { .. } => PREC_POW,
            _ => PREC_ATOM,
        }
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, h: ExprHandle, parent: u8) -> fmt::Result {
        let own = self.precedence(h);
        if own < parent {
            f.write_str("(")?;
            self.write_node(f, h)?;
            return f.write_str(")");
        }
        self.write_node(f, h)
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, h: ExprHandle) -> fmt::Result {
        let arena = self.arena;
        match arena.get(h) {
            ExprNode::Number(n) => write!(f, "{n}"),
            ExprNode::Symbol(_) => f.write_str(arena.symbol_name(h).unwrap_or("?")),
            ExprNode::Constant(c) => f.write_str(c.name()),
            ExprNode::Add(terms) => self.write_sum(f, terms),
            ExprNode::Mul(factors) => self.write_product(f, factors, false),
            ExprNode::Pow { base, exp } => self.write_power(f, *base, *exp),
            ExprNode::Apply { func, args } => {
                f.write_str(arena.function_name(*func))?;
                self.write_args(f, args)
            }
            ExprNode::Function(id) => f.write_str(arena.function_name(*id)),
            ExprNode::Lambda { vars, body } => {
                f.write_str("Lambda(")?;
                self.write_tuple(f, vars)?;
                f.write_str(", ")?;
                self.write(f, *body, 0)?;
                f.write_str(")")
            }
            ExprNode::FDerivative { func, indices } => {
                write!(f, "D[{}", arena.function_name(*func))?;
                for i in indices {
                    write!(f, ", {i}")?;
                }
                f.write_str("]")
            }
            ExprNode::Composition(fs) => {
                for (i, &g) in fs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" o ")?;
                    }
                    self.write(f, g, PREC_ATOM)?;
                }
                Ok(())
            }
            ExprNode::FApply { func, args } => {
                self.write(f, *func, PREC_ATOM)?;
                self.write_args(f, args)
            }
            ExprNode::Derivative { expr, vars } => {
                f.write_str("Derivative(")?;
                self.write(f, *expr, 0)?;
                for &v in vars {
                    f.write_str(", ")?;
                    self.write(f, v, 0)?;
                }
                f.write_str(")")
            }
            ExprNode::Order { expr, vars } => {
                f.write_str("O(")?;
                self.write(f, *expr, 0)?;
                if vars.len() > 1 {
                    for &v in vars {
                        f.write_str(", ")?;
                        self.write(f, v, 0)?;
                    }
                }
                f.write_str(")")
            }
        }
    }

    fn write_args(&self, f: &mut fmt::Formatter<'_>, args: &[ExprHandle]) -> fmt::Result {
        f.write_str("(")?;
        for (i, &a) in args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            self.write(f, a, 0)?;
        }
        f.write_str(")")
    }

    fn write_tuple(&self, f: &mut fmt::Formatter<'_>, items: &[ExprHandle]) -> fmt::Result {
        if let [only] = items {
            return self.write(f, *only, 0);
        }
        self.write_args(f, items)
    }

    // The constant goes last: `x + 1`.
    fn write_sum(&self, f: &mut fmt::Formatter<'_>, terms: &[ExprHandle]) -> fmt::Result {
        let mut ordered: Vec<ExprHandle> = terms.iter().copied().filter(|&t| !self.arena.is_number(t)).collect();
        ordered.extend(terms.iter().copied().filter(|&t| self.arena.is_number(t)));
        for (i, &t) in ordered.iter().enumerate() {
            let negative = self.is_negative_term(t);
            match (i, negative) {
                (0, true) => f.write_str("-")?,
                (0, false) => {}
                (_, true) => f.write_str(" - ")?,
                (_, false) => f.write_str(" + ")?,
            }
            if negative {
                self.write_negated(f, t)?;
            } else {
                self.write(f, t, PREC_ADD)?;
            }
        }
        Ok(())
    }

    fn is_negative_term(&self, t: ExprHandle) -> bool {
        match self.arena.get(t) {
            ExprNode::Number(n) => n.is_negative(),
            ExprNode::Mul(args) => self.arena.as_number(args[0]).is_some_and(Number::is_negative),
            _ => false,
        }
    }

    fn write_negated(&self, f: &mut fmt::Formatter<'_>, t: ExprHandle) -> fmt::Result {
        match self.arena.get(t) {
            ExprNode::Number(n) => write!(f, "{}", n.neg()),
            ExprNode::Mul(args) => self.write_product(f, args, true),
            _ => self.write(f, t, PREC_MUL),
        }
    }

    // `negate` flips the sign of a leading numeric coefficient.
    fn write_product(&self, f: &mut fmt::Formatter<'_>, factors: &[ExprHandle], negate: bool) -> fmt::Result {
        let arena = self.arena;
        let (coeff, rest) = match factors.split_first() {
            Some((&c, rest)) if arena.is_number(c) => (arena.as_number(c).cloned(), rest),
            _ => (None, factors),
        };
        let coeff = coeff.map(|c| if negate { c.neg() } else { c });

        let mut numer: Vec<ExprHandle> = Vec::new();
        let mut denom: Vec<(ExprHandle, Number)> = Vec::new();
        for &g in rest {
            match arena.get(g) {
                ExprNode::Pow { base, exp } => match arena.as_number(*exp) {
                    Some(n) if n.is_negative() => denom.push((*base, n.neg())),
                    _ => numer.push(g),
                },
                _ => numer.push(g),
            }
        }

        let mut wrote = false;
        match &coeff {
            Some(c) if c.is_minus_one() && !numer.is_empty() => f.write_str("-")?,
            Some(c) if !c.is_one() || numer.is_empty() => {
                if c.is_negative() || matches!(c, Number::Rational(_)) {
                    write!(f, "({c})")?;
                } else {
                    write!(f, "{c}")?;
                }
                wrote = true;
            }
            _ => {}
        }
        for &g in &numer {
            if wrote {
                f.write_str("*")?;
            }
            self.write(f, g, PREC_MUL + 1)?;
            wrote = true;
        }
        if !wrote {
            f.write_str("1")?;
        }
        if !denom.is_empty() {
            f.write_str("/")?;
            let grouped = denom.len() > 1;
            if grouped {
                f.write_str("(")?;
            }
            for (i, (base, e)) in denom.iter().enumerate() {
                if i > 0 {
                    f.write_str("*")?;
                }
                self.write(f, *base, PREC_POW + 1)?;
                if !e.is_one() {
                    write!(f, "^{e}")?;
                }
            }
            if grouped {
                f.write_str(")")?;
            }
        }
        Ok(())
    }

    fn write_power(&self, f: &mut fmt::Formatter<'_>, base: ExprHandle, exp: ExprHandle) -> fmt::Result {
        if let Some(n) = self.arena.as_number(exp) {
            if n.is_minus_one() {
                f.write_str("1/")?;
                return self.write(f, base, PREC_POW + 1);
            }
        }
        self.write(f, base, PREC_POW + 1)?;
        f.write_str("^")?;
        self.write(f, exp, PREC_POW + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(arena: &ExprArena, h: ExprHandle) -> String {
        arena.display(h).to_string()
    }

    #[test]
    fn test_polynomial() {
        let mut arena = ExprArena::new();
        let p = arena.parse("(x + 1)^2").unwrap();
        let e = arena.expand(p).unwrap();
        let text = render(&arena, e);
        assert!(text.contains("x^2"));
        assert!(text.contains("2*x"));
        assert!(text.ends_with(" + 1"));
        assert_eq!(render(&arena, p), "(x + 1)^2");
    }

    #[test]
    fn test_signs_and_fractions() {
        let mut arena = ExprArena::new();
        let d = arena.parse("x - y").unwrap();
        let text = render(&arena, d);
        assert!(text == "x - y" || text == "-y + x");
        let q = arena.parse("sin(x)/y").unwrap();
        assert_eq!(render(&arena, q), "sin(x)/y");
        let h = arena.half();
        assert_eq!(render(&arena, h), "1/2");
    }

    #[test]
    fn test_order() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let three = arena.integer(3);
        let x3 = arena.pow(x, three).unwrap();
        let o = arena.order(x3, &[x]).unwrap();
        assert_eq!(render(&arena, o), "O(x^3)");
    }
}
