//! Conversion of host values and strings into expressions.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use symbolon_numbers::{Integer, Rational, Real};

use crate::arena::ExprArena;
use crate::error::{CoreError, CoreResult};
use crate::handle::ExprHandle;

#[derive(Parser)]
#[grammar = "sympify.pest"]
struct ExprParser;

/// Values that can become expressions.
pub trait Sympify {
    /// Converts `self` into an expression of `arena`.
    ///
    /// # Errors
    ///
    /// Returns a value-error for unparsable strings and non-finite floats.
    fn sympify(self, arena: &mut ExprArena) -> CoreResult<ExprHandle>;
}

impl Sympify for ExprHandle {
    fn sympify(self, _arena: &mut ExprArena) -> CoreResult<ExprHandle> {
        Ok(self)
    }
}

impl Sympify for i64 {
    fn sympify(self, arena: &mut ExprArena) -> CoreResult<ExprHandle> {
        Ok(arena.integer(self))
    }
}

impl Sympify for i32 {
    fn sympify(self, arena: &mut ExprArena) -> CoreResult<ExprHandle> {
        Ok(arena.integer(i64::from(self)))
    }
}

impl Sympify for u32 {
    fn sympify(self, arena: &mut ExprArena) -> CoreResult<ExprHandle> {
        Ok(arena.integer(i64::from(self)))
    }
}

impl Sympify for f64 {
    fn sympify(self, arena: &mut ExprArena) -> CoreResult<ExprHandle> {
        let r = Real::from_f64(self).map_err(|err| CoreError::value("sympify", None, err.to_string()))?;
        Ok(arena.real(r))
    }
}

impl Sympify for Integer {
    fn sympify(self, arena: &mut ExprArena) -> CoreResult<ExprHandle> {
        Ok(arena.big_integer(self))
    }
}

impl Sympify for Rational {
    fn sympify(self, arena: &mut ExprArena) -> CoreResult<ExprHandle> {
        Ok(arena.rational_value(self))
    }
}

impl Sympify for Real {
    fn sympify(self, arena: &mut ExprArena) -> CoreResult<ExprHandle> {
        Ok(arena.real(self))
    }
}

impl Sympify for &str {
    fn sympify(self, arena: &mut ExprArena) -> CoreResult<ExprHandle> {
        arena.parse(self)
    }
}

impl Sympify for String {
    fn sympify(self, arena: &mut ExprArena) -> CoreResult<ExprHandle> {
        arena.parse(&self)
    }
}

impl ExprArena {
    /// Converts any [`Sympify`] value.
    ///
    /// # Errors
    ///
    /// See [`Sympify::sympify`].
    pub fn sympify<T: Sympify>(&mut self, value: T) -> CoreResult<ExprHandle> {
        value.sympify(self)
    }

    /// Parses an expression such as `"2*x**2 - sin(y)/3"`.
    ///
    /// Integer literals are exact and decimal literals become `Real`s.
    /// Names resolve to singletons (`pi`, `E`, `I`, `oo`, ...) before
    /// symbols; calls must name a registered function.
    ///
    /// # Errors
    ///
    /// Returns a value-error for syntax errors and unknown functions, and
    /// whatever the constructors return (e.g. a domain-error for `log(0)`).
    pub fn parse(&mut self, input: &str) -> CoreResult<ExprHandle> {
        let mut pairs = ExprParser::parse(Rule::expression, input)
            .map_err(|err| CoreError::value("sympify", None, err.to_string()))?;
        let sum = pairs
            .next()
            .and_then(|expression| expression.into_inner().next())
            .ok_or_else(|| CoreError::value("sympify", None, "empty expression"))?;
        self.build(sum)
    }

    fn build(&mut self, pair: Pair<'_, Rule>) -> CoreResult<ExprHandle> {
        match pair.as_rule() {
            Rule::sum => {
                let mut inner = pair.into_inner();
                let mut terms = Vec::new();
                if let Some(first) = inner.next() {
                    terms.push(self.build(first)?);
                }
                while let (Some(op), Some(operand)) = (inner.next(), inner.next()) {
                    let t = self.build(operand)?;
                    terms.push(if op.as_str() == "-" { self.neg(t) } else { t });
                }
                Ok(self.add(&terms))
            }
            Rule::term => {
                let mut inner = pair.into_inner();
                let mut acc = match inner.next() {
                    Some(first) => self.build(first)?,
                    None => self.one(),
                };
                while let (Some(op), Some(operand)) = (inner.next(), inner.next()) {
                    let f = self.build(operand)?;
                    acc = if op.as_str() == "/" { self.div(acc, f)? } else { self.mul(&[acc, f]) };
                }
                Ok(acc)
            }
            Rule::factor => {
                let mut negate = false;
                let mut value = None;
                for p in pair.into_inner() {
                    match p.as_rule() {
                        Rule::neg => negate = !negate,
                        _ => value = Some(self.build(p)?),
                    }
                }
                let value = value.ok_or_else(|| CoreError::value("sympify", None, "missing operand"))?;
                Ok(if negate { self.neg(value) } else { value })
            }
            Rule::power => {
                let mut inner = pair.into_inner();
                let base = match inner.next() {
                    Some(b) => self.build(b)?,
                    None => return Err(CoreError::value("sympify", None, "missing base")),
                };
                match inner.next() {
                    Some(exp) => {
                        let e = self.build(exp)?;
                        self.pow(base, e)
                    }
                    None => Ok(base),
                }
            }
            Rule::integer => {
                let n = Integer::from_str_radix(pair.as_str(), 10)
                    .map_err(|err| CoreError::from_number("sympify", None, err))?;
                Ok(self.big_integer(n))
            }
            Rule::real => {
                let r = Real::parse(pair.as_str()).map_err(|err| CoreError::from_number("sympify", None, err))?;
                Ok(self.real(r))
            }
            Rule::name => {
                let name = pair.as_str();
                if self.registry().singleton(name).is_some() {
                    self.singleton(name)
                } else {
                    Ok(self.symbol(name))
                }
            }
            Rule::call => {
                let mut inner = pair.into_inner();
                let name = inner
                    .next()
                    .map(|n| n.as_str().to_string())
                    .ok_or_else(|| CoreError::value("sympify", None, "missing function name"))?;
                let func = self
                    .function_id(&name)
                    .ok_or_else(|| CoreError::value("sympify", None, format!("unknown function `{name}`")))?;
                let mut args = Vec::new();
                for a in inner {
                    args.push(self.build(a)?);
                }
                self.apply(func, &args)
            }
            rule => Err(CoreError::value("sympify", None, format!("unexpected {rule:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_values() {
        let mut arena = ExprArena::new();
        let three = arena.integer(3);
        assert_eq!(arena.sympify(3i64).unwrap(), three);
        assert_eq!(arena.sympify(3i32).unwrap(), three);
        assert_eq!(arena.sympify(3u32).unwrap(), three);
        assert_eq!(arena.sympify(three).unwrap(), three);
        let half = arena.half();
        assert_eq!(arena.sympify(Rational::from_i64(1, 2)).unwrap(), half);
        assert!(arena.sympify(f64::NAN).is_err());
    }

    #[test]
    fn test_parse_polynomial() {
        let mut arena = ExprArena::new();
        let parsed = arena.sympify("x**2 + 2*x + 1").unwrap();
        let x = arena.symbol("x");
        let two = arena.integer(2);
        let one = arena.one();
        let x2 = arena.pow(x, two).unwrap();
        let tx = arena.mul(&[two, x]);
        assert_eq!(parsed, arena.add(&[x2, tx, one]));
        assert_eq!(arena.parse("x^2 + 2*x + 1").unwrap(), parsed);
    }

    #[test]
    fn test_precedence() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let two = arena.integer(2);
        let x2 = arena.pow(x, two).unwrap();
        assert_eq!(arena.parse("-x^2").unwrap(), arena.neg(x2));
        let m1 = arena.minus_one();
        assert_eq!(arena.parse("x^-1").unwrap(), arena.pow(x, m1).unwrap());
        assert_eq!(arena.parse("2^3^2").unwrap(), arena.integer(512));
        assert_eq!(arena.parse("(1 - 3) / 4").unwrap(), arena.rational(-1, 2));
    }

    #[test]
    fn test_names_and_calls() {
        let mut arena = ExprArena::new();
        let pi = arena.pi();
        assert_eq!(arena.parse("pi").unwrap(), pi);
        assert_eq!(arena.parse("sin(pi)").unwrap(), arena.zero());
        let x = arena.symbol("x");
        let e = arena.exp(x).unwrap();
        assert_eq!(arena.parse("exp(x)").unwrap(), e);
        assert!(arena.parse("frobnicate(x)").is_err());
        assert!(arena.parse("x +").is_err());
    }

    #[test]
    fn test_decimals() {
        let mut arena = ExprArena::new();
        let r = arena.parse("0.25").unwrap();
        assert_eq!(arena.as_number(r).and_then(|n| n.to_real()).map(|v| v.to_f64()), Some(0.25));
        assert!(arena.parse("1e3").is_ok());
    }
}
