//! The expression arena.
//!
//! Every node lives in one `Vec`, and a hash-consing map guarantees that
//! each structurally distinct node is stored once. The arena also owns
//! the symbol table, the class registry and the memo caches, so one
//! `ExprArena` is one self-contained kernel.

use std::sync::Arc;

use hashbrown::HashMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use symbolon_numbers::{Integer, Number, Rational, Real};

use crate::assumptions::{AssumptionSet, Predicate};
use crate::error::{CoreError, CoreResult};
use crate::expr::{Args, Constant, ExprNode, FunctionId};
use crate::function::{elementary, Arity, FunctionDef};
use crate::handle::ExprHandle;
use crate::intern::InternTable;
use crate::memo::MemoTable;
use crate::registry::{FunctionEntry, Registry, SingletonFactory};
use crate::series::SeriesConfig;
use crate::symbol::{SymbolData, SymbolKind};

/// Storage, registry and caches of one kernel instance.
#[derive(Debug)]
pub struct ExprArena {
    nodes: Vec<ExprNode>,
    intern_map: HashMap<ExprNode, ExprHandle>,
    symbols: InternTable<SymbolData>,
    next_tag: u32,
    registry: Registry,
    pub(crate) memo: MemoTable,
    pub(crate) free_symbol_cache: FxHashMap<ExprHandle, Arc<[ExprHandle]>>,
    pub(crate) atom_cache: FxHashMap<ExprHandle, Arc<[ExprHandle]>>,
    pub(crate) predicate_cache: FxHashMap<ExprHandle, AssumptionSet>,
    series_config: SeriesConfig,
}

impl Default for ExprArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ExprArena {
    /// An arena with the elementary functions registered.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SeriesConfig::default())
    }

    /// An arena with the given series limits.
    #[must_use]
    pub fn with_config(series_config: SeriesConfig) -> Self {
        let mut arena = Self {
            nodes: Vec::new(),
            intern_map: HashMap::new(),
            symbols: InternTable::new(),
            next_tag: 1,
            registry: Registry::new(),
            memo: MemoTable::default(),
            free_symbol_cache: FxHashMap::default(),
            atom_cache: FxHashMap::default(),
            predicate_cache: FxHashMap::default(),
            series_config,
        };
        elementary::register_builtins(&mut arena.registry);
        arena.register_default_singletons();
        arena
    }

    fn register_default_singletons(&mut self) {
        let singletons: [(&str, SingletonFactory); 9] = [
            ("pi", Self::pi),
            ("E", Self::e),
            ("I", Self::imaginary_unit),
            ("EulerGamma", Self::euler_gamma),
            ("oo", Self::infinity),
            ("-oo", Self::neg_infinity),
            ("nan", Self::nan),
            ("zero", Self::zero),
            ("one", Self::one),
        ];
        for (name, factory) in singletons {
            self.registry.register_singleton(name, factory);
        }
    }

    /// Interns a node exactly as given. Callers are responsible for the
    /// node already being canonical.
    ///
    /// # Panics
    ///
    /// Panics if the arena holds `u32::MAX` nodes.
    pub(crate) fn intern(&mut self, node: ExprNode) -> ExprHandle {
        if let Some(&handle) = self.intern_map.get(&node) {
            return handle;
        }
        let index = self.nodes.len();
        assert!(index < u32::MAX as usize, "arena capacity exceeded");
        #[allow(clippy::cast_possible_truncation)]
        let handle = ExprHandle::new(index as u32);
        self.nodes.push(node.clone());
        self.intern_map.insert(node, handle);
        handle
    }

    /// The node behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle was not issued by this arena.
    #[must_use]
    pub fn get(&self, handle: ExprHandle) -> &ExprNode {
        &self.nodes[handle.slot()]
    }

    /// The ordered child tuple of a node.
    #[must_use]
    pub fn args(&self, handle: ExprHandle) -> Args {
        self.get(handle).children()
    }

    /// Number of distinct nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True before the first node is interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The class registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Series truncation and refinement limits.
    #[must_use]
    pub fn series_config(&self) -> &SeriesConfig {
        &self.series_config
    }

    /// Replaces the series limits.
    pub fn set_series_config(&mut self, config: SeriesConfig) {
        self.series_config = config;
    }

    /// Drops every memoised result. Canonical nodes are kept.
    pub fn clear_caches(&mut self) {
        self.memo.clear();
        self.free_symbol_cache.clear();
        self.atom_cache.clear();
        self.predicate_cache.clear();
    }

    /// Number of memoised `subs`, `expand` and `diff` results.
    #[must_use]
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    // Numbers and constants.

    /// A numeric leaf.
    pub fn number(&mut self, n: Number) -> ExprHandle {
        self.intern(ExprNode::Number(n))
    }

    /// An integer leaf.
    pub fn integer(&mut self, value: i64) -> ExprHandle {
        self.number(Number::integer(value))
    }

    /// A big integer leaf.
    pub fn big_integer(&mut self, value: Integer) -> ExprHandle {
        self.number(Number::Integer(value))
    }

    /// `p/q`, reduced; a zero denominator gives a signed infinity or NaN.
    pub fn rational(&mut self, p: i64, q: i64) -> ExprHandle {
        self.number(Number::fraction(p, q))
    }

    /// An exact rational leaf, demoted to an integer when integral.
    pub fn rational_value(&mut self, r: Rational) -> ExprHandle {
        self.number(Number::from_rational(r))
    }

    /// A real leaf.
    pub fn real(&mut self, value: Real) -> ExprHandle {
        self.number(Number::Real(value))
    }

    /// `0`.
    pub fn zero(&mut self) -> ExprHandle {
        self.number(Number::zero())
    }

    /// `1`.
    pub fn one(&mut self) -> ExprHandle {
        self.number(Number::one())
    }

    /// `-1`.
    pub fn minus_one(&mut self) -> ExprHandle {
        self.number(Number::minus_one())
    }

    /// `1/2`.
    pub fn half(&mut self) -> ExprHandle {
        self.rational(1, 2)
    }

    /// `oo`.
    pub fn infinity(&mut self) -> ExprHandle {
        self.number(Number::Infinity)
    }

    /// `-oo`.
    pub fn neg_infinity(&mut self) -> ExprHandle {
        self.number(Number::NegativeInfinity)
    }

    /// NaN.
    pub fn nan(&mut self) -> ExprHandle {
        self.number(Number::NaN)
    }

    /// A named constant.
    pub fn constant(&mut self, c: Constant) -> ExprHandle {
        self.intern(ExprNode::Constant(c))
    }

    /// `pi`.
    pub fn pi(&mut self) -> ExprHandle {
        self.constant(Constant::Pi)
    }

    /// Euler's number.
    pub fn e(&mut self) -> ExprHandle {
        self.constant(Constant::E)
    }

    /// The imaginary unit.
    pub fn imaginary_unit(&mut self) -> ExprHandle {
        self.constant(Constant::ImaginaryUnit)
    }

    /// The Euler-Mascheroni constant.
    pub fn euler_gamma(&mut self) -> ExprHandle {
        self.constant(Constant::EulerGamma)
    }

    /// The number behind a numeric leaf.
    #[must_use]
    pub fn as_number(&self, h: ExprHandle) -> Option<&Number> {
        self.get(h).as_number()
    }

    /// True for numeric leaves.
    #[must_use]
    pub fn is_number(&self, h: ExprHandle) -> bool {
        self.get(h).is_number()
    }

    /// True for the exact or inexact zero.
    #[must_use]
    pub fn is_zero(&self, h: ExprHandle) -> bool {
        self.as_number(h).is_some_and(Number::is_zero)
    }

    /// True for the integer one.
    #[must_use]
    pub fn is_one(&self, h: ExprHandle) -> bool {
        self.as_number(h).is_some_and(Number::is_one)
    }

    /// True for the exact rationals, integers included.
    #[must_use]
    pub fn is_rational_number(&self, h: ExprHandle) -> bool {
        self.as_number(h).is_some_and(Number::is_exact)
    }

    /// The small integer value of a numeric leaf.
    #[must_use]
    pub fn as_i64(&self, h: ExprHandle) -> Option<i64> {
        self.as_number(h).and_then(Number::to_i64)
    }

    // Symbols.

    fn intern_symbol(&mut self, data: SymbolData) -> ExprHandle {
        let id = self.symbols.intern(data);
        self.intern(ExprNode::Symbol(id))
    }

    fn fresh_tag(&mut self) -> u32 {
        let tag = self.next_tag;
        self.next_tag += 1;
        tag
    }

    fn closed_assumptions(op: &'static str, facts: &[(Predicate, bool)]) -> CoreResult<AssumptionSet> {
        let mut all: SmallVec<[(Predicate, bool); 4]> = facts.iter().copied().collect();
        if !facts.iter().any(|(p, _)| *p == Predicate::Commutative) {
            all.push((Predicate::Commutative, true));
        }
        AssumptionSet::from_facts(&all).map_err(|conflict| CoreError::type_error(op, None, conflict.to_string()))
    }

    /// A commutative symbol with no other assumptions.
    pub fn symbol(&mut self, name: &str) -> ExprHandle {
        let assumptions = AssumptionSet::new()
            .with(Predicate::Commutative, true)
            .unwrap_or_default();
        self.intern_symbol(SymbolData {
            name: name.to_string(),
            kind: SymbolKind::Named,
            assumptions,
        })
    }

    /// A symbol with assumptions; `commutative` defaults to true.
    ///
    /// # Errors
    ///
    /// Returns a type-error if the facts contradict each other.
    pub fn symbol_with(&mut self, name: &str, facts: &[(Predicate, bool)]) -> CoreResult<ExprHandle> {
        let assumptions = Self::closed_assumptions("symbol", facts)?;
        Ok(self.intern_symbol(SymbolData {
            name: name.to_string(),
            kind: SymbolKind::Named,
            assumptions,
        }))
    }

    /// A non-commutative symbol.
    pub fn noncommutative_symbol(&mut self, name: &str) -> ExprHandle {
        let assumptions = AssumptionSet::new()
            .with(Predicate::Commutative, false)
            .unwrap_or_default();
        self.intern_symbol(SymbolData {
            name: name.to_string(),
            kind: SymbolKind::Named,
            assumptions,
        })
    }

    /// A fresh dummy, distinct from every other symbol.
    pub fn dummy(&mut self, name: &str) -> ExprHandle {
        let assumptions = AssumptionSet::new()
            .with(Predicate::Commutative, true)
            .unwrap_or_default();
        let tag = self.fresh_tag();
        self.intern_symbol(SymbolData {
            name: name.to_string(),
            kind: SymbolKind::Dummy(tag),
            assumptions,
        })
    }

    /// A fresh dummy with assumptions.
    ///
    /// # Errors
    ///
    /// Returns a type-error if the facts contradict each other.
    pub fn dummy_with(&mut self, name: &str, facts: &[(Predicate, bool)]) -> CoreResult<ExprHandle> {
        let assumptions = Self::closed_assumptions("dummy", facts)?;
        let tag = self.fresh_tag();
        Ok(self.intern_symbol(SymbolData {
            name: name.to_string(),
            kind: SymbolKind::Dummy(tag),
            assumptions,
        }))
    }

    /// A fresh wildcard matching anything.
    pub fn wild(&mut self, name: &str) -> ExprHandle {
        self.wild_excluding(name, &[])
    }

    /// A fresh wildcard refusing bindings that contain any of `exclude`.
    pub fn wild_excluding(&mut self, name: &str, exclude: &[ExprHandle]) -> ExprHandle {
        let assumptions = AssumptionSet::new()
            .with(Predicate::Commutative, true)
            .unwrap_or_default();
        let tag = self.fresh_tag();
        self.intern_symbol(SymbolData {
            name: name.to_string(),
            kind: SymbolKind::Wild {
                tag,
                exclude: exclude.iter().copied().collect(),
            },
            assumptions,
        })
    }

    /// The symbol table entry of a symbol node.
    #[must_use]
    pub fn symbol_data(&self, h: ExprHandle) -> Option<&SymbolData> {
        match self.get(h) {
            ExprNode::Symbol(id) => self.symbols.get(*id),
            _ => None,
        }
    }

    /// The name of a symbol node.
    #[must_use]
    pub fn symbol_name(&self, h: ExprHandle) -> Option<&str> {
        self.symbol_data(h).map(|d| d.name.as_str())
    }

    /// True for symbols, dummies and wildcards.
    #[must_use]
    pub fn is_symbol(&self, h: ExprHandle) -> bool {
        matches!(self.get(h), ExprNode::Symbol(_))
    }

    /// True for wildcards.
    #[must_use]
    pub fn is_wild(&self, h: ExprHandle) -> bool {
        self.symbol_data(h).is_some_and(SymbolData::is_wild)
    }

    // Functions and singletons.

    /// Registers a defined function.
    ///
    /// # Errors
    ///
    /// Returns a value-error if a function of that name exists.
    pub fn register_function(&mut self, def: Arc<dyn FunctionDef>) -> CoreResult<FunctionId> {
        let name = def.name().to_string();
        let id = self.registry.add_function(FunctionEntry::Defined(def))?;
        tracing::debug!(function = %name, id, "registered function");
        Ok(id)
    }

    /// Declares an undefined function; redeclaring with the same arity
    /// returns the same id.
    ///
    /// # Errors
    ///
    /// Returns a type-error if the name was declared with another arity,
    /// and a value-error if it names a defined function.
    pub fn function(&mut self, name: &str, arity: Arity) -> CoreResult<FunctionId> {
        self.registry.add_function(FunctionEntry::Undefined {
            name: name.to_string(),
            arity,
        })
    }

    /// Looks a function up by name.
    #[must_use]
    pub fn function_id(&self, name: &str) -> Option<FunctionId> {
        self.registry.function_id(name)
    }

    /// The name of a function.
    #[must_use]
    pub fn function_name(&self, id: FunctionId) -> &str {
        self.registry.function(id).map_or("?", FunctionEntry::name)
    }

    /// The hooks of a defined function.
    #[must_use]
    pub fn function_def(&self, id: FunctionId) -> Option<Arc<dyn FunctionDef>> {
        match self.registry.function(id) {
            Some(FunctionEntry::Defined(def)) => Some(Arc::clone(def)),
            _ => None,
        }
    }

    /// True for undefined functions.
    #[must_use]
    pub fn is_undefined_function(&self, id: FunctionId) -> bool {
        self.registry.function(id).is_some_and(FunctionEntry::is_undefined)
    }

    /// A function as a value.
    pub fn function_value(&mut self, id: FunctionId) -> ExprHandle {
        self.intern(ExprNode::Function(id))
    }

    /// Registers a singleton factory.
    pub fn register_singleton(&mut self, name: &str, factory: SingletonFactory) {
        self.registry.register_singleton(name, factory);
    }

    /// Inserts a class into the ordering table; see
    /// [`Registry::register_class`].
    ///
    /// # Errors
    ///
    /// Returns a value-error if `before` is unknown.
    pub fn register_class(&mut self, name: &str, before: Option<&str>) -> CoreResult<()> {
        self.registry.register_class(name, before)
    }

    /// Resolves a singleton by name.
    ///
    /// # Errors
    ///
    /// Returns a value-error for unknown names.
    pub fn singleton(&mut self, name: &str) -> CoreResult<ExprHandle> {
        let factory = self
            .registry
            .singleton(name)
            .ok_or_else(|| CoreError::value("singleton", None, format!("no singleton named `{name}`")))?;
        Ok(factory(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_consing() {
        let mut arena = ExprArena::new();
        let x1 = arena.symbol("x");
        let x2 = arena.symbol("x");
        let y = arena.symbol("y");
        assert_eq!(x1, x2);
        assert_ne!(x1, y);
        assert_eq!(arena.integer(3), arena.number(Number::integer(3)));
        assert_eq!(arena.rational(4, 2), arena.integer(2));
    }

    #[test]
    fn test_assumptions_distinguish_symbols() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let xp = arena.symbol_with("x", &[(Predicate::Positive, true)]).unwrap();
        assert_ne!(x, xp);
        assert_eq!(arena.symbol_name(xp), Some("x"));
        let again = arena.symbol_with("x", &[(Predicate::Positive, true)]).unwrap();
        assert_eq!(xp, again);
    }

    #[test]
    fn test_assumption_conflict_is_type_error() {
        let mut arena = ExprArena::new();
        let err = arena
            .symbol_with("x", &[(Predicate::Positive, true), (Predicate::Negative, true)])
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Type);
    }

    #[test]
    fn test_dummies_are_distinct() {
        let mut arena = ExprArena::new();
        let d1 = arena.dummy("t");
        let d2 = arena.dummy("t");
        assert_ne!(d1, d2);
        assert!(arena.symbol_data(d1).unwrap().is_dummy());
        let w = arena.wild("w");
        assert!(arena.is_wild(w));
    }

    #[test]
    fn test_rational_zero_denominator() {
        let mut arena = ExprArena::new();
        let inf = arena.infinity();
        assert_eq!(arena.rational(5, 0), inf);
        let nan = arena.nan();
        assert_eq!(arena.rational(0, 0), nan);
    }

    #[test]
    fn test_singletons() {
        let mut arena = ExprArena::new();
        let pi = arena.pi();
        assert_eq!(arena.singleton("pi").unwrap(), pi);
        let oo = arena.infinity();
        assert_eq!(arena.singleton("oo").unwrap(), oo);
        assert!(arena.singleton("nope").is_err());
    }

    #[test]
    fn test_builtin_function_ids() {
        let arena = ExprArena::new();
        assert_eq!(arena.function_id("exp"), Some(crate::functions::EXP));
        assert_eq!(arena.function_id("sign"), Some(crate::functions::SIGN));
        assert_eq!(arena.function_name(crate::functions::LOG), "log");
    }

    #[test]
    fn test_undefined_function() {
        let mut arena = ExprArena::new();
        let f = arena.function("f", Arity::Exact(1)).unwrap();
        assert!(arena.is_undefined_function(f));
        assert_eq!(arena.function("f", Arity::Exact(1)).unwrap(), f);
        assert!(arena.function("f", Arity::Exact(2)).is_err());
        assert!(arena.function("exp", Arity::Exact(1)).is_err());
    }
}
