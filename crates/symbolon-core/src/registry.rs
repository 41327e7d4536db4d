//! The class registry.
//!
//! Each arena owns one registry holding the total order on class names,
//! per-class default assumptions, the singleton factories and the
//! function table. It is populated when the arena is built and is
//! append-only afterwards.

use std::cell::RefCell;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::arena::ExprArena;
use crate::assumptions::AssumptionSet;
use crate::error::{CoreError, CoreResult};
use crate::expr::FunctionId;
use crate::function::{Arity, FunctionDef};
use crate::handle::ExprHandle;

/// Builds a singleton on demand.
pub type SingletonFactory = fn(&mut ExprArena) -> ExprHandle;

/// The built-in class order. Sorting `Add` and `Mul` children compares
/// these ranks first.
const CLASS_ORDER: &[&str] = &[
    "Integer",
    "Rational",
    "Real",
    "Interval",
    "Infinity",
    "NegativeInfinity",
    "NaN",
    "Exp1",
    "Pi",
    "EulerGamma",
    "ImaginaryUnit",
    "Symbol",
    "Dummy",
    "Wild",
    "abs",
    "sign",
    "Pow",
    "Mul",
    "Add",
    "Apply",
    "exp",
    "log",
    "sin",
    "cos",
    "tan",
    "Derivative",
    "FApply",
    "Function",
    "Lambda",
    "FDerivative",
    "Composition",
    "Order",
];

/// Where a newly registered function class goes when no position is
/// requested: after the built-in function classes.
const DEFAULT_INSERT_BEFORE: &str = "Derivative";

/// A function table entry.
#[derive(Clone, Debug)]
pub enum FunctionEntry {
    /// A function with evaluation hooks.
    Defined(Arc<dyn FunctionDef>),
    /// A named function with no body.
    Undefined {
        /// Name.
        name: String,
        /// Accepted argument counts.
        arity: Arity,
    },
}

impl FunctionEntry {
    /// The function's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Defined(def) => def.name(),
            Self::Undefined { name, .. } => name,
        }
    }

    /// Accepted argument counts.
    #[must_use]
    pub fn arity(&self) -> Arity {
        match self {
            Self::Defined(def) => def.arity(),
            Self::Undefined { arity, .. } => *arity,
        }
    }

    /// True for undefined functions.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined { .. })
    }
}

/// Class order, singletons and functions.
#[derive(Debug)]
pub struct Registry {
    class_order: Vec<String>,
    class_rank: FxHashMap<String, usize>,
    class_defaults: FxHashMap<String, AssumptionSet>,
    functions: Vec<FunctionEntry>,
    function_ids: FxHashMap<String, FunctionId>,
    singletons: FxHashMap<String, SingletonFactory>,
    warned: RefCell<FxHashSet<String>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry holding the built-in class order and nothing else.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            class_order: Vec::new(),
            class_rank: FxHashMap::default(),
            class_defaults: FxHashMap::default(),
            functions: Vec::new(),
            function_ids: FxHashMap::default(),
            singletons: FxHashMap::default(),
            warned: RefCell::new(FxHashSet::default()),
        };
        for name in CLASS_ORDER {
            registry.class_order.push((*name).to_string());
        }
        registry.reindex();
        registry
    }

    fn reindex(&mut self) {
        self.class_rank = self
            .class_order
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
    }

    /// The rank of a class in the total order, if the class is known.
    #[must_use]
    pub fn class_rank(&self, name: &str) -> Option<usize> {
        self.class_rank.get(name).copied()
    }

    /// Like [`class_rank`](Self::class_rank), logging the first miss for
    /// each class.
    pub(crate) fn class_rank_or_warn(&self, name: &str) -> Option<usize> {
        let rank = self.class_rank(name);
        if rank.is_none() && self.warned.borrow_mut().insert(name.to_string()) {
            tracing::warn!(class = name, "class missing from the ordering table, comparing by name");
        }
        rank
    }

    /// The class names in order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.class_order.iter().map(String::as_str)
    }

    /// Inserts `name` into the class order, before `before` when given and
    /// otherwise after the built-in functions. Re-registering is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a value-error if `before` is not a known class.
    pub fn register_class(&mut self, name: &str, before: Option<&str>) -> CoreResult<()> {
        if self.class_rank.contains_key(name) {
            return Ok(());
        }
        let anchor = before.unwrap_or(DEFAULT_INSERT_BEFORE);
        let pos = self
            .class_rank(anchor)
            .ok_or_else(|| CoreError::value("register_class", None, format!("unknown class `{anchor}`")))?;
        self.class_order.insert(pos, name.to_string());
        self.reindex();
        Ok(())
    }

    /// Sets the default assumptions of a class.
    pub fn set_class_defaults(&mut self, name: &str, defaults: AssumptionSet) {
        self.class_defaults.insert(name.to_string(), defaults);
    }

    /// Default assumptions of a class.
    #[must_use]
    pub fn class_defaults(&self, name: &str) -> Option<AssumptionSet> {
        self.class_defaults.get(name).copied()
    }

    pub(crate) fn add_function(&mut self, entry: FunctionEntry) -> CoreResult<FunctionId> {
        let name = entry.name().to_string();
        if let Some(&id) = self.function_ids.get(&name) {
            let existing = &self.functions[id as usize];
            return match (existing, &entry) {
                (FunctionEntry::Undefined { arity: a, .. }, FunctionEntry::Undefined { arity: b, .. }) if a == b => {
                    Ok(id)
                }
                (FunctionEntry::Undefined { arity: a, .. }, FunctionEntry::Undefined { arity: b, .. }) => {
                    Err(CoreError::type_error(
                        "function",
                        None,
                        format!("`{name}` was declared with {a} arguments, not {b}"),
                    ))
                }
                _ => Err(CoreError::value(
                    "register_function",
                    None,
                    format!("`{name}` is already registered"),
                )),
            };
        }
        let id = FunctionId::try_from(self.functions.len())
            .map_err(|_| CoreError::value("register_function", None, "function table is full"))?;
        if let FunctionEntry::Defined(def) = &entry {
            self.register_class(&name, None)?;
            let defaults = def.default_assumptions();
            if !defaults.is_empty() {
                self.set_class_defaults(&name, defaults);
            }
        }
        self.functions.push(entry);
        self.function_ids.insert(name, id);
        Ok(id)
    }

    /// The entry for `id`.
    #[must_use]
    pub fn function(&self, id: FunctionId) -> Option<&FunctionEntry> {
        self.functions.get(id as usize)
    }

    /// Looks a function up by name.
    #[must_use]
    pub fn function_id(&self, name: &str) -> Option<FunctionId> {
        self.function_ids.get(name).copied()
    }

    /// Registers a singleton factory under `name`, replacing any previous
    /// one.
    pub fn register_singleton(&mut self, name: &str, factory: SingletonFactory) {
        self.singletons.insert(name.to_string(), factory);
    }

    /// The factory registered under `name`.
    #[must_use]
    pub fn singleton(&self, name: &str) -> Option<SingletonFactory> {
        self.singletons.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let r = Registry::new();
        assert!(r.class_rank("Integer") < r.class_rank("Symbol"));
        assert!(r.class_rank("Pow") < r.class_rank("Mul"));
        assert!(r.class_rank("Mul") < r.class_rank("Add"));
        assert_eq!(r.class_rank("Gamma"), None);
    }

    #[test]
    fn test_register_class() {
        let mut r = Registry::new();
        r.register_class("gamma", None).unwrap();
        assert!(r.class_rank("tan") < r.class_rank("gamma"));
        assert!(r.class_rank("gamma") < r.class_rank("Derivative"));
        r.register_class("MatrixSymbol", Some("Pow")).unwrap();
        assert!(r.class_rank("MatrixSymbol") < r.class_rank("Pow"));
        assert!(r.register_class("Other", Some("NoSuchClass")).is_err());
    }

    #[test]
    fn test_undefined_function_redeclaration() {
        let mut r = Registry::new();
        let f = r
            .add_function(FunctionEntry::Undefined { name: "f".into(), arity: Arity::Exact(1) })
            .unwrap();
        let again = r
            .add_function(FunctionEntry::Undefined { name: "f".into(), arity: Arity::Exact(1) })
            .unwrap();
        assert_eq!(f, again);
        let clash = r.add_function(FunctionEntry::Undefined { name: "f".into(), arity: Arity::Exact(2) });
        assert!(clash.is_err());
    }
}
