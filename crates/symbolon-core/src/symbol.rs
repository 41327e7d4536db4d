//! Symbol table entries.

use smallvec::SmallVec;

use crate::assumptions::AssumptionSet;
use crate::handle::ExprHandle;

/// What kind of symbol an entry is.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// An ordinary symbol, identified by name and assumptions.
    Named,
    /// A bound variable; the tag makes every dummy distinct.
    Dummy(u32),
    /// A pattern variable.
    Wild {
        /// Distinguishes wildcards with equal names.
        tag: u32,
        /// Expressions a binding must not contain.
        exclude: SmallVec<[ExprHandle; 2]>,
    },
}

/// One symbol.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymbolData {
    /// Printed name.
    pub name: String,
    /// Named, dummy or wild.
    pub kind: SymbolKind,
    /// Closed assumptions, always including `commutative`.
    pub assumptions: AssumptionSet,
}

impl SymbolData {
    /// True for dummies.
    #[must_use]
    pub fn is_dummy(&self) -> bool {
        matches!(self.kind, SymbolKind::Dummy(_))
    }

    /// True for wildcards.
    #[must_use]
    pub fn is_wild(&self) -> bool {
        matches!(self.kind, SymbolKind::Wild { .. })
    }

    /// The identity tag: zero for named symbols.
    #[must_use]
    pub fn tag(&self) -> u32 {
        match &self.kind {
            SymbolKind::Named => 0,
            SymbolKind::Dummy(tag) | SymbolKind::Wild { tag, .. } => *tag,
        }
    }

    /// Class name used by the ordering table.
    #[must_use]
    pub fn class_name(&self) -> &'static str {
        match self.kind {
            SymbolKind::Named => "Symbol",
            SymbolKind::Dummy(_) => "Dummy",
            SymbolKind::Wild { .. } => "Wild",
        }
    }
}
