//! Structural queries over expression trees.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::arena::ExprArena;
use crate::expr::ExprNode;
use crate::handle::ExprHandle;

/// The leaf classes [`ExprArena::atoms`] can filter on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AtomKind {
    /// Numbers, including the infinities and NaN.
    Number,
    /// Named symbols and dummies.
    Symbol,
    /// Wildcards.
    Wild,
    /// `e`, `pi`, `EulerGamma` and `i`.
    Constant,
    /// Function objects and their derivatives used as values.
    Function,
}

impl ExprArena {
    /// Checks if `target` occurs anywhere in `h`.
    ///
    /// A `target` containing wildcards is a pattern: the result is true if
    /// it matches some subtree of `h`.
    pub fn has(&mut self, h: ExprHandle, target: ExprHandle) -> bool {
        if !self.has_wild(target) {
            return self.has_subtree(h, target);
        }
        let mut stack = vec![h];
        let mut subtrees = Vec::new();
        while let Some(e) = stack.pop() {
            subtrees.push(e);
            stack.extend(self.get(e).children());
        }
        subtrees
            .into_iter()
            .any(|e| self.matches(target, e, None, false).is_some())
    }

    /// Checks if `target` is structurally one of the subtrees of `h`.
    #[must_use]
    pub fn has_subtree(&self, h: ExprHandle, target: ExprHandle) -> bool {
        if h == target {
            return true;
        }
        let node = self.get(h);
        if node.is_atom() {
            return false;
        }
        node.children().iter().any(|&c| self.has_subtree(c, target))
    }

    /// Checks if any of `targets` occurs in `h`.
    #[must_use]
    pub fn has_any(&self, h: ExprHandle, targets: &[ExprHandle]) -> bool {
        targets.iter().any(|&t| self.has_subtree(h, t))
    }

    /// The symbols of `h` not bound by a `Lambda`, in canonical order.
    pub fn free_symbols(&mut self, h: ExprHandle) -> Arc<[ExprHandle]> {
        if let Some(cached) = self.free_symbol_cache.get(&h) {
            return Arc::clone(cached);
        }
        let mut found = FxHashSet::default();
        self.collect_free(h, &mut found);
        let mut symbols: Vec<ExprHandle> = found.into_iter().collect();
        self.sort_canonical(&mut symbols);
        let symbols: Arc<[ExprHandle]> = symbols.into();
        self.free_symbol_cache.insert(h, Arc::clone(&symbols));
        symbols
    }

    fn collect_free(&self, h: ExprHandle, found: &mut FxHashSet<ExprHandle>) {
        match self.get(h) {
            ExprNode::Symbol(_) => {
                found.insert(h);
            }
            ExprNode::Lambda { vars, body } => {
                let mut inner = FxHashSet::default();
                self.collect_free(*body, &mut inner);
                found.extend(inner.into_iter().filter(|s| !vars.contains(s)));
            }
            node if node.is_atom() => {}
            node => {
                for c in node.children() {
                    self.collect_free(c, found);
                }
            }
        }
    }

    /// The distinct atoms of `h` of the given kind (all of them for
    /// `None`), in canonical order.
    pub fn atoms(&mut self, h: ExprHandle, kind: Option<AtomKind>) -> Vec<ExprHandle> {
        let cached = self.atom_cache.get(&h).cloned();
        let all = match cached {
            Some(cached) => cached,
            None => {
                let mut atoms: Vec<ExprHandle> = self.collect_atoms(h).into_iter().collect();
                self.sort_canonical(&mut atoms);
                let atoms: Arc<[ExprHandle]> = atoms.into();
                self.atom_cache.insert(h, Arc::clone(&atoms));
                atoms
            }
        };
        match kind {
            None => all.to_vec(),
            Some(kind) => all.iter().copied().filter(|&a| self.atom_kind(a) == Some(kind)).collect(),
        }
    }

    /// The kind of a leaf, `None` for composite nodes.
    #[must_use]
    pub fn atom_kind(&self, h: ExprHandle) -> Option<AtomKind> {
        match self.get(h) {
            ExprNode::Number(_) => Some(AtomKind::Number),
            ExprNode::Symbol(_) if self.is_wild(h) => Some(AtomKind::Wild),
            ExprNode::Symbol(_) => Some(AtomKind::Symbol),
            ExprNode::Constant(_) => Some(AtomKind::Constant),
            ExprNode::Function(_) | ExprNode::FDerivative { .. } => Some(AtomKind::Function),
            _ => None,
        }
    }

    pub(crate) fn collect_atoms(&self, h: ExprHandle) -> FxHashSet<ExprHandle> {
        let mut seen = FxHashSet::default();
        let mut stack = vec![h];
        while let Some(e) = stack.pop() {
            let node = self.get(e);
            if node.is_atom() {
                seen.insert(e);
            } else {
                stack.extend(node.children());
            }
        }
        seen
    }

    /// The number of operations in `h`: `k - 1` for a sum or product of
    /// `k` terms, one for each power, application and derivative.
    #[must_use]
    pub fn count_ops(&self, h: ExprHandle) -> usize {
        let node = self.get(h);
        let own = match node {
            ExprNode::Add(args) | ExprNode::Mul(args) => args.len().saturating_sub(1),
            ExprNode::Pow { .. }
            | ExprNode::Apply { .. }
            | ExprNode::FApply { .. }
            | ExprNode::Derivative { .. }
            | ExprNode::Order { .. }
            | ExprNode::Lambda { .. } => 1,
            ExprNode::Composition(fs) => fs.len().saturating_sub(1),
            _ => 0,
        };
        own + node.children().iter().map(|&c| self.count_ops(c)).sum::<usize>()
    }
}
