//! Memoisation keyed by canonical handles.
//!
//! Handles are hash-consed, so a handle tuple identifies its inputs
//! exactly and results never go stale. Operations that read the precision
//! context are not memoised.

use rustc_hash::FxHashMap;

use crate::handle::ExprHandle;

/// Memoised operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum MemoOp {
    Subs,
    Expand,
    Diff,
}

#[derive(Debug, Default)]
pub(crate) struct MemoTable {
    entries: FxHashMap<(MemoOp, [ExprHandle; 3]), ExprHandle>,
}

impl MemoTable {
    pub(crate) fn get(&self, op: MemoOp, key: [ExprHandle; 3]) -> Option<ExprHandle> {
        self.entries.get(&(op, key)).copied()
    }

    pub(crate) fn insert(&mut self, op: MemoOp, key: [ExprHandle; 3], value: ExprHandle) {
        self.entries.insert((op, key), value);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_per_operation() {
        let mut memo = MemoTable::default();
        let h = ExprHandle::new;
        memo.insert(MemoOp::Expand, [h(1), h(1), h(1)], h(2));
        assert_eq!(memo.get(MemoOp::Expand, [h(1), h(1), h(1)]), Some(h(2)));
        assert_eq!(memo.get(MemoOp::Diff, [h(1), h(1), h(1)]), None);
        assert_eq!(memo.len(), 1);
        memo.clear();
        assert_eq!(memo.len(), 0);
    }
}
