//! Interning tables.
//!
//! The arena interns its nodes directly; this generic table backs the
//! symbol table, where a symbol's identity is its name, kind and
//! assumptions.

use hashbrown::HashMap;
use std::hash::Hash;

/// Maps values to dense `u32` ids, storing each distinct value once.
#[derive(Debug, Clone)]
pub struct InternTable<T> {
    ids: HashMap<T, u32>,
    values: Vec<T>,
}

impl<T: Clone + Eq + Hash> Default for InternTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> InternTable<T> {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            values: Vec::new(),
        }
    }

    /// The id of `value`, assigning the next free id on first sight.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` values are interned.
    pub fn intern(&mut self, value: T) -> u32 {
        if let Some(&id) = self.ids.get(&value) {
            return id;
        }
        assert!(self.values.len() < u32::MAX as usize, "intern table exceeded u32 ids");
        #[allow(clippy::cast_possible_truncation)]
        let id = self.values.len() as u32;
        self.ids.insert(value.clone(), id);
        self.values.push(value);
        id
    }

    /// The value stored under `id`.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&T> {
        self.values.get(id as usize)
    }

    /// The id of an already interned value.
    #[must_use]
    pub fn get_id(&self, value: &T) -> Option<u32> {
        self.ids.get(value).copied()
    }

    /// Number of distinct values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_idempotent() {
        let mut table = InternTable::new();
        let x = table.intern(("x", 0u8));
        let y = table.intern(("y", 0u8));
        let x_positive = table.intern(("x", 1u8));
        assert_eq!(table.intern(("x", 0u8)), x);
        assert_ne!(x, y);
        assert_ne!(x, x_positive);
        assert_eq!(table.get(y), Some(&("y", 0u8)));
        assert_eq!(table.get_id(&("x", 1u8)), Some(x_positive));
        assert_eq!(table.len(), 3);
    }
}
