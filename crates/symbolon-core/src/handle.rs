//! Handles into the expression arena.

use std::fmt;

/// A 32-bit index naming one canonical node of an [`ExprArena`].
///
/// Nodes are hash-consed, so comparing handles is structural equality and
/// hashing a handle stands in for hashing the whole tree.
///
/// [`ExprArena`]: crate::ExprArena
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprHandle(u32);

impl ExprHandle {
    /// Wraps a raw arena index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The raw arena index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ExprHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({})", self.0)
    }
}

impl fmt::Display for ExprHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_identity() {
        assert_eq!(ExprHandle::new(7), ExprHandle::new(7));
        assert_ne!(ExprHandle::new(7), ExprHandle::new(8));
        assert_eq!(ExprHandle::new(7).slot(), 7);
        assert_eq!(format!("{:?} {}", ExprHandle::new(2), ExprHandle::new(2)), "Expr(2) #2");
    }

    #[test]
    fn test_handle_size() {
        assert_eq!(std::mem::size_of::<ExprHandle>(), 4);
    }
}
