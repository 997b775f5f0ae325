//! Operation interning for program construction.

use std::collections::HashMap;
use std::sync::Arc;

use crate::operation::{OpRef, Operation};

/// Pool that hands out one shared allocation per distinct operation.
///
/// Programs built through the same pool share every structurally equal
/// operation, so a table with many `scan a` rows holds a single `scan a`.
#[derive(Debug, Clone, Default)]
pub struct OperationPool {
    index: HashMap<Operation, OpRef>,
}

impl OperationPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern an operation and return its shared handle.
    pub fn intern(&mut self, operation: Operation) -> OpRef {
        if let Some(shared) = self.index.get(&operation) {
            return Arc::clone(shared);
        }
        let shared = Arc::new(operation.clone());
        self.index.insert(operation, Arc::clone(&shared));
        shared
    }

    /// Number of distinct operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{InputOp, Transition};

    #[test]
    fn test_equal_operations_share_storage() {
        let mut pool = OperationPool::new();
        let a = pool.intern(Operation::Input(InputOp::Scan(0)));
        let b = pool.intern(Operation::Input(InputOp::Scan(0)));
        let c = pool.intern(Operation::Control(Transition::new(0, 1)));
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(pool.len(), 2);
    }
}
