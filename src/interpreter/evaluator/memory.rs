use std::collections::HashMap;

use crate::interpreter::value::core::Value;

/// Addressable memory cells.
///
/// Cells are keyed by integer address. Reading a cell that was never written
/// yields `0`.
///
/// # Example
/// ```
/// use calctree::interpreter::{evaluator::memory::MemoryCells, value::core::Value};
///
/// let mut memory = MemoryCells::new();
/// memory.write(3, Value::from(42.0));
///
/// assert_eq!(memory.read(3), Value::from(42.0));
/// assert_eq!(memory.read(4), Value::from(0.0));
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryCells {
    cells: HashMap<i64, Value>,
}

impl MemoryCells {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` at `address`, returning the previous content.
    pub fn write(&mut self, address: i64, value: Value) -> Option<Value> {
        tracing::trace!(address, %value, "memory write");
        self.cells.insert(address, value)
    }

    /// The value at `address`, or `0` if the cell was never written.
    #[must_use]
    pub fn read(&self, address: i64) -> Value {
        self.cells
            .get(&address)
            .cloned()
            .unwrap_or_else(|| Value::number(0.0))
    }

    /// Empties the cell at `address`, returning its content.
    pub fn forget(&mut self, address: i64) -> Option<Value> {
        self.cells.remove(&address)
    }

    /// Empties every cell.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Number of written cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if no cell has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
