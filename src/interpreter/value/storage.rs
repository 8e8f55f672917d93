use std::rc::Rc;

use crate::interpreter::{types::core::RuntimeType, value::core::Value};

/// The payload of a tuple value: its elements and their tuple type.
#[derive(Debug, Clone)]
pub struct Storage {
    elements: Rc<[Value]>,
    ty:       RuntimeType,
}

impl Storage {
    /// Wraps `elements`, recording their types as a tuple type.
    #[must_use]
    pub fn new(elements: Vec<Value>) -> Self {
        let ty = RuntimeType::tuple(elements.iter().map(Value::runtime_type).collect());
        Self { elements: elements.into(),
               ty }
    }

    /// The elements in order.
    #[must_use]
    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    /// The element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.elements.get(index)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` for the empty tuple.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The tuple type of the elements.
    #[must_use]
    pub const fn runtime_type(&self) -> &RuntimeType {
        &self.ty
    }
}

impl PartialEq for Storage {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}
