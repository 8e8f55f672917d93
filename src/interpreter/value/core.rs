use std::{cell::Cell, rc::Rc};

use ordered_float::OrderedFloat;

use crate::{
    ast::{Arena, NodePos, POINTER_PREFIX},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalContext, EvalResult},
        types::core::RuntimeType,
        value::{function::Function, materialize::materialize, storage::Storage},
    },
    util::num::format_number,
};

/// The four kinds of runtime values.
#[derive(Debug, Clone)]
pub enum ValueKind {
    /// A double precision floating-point number.
    Number(f64),
    /// An ordered, heterogeneous tuple of values.
    Tuple(Storage),
    /// A native closure or a lambda.
    Function(Rc<Function>),
    /// An alias to a node of the arena. Dereferencing evaluates the pointee;
    /// repointing changes the alias and never copies the pointee.
    NodePointer(NodePos),
}

/// A runtime value.
///
/// Values and trees convert both ways: evaluating a tree yields a value, and
/// [`Value::tree`] yields a tree that evaluates back to an equal value. That
/// tree is built on first request and memoized on the value for as long as
/// the arena is not wiped.
///
/// # Example
/// ```
/// use calctree::{
///     ast::{Arena, tree_to_string},
///     interpreter::value::core::Value,
/// };
///
/// let mut arena = Arena::new();
/// let value = Value::from(vec![Value::from(1.5), Value::from(2.0)]);
///
/// let tree = value.tree(&mut arena);
/// assert_eq!(tree_to_string(&arena, tree), "[1.5, 2]");
///
/// let allocated = arena.len();
/// assert_eq!(value.tree(&mut arena), tree);
/// assert_eq!(arena.len(), allocated);
/// ```
#[derive(Clone)]
pub struct Value {
    kind: ValueKind,
    tree: Cell<Option<(u32, NodePos)>>,
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::number(v)
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::tuple(v)
    }
}

impl From<Function> for Value {
    fn from(v: Function) -> Self {
        Self::function(Rc::new(v))
    }
}

impl Value {
    fn from_kind(kind: ValueKind) -> Self {
        Self { kind,
               tree: Cell::new(None) }
    }

    /// A number.
    #[must_use]
    pub fn number(value: f64) -> Self {
        Self::from_kind(ValueKind::Number(value))
    }

    /// A tuple of `elements`.
    #[must_use]
    pub fn tuple(elements: Vec<Self>) -> Self {
        Self::from_kind(ValueKind::Tuple(Storage::new(elements)))
    }

    /// A function value sharing `function`.
    #[must_use]
    pub fn function(function: Rc<Function>) -> Self {
        Self::from_kind(ValueKind::Function(function))
    }

    /// A pointer to the node at `target`.
    #[must_use]
    pub fn pointer(target: NodePos) -> Self {
        Self::from_kind(ValueKind::NodePointer(target))
    }

    /// The kind and payload of this value.
    #[must_use]
    pub const fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// The structural type of this value.
    #[must_use]
    pub fn runtime_type(&self) -> RuntimeType {
        match &self.kind {
            ValueKind::Number(_) => RuntimeType::number(),
            ValueKind::Tuple(storage) => storage.runtime_type().clone(),
            ValueKind::Function(function) => function.runtime_type(),
            ValueKind::NodePointer(_) => RuntimeType::pointer(),
        }
    }

    /// Returns the number, or an error naming `origin` if this is not a
    /// number.
    ///
    /// # Errors
    /// Returns `RuntimeError::ExpectedNumber` for any other kind.
    pub fn as_number(&self, origin: &str) -> EvalResult<f64> {
        match self.kind {
            ValueKind::Number(value) => Ok(value),
            _ => Err(RuntimeError::ExpectedNumber { origin: origin.to_string() }),
        }
    }

    /// Returns the pointee handle, or an error naming `origin` if this is not
    /// a node pointer.
    ///
    /// # Errors
    /// Returns `RuntimeError::ExpectedPointer` for any other kind.
    pub fn as_pointer(&self, origin: &str) -> EvalResult<NodePos> {
        match self.kind {
            ValueKind::NodePointer(target) => Ok(target),
            _ => Err(RuntimeError::ExpectedPointer { origin: origin.to_string() }),
        }
    }

    /// The tuple payload, if this is a tuple.
    #[must_use]
    pub const fn as_tuple(&self) -> Option<&Storage> {
        match &self.kind {
            ValueKind::Tuple(storage) => Some(storage),
            _ => None,
        }
    }

    /// The function payload, if this is a function.
    #[must_use]
    pub const fn as_function(&self) -> Option<&Rc<Function>> {
        match &self.kind {
            ValueKind::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Returns the root of a tree that evaluates back to this value,
    /// building it in `arena` on first request.
    pub fn tree(&self, arena: &mut Arena) -> NodePos {
        if let Some((generation, pos)) = self.tree.get()
           && generation == arena.generation()
        {
            return pos;
        }
        let pos = materialize(self, arena);
        self.tree.set(Some((arena.generation(), pos)));
        pos
    }

    /// Evaluates the node this pointer aliases.
    ///
    /// # Errors
    /// Returns `RuntimeError::ExpectedPointer` if this is not a pointer, or
    /// the error raised while evaluating the pointee.
    pub fn deref(&self, ctx: &mut EvalContext<'_>) -> EvalResult<Self> {
        let target = self.as_pointer("deref")?;
        ctx.evaluate(target)
    }

    /// Makes this pointer alias `target` instead.
    ///
    /// # Errors
    /// Returns `RuntimeError::ExpectedPointer` if this is not a pointer.
    pub fn repoint(&mut self, target: NodePos) -> EvalResult<()> {
        match &mut self.kind {
            ValueKind::NodePointer(current) => {
                *current = target;
                self.tree.set(None);
                Ok(())
            },
            _ => Err(RuntimeError::ExpectedPointer { origin: "repoint".to_string() }),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (ValueKind::Tuple(a), ValueKind::Tuple(b)) => a == b,
            (ValueKind::Function(a), ValueKind::Function(b)) => Rc::ptr_eq(a, b) || a == b,
            (ValueKind::NodePointer(a), ValueKind::NodePointer(b)) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ValueKind::Number(value) => write!(f, "{}", format_number(*value)),
            ValueKind::Tuple(storage) => {
                write!(f, "[")?;
                for (index, element) in storage.elements().iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, "]")
            },
            ValueKind::Function(function) => write!(f, "{function}"),
            ValueKind::NodePointer(target) => write!(f, "{POINTER_PREFIX}{target}"),
        }
    }
}
