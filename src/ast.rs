use std::fmt::Write as _;

use crate::interpreter::types::core::RuntimeType;

/// The append-only node store and its handles.
///
/// Every tree built by the parser, and every tree materialized from a runtime
/// value, lives in an [`Arena`]. Nodes reference each other only through
/// [`NodePos`] handles.
pub mod arena;

pub use arena::{Arena, NodePos};

/// Value of the synthetic operator node that applies a callee (left child)
/// to an argument tuple (right child).
pub const APPLY: &str = "()";
/// Value of the head node of a tuple chain.
pub const TUPLE_HEAD: &str = "[";
/// Value of every non-head link of a tuple chain.
pub const TUPLE_LINK: &str = ",";
/// Value of a function literal node.
pub const FUNCTION_HEAD: &str = "{";
/// Prefix of the synthetic operator leaf a node pointer materializes to. The
/// rest of the leaf's value is the pointee's index.
pub const POINTER_PREFIX: &str = "&";

/// The notation (fixity) of an operator.
///
/// In this grammar a `Postfix` operator carries its single operand as its
/// right child and may be written before (`sqrt 16`) or after (`16 sqrt`) the
/// operand; a `Prefix` operator binds the operand already on the stack as its
/// left child (`5 !`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Notation {
    /// Binary, written between its operands.
    Infix,
    /// Unary, binds the operand to its left.
    Prefix,
    /// Unary, binds the operand to its right.
    Postfix,
    /// Nullary.
    Constant,
}

impl std::fmt::Display for Notation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Infix => "infix",
            Self::Prefix => "prefix",
            Self::Postfix => "postfix",
            Self::Constant => "constant",
        };
        write!(f, "{name}")
    }
}

/// Governs how the evaluator and the type inferer interpret a node's
/// children.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeState {
    /// A numeric literal leaf; `value` holds the literal text.
    Number,
    /// A function literal: `left` is the body, `right` the applied argument
    /// tuple (if any), `parameters` the declared parameters.
    Function,
    /// A link of a tuple chain: `left` is the element, `right` the next link.
    Tuple,
    /// An operator: infix uses both children, prefix only `left`, postfix
    /// only `right`. A childless operator node references a constant (or an
    /// operator as a first-class value).
    Operator,
}

/// A declared parameter of a function literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// The parameter's name, which resolves as a constant inside the body.
    pub name: String,
    /// The parameter's declared structural type.
    pub ty:   RuntimeType,
}

/// One element of the [`Arena`].
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Operator lexeme, numeric literal text, or a synthetic placeholder.
    pub value:      String,
    /// How the children are to be interpreted.
    pub state:      NodeState,
    /// Declared parameters; only meaningful when `state` is `Function`.
    pub parameters: Vec<Parameter>,
    /// Left child.
    pub left:       Option<NodePos>,
    /// Right child.
    pub right:      Option<NodePos>,
}

impl Node {
    /// A numeric literal leaf.
    #[must_use]
    pub fn number(text: impl Into<String>) -> Self {
        Self { value:      text.into(),
               state:      NodeState::Number,
               parameters: Vec::new(),
               left:       None,
               right:      None, }
    }

    /// An operator node with the given children.
    #[must_use]
    pub fn operator(lexeme: impl Into<String>, left: Option<NodePos>, right: Option<NodePos>) -> Self {
        Self { value: lexeme.into(),
               state: NodeState::Operator,
               parameters: Vec::new(),
               left,
               right }
    }

    /// One link of a tuple chain.
    #[must_use]
    pub fn tuple_link(value: &str, element: Option<NodePos>, next: Option<NodePos>) -> Self {
        Self { value:      value.to_string(),
               state:      NodeState::Tuple,
               parameters: Vec::new(),
               left:       element,
               right:      next, }
    }

    /// A function literal with the given parameters and body.
    #[must_use]
    pub fn function(parameters: Vec<Parameter>, body: NodePos) -> Self {
        Self { value: FUNCTION_HEAD.to_string(),
               state: NodeState::Function,
               parameters,
               left: Some(body),
               right: None }
    }

    /// Returns `true` if the node has no children.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// If this is a synthetic pointer leaf, returns the handle it points to.
    #[must_use]
    pub fn pointer_target(&self) -> Option<NodePos> {
        if self.state != NodeState::Operator || !self.is_leaf() {
            return None;
        }
        self.value
            .strip_prefix(POINTER_PREFIX)
            .and_then(|index| index.parse().ok())
            .map(NodePos::new)
    }
}

/// Collects the element handles of the tuple chain starting at `head`.
///
/// Returns `None` if any link of the chain is dangling or is not a tuple
/// link.
#[must_use]
pub fn tuple_elements(arena: &Arena, head: NodePos) -> Option<Vec<NodePos>> {
    let mut elements = Vec::new();
    let mut current = Some(head);
    while let Some(pos) = current {
        let link = arena.get(pos)?;
        if link.state != NodeState::Tuple {
            return None;
        }
        elements.extend(link.left);
        current = link.right;
    }
    Some(elements)
}

/// Allocates a tuple chain holding `elements` in order and returns its head.
///
/// The head link has value [`TUPLE_HEAD`], every further link
/// [`TUPLE_LINK`]. With no elements, the chain is a lone head link without an
/// element: the empty tuple.
pub fn alloc_tuple(arena: &mut Arena, elements: Vec<NodePos>) -> NodePos {
    let mut next = None;
    for (index, element) in elements.into_iter().enumerate().rev() {
        let value = if index == 0 { TUPLE_HEAD } else { TUPLE_LINK };
        next = Some(arena.alloc(Node::tuple_link(value, Some(element), next)));
    }
    next.unwrap_or_else(|| arena.alloc(Node::tuple_link(TUPLE_HEAD, None, None)))
}

/// Renders the subtree at `pos` as parenthesized-by-fixity text.
///
/// Infix nodes render as `(l op r)`, prefix nodes as `(l op)`, postfix nodes
/// as `(op r)`, tuples as `[a, b]` and function literals as
/// `{x: Number | body}` followed by their applied arguments, if any.
///
/// # Example
/// ```
/// use calctree::ast::{Arena, Node, tree_to_string};
///
/// let mut arena = Arena::new();
/// let two = arena.alloc(Node::number("2"));
/// let three = arena.alloc(Node::number("3"));
/// let sum = arena.alloc(Node::operator("+", Some(two), Some(three)));
///
/// assert_eq!(tree_to_string(&arena, sum), "(2 + 3)");
/// ```
#[must_use]
pub fn tree_to_string(arena: &Arena, pos: NodePos) -> String {
    let mut out = String::new();
    write_tree(arena, pos, &mut out);
    out
}

fn write_tree(arena: &Arena, pos: NodePos, out: &mut String) {
    let Some(node) = arena.get(pos) else {
        let _ = write!(out, "<dangling {pos}>");
        return;
    };

    match node.state {
        NodeState::Number => out.push_str(&node.value),
        NodeState::Tuple => write_tuple(arena, pos, out),
        NodeState::Function => {
            out.push('{');
            for (index, parameter) in node.parameters.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{}: {}", parameter.name, parameter.ty);
            }
            if !node.parameters.is_empty() {
                out.push_str(" | ");
            }
            if let Some(body) = node.left {
                write_tree(arena, body, out);
            }
            out.push('}');
            if let Some(arguments) = node.right {
                write_tuple(arena, arguments, out);
            }
        },
        NodeState::Operator => match (node.left, node.right) {
            (Some(callee), Some(arguments)) if node.value == APPLY => {
                write_tree(arena, callee, out);
                write_tuple(arena, arguments, out);
            },
            (Some(left), Some(right)) => {
                out.push('(');
                write_tree(arena, left, out);
                let _ = write!(out, " {} ", node.value);
                write_tree(arena, right, out);
                out.push(')');
            },
            (Some(left), None) => {
                out.push('(');
                write_tree(arena, left, out);
                let _ = write!(out, " {})", node.value);
            },
            (None, Some(right)) => {
                let _ = write!(out, "({} ", node.value);
                write_tree(arena, right, out);
                out.push(')');
            },
            (None, None) => out.push_str(&node.value),
        },
    }
}

fn write_tuple(arena: &Arena, head: NodePos, out: &mut String) {
    out.push('[');
    match tuple_elements(arena, head) {
        Some(elements) => {
            for (index, element) in elements.into_iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_tree(arena, element, out);
            }
        },
        None => out.push('?'),
    }
    out.push(']');
}
