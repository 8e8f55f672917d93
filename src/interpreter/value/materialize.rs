use crate::{
    ast::{Arena, Node, NodePos, POINTER_PREFIX, Parameter, alloc_tuple},
    interpreter::value::{
        core::{Value, ValueKind},
        function::FunctionBody,
    },
    util::num::format_number,
};

/// Operator leaf value of a native function that has no signature. Such a
/// leaf names no registered operator, so it does not evaluate back.
pub const UNNAMED_NATIVE: &str = "<native>";

/// Builds a tree in `arena` that evaluates back to `value`.
///
/// - a number becomes a number leaf holding its shortest exact text;
/// - a tuple becomes a tuple chain over the trees of its elements;
/// - a lambda becomes its function literal, copied without arguments if the
///   literal has arguments attached. A closure over bound values is wrapped
///   in an outer literal declaring one parameter per binding, applied to the
///   trees of the bound values, so `{y | x + y}` closed over `x = 3` becomes
///   `{x: Number | {y: Number | (x + y)}}[3]`;
/// - a native function becomes an operator leaf named by its signature,
///   which evaluates to the registered operator;
/// - a node pointer becomes a pointer leaf naming the pointee's index.
///
/// Callers go through [`Value::tree`], which memoizes the result.
pub(crate) fn materialize(value: &Value, arena: &mut Arena) -> NodePos {
    match value.kind() {
        ValueKind::Number(number) => arena.alloc(Node::number(format_number(*number))),
        ValueKind::Tuple(storage) => {
            let elements = storage.elements()
                                  .iter()
                                  .map(|element| element.tree(arena))
                                  .collect();
            alloc_tuple(arena, elements)
        },
        ValueKind::Function(function) => match function.body() {
            FunctionBody::Tree { node, captured, .. } => {
                let literal = match arena.get(*node) {
                    Some(literal) if literal.right.is_some() => {
                        let unapplied = Node { right: None,
                                               ..literal.clone() };
                        arena.alloc(unapplied)
                    },
                    _ => *node,
                };
                close_over(captured.bindings(), literal, arena)
            },
            FunctionBody::Native(_) => {
                let name = function.signature().unwrap_or(UNNAMED_NATIVE).to_string();
                arena.alloc(Node::operator(name, None, None))
            },
        },
        ValueKind::NodePointer(target) => {
            arena.alloc(Node::operator(format!("{POINTER_PREFIX}{target}"), None, None))
        },
    }
}

fn close_over(bindings: &[(String, Value)], literal: NodePos, arena: &mut Arena) -> NodePos {
    if bindings.is_empty() {
        return literal;
    }
    let parameters = bindings.iter()
                             .map(|(name, value)| Parameter { name: name.clone(),
                                                              ty:   value.runtime_type(), })
                             .collect();
    let arguments = bindings.iter().map(|(_, value)| value.tree(arena)).collect();
    let arguments = alloc_tuple(arena, arguments);
    arena.alloc(Node { right: Some(arguments),
                       ..Node::function(parameters, literal) })
}
