use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{APPLY, Arena, Node, NodePos, NodeState, Notation, tuple_elements},
    error::RuntimeError,
    interpreter::{
        evaluator::{core::EvalResult, registry::OperatorRegistry},
        types::core::{BaseType, RuntimeType},
    },
};

/// Memoized node types.
///
/// Entries are keyed by node handle and belong to one arena generation: the
/// first use after [`Arena::free_all`] empties the cache.
#[derive(Debug, Default, Clone)]
pub struct TypeCache {
    types:      HashMap<NodePos, RuntimeType>,
    generation: Option<u32>,
}

impl TypeCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached type of `pos`.
    #[must_use]
    pub fn get(&self, pos: NodePos) -> Option<&RuntimeType> {
        self.types.get(&pos)
    }

    /// Number of cached nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no node is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Forgets every cached type.
    pub fn clear(&mut self) {
        self.types.clear();
    }

    fn sync(&mut self, arena: &Arena) {
        if self.generation != Some(arena.generation()) {
            self.types.clear();
            self.generation = Some(arena.generation());
        }
    }
}

struct Frame {
    pos:      NodePos,
    registry: Rc<OperatorRegistry>,
    expanded: bool,
}

/// Infers the type of the subtree rooted at `root`.
///
/// The walk is an explicit-stack post-order traversal: a node is typed once
/// all of its dependencies are in `cache`, and every typed node is stored
/// there. Asking again for a cached node returns at once, without looking at
/// the registry or the children.
///
/// - a number literal is `Number`;
/// - a tuple is the tuple of its element types, `[]` when empty;
/// - a function literal is `fn P -> R`, where `P` is built from the declared
///   parameter types and `R` is the body type, inferred with every parameter
///   resolving as a constant of its declared type. Applied to arguments, the
///   literal has type `R` once the arguments are accepted;
/// - an operator node must find its operator under the notation its
///   children imply, and its operands must be accepted by the operator's
///   parameter type. Its type is the operator's return type;
/// - a childless operator node is a constant (its return type), a node
///   pointer, or a reference to an operator (its function type).
///
/// # Errors
/// Returns a type error wrapped with the value of the node where it arose.
///
/// # Example
/// ```
/// use calctree::{
///     ast::Arena,
///     interpreter::{
///         evaluator::core::Evaluator,
///         parser::core::Parser,
///         types::infer::{TypeCache, infer_type},
///     },
/// };
///
/// let mut arena = Arena::new();
/// let evaluator = Evaluator::with_builtins().unwrap();
/// let root = Parser::standard().parse("{x, y | x * y}", &mut arena).unwrap();
///
/// let ty = infer_type(&arena, evaluator.registry(), root, &mut TypeCache::new()).unwrap();
/// assert_eq!(ty.to_string(), "fn [Number, Number] -> Number");
/// ```
#[tracing::instrument(level = "trace", skip(arena, registry, cache))]
pub fn infer_type(arena: &Arena,
                  registry: &Rc<OperatorRegistry>,
                  root: NodePos,
                  cache: &mut TypeCache)
                  -> EvalResult<RuntimeType> {
    cache.sync(arena);
    if let Some(ty) = cache.get(root) {
        return Ok(ty.clone());
    }

    let mut stack = vec![Frame { pos:      root,
                                 registry: Rc::clone(registry),
                                 expanded: false, }];

    while let Some(frame) = stack.pop() {
        if cache.types.contains_key(&frame.pos) {
            continue;
        }
        let node = arena.get(frame.pos)
                        .ok_or(RuntimeError::DanglingNode { index: frame.pos.index() })?;

        if !frame.expanded {
            let pending: Vec<Frame> =
                dependencies(arena, node, &frame.registry).map_err(|e| e.at_node(&node.value))?
                                                          .into_iter()
                                                          .filter(|(pos, _)| !cache.types.contains_key(pos))
                                                          .map(|(pos, registry)| Frame { pos,
                                                                                         registry,
                                                                                         expanded: false })
                                                          .collect();
            if !pending.is_empty() {
                stack.push(Frame { expanded: true,
                                   ..frame });
                stack.extend(pending.into_iter().rev());
                continue;
            }
        }

        let ty = type_of(arena, node, &frame.registry, cache).map_err(|e| e.at_node(&node.value))?;
        tracing::trace!(pos = %frame.pos, %ty, "typed");
        cache.types.insert(frame.pos, ty);
    }

    cache.get(root)
         .cloned()
         .ok_or(RuntimeError::DanglingNode { index: root.index() })
}

/// Subtrees whose types `node` needs, each with the registry to infer it
/// under.
fn dependencies(arena: &Arena,
                node: &Node,
                registry: &Rc<OperatorRegistry>)
                -> EvalResult<Vec<(NodePos, Rc<OperatorRegistry>)>> {
    let mut deps = Vec::new();
    match node.state {
        NodeState::Number => {},
        NodeState::Tuple => {
            for element in chain(arena, node)? {
                deps.push((element, Rc::clone(registry)));
            }
        },
        NodeState::Function => {
            if let Some(body) = node.left {
                deps.push((body, Rc::new(registry.with_parameters(&node.parameters))));
            }
            if let Some(arguments) = node.right {
                for element in elements_of(arena, arguments)? {
                    deps.push((element, Rc::clone(registry)));
                }
            }
        },
        NodeState::Operator => {
            if node.value == APPLY
               && let (Some(callee), Some(arguments)) = (node.left, node.right)
            {
                deps.push((callee, Rc::clone(registry)));
                for element in elements_of(arena, arguments)? {
                    deps.push((element, Rc::clone(registry)));
                }
            } else {
                for child in [node.left, node.right].into_iter().flatten() {
                    deps.push((child, Rc::clone(registry)));
                }
            }
        },
    }
    Ok(deps)
}

fn type_of(arena: &Arena,
           node: &Node,
           registry: &OperatorRegistry,
           cache: &TypeCache)
           -> EvalResult<RuntimeType> {
    let cached = |pos: NodePos| {
        cache.get(pos)
             .cloned()
             .ok_or(RuntimeError::DanglingNode { index: pos.index() })
    };

    match node.state {
        NodeState::Number => Ok(RuntimeType::number()),
        NodeState::Tuple => {
            let types = chain(arena, node)?.into_iter()
                                           .map(cached)
                                           .collect::<EvalResult<Vec<_>>>()?;
            Ok(RuntimeType::tuple(types))
        },
        NodeState::Function => {
            let Some(body) = node.left else {
                return Err(RuntimeError::InvalidArgument { details: "function literal has no body".to_string(),
                                                           origin:  node.value.clone(), });
            };
            let returns = cached(body)?;
            let params = RuntimeType::params_of(node.parameters
                                                    .iter()
                                                    .map(|parameter| parameter.ty.clone())
                                                    .collect());
            let Some(arguments) = node.right else {
                return Ok(RuntimeType::function(returns, params));
            };

            let types = elements_of(arena, arguments)?.into_iter()
                                                      .map(cached)
                                                      .collect::<EvalResult<Vec<_>>>()?;
            check_arguments(&params, node.parameters.len(), &types, "lambda")?;
            Ok(returns)
        },
        NodeState::Operator => operator_type(arena, node, registry, &cached),
    }
}

fn operator_type(arena: &Arena,
                 node: &Node,
                 registry: &OperatorRegistry,
                 cached: &dyn Fn(NodePos) -> EvalResult<RuntimeType>)
                 -> EvalResult<RuntimeType> {
    let (notation, operands) = match (node.left, node.right) {
        (None, None) => return leaf_type(node, registry),
        (Some(callee), Some(arguments)) if node.value == APPLY => {
            let callee_type = cached(callee)?;
            let (Some(returns), Some(params)) = (callee_type.return_type(), callee_type.params_type()) else {
                return Err(RuntimeError::TypeMismatch { expected: RuntimeType::Base(BaseType::Function),
                                                        found:    callee_type,
                                                        origin:   APPLY.to_string(), });
            };
            let types = elements_of(arena, arguments)?.into_iter()
                                                      .map(cached)
                                                      .collect::<EvalResult<Vec<_>>>()?;
            if !params.accepts_arguments(&types) {
                return Err(RuntimeError::TypeMismatch { expected: params.clone(),
                                                        found:    RuntimeType::params_of(types),
                                                        origin:   APPLY.to_string(), });
            }
            return Ok(returns.clone());
        },
        (Some(left), Some(right)) => (Notation::Infix, vec![cached(left)?, cached(right)?]),
        (Some(left), None) => (Notation::Prefix, vec![cached(left)?]),
        (None, Some(right)) => (Notation::Postfix, vec![cached(right)?]),
    };

    let function = registry.lookup(&node.value, notation)
                           .ok_or_else(|| RuntimeError::UnknownOperator { lexeme: node.value.clone() })?;
    check_arguments(function.params_type(), function.param_count(), &operands, &node.value)?;
    Ok(function.return_type().clone())
}

fn leaf_type(node: &Node, registry: &OperatorRegistry) -> EvalResult<RuntimeType> {
    if node.pointer_target().is_some() {
        return Ok(RuntimeType::pointer());
    }
    if let Some(constant) = registry.constant(&node.value) {
        return Ok(constant.return_type().clone());
    }
    registry.any_operator(&node.value)
            .map(|function| function.runtime_type())
            .ok_or_else(|| RuntimeError::UnknownOperator { lexeme: node.value.clone() })
}

fn check_arguments(params: &RuntimeType, count: usize, types: &[RuntimeType], origin: &str) -> EvalResult<()> {
    if types.len() != count {
        return Err(RuntimeError::ArgumentCountMismatch { expected: count,
                                                         found:    types.len(),
                                                         origin:   origin.to_string(), });
    }
    if !params.accepts_arguments(types) {
        return Err(RuntimeError::TypeMismatch { expected: params.clone(),
                                                found:    RuntimeType::params_of(types.to_vec()),
                                                origin:   origin.to_string(), });
    }
    Ok(())
}

/// Element handles of the tuple chain whose head link is `node`.
pub(crate) fn chain(arena: &Arena, node: &Node) -> EvalResult<Vec<NodePos>> {
    let mut elements: Vec<NodePos> = node.left.into_iter().collect();
    if let Some(next) = node.right {
        elements.extend(elements_of(arena, next)?);
    }
    Ok(elements)
}

/// Element handles of the tuple chain starting at `head`.
pub(crate) fn elements_of(arena: &Arena, head: NodePos) -> EvalResult<Vec<NodePos>> {
    tuple_elements(arena, head).ok_or(RuntimeError::DanglingNode { index: head.index() })
}
