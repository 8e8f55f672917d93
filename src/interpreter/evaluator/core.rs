use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{APPLY, Arena, Node, NodePos, NodeState, Notation},
    error::RuntimeError,
    interpreter::{
        evaluator::{catalog::builtin_operators, memory::MemoryCells, registry::OperatorRegistry},
        types::{
            core::{BaseType, RuntimeType},
            infer::{TypeCache, chain, elements_of, infer_type},
        },
        value::{core::Value, function::Function},
    },
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// Stores the runtime evaluation context.
///
/// The context borrows the host's arena and memory cells for the duration of
/// one evaluation and carries the registry in scope. Native operators
/// receive it, so they can read and write memory cells, materialize values
/// into the arena and evaluate nodes.
pub struct EvalContext<'a> {
    /// The node store being evaluated.
    pub arena:    &'a mut Arena,
    /// The host's memory cells.
    pub memory:   &'a mut MemoryCells,
    /// The operators and constants visible to the evaluated tree.
    pub registry: Rc<OperatorRegistry>,
}

#[derive(Clone, Copy)]
struct Frame {
    pos:      NodePos,
    expanded: bool,
}

impl EvalContext<'_> {
    /// Evaluates the subtree rooted at `root`.
    ///
    /// The walk is an explicit-stack post-order traversal with a per-call
    /// result cache: a node is reduced once every node it depends on has a
    /// value. A function literal's body is not a dependency; it runs when
    /// the literal is applied.
    ///
    /// # Errors
    /// Returns the first error raised, wrapped with the value of the node it
    /// surfaced at. A failure inside a tuple is further wrapped in
    /// `RuntimeError::StorageEvaluation` naming the element's index.
    ///
    /// # Example
    /// ```
    /// use std::rc::Rc;
    ///
    /// use calctree::{
    ///     ast::Arena,
    ///     interpreter::{
    ///         evaluator::{core::{EvalContext, Evaluator}, memory::MemoryCells},
    ///         parser::core::Parser,
    ///         value::core::Value,
    ///     },
    /// };
    ///
    /// let evaluator = Evaluator::with_builtins().unwrap();
    /// let mut arena = Arena::new();
    /// let mut memory = MemoryCells::new();
    /// let root = Parser::standard().parse("(2 + 3) * 4", &mut arena).unwrap();
    ///
    /// let mut ctx = EvalContext { arena:    &mut arena,
    ///                             memory:   &mut memory,
    ///                             registry: Rc::clone(evaluator.registry()), };
    /// assert_eq!(ctx.evaluate(root).unwrap(), Value::from(20.0));
    /// ```
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn evaluate(&mut self, root: NodePos) -> EvalResult<Value> {
        let mut results: HashMap<NodePos, Value> = HashMap::new();
        let mut stack = vec![Frame { pos:      root,
                                     expanded: false, }];

        while let Some(frame) = stack.pop() {
            if results.contains_key(&frame.pos) {
                continue;
            }
            let node = self.arena
                           .get(frame.pos)
                           .cloned()
                           .ok_or(RuntimeError::DanglingNode { index: frame.pos.index() })?;

            if !frame.expanded {
                let pending: Vec<NodePos> = dependencies(self.arena, &node).map_err(|e| e.at_node(&node.value))?
                                                                           .into_iter()
                                                                           .filter(|pos| !results.contains_key(pos))
                                                                           .collect();
                if !pending.is_empty() {
                    stack.push(Frame { expanded: true,
                                       ..frame });
                    stack.extend(pending.into_iter().rev().map(|pos| Frame { pos,
                                                                             expanded: false }));
                    continue;
                }
            }

            match self.reduce(frame.pos, &node, &results) {
                Ok(value) => {
                    tracing::trace!(pos = %frame.pos, %value, "reduced");
                    results.insert(frame.pos, value);
                },
                Err(error) => {
                    let error = error.at_node(&node.value);
                    return Err(within_tuples(self.arena, &stack, frame.pos, error));
                },
            }
        }

        results.remove(&root)
               .ok_or(RuntimeError::DanglingNode { index: root.index() })
    }

    /// Evaluates `root` with `registry` in scope instead of the current one.
    /// Lambda bodies run this way, under their captured registry extended
    /// with the argument bindings.
    ///
    /// # Errors
    /// Returns the error raised while evaluating `root`.
    pub fn evaluate_under(&mut self, registry: Rc<OperatorRegistry>, root: NodePos) -> EvalResult<Value> {
        let mut scope = EvalContext { arena: &mut *self.arena,
                                      memory: &mut *self.memory,
                                      registry };
        scope.evaluate(root)
    }

    fn reduce(&mut self, pos: NodePos, node: &Node, results: &HashMap<NodePos, Value>) -> EvalResult<Value> {
        let result = |pos: NodePos| {
            results.get(&pos)
                   .cloned()
                   .ok_or(RuntimeError::DanglingNode { index: pos.index() })
        };

        match node.state {
            NodeState::Number => node.value
                                     .parse::<f64>()
                                     .map(Value::number)
                                     .map_err(|_| RuntimeError::InvalidNumber { text: node.value.clone() }),
            NodeState::Tuple => {
                let elements = chain(self.arena, node)?;
                if elements.is_empty() {
                    return Err(RuntimeError::StorageEvaluation { index: None,
                                                                 cause: None, });
                }
                let values = elements.into_iter().map(result).collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::tuple(values))
            },
            NodeState::Function => {
                let function = Function::lambda(&self.registry, self.arena, pos)?;
                let Some(arguments) = node.right else {
                    return Ok(Value::from(function));
                };
                let args = elements_of(self.arena, arguments)?.into_iter()
                                                              .map(result)
                                                              .collect::<EvalResult<Vec<_>>>()?;
                function.apply(self, &args)
            },
            NodeState::Operator => match (node.left, node.right) {
                (None, None) => self.leaf(node),
                (Some(callee), Some(arguments)) if node.value == APPLY => {
                    let callee = result(callee)?;
                    let Some(function) = callee.as_function().cloned() else {
                        return Err(RuntimeError::TypeMismatch { expected: RuntimeType::Base(BaseType::Function),
                                                                found:    callee.runtime_type(),
                                                                origin:   APPLY.to_string(), });
                    };
                    let args = elements_of(self.arena, arguments)?.into_iter()
                                                                  .map(result)
                                                                  .collect::<EvalResult<Vec<_>>>()?;
                    function.apply(self, &args)
                },
                (Some(left), Some(right)) => self.call(&node.value, Notation::Infix, &[result(left)?, result(right)?]),
                (Some(left), None) => self.call(&node.value, Notation::Prefix, &[result(left)?]),
                (None, Some(right)) => self.call(&node.value, Notation::Postfix, &[result(right)?]),
            },
        }
    }

    /// A childless operator node: a node pointer, a constant, or an operator
    /// used as a value.
    fn leaf(&mut self, node: &Node) -> EvalResult<Value> {
        if let Some(target) = node.pointer_target() {
            return Ok(Value::pointer(target));
        }
        if let Some(constant) = self.registry.constant(&node.value).cloned() {
            return constant.apply(self, &[]);
        }
        self.registry
            .any_operator(&node.value)
            .cloned()
            .map(Value::function)
            .ok_or_else(|| RuntimeError::UnknownOperator { lexeme: node.value.clone() })
    }

    fn call(&mut self, lexeme: &str, notation: Notation, args: &[Value]) -> EvalResult<Value> {
        let function = self.registry
                           .lookup(lexeme, notation)
                           .cloned()
                           .ok_or_else(|| RuntimeError::UnknownOperator { lexeme: lexeme.to_string() })?;
        function.apply(self, args)
    }
}

/// Nodes whose values `node` needs before it can be reduced.
fn dependencies(arena: &Arena, node: &Node) -> EvalResult<Vec<NodePos>> {
    match node.state {
        NodeState::Number => Ok(Vec::new()),
        NodeState::Tuple => chain(arena, node),
        NodeState::Function => match node.right {
            Some(arguments) => elements_of(arena, arguments),
            None => Ok(Vec::new()),
        },
        NodeState::Operator => {
            if node.value == APPLY
               && let (Some(callee), Some(arguments)) = (node.left, node.right)
            {
                let mut deps = vec![callee];
                deps.extend(elements_of(arena, arguments)?);
                Ok(deps)
            } else {
                Ok([node.left, node.right].into_iter().flatten().collect())
            }
        },
    }
}

/// Wraps `error`, raised at `failed`, once for every tuple among its pending
/// ancestors. The expanded frames left on the stack are exactly those
/// ancestors, innermost last.
fn within_tuples(arena: &Arena, stack: &[Frame], failed: NodePos, mut error: RuntimeError) -> RuntimeError {
    let mut child = failed;
    for ancestor in stack.iter().rev().filter(|frame| frame.expanded) {
        if let Some(node) = arena.get(ancestor.pos)
           && node.state == NodeState::Tuple
           && let Ok(elements) = chain(arena, node)
        {
            let index = elements.iter().position(|&element| element == child);
            error = RuntimeError::StorageEvaluation { index,
                                                      cause: Some(Box::new(error)) };
        }
        child = ancestor.pos;
    }
    error
}

/// Owns the operator registry and evaluates trees against it.
///
/// Registering an operator never affects lambdas created earlier: they keep
/// the registry they closed over.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    registry: Rc<OperatorRegistry>,
}

impl Evaluator {
    /// Creates an evaluator with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an evaluator with every operator of the built-in catalog
    /// registered.
    ///
    /// # Errors
    /// Returns `RuntimeError::LambdaConstruction` if a catalog entry is
    /// inconsistent.
    pub fn with_builtins() -> EvalResult<Self> {
        let mut evaluator = Self::new();
        for operator in builtin_operators() {
            evaluator.register(operator.function()?)?;
        }
        tracing::debug!(operators = evaluator.registry.len(), "built-in catalog registered");
        Ok(evaluator)
    }

    /// Registers `function` under its signature, returning the function it
    /// replaced, if any.
    ///
    /// # Errors
    /// Returns `RuntimeError::LambdaConstruction` if the function is unnamed
    /// or its parameter count does not fit its notation.
    pub fn register(&mut self, function: Function) -> EvalResult<Option<Rc<Function>>> {
        Rc::make_mut(&mut self.registry).register(function)
    }

    /// The registry trees are evaluated against.
    #[must_use]
    pub const fn registry(&self) -> &Rc<OperatorRegistry> {
        &self.registry
    }

    /// Evaluates the tree at `root` of `arena`, with `memory` as the memory
    /// cells.
    ///
    /// # Errors
    /// Returns the error raised during evaluation; see
    /// [`EvalContext::evaluate`].
    pub fn evaluate(&self, arena: &mut Arena, memory: &mut MemoryCells, root: NodePos) -> EvalResult<Value> {
        let mut ctx = EvalContext { arena,
                                    memory,
                                    registry: Rc::clone(&self.registry) };
        ctx.evaluate(root)
    }

    /// Infers the type of the tree at `root` of `arena`, memoizing node types
    /// in `cache`.
    ///
    /// # Errors
    /// Returns the type error raised during inference; see [`infer_type`].
    pub fn infer(&self, arena: &Arena, root: NodePos, cache: &mut TypeCache) -> EvalResult<RuntimeType> {
        infer_type(arena, &self.registry, root, cache)
    }
}
