use std::{
    cell::Cell,
    panic::{self, AssertUnwindSafe},
    rc::Rc,
    sync::Once,
};

use crate::{
    ast::{Arena, NodePos, NodeState, Notation},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{EvalContext, EvalResult},
            registry::OperatorRegistry,
        },
        types::{
            core::RuntimeType,
            infer::{TypeCache, infer_type},
        },
        value::core::Value,
    },
};

thread_local! {
    static QUIET_PANICS: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Wraps the process panic hook once so that panics raised on this thread
/// while a native body runs are not reported by the hook. They are turned
/// into errors instead; every other panic still reaches the previous hook.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !QUIET_PANICS.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

/// Signature of a native function body.
///
/// A body receives the evaluation context (arena, memory cells and the
/// registry in scope) and the already checked arguments.
pub type NativeFn = Rc<dyn Fn(&mut EvalContext<'_>, &[Value]) -> EvalResult<Value>>;

/// Declared types of a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    /// The type of the result.
    pub return_type: RuntimeType,
    /// The parameter type: the parameter's own type for one parameter, a
    /// tuple type for several, or the any-tuple wildcard for variadic
    /// natives.
    pub params_type: RuntimeType,
    /// The number of parameters.
    pub param_count: usize,
}

/// What runs when a function is applied.
#[derive(Clone)]
pub enum FunctionBody {
    /// A closure supplied by the host.
    Native(NativeFn),
    /// A lambda: a function literal of the arena and the registry it closes
    /// over.
    Tree {
        /// The function literal node.
        node:       NodePos,
        /// The parameter names, bound in order to the arguments.
        parameters: Vec<String>,
        /// The registry in scope where the literal was evaluated.
        captured:   Rc<OperatorRegistry>,
    },
}

/// A function value: a native closure or a lambda, with its notation,
/// optional signature (the lexeme it is registered under) and declared
/// types.
#[derive(Clone)]
pub struct Function {
    notation:  Notation,
    signature: Option<String>,
    info:      FunctionInfo,
    body:      FunctionBody,
}

impl Function {
    /// Creates a native function.
    ///
    /// # Errors
    /// Returns `RuntimeError::LambdaConstruction` if `params_type` cannot
    /// describe `param_count` parameters.
    ///
    /// # Example
    /// ```
    /// use calctree::{
    ///     ast::Notation,
    ///     interpreter::{types::core::RuntimeType, value::{core::Value, function::Function}},
    /// };
    ///
    /// let double = Function::native("double",
    ///                               Notation::Postfix,
    ///                               RuntimeType::number(),
    ///                               RuntimeType::number(),
    ///                               1,
    ///                               |_, args| Ok(Value::from(args[0].as_number("double")? * 2.0)))
    ///                 .unwrap();
    /// assert_eq!(double.runtime_type().to_string(), "fn Number -> Number");
    ///
    /// let broken = Function::native("broken",
    ///                               Notation::Infix,
    ///                               RuntimeType::number(),
    ///                               RuntimeType::number(),
    ///                               2,
    ///                               |_, args| Ok(args[0].clone()));
    /// assert!(broken.is_err());
    /// ```
    pub fn native<F>(signature: impl Into<String>,
                     notation: Notation,
                     return_type: RuntimeType,
                     params_type: RuntimeType,
                     param_count: usize,
                     body: F)
                     -> EvalResult<Self>
        where F: Fn(&mut EvalContext<'_>, &[Value]) -> EvalResult<Value> + 'static
    {
        let function = Self { notation,
                              signature: Some(signature.into()),
                              info: FunctionInfo { return_type,
                                                   params_type,
                                                   param_count },
                              body: FunctionBody::Native(Rc::new(body)) };
        function.validate()?;
        Ok(function)
    }

    /// Creates a lambda from the function literal at `node`, closing over
    /// `registry`.
    ///
    /// The return type is inferred from the body with every parameter
    /// resolving as a constant of its declared type. It is inferred once per
    /// literal and reused while the bindings in scope keep their types. A
    /// lambda without parameters has constant notation, one with two has
    /// infix notation, any other has postfix notation.
    ///
    /// # Errors
    /// Returns `RuntimeError::LambdaConstruction` wrapping the type error if
    /// the body does not type-check.
    pub fn lambda(registry: &Rc<OperatorRegistry>, arena: &Arena, node: NodePos) -> EvalResult<Self> {
        let literal = arena.get(node)
                           .filter(|literal| literal.state == NodeState::Function)
                           .ok_or(RuntimeError::DanglingNode { index: node.index() })?;
        let body = literal.left.ok_or_else(|| construction_error("the literal has no body", None))?;

        let return_type = match registry.literal_type(arena.generation(), node) {
            Some(return_type) => return_type,
            None => {
                let shadow = Rc::new(registry.with_parameters(&literal.parameters));
                let return_type = infer_type(arena, &shadow, body, &mut TypeCache::new())
                    .map_err(|cause| construction_error("the body does not type-check", Some(cause)))?;
                registry.remember_literal_type(arena.generation(), node, return_type.clone());
                return_type
            },
        };

        let params_type = RuntimeType::params_of(literal.parameters
                                                        .iter()
                                                        .map(|parameter| parameter.ty.clone())
                                                        .collect());
        let param_count = literal.parameters.len();
        let notation = match param_count {
            0 => Notation::Constant,
            2 => Notation::Infix,
            _ => Notation::Postfix,
        };

        let function = Self { notation,
                              signature: None,
                              info: FunctionInfo { return_type,
                                                   params_type,
                                                   param_count },
                              body: FunctionBody::Tree { node,
                                                         parameters: literal.parameters
                                                                            .iter()
                                                                            .map(|parameter| parameter.name.clone())
                                                                            .collect(),
                                                         captured: Rc::clone(registry) } };
        function.validate()?;
        Ok(function)
    }

    /// A constant named `name` that always yields `value`. Lambda arguments
    /// are bound through such constants.
    #[must_use]
    pub fn binding(name: &str, value: Value) -> Self {
        Self { notation:  Notation::Constant,
               signature: Some(name.to_string()),
               info:      FunctionInfo { return_type: value.runtime_type(),
                                         params_type: RuntimeType::tuple(Vec::new()),
                                         param_count: 0, },
               body:      FunctionBody::Native(Rc::new(move |_: &mut EvalContext<'_>, _: &[Value]| -> EvalResult<Value> {
                                                   Ok(value.clone())
                                               })), }
    }

    /// A constant named `name` of type `ty` with no value, standing in for a
    /// parameter while a body is type-checked.
    #[must_use]
    pub fn placeholder(name: &str, ty: RuntimeType) -> Self {
        let origin = name.to_string();
        Self { notation:  Notation::Constant,
               signature: Some(name.to_string()),
               info:      FunctionInfo { return_type: ty,
                                         params_type: RuntimeType::tuple(Vec::new()),
                                         param_count: 0, },
               body:      FunctionBody::Native(Rc::new(move |_: &mut EvalContext<'_>, _: &[Value]| -> EvalResult<Value> {
                                                   Err(RuntimeError::LambdaEvaluation { details: "the parameter is not bound to a value".to_string(),
                                                                                        origin:  origin.clone(),
                                                                                        cause:   None, })
                                               })), }
    }

    fn validate(&self) -> EvalResult<()> {
        let params = &self.info.params_type;
        let consistent = match self.info.param_count {
            0 => params.elements().is_some_and(<[RuntimeType]>::is_empty),
            1 => true,
            count => {
                *params == RuntimeType::any_tuple()
                || params.elements().is_some_and(|elements| elements.len() == count)
            },
        };
        if consistent {
            Ok(())
        } else {
            Err(RuntimeError::LambdaConstruction { details: format!("{} parameter(s) cannot have type {params}",
                                                                    self.info.param_count),
                                                   origin:  self.origin().to_string(),
                                                   cause:   None, })
        }
    }

    /// The notation this function is written with.
    #[must_use]
    pub const fn notation(&self) -> Notation {
        self.notation
    }

    /// The lexeme this function is registered under, if any.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// The declared types.
    #[must_use]
    pub const fn info(&self) -> &FunctionInfo {
        &self.info
    }

    /// The declared return type.
    #[must_use]
    pub const fn return_type(&self) -> &RuntimeType {
        &self.info.return_type
    }

    /// The declared parameter type.
    #[must_use]
    pub const fn params_type(&self) -> &RuntimeType {
        &self.info.params_type
    }

    /// The number of parameters.
    #[must_use]
    pub const fn param_count(&self) -> usize {
        self.info.param_count
    }

    /// The body.
    #[must_use]
    pub const fn body(&self) -> &FunctionBody {
        &self.body
    }

    /// The function type `fn params -> return`.
    #[must_use]
    pub fn runtime_type(&self) -> RuntimeType {
        RuntimeType::function(self.info.return_type.clone(), self.info.params_type.clone())
    }

    /// The name errors raised by this function are tagged with.
    #[must_use]
    pub fn origin(&self) -> &str {
        self.signature.as_deref().unwrap_or("lambda")
    }

    /// Applies this function to `args` after checking their count and types.
    ///
    /// Native bodies run inside a panic boundary: a panic becomes a
    /// `RuntimeError::LambdaEvaluation` carrying the panic message, and the
    /// panic hook stays silent for it. Lambda
    /// bodies are evaluated under the captured registry extended with one
    /// constant per parameter, bound to the matching argument.
    ///
    /// # Errors
    /// Returns `RuntimeError::ArgumentCountMismatch` or
    /// `RuntimeError::TypeMismatch` for rejected arguments, the error of a
    /// native body, or `RuntimeError::LambdaEvaluation` wrapping the failure
    /// of a lambda body.
    pub fn apply(&self, ctx: &mut EvalContext<'_>, args: &[Value]) -> EvalResult<Value> {
        if args.len() != self.info.param_count {
            return Err(RuntimeError::ArgumentCountMismatch { expected: self.info.param_count,
                                                             found:    args.len(),
                                                             origin:   self.origin().to_string(), });
        }
        let types: Vec<RuntimeType> = args.iter().map(Value::runtime_type).collect();
        if !self.info.params_type.accepts_arguments(&types) {
            return Err(RuntimeError::TypeMismatch { expected: self.info.params_type.clone(),
                                                    found:    RuntimeType::params_of(types),
                                                    origin:   self.origin().to_string(), });
        }
        self.invoke(ctx, args)
    }

    fn invoke(&self, ctx: &mut EvalContext<'_>, args: &[Value]) -> EvalResult<Value> {
        match &self.body {
            FunctionBody::Native(body) => {
                tracing::trace!(function = self.origin(), "native call");
                install_quiet_hook();
                let quiet = QUIET_PANICS.with(|flag| flag.replace(true));
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(ctx, args)));
                QUIET_PANICS.with(|flag| flag.set(quiet));
                match outcome {
                    Ok(result) => result,
                    Err(payload) => {
                        let details = payload.downcast_ref::<&str>()
                                             .map(ToString::to_string)
                                             .or_else(|| payload.downcast_ref::<String>().cloned())
                                             .unwrap_or_else(|| "the native body panicked".to_string());
                        tracing::debug!(function = self.origin(), %details, "native body panicked");
                        Err(RuntimeError::LambdaEvaluation { details,
                                                             origin: self.origin().to_string(),
                                                             cause: None })
                    },
                }
            },
            FunctionBody::Tree { node,
                                 parameters,
                                 captured, } => {
                let body = ctx.arena
                              .get(*node)
                              .and_then(|literal| literal.left)
                              .ok_or(RuntimeError::DanglingNode { index: node.index() })?;
                let registry = Rc::new(captured.with_bindings(parameters, args));
                ctx.evaluate_under(registry, body)
                   .map_err(|cause| RuntimeError::LambdaEvaluation { details: "the body failed".to_string(),
                                                                     origin:  self.origin().to_string(),
                                                                     cause:   Some(Box::new(cause)), })
            },
        }
    }
}

fn construction_error(details: &str, cause: Option<RuntimeError>) -> RuntimeError {
    RuntimeError::LambdaConstruction { details: details.to_string(),
                                       origin:  "lambda".to_string(),
                                       cause:   cause.map(Box::new), }
}

// Natives are equal when they share a body. Lambdas are equal when they come
// from the same literal and close over equal bound values.
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        let same_body = match (&self.body, &other.body) {
            (FunctionBody::Native(a), FunctionBody::Native(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            (FunctionBody::Tree { node: a,
                                  parameters: names_a,
                                  captured: scope_a, },
             FunctionBody::Tree { node: b,
                                  parameters: names_b,
                                  captured: scope_b, }) => {
                a == b && names_a == names_b && scope_a.bindings() == scope_b.bindings()
            },
            _ => false,
        };
        same_body && self.notation == other.notation && self.signature == other.signature && self.info == other.info
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let body = match &self.body {
            FunctionBody::Native(_) => "native".to_string(),
            FunctionBody::Tree { node, .. } => format!("tree at {node}"),
        };
        f.debug_struct("Function")
         .field("notation", &self.notation)
         .field("signature", &self.signature)
         .field("info", &self.info)
         .field("body", &body)
         .finish()
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.origin(), self.runtime_type())
    }
}
