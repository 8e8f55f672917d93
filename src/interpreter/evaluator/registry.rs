use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    ast::{NodePos, Notation, Parameter},
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        types::core::RuntimeType,
        value::{core::Value, function::Function},
    },
};

/// Return types of function literals already checked against one family of
/// registries, keyed by arena generation and literal node. An entry is only
/// reused when the bindings in scope have the same names and types as when
/// it was recorded.
#[derive(Debug, Default)]
struct LiteralTypes {
    generation: Option<u32>,
    entries:    HashMap<(u32, NodePos), (Vec<(String, RuntimeType)>, RuntimeType)>,
}

/// Functions by lexeme, partitioned by notation.
///
/// Cloning a registry is cheap: the tables hold shared functions, so a lambda
/// application can extend a copy with its parameter bindings without
/// touching the registry it closes over.
#[derive(Clone, Default)]
pub struct OperatorRegistry {
    infix:     HashMap<String, Rc<Function>>,
    prefix:    HashMap<String, Rc<Function>>,
    postfix:   HashMap<String, Rc<Function>>,
    constants: HashMap<String, Rc<Function>>,
    bindings:  Vec<(String, Value)>,
    literals:  Rc<RefCell<LiteralTypes>>,
}

impl OperatorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `function` in the table of its notation, under its
    /// signature, and returns the function it replaced, if any.
    ///
    /// # Errors
    /// Returns `RuntimeError::LambdaConstruction` if the function has no
    /// signature, or if its parameter count does not fit its notation: infix
    /// operators take two parameters, prefix and postfix operators one, and
    /// constants none.
    pub fn register(&mut self, function: Function) -> EvalResult<Option<Rc<Function>>> {
        let Some(signature) = function.signature().map(ToString::to_string) else {
            return Err(RuntimeError::LambdaConstruction { details: "only named functions can be registered".to_string(),
                                                          origin:  function.origin().to_string(),
                                                          cause:   None, });
        };

        let expected = match function.notation() {
            Notation::Infix => 2,
            Notation::Prefix | Notation::Postfix => 1,
            Notation::Constant => 0,
        };
        if function.param_count() != expected {
            return Err(RuntimeError::LambdaConstruction { details: format!("a {} operator takes {expected} parameter(s), not {}",
                                                                           function.notation(),
                                                                           function.param_count()),
                                                          origin:  signature,
                                                          cause:   None, });
        }

        tracing::debug!(%signature, notation = %function.notation(), "operator registered");
        if function.notation() == Notation::Constant {
            self.bindings.retain(|(name, _)| *name != signature);
        }
        self.literals = Rc::default();
        Ok(self.table_mut(function.notation()).insert(signature, Rc::new(function)))
    }

    const fn table(&self, notation: Notation) -> &HashMap<String, Rc<Function>> {
        match notation {
            Notation::Infix => &self.infix,
            Notation::Prefix => &self.prefix,
            Notation::Postfix => &self.postfix,
            Notation::Constant => &self.constants,
        }
    }

    const fn table_mut(&mut self, notation: Notation) -> &mut HashMap<String, Rc<Function>> {
        match notation {
            Notation::Infix => &mut self.infix,
            Notation::Prefix => &mut self.prefix,
            Notation::Postfix => &mut self.postfix,
            Notation::Constant => &mut self.constants,
        }
    }

    /// The function registered for `lexeme` under `notation`.
    #[must_use]
    pub fn lookup(&self, lexeme: &str, notation: Notation) -> Option<&Rc<Function>> {
        self.table(notation).get(lexeme)
    }

    /// The constant named `name`.
    #[must_use]
    pub fn constant(&self, name: &str) -> Option<&Rc<Function>> {
        self.constants.get(name)
    }

    /// The operator `lexeme` refers to when used as a value: the postfix,
    /// prefix or infix operator of that name, in this order of preference.
    #[must_use]
    pub fn any_operator(&self, lexeme: &str) -> Option<&Rc<Function>> {
        [Notation::Postfix, Notation::Prefix, Notation::Infix].into_iter()
                                                              .find_map(|notation| self.lookup(lexeme, notation))
    }

    /// A copy of this registry in which every parameter resolves as a
    /// constant of its declared type, with no value behind it.
    #[must_use]
    pub fn with_parameters(&self, parameters: &[Parameter]) -> Self {
        let mut shadow = self.clone();
        shadow.literals = Rc::default();
        for parameter in parameters {
            shadow.bindings.retain(|(name, _)| *name != parameter.name);
            shadow.constants.insert(parameter.name.clone(),
                                    Rc::new(Function::placeholder(&parameter.name, parameter.ty.clone())));
        }
        shadow
    }

    /// A copy of this registry in which every name resolves as a constant
    /// yielding the matching value.
    ///
    /// The bindings are also recorded by name, in the order they were first
    /// made, so a closure over this registry can be rebuilt as a tree.
    #[must_use]
    pub fn with_bindings(&self, names: &[String], values: &[Value]) -> Self {
        let mut scope = self.clone();
        for (name, value) in names.iter().zip(values) {
            scope.constants.insert(name.clone(), Rc::new(Function::binding(name, value.clone())));
            match scope.bindings.iter_mut().find(|(bound, _)| bound == name) {
                Some((_, slot)) => *slot = value.clone(),
                None => scope.bindings.push((name.clone(), value.clone())),
            }
        }
        scope
    }

    /// The values bound through [`OperatorRegistry::with_bindings`], by name.
    #[must_use]
    pub fn bindings(&self) -> &[(String, Value)] {
        &self.bindings
    }

    fn binding_types(&self) -> Vec<(String, RuntimeType)> {
        self.bindings
            .iter()
            .map(|(name, value)| (name.clone(), value.runtime_type()))
            .collect()
    }

    /// The return type recorded for the function literal at `node`, if the
    /// bindings in scope still have the types it was checked with.
    pub(crate) fn literal_type(&self, generation: u32, node: NodePos) -> Option<RuntimeType> {
        let literals = self.literals.borrow();
        let (scope, returns) = literals.entries.get(&(generation, node))?;
        (*scope == self.binding_types()).then(|| returns.clone())
    }

    pub(crate) fn remember_literal_type(&self, generation: u32, node: NodePos, returns: RuntimeType) {
        let mut literals = self.literals.borrow_mut();
        if literals.generation != Some(generation) {
            literals.entries.clear();
            literals.generation = Some(generation);
        }
        literals.entries.insert((generation, node), (self.binding_types(), returns));
    }

    /// Number of function literals whose return type is memoized for this
    /// registry and the scopes derived from it.
    #[must_use]
    pub fn memoized_literals(&self) -> usize {
        self.literals.borrow().entries.len()
    }

    /// Total number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.infix.len() + self.prefix.len() + self.postfix.len() + self.constants.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn names(table: &HashMap<String, Rc<Function>>) -> Vec<&str> {
            let mut names: Vec<&str> = table.keys().map(String::as_str).collect();
            names.sort_unstable();
            names
        }

        f.debug_struct("OperatorRegistry")
         .field("infix", &names(&self.infix))
         .field("prefix", &names(&self.prefix))
         .field("postfix", &names(&self.postfix))
         .field("constants", &names(&self.constants))
         .field("bindings", &self.bindings.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>())
         .finish()
    }
}
