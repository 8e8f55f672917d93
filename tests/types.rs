use std::{collections::HashSet, rc::Rc};

use calctree::{
    ast::{Arena, Node, Notation},
    error::RuntimeError,
    interpreter::{
        evaluator::{core::Evaluator, registry::OperatorRegistry},
        parser::core::Parser,
        types::{
            core::{BaseType, RuntimeType},
            infer::{TypeCache, infer_type},
        },
    },
};
use pretty_assertions::assert_eq;

fn type_of(text: &str) -> Result<RuntimeType, RuntimeError> {
    let evaluator = Evaluator::with_builtins().unwrap();
    let mut arena = Arena::new();
    let root = Parser::standard().parse(text, &mut arena)
                                 .unwrap_or_else(|e| panic!("failed to parse {text:?}: {e}"));
    evaluator.infer(&arena, root, &mut TypeCache::new())
}

fn shown(text: &str) -> String {
    type_of(text).unwrap_or_else(|e| panic!("failed to type {text:?}: {e}"))
                 .to_string()
}

#[test]
fn structural_equality() {
    let number = RuntimeType::number();
    let pair = RuntimeType::tuple(vec![number.clone(), number.clone()]);
    let same_pair = RuntimeType::tuple(vec![RuntimeType::number(), RuntimeType::number()]);

    assert_eq!(pair, same_pair);
    assert_eq!(pair.structural_hash(), same_pair.structural_hash());
    assert_ne!(pair, RuntimeType::tuple(vec![number.clone()]));
    assert_ne!(RuntimeType::function(number.clone(), number.clone()),
               RuntimeType::function(number.clone(), pair.clone()));
    assert_ne!(RuntimeType::tuple(Vec::new()), RuntimeType::any_tuple());

    let set: HashSet<RuntimeType> = [pair.clone(), same_pair, number].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn kinds_and_accessors() {
    let number = RuntimeType::number();
    let function = RuntimeType::function(RuntimeType::pointer(), number.clone());

    assert_eq!(function.kind(), BaseType::Function);
    assert!(function.is_function());
    assert_eq!(function.return_type(), Some(&RuntimeType::pointer()));
    assert_eq!(function.params_type(), Some(&number));
    assert_eq!(number.elements(), None);
    assert!(RuntimeType::tuple(Vec::new()).is_tuple());
    assert!(!RuntimeType::any_tuple().is_tuple());
}

#[test]
fn params_of_collapses_single_parameters() {
    let number = RuntimeType::number();
    assert_eq!(RuntimeType::params_of(vec![number.clone()]), number);
    assert_eq!(RuntimeType::params_of(Vec::new()), RuntimeType::tuple(Vec::new()));
    assert_eq!(RuntimeType::params_of(vec![number.clone(), number.clone()]),
               RuntimeType::tuple(vec![number.clone(), number]));
}

#[test]
fn any_tuple_accepts_every_tuple_only() {
    let any = RuntimeType::any_tuple();
    let number = RuntimeType::number();

    assert!(any.accepts(&RuntimeType::tuple(Vec::new())));
    assert!(any.accepts(&RuntimeType::tuple(vec![number.clone(), RuntimeType::pointer()])));
    assert!(!any.accepts(&number));
    assert!(any.accepts_arguments(&[number.clone(), number.clone()]));
    assert!(!any.accepts_arguments(&[number]));
}

#[test]
fn display() {
    let number = RuntimeType::number();
    let pair = RuntimeType::tuple(vec![number.clone(), number.clone()]);

    assert_eq!(number.to_string(), "Number");
    assert_eq!(RuntimeType::pointer().to_string(), "Pointer");
    assert_eq!(RuntimeType::any_tuple().to_string(), "[..]");
    assert_eq!(RuntimeType::tuple(Vec::new()).to_string(), "[]");
    assert_eq!(pair.to_string(), "[Number, Number]");
    assert_eq!(RuntimeType::function(number, pair).to_string(), "fn [Number, Number] -> Number");
}

#[test]
fn literals_and_operators() {
    assert_eq!(shown("3 + 4 * 2"), "Number");
    assert_eq!(shown("pi"), "Number");
    assert_eq!(shown("[1, [2, 3]]"), "[Number, [Number, Number]]");
    assert_eq!(shown("[]"), "[]");
    assert_eq!(shown("[1, 2] sigma"), "Number");
    assert_eq!(shown("5 ref"), "Pointer");
    assert_eq!(shown("5 ref deref"), "Number");
    assert_eq!(shown("2 ref <- 3"), "Number");
}

#[test]
fn operator_references() {
    assert_eq!(shown("sqrt"), "fn Number -> Number");
    assert_eq!(shown("+"), "fn [Number, Number] -> Number");
    assert_eq!(shown("[sqrt, 1]"), "[fn Number -> Number, Number]");
}

#[test]
fn function_literals() {
    assert_eq!(shown("{x | x * 2}"), "fn Number -> Number");
    assert_eq!(shown("{x, y | x * y}"), "fn [Number, Number] -> Number");
    assert_eq!(shown("{42}"), "fn [] -> Number");
    assert_eq!(shown("{v: [Number, Number] | v}"), "fn [Number, Number] -> [Number, Number]");
    assert_eq!(shown("{x | {y | x + y}}"), "fn Number -> fn Number -> Number");
}

#[test]
fn applications_collapse_to_return_type() {
    assert_eq!(shown("{x | x * 2}[3]"), "Number");
    assert_eq!(shown("{x | {y | x + y}}[3]"), "fn Number -> Number");
    assert_eq!(shown("{x | {y | x + y}}[3][4]"), "Number");
    assert_eq!(shown("{f: fn Number -> Number, v | f[v]}[sqrt, 16]"), "Number");
}

#[test]
fn tuple_operand_is_a_type_error() {
    let err = type_of("[1, 2] + 3").unwrap_err();
    assert!(err.is_type_error());
    assert!(matches!(err.root_cause(), RuntimeError::TypeMismatch { .. }));
    assert_eq!(err.origin(), Some("+"));
}

#[test]
fn argument_errors() {
    let count = type_of("{x | x * 2}[1, 2]").unwrap_err();
    assert!(matches!(count.root_cause(), RuntimeError::ArgumentCountMismatch { expected: 1, found: 2, .. }));

    let mismatch = type_of("{v: [Number, Number] | v sigma}[1]").unwrap_err();
    assert!(matches!(mismatch.root_cause(), RuntimeError::TypeMismatch { .. }));

    let not_callable = type_of("{x | x[1]}").unwrap_err();
    assert!(not_callable.is_type_error());
}

#[test]
fn body_errors_surface_through_the_literal() {
    let err = type_of("{x | x + [1]}").unwrap_err();
    assert!(err.is_type_error());
    assert!(matches!(err.root_cause(), RuntimeError::TypeMismatch { .. }));
}

#[test]
fn unregistered_constant_is_a_type_error() {
    let mut arena = Arena::new();
    let tau = arena.alloc(Node::operator("tau", None, None));
    let one = arena.alloc(Node::number("1"));
    let sum = arena.alloc(Node::operator("+", Some(tau), Some(one)));

    let evaluator = Evaluator::with_builtins().unwrap();
    let err = evaluator.infer(&arena, sum, &mut TypeCache::new()).unwrap_err();
    assert!(err.is_type_error());
    assert_eq!(err.root_cause(), &RuntimeError::UnknownOperator { lexeme: "tau".to_string() });
}

#[test]
fn missing_notation_is_a_type_error() {
    let mut arena = Arena::new();
    let two = arena.alloc(Node::number("2"));
    let misuse = arena.alloc(Node::operator("sqrt", Some(two), None));

    let registry = Rc::clone(Evaluator::with_builtins().unwrap().registry());
    let err = infer_type(&arena, &registry, misuse, &mut TypeCache::new()).unwrap_err();
    assert!(err.is_type_error());
}

#[test]
fn sessions_type_check_text() {
    let mut calc = calctree::Calculator::new().unwrap();
    assert_eq!(calc.infer_str("{x | x sqrt}[9]").unwrap(), RuntimeType::number());
    assert!(calc.infer_str("[1] * 2").is_err());
    assert!(calc.infer_str("(1").is_err());
    assert!(calc.memory().is_empty());
}

#[test]
fn cached_types_are_returned_as_is() {
    let evaluator = Evaluator::with_builtins().unwrap();
    let mut arena = Arena::new();
    let root = Parser::standard().parse("[1 + 2, {x | x}]", &mut arena).unwrap();

    let mut cache = TypeCache::new();
    let first = evaluator.infer(&arena, root, &mut cache).unwrap();
    let cached = cache.len();
    assert!(cached > 0);
    assert_eq!(cache.get(root), Some(&first));

    // A cached root is answered without consulting the registry.
    let empty = Rc::new(OperatorRegistry::new());
    let second = infer_type(&arena, &empty, root, &mut cache).unwrap();
    assert_eq!(first, second);
    assert_eq!(cache.len(), cached);
}

#[test]
fn cache_is_dropped_when_the_arena_is_wiped() {
    let evaluator = Evaluator::with_builtins().unwrap();
    let mut arena = Arena::new();
    let mut parser = Parser::standard();
    let mut cache = TypeCache::new();

    let root = parser.parse("[1, 2]", &mut arena).unwrap();
    evaluator.infer(&arena, root, &mut cache).unwrap();
    assert!(!cache.is_empty());

    arena.free_all();
    let root = parser.parse("7", &mut arena).unwrap();
    assert_eq!(evaluator.infer(&arena, root, &mut cache).unwrap(), RuntimeType::number());
    assert_eq!(cache.len(), 1);
}

#[test]
fn registered_natives_are_typed_by_declaration() {
    use calctree::interpreter::value::{core::Value, function::Function};

    let mut evaluator = Evaluator::with_builtins().unwrap();
    let swap = Function::native("swap",
                                Notation::Postfix,
                                RuntimeType::tuple(vec![RuntimeType::pointer(), RuntimeType::number()]),
                                RuntimeType::tuple(vec![RuntimeType::number(), RuntimeType::pointer()]),
                                1,
                                |_, args| Ok(args[0].clone()))
                   .unwrap();
    evaluator.register(swap).unwrap();

    let mut arena = Arena::new();
    let mut parser = Parser::standard();
    parser.register_operator("swap", Notation::Postfix, 9);
    let root = parser.parse("[1, 1 ref] swap", &mut arena).unwrap();

    let ty = evaluator.infer(&arena, root, &mut TypeCache::new()).unwrap();
    assert_eq!(ty.to_string(), "[Pointer, Number]");
    assert!(Value::from(1.0).runtime_type() == RuntimeType::number());
}
