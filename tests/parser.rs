use calctree::{
    ast::{Arena, NodeState, Notation, tree_to_string},
    error::ParseError,
    interpreter::{
        parser::{
            core::Parser,
            declaration::{parse_parameter, parse_type},
        },
        syntax::SyntaxConfig,
        types::core::RuntimeType,
    },
};
use pretty_assertions::assert_eq;

fn tree(text: &str) -> String {
    let mut arena = Arena::new();
    let root = Parser::standard().parse(text, &mut arena)
                                 .unwrap_or_else(|e| panic!("failed to parse {text:?}: {e}"));
    tree_to_string(&arena, root)
}

fn parse_error(text: &str) -> ParseError {
    let mut arena = Arena::new();
    match Parser::standard().parse(text, &mut arena) {
        Ok(root) => panic!("{text:?} parsed to {}", tree_to_string(&arena, root)),
        Err(e) => e,
    }
}

fn merged(text: &str) -> Vec<String> {
    let parser = Parser::standard();
    let lexemes = parser.tokenize(text).unwrap();
    parser.merge_numbers(&lexemes)
}

#[test]
fn numbers_are_reassembled() {
    assert_eq!(merged("12+3.5*2"), ["12", "+", "3.5", "*", "2"]);
    assert_eq!(merged("-1.25"), ["-1.25"]);
    assert_eq!(merged(".5 + 1."), [".5", "+", "1."]);
    assert_eq!(merged("4 - -2"), ["4", "-", "-2"]);
    assert_eq!(merged("(-3)"), ["(", "-3", ")"]);
    assert_eq!(merged("1.2.3"), ["1.2", ".", "3"]);
    assert_eq!(merged("1 2"), ["1", "2"]);
}

#[test]
fn minus_after_operand_is_subtraction() {
    assert_eq!(merged("4-2"), ["4", "-", "2"]);
    assert_eq!(merged("(1)-2"), ["(", "1", ")", "-", "2"]);
    assert_eq!(merged("5 ! - 1"), ["5", "!", "-", "1"]);
}

#[test]
fn precedence_and_left_associativity() {
    assert_eq!(tree("3 + 4 * 2"), "(3 + (4 * 2))");
    assert_eq!(tree("(2 + 3) * 4"), "((2 + 3) * 4)");
    assert_eq!(tree("2 ^ 3 ^ 2"), "((2 ^ 3) ^ 2)");
    assert_eq!(tree("8 - 2 - 1"), "((8 - 2) - 1)");
    assert_eq!(tree("1 + 2 == 3"), "((1 + 2) == 3)");
    assert_eq!(tree("1 <- 2 + 3"), "(1 <- (2 + 3))");
}

#[test]
fn unary_operators() {
    assert_eq!(tree("25 sqrt"), "(sqrt 25)");
    assert_eq!(tree("sqrt 16 + 9"), "((sqrt 16) + 9)");
    assert_eq!(tree("25 sqrt + 1"), "((sqrt 25) + 1)");
    assert_eq!(tree("2 * 9 sqrt"), "(2 * (sqrt 9))");
    assert_eq!(tree("5 !"), "(5 !)");
    assert_eq!(tree("2 + 3 !"), "(2 + (3 !))");
    assert_eq!(tree("5 ref deref"), "(deref (ref 5))");
    assert_eq!(tree("sqrt (1 + 3)"), "(sqrt (1 + 3))");
}

#[test]
fn constants_are_leaves() {
    assert_eq!(tree("2 * pi"), "(2 * pi)");
    assert_eq!(tree("e"), "e");
}

#[test]
fn lone_operator_is_a_reference() {
    let mut arena = Arena::new();
    let root = Parser::standard().parse("sqrt", &mut arena).unwrap();
    let node = arena.get(root).unwrap();
    assert_eq!(node.state, NodeState::Operator);
    assert!(node.is_leaf());
    assert_eq!(node.value, "sqrt");
}

#[test]
fn tuple_literals() {
    assert_eq!(tree("[1, 2 + 3]"), "[1, (2 + 3)]");
    assert_eq!(tree("[1, [2, 3]]"), "[1, [2, 3]]");
    assert_eq!(tree("[-1]"), "[-1]");
    assert_eq!(tree("[]"), "[]");
    assert_eq!(tree("sigma [1, 2]"), "(sigma [1, 2])");
    assert_eq!(tree("[1, 2] sigma"), "(sigma [1, 2])");
}

#[test]
fn function_literals() {
    assert_eq!(tree("{x | x * 2}"), "{x: Number | (x * 2)}");
    assert_eq!(tree("{x, y: Number | x - y}"), "{x: Number, y: Number | (x - y)}");
    assert_eq!(tree("{42}"), "{42}");
    assert_eq!(tree("{v: [Number, Number] | v sigma}"), "{v: [Number, Number] | (sigma v)}");
    assert_eq!(tree("{f: fn Number -> Number | f[2]}"),
               "{f: fn Number -> Number | f[2]}");
}

#[test]
fn application_attaches_arguments() {
    assert_eq!(tree("{x | x * 2}[3]"), "{x: Number | (x * 2)}[3]");
    assert_eq!(tree("{x | {y | x + y}}[3][4]"), "{x: Number | {y: Number | (x + y)}}[3][4]");
    assert_eq!(tree("{x | {y | x + y}[2]}[3]"), "{x: Number | {y: Number | (x + y)}[2]}[3]");

    let mut arena = Arena::new();
    let root = Parser::standard().parse("{x | x}[1]", &mut arena).unwrap();
    let literal = arena.get(root).unwrap();
    assert_eq!(literal.state, NodeState::Function);
    assert!(literal.right.is_some());
}

#[test]
fn parameter_names_do_not_leak() {
    let mut parser = Parser::standard();
    let mut arena = Arena::new();
    parser.parse("{x | x + 1}", &mut arena).unwrap();

    assert!(!parser.tokenizer().is_keyword("x"));
    assert_eq!(parser.config().fixity("x"), None);
    assert!(parser.parse("x + 1", &mut arena).is_err());
}

#[test]
fn parameters_shadow_operators_inside_the_body_only() {
    let mut parser = Parser::standard();
    let mut arena = Arena::new();
    let root = parser.parse("{ln | ln * 2}", &mut arena).unwrap();

    assert_eq!(tree_to_string(&arena, root), "{ln: Number | (ln * 2)}");
    assert_eq!(parser.config().fixity("ln"), Some(Notation::Postfix));
}

#[test]
fn syntax_errors() {
    assert!(matches!(parse_error("(2+3"), ParseError::UnbalancedBrackets { .. }));
    assert!(matches!(parse_error("2+3)"), ParseError::UnbalancedBrackets { .. }));
    assert!(matches!(parse_error("[1, 2"), ParseError::UnbalancedBrackets { .. }));
    assert!(matches!(parse_error("()"), ParseError::EmptyExpression { .. }));
    assert!(matches!(parse_error("3 +"), ParseError::MissingOperand { .. }));
    assert!(matches!(parse_error("* 3"), ParseError::UnexpectedLexeme { .. }));
    assert!(matches!(parse_error("1 2"), ParseError::DanglingOperands { count: 2 }));
    assert!(matches!(parse_error("[1, , 2]"), ParseError::EmptyExpression { .. }));
    assert!(matches!(parse_error("{x | }"), ParseError::EmptyExpression { .. }));
    assert!(matches!(parse_error("{x, x | x}"), ParseError::InvalidDeclaration { .. }));
    assert!(matches!(parse_error("{x: Banana | x}"), ParseError::InvalidDeclaration { .. }));
    assert!(parse_error("(2+3").is_syntax_error());
}

#[test]
fn minus_after_postfix_is_a_sign() {
    assert!(matches!(parse_error("25 sqrt - 1"), ParseError::DanglingOperands { count: 2 }));
}

#[test]
fn unconfigured_parser_is_not_ready() {
    let mut arena = Arena::new();
    let mut parser = Parser::new(SyntaxConfig::new());
    let err = parser.parse("1", &mut arena).unwrap_err();

    let ParseError::NotReady { missing } = &err else {
        panic!("expected NotReady, got {err:?}");
    };
    assert!(missing.contains(&"operator level table"));
    assert!(!err.is_syntax_error());
}

#[test]
fn registered_operators_parse() {
    let mut parser = Parser::standard();
    parser.register_operator("twice", Notation::Postfix, 9);

    let mut arena = Arena::new();
    let root = parser.parse("1 + 4 twice", &mut arena).unwrap();
    assert_eq!(tree_to_string(&arena, root), "(1 + (twice 4))");
}

#[test]
fn type_annotations() {
    let number = RuntimeType::number();
    let pair = RuntimeType::tuple(vec![number.clone(), number.clone()]);

    assert_eq!(parse_type("Number").unwrap(), number);
    assert_eq!(parse_type("Pointer").unwrap(), RuntimeType::pointer());
    assert_eq!(parse_type("[]").unwrap(), RuntimeType::tuple(Vec::new()));
    assert_eq!(parse_type("[Number, [Number, Number]]").unwrap(),
               RuntimeType::tuple(vec![number.clone(), pair.clone()]));
    assert_eq!(parse_type("fn Number -> fn Number -> Number").unwrap(),
               RuntimeType::function(RuntimeType::function(number.clone(), number.clone()), number.clone()));
    assert_eq!(parse_type("fn [Number, Number] -> Number").unwrap(),
               RuntimeType::function(number, pair));

    assert!(parse_type("Number Number").is_err());
    assert!(parse_type("[Number,").is_err());
    assert!(parse_type("fn Number").is_err());
    assert!(parse_type("%").is_err());
}

#[test]
fn parameter_declarations() {
    let plain = parse_parameter(" x ").unwrap();
    assert_eq!(plain.name, "x");
    assert_eq!(plain.ty, RuntimeType::number());

    let typed = parse_parameter("p: Pointer").unwrap();
    assert_eq!(typed.name, "p");
    assert_eq!(typed.ty, RuntimeType::pointer());

    assert!(parse_parameter("").is_err());
    assert!(parse_parameter("x y").is_err());
    assert!(parse_parameter(": Number").is_err());
}

#[test]
fn custom_syntax_tables() {
    let config = SyntaxConfig::new().with_separators([' '])
                                    .with_bracket("(", ")")
                                    .with_raw_bracket("<", ">", NodeState::Tuple)
                                    .with_raw_bracket("{", "}", NodeState::Function)
                                    .with_operator("+", Notation::Infix, 1)
                                    .with_operator("*", Notation::Infix, 2)
                                    .with_operator("sum", Notation::Postfix, 9)
                                    .with_list_separator(";")
                                    .with_parameter_separator("=>");
    assert!(config.missing_tables().is_empty());

    let mut parser = Parser::new(config);
    let mut arena = Arena::new();
    let tuple = parser.parse("<1; (2 + 3) * 4> sum", &mut arena).unwrap();
    assert_eq!(tree_to_string(&arena, tuple), "(sum [1, ((2 + 3) * 4)])");

    let literal = parser.parse("{a; b => a * b}<6; 7>", &mut arena).unwrap();
    assert_eq!(tree_to_string(&arena, literal), "{a: Number, b: Number | (a * b)}[6, 7]");
}
