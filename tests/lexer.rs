use calctree::{
    error::ParseError,
    interpreter::{lexer::Tokenizer, syntax::SyntaxConfig},
};
use pretty_assertions::assert_eq;

fn tokenizer() -> Tokenizer {
    Tokenizer::new(&SyntaxConfig::standard())
}

fn lex(text: &str) -> Vec<String> {
    tokenizer().tokenize(text)
               .unwrap_or_else(|e| panic!("failed to tokenize {text:?}: {e}"))
}

#[test]
fn digits_and_operators() {
    assert_eq!(lex("12+3.5*2"), ["12", "+", "3", ".", "5", "*", "2"]);
    assert_eq!(lex("  7 \t-\n 1 "), ["7", "-", "1"]);
}

#[test]
fn greedy_keywords() {
    assert_eq!(lex("1<=2"), ["1", "<=", "2"]);
    assert_eq!(lex("3<-4"), ["3", "<-", "4"]);
    assert_eq!(lex("5!=5"), ["5", "!=", "5"]);
    assert_eq!(lex("5!"), ["5", "!"]);
    assert_eq!(lex("25 sqrt"), ["25", "sqrt"]);
    assert_eq!(lex("2pi"), ["2", "pi"]);
}

#[test]
fn raw_regions_are_captured_verbatim() {
    assert_eq!(lex("sigma [1, [2, 3]]"), ["sigma", "[", "1, [2, 3]", "]"]);
    assert_eq!(lex("{x | [x, {y | y}]}"), ["{", "x | [x, {y | y}]", "}"]);
    assert_eq!(lex("{x | x * 2}[3]"), ["{", "x | x * 2", "}", "[", "3", "]"]);
}

#[test]
fn empty_raw_region_has_no_body() {
    assert_eq!(lex("[]"), ["[", "]"]);
    assert_eq!(lex("{42}[ ]"), ["{", "42", "}", "[", "]"]);
}

#[test]
fn unterminated_raw_region_keeps_its_body() {
    assert_eq!(lex("[1, 2"), ["[", "1, 2"]);
}

#[test]
fn unknown_characters_are_marked() {
    let err = tokenizer().tokenize("2 $ 3 ?").unwrap_err();
    let ParseError::Lexing { text,
                             marker,
                             positions, } = &err
    else {
        panic!("expected a lexing error, got {err:?}");
    };
    assert_eq!(text, "2 $ 3 ?");
    assert_eq!(marker, "  ^   ^");
    assert_eq!(positions, &vec![2, 6]);
    assert!(!err.is_syntax_error());
    assert!(err.to_string().ends_with("2 $ 3 ?\n  ^   ^"));
}

#[test]
fn identifiers_are_not_keywords_until_inserted() {
    let mut tokenizer = tokenizer();
    assert!(tokenizer.tokenize("x + 1").is_err());
    assert_eq!(tokenizer.tokenize_lossy("x + 1"), ["+", "1"]);

    assert!(tokenizer.insert_keyword("x"));
    assert!(tokenizer.is_keyword("x"));
    assert_eq!(tokenizer.tokenize("x + 1").unwrap(), ["x", "+", "1"]);

    assert!(tokenizer.remove_keyword("x"));
    assert!(tokenizer.tokenize("x + 1").is_err());
}
