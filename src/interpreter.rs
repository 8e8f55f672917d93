/// The trie module provides the prefix dictionary behind keyword matching.
///
/// Both the keyword table and the raw-bracket delimiter table of the
/// tokenizer are tries walked one character at a time.
pub mod trie;
/// The syntax module holds the tables the tokenizer and parser consume.
///
/// Bracket pairs, raw-expression brackets, operator levels and fixities,
/// separators and keywords are all plain data supplied through a
/// [`syntax::SyntaxConfig`], never discovered at run time.
pub mod syntax;
/// The lexer module tokenizes source text for further parsing.
///
/// The tokenizer reads raw text and produces a sequence of lexemes: keywords
/// (operators and brackets), digit runs, and the verbatim bodies of
/// raw-expression brackets.
///
/// # Responsibilities
/// - Greedy keyword matching through a trie.
/// - Capturing nested raw bracket regions as single lexemes.
/// - Reporting unclassifiable characters with their positions.
pub mod lexer;
/// The parser module builds trees in the arena from lexemes.
///
/// Parsing runs in two stages: numeric literals are reassembled from digit,
/// sign and decimal point lexemes, then a shunting-yard pass builds the
/// operator tree, re-parsing tuple and function literal bodies on the way.
///
/// # Responsibilities
/// - Resolving `-` as sign or subtraction from the preceding lexeme.
/// - Honoring operator levels and fixities, with equal levels reducing left
///   to right.
/// - Building tuple chains and typed function literals.
pub mod parser;
/// The types module implements the structural type system.
///
/// Types are identified by shape alone. Every type carries a structural hash
/// computed at construction time, which serves as a fast pre-filter for
/// equality. Static inference computes the type of any subtree against an
/// operator registry.
pub mod types;
/// The value module defines the runtime values produced by evaluation.
///
/// A value is a number, a tuple, a function or a node pointer. Every value can
/// be turned back into a tree in the arena, and that tree is memoized on the
/// value.
pub mod value;
/// The evaluator module executes trees and computes results.
///
/// It owns the operator registry, walks trees iteratively, applies user
/// lambdas and native operators, and provides the built-in operator catalog
/// including the memory cell operators.
///
/// # Responsibilities
/// - Registering operators by lexeme and notation.
/// - Evaluating trees without recursing on tree depth.
/// - Converting failures of native operators into typed errors.
pub mod evaluator;
