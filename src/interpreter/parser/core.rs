use crate::{
    ast::{Arena, NodePos, Notation},
    error::ParseError,
    interpreter::{
        lexer::{Lexeme, Tokenizer},
        syntax::SyntaxConfig,
    },
};

/// Result type used by the tokenizer and the parser.
pub type ParseResult<T> = Result<T, ParseError>;

/// Turns lexemes into trees stored in an [`Arena`].
///
/// The parser owns its [`SyntaxConfig`] and a [`Tokenizer`] built from it.
/// Function literal bodies are re-tokenized with their parameter names added
/// as keywords, so the two are kept in sync by every mutating method.
///
/// # Example
/// ```
/// use calctree::{
///     ast::{Arena, tree_to_string},
///     interpreter::parser::core::Parser,
/// };
///
/// let mut arena = Arena::new();
/// let mut parser = Parser::standard();
/// let root = parser.parse("3 + 4 * 2", &mut arena).unwrap();
///
/// assert_eq!(tree_to_string(&arena, root), "(3 + (4 * 2))");
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    pub(super) config:    SyntaxConfig,
    pub(super) tokenizer: Tokenizer,
}

impl Parser {
    /// Creates a parser for `config`.
    #[must_use]
    pub fn new(config: SyntaxConfig) -> Self {
        let tokenizer = Tokenizer::new(&config);
        Self { config, tokenizer }
    }

    /// Creates a parser for the standard calculator syntax.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(SyntaxConfig::standard())
    }

    /// Checks that every table needed to build trees has been configured.
    ///
    /// # Errors
    /// Returns `ParseError::NotReady` naming the missing tables.
    pub fn ready(&self) -> ParseResult<()> {
        let missing = self.config.missing_tables();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ParseError::NotReady { missing })
        }
    }

    /// The syntax tables this parser uses.
    #[must_use]
    pub const fn config(&self) -> &SyntaxConfig {
        &self.config
    }

    /// The tokenizer this parser re-lexes literal bodies with.
    #[must_use]
    pub const fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Tokenizes `text` with this parser's tokenizer.
    pub fn tokenize(&self, text: &str) -> ParseResult<Vec<Lexeme>> {
        self.tokenizer.tokenize(text)
    }

    /// Adds an operator to the level and fixity tables and to the tokenizer's
    /// keywords.
    pub fn register_operator(&mut self, lexeme: &str, notation: Notation, level: u8) {
        tracing::debug!(lexeme, %notation, level, "operator added to syntax");
        self.config.set_operator(lexeme, notation, level);
        self.tokenizer.insert_keyword(lexeme);
    }

    /// Runs the whole front-end: readiness check, tokenization, number
    /// reassembly and tree construction.
    ///
    /// # Returns
    /// The handle of the root node.
    ///
    /// # Errors
    /// Returns the first lexing, readiness or syntax error met.
    pub fn parse(&mut self, text: &str, arena: &mut Arena) -> ParseResult<NodePos> {
        self.ready()?;
        let lexemes = self.tokenize(text)?;
        let merged = self.merge_numbers(&lexemes);
        self.build_tree(&merged, arena)
    }

    /// Parses a nested expression (a literal element or a function body)
    /// without the readiness check.
    pub(super) fn parse_fragment(&mut self, text: &str, arena: &mut Arena) -> ParseResult<NodePos> {
        let lexemes = self.tokenize(text)?;
        let merged = self.merge_numbers(&lexemes);
        self.build_fragment(&merged, arena)
    }
}
