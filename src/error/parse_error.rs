#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can occur during lexing or parsing.
pub enum ParseError {
    /// One or more characters could not be classified by the tokenizer.
    Lexing {
        /// The original source text, with whitespace flattened to spaces.
        text:      String,
        /// A marker line with `^` under every rejected character.
        marker:    String,
        /// Character offsets of the rejected characters.
        positions: Vec<usize>,
    },
    /// A lexeme appeared where the grammar does not allow it.
    UnexpectedLexeme {
        /// The offending lexeme.
        lexeme:  String,
        /// Details about what was expected instead.
        details: String,
    },
    /// A bracket was opened but never closed, or closed without being opened.
    UnbalancedBrackets {
        /// The bracket that could not be matched.
        bracket: String,
    },
    /// An operator did not find the operand(s) it needs.
    MissingOperand {
        /// The operator lexeme.
        operator: String,
    },
    /// The expression left more than one operand after reduction.
    DanglingOperands {
        /// The number of operands left on the stack.
        count: usize,
    },
    /// The expression (or a literal element) contains no lexemes at all.
    EmptyExpression {
        /// The construct that turned out to be empty.
        context: String,
    },
    /// A function literal's parameter declaration or a type annotation is
    /// malformed.
    InvalidDeclaration {
        /// Details about the malformed declaration.
        details: String,
    },
    /// The parser was asked to build a tree before all of its tables were
    /// configured.
    NotReady {
        /// The names of the missing tables.
        missing: Vec<&'static str>,
    },
}

impl ParseError {
    /// Returns `true` for every error raised while building a tree from
    /// lexemes, as opposed to lexing or readiness failures.
    #[must_use]
    pub const fn is_syntax_error(&self) -> bool {
        matches!(self,
                 Self::UnexpectedLexeme { .. }
                 | Self::UnbalancedBrackets { .. }
                 | Self::MissingOperand { .. }
                 | Self::DanglingOperands { .. }
                 | Self::EmptyExpression { .. }
                 | Self::InvalidDeclaration { .. })
    }

    /// The name of the operation that raised this error.
    #[must_use]
    pub const fn origin(&self) -> &'static str {
        match self {
            Self::Lexing { .. } => "tokenize",
            Self::InvalidDeclaration { .. } => "parse_declaration",
            Self::NotReady { .. } => "ready",
            _ => "build_tree",
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexing { text, marker, .. } => {
                write!(f, "Lexing error: unrecognized characters.\n{text}\n{marker}")
            },
            Self::UnexpectedLexeme { lexeme, details } => {
                write!(f, "Syntax error: unexpected lexeme '{lexeme}': {details}.")
            },
            Self::UnbalancedBrackets { bracket } => {
                write!(f, "Syntax error: unbalanced bracket '{bracket}'.")
            },
            Self::MissingOperand { operator } => {
                write!(f, "Syntax error: operator '{operator}' is missing an operand.")
            },
            Self::DanglingOperands { count } => write!(f,
                                                       "Syntax error: {count} operands are left without an operator joining them."),
            Self::EmptyExpression { context } => {
                write!(f, "Syntax error: empty {context}.")
            },
            Self::InvalidDeclaration { details } => {
                write!(f, "Syntax error: invalid declaration: {details}.")
            },
            Self::NotReady { missing } => write!(f,
                                                 "Parser is not ready: missing {}.",
                                                 missing.join(", ")),
        }
    }
}

impl std::error::Error for ParseError {}
