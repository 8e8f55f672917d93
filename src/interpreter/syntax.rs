use std::collections::{BTreeSet, HashMap, HashSet};

use crate::{
    ast::{NodeState, Notation},
    interpreter::evaluator::catalog::builtin_operators,
};

/// A bracket pair whose body is captured verbatim by the tokenizer and
/// parsed by the parser into a tuple or function literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBracket {
    /// The opening delimiter, e.g. `[`.
    pub open:  String,
    /// The closing delimiter, e.g. `]`.
    pub close: String,
    /// The kind of literal the body builds: `Tuple` or `Function`.
    pub state: NodeState,
}

/// Every table the tokenizer and parser consume, supplied as explicit data.
///
/// `SyntaxConfig::new()` is empty and leaves the parser not ready;
/// [`SyntaxConfig::standard`] describes the standard calculator syntax with
/// the built-in operator catalog.
#[derive(Debug, Clone, Default)]
pub struct SyntaxConfig {
    brackets:            Vec<(String, String)>,
    raw_brackets:        Vec<RawBracket>,
    levels:              HashMap<String, u8>,
    fixities:            HashMap<String, Notation>,
    separators:          HashSet<char>,
    keywords:            BTreeSet<String>,
    list_separator:      String,
    parameter_separator: String,
}

impl SyntaxConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self { list_separator: ",".to_string(),
               parameter_separator: "|".to_string(),
               ..Self::default() }
    }

    /// The standard calculator syntax.
    ///
    /// - separators: space, tab, carriage return and newline;
    /// - grouping brackets: `(` `)`;
    /// - tuple literals: `[a, b, c]`;
    /// - function literals: `{x: Number, y | body}`;
    /// - `.` as a keyword so decimal points survive tokenization;
    /// - every operator of the built-in catalog with its notation and level.
    #[must_use]
    pub fn standard() -> Self {
        let mut config = Self::new().with_separators([' ', '\t', '\r', '\n'])
                                    .with_bracket("(", ")")
                                    .with_raw_bracket("[", "]", NodeState::Tuple)
                                    .with_raw_bracket("{", "}", NodeState::Function)
                                    .with_keyword(".");
        for operator in builtin_operators() {
            config.set_operator(operator.lexeme, operator.notation, operator.level);
        }
        config
    }

    /// Adds separator characters.
    #[must_use]
    pub fn with_separators(mut self, separators: impl IntoIterator<Item = char>) -> Self {
        self.separators.extend(separators);
        self
    }

    /// Adds a grouping bracket pair.
    #[must_use]
    pub fn with_bracket(mut self, open: &str, close: &str) -> Self {
        self.brackets.push((open.to_string(), close.to_string()));
        self
    }

    /// Adds a raw-expression bracket pair building literals of `state`.
    #[must_use]
    pub fn with_raw_bracket(mut self, open: &str, close: &str, state: NodeState) -> Self {
        self.raw_brackets.push(RawBracket { open: open.to_string(),
                                            close: close.to_string(),
                                            state });
        self
    }

    /// Adds an operator with its notation and precedence level.
    #[must_use]
    pub fn with_operator(mut self, lexeme: &str, notation: Notation, level: u8) -> Self {
        self.set_operator(lexeme, notation, level);
        self
    }

    /// Adds a bare keyword: a lexeme the tokenizer recognizes without it
    /// being an operator or bracket.
    #[must_use]
    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.keywords.insert(keyword.to_string());
        self
    }

    /// Sets the separator between tuple elements and between parameter
    /// declarations.
    #[must_use]
    pub fn with_list_separator(mut self, separator: &str) -> Self {
        self.list_separator = separator.to_string();
        self
    }

    /// Sets the separator between a function literal's parameter
    /// declarations and its body.
    #[must_use]
    pub fn with_parameter_separator(mut self, separator: &str) -> Self {
        self.parameter_separator = separator.to_string();
        self
    }

    /// Registers (or re-registers) an operator in the level and fixity
    /// tables.
    pub fn set_operator(&mut self, lexeme: &str, notation: Notation, level: u8) {
        self.levels.insert(lexeme.to_string(), level);
        self.fixities.insert(lexeme.to_string(), notation);
    }

    /// Replaces the fixity of `lexeme`, returning the previous one. Passing
    /// `None` removes the entry.
    pub fn replace_fixity(&mut self, lexeme: &str, fixity: Option<Notation>) -> Option<Notation> {
        match fixity {
            Some(notation) => self.fixities.insert(lexeme.to_string(), notation),
            None => self.fixities.remove(lexeme),
        }
    }

    /// The notation registered for `lexeme`.
    #[must_use]
    pub fn fixity(&self, lexeme: &str) -> Option<Notation> {
        self.fixities.get(lexeme).copied()
    }

    /// The precedence level registered for `lexeme`.
    #[must_use]
    pub fn level(&self, lexeme: &str) -> Option<u8> {
        self.levels.get(lexeme).copied()
    }

    /// Returns `true` if `lexeme` opens a grouping bracket.
    #[must_use]
    pub fn is_open_bracket(&self, lexeme: &str) -> bool {
        self.brackets.iter().any(|(open, _)| open == lexeme)
    }

    /// Returns `true` if `lexeme` closes a grouping bracket.
    #[must_use]
    pub fn is_close_bracket(&self, lexeme: &str) -> bool {
        self.brackets.iter().any(|(_, close)| close == lexeme)
    }

    /// The closing bracket matching the grouping bracket `open`.
    #[must_use]
    pub fn closing_bracket(&self, open: &str) -> Option<&str> {
        self.brackets
            .iter()
            .find(|(candidate, _)| candidate == open)
            .map(|(_, close)| close.as_str())
    }

    /// The raw-expression bracket opened by `lexeme`.
    #[must_use]
    pub fn raw_bracket(&self, lexeme: &str) -> Option<&RawBracket> {
        self.raw_brackets.iter().find(|raw| raw.open == lexeme)
    }

    /// Returns `true` if `lexeme` opens a raw-expression bracket whose body is
    /// a tuple literal.
    #[must_use]
    pub fn opens_tuple(&self, lexeme: &str) -> bool {
        self.raw_bracket(lexeme)
            .is_some_and(|raw| raw.state == NodeState::Tuple)
    }

    /// All raw-expression bracket pairs.
    #[must_use]
    pub fn raw_brackets(&self) -> &[RawBracket] {
        &self.raw_brackets
    }

    /// All grouping bracket pairs.
    #[must_use]
    pub fn brackets(&self) -> &[(String, String)] {
        &self.brackets
    }

    /// The separator characters.
    #[must_use]
    pub const fn separators(&self) -> &HashSet<char> {
        &self.separators
    }

    /// The tuple element separator.
    #[must_use]
    pub fn list_separator(&self) -> &str {
        &self.list_separator
    }

    /// The separator between parameters and body of a function literal.
    #[must_use]
    pub fn parameter_separator(&self) -> &str {
        &self.parameter_separator
    }

    /// Every lexeme the tokenizer must recognize: bare keywords, both sides
    /// of every bracket pair and every operator.
    #[must_use]
    pub fn keywords(&self) -> BTreeSet<String> {
        let mut keywords = self.keywords.clone();
        for (open, close) in &self.brackets {
            keywords.insert(open.clone());
            keywords.insert(close.clone());
        }
        for raw in &self.raw_brackets {
            keywords.insert(raw.open.clone());
            keywords.insert(raw.close.clone());
        }
        keywords.extend(self.fixities.keys().cloned());
        keywords
    }

    /// Names of the tables that still have to be configured before trees can
    /// be built.
    #[must_use]
    pub fn missing_tables(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.brackets.is_empty() {
            missing.push("bracket table");
        }
        if self.levels.is_empty() {
            missing.push("operator level table");
        }
        if self.fixities.is_empty() {
            missing.push("operator fixity table");
        }
        if self.raw_brackets.is_empty() {
            missing.push("raw bracket table");
        }
        missing
    }
}
