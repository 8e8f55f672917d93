//! # calctree
//!
//! calctree is an embeddable expression interpreter written in Rust.
//! It tokenizes, parses, type-checks and evaluates expressions with
//! configurable operators, tuples, first-class lambdas with closures, node
//! pointers and addressable memory cells.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use std::error::Error;

use crate::{
    ast::{Arena, NodePos, tree_to_string},
    interpreter::{
        evaluator::{
            core::{EvalResult, Evaluator},
            memory::MemoryCells,
        },
        lexer::Lexeme,
        parser::core::{ParseResult, Parser},
        types::{core::RuntimeType, infer::TypeCache},
        value::{core::Value, function::Function},
    },
};

/// Defines the structure of parsed expressions.
///
/// This module declares the arena node type and the synthetic node values
/// the parser and the evaluator agree on. Trees are stored in an
/// append-only [`ast::Arena`] and referenced through [`ast::NodePos`]
/// handles.
///
/// # Responsibilities
/// - Defines nodes, notations and node states.
/// - Owns the arena and its generation counter.
/// - Renders trees as parenthesized-by-fixity text.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised during lexing, parsing,
/// inference or evaluation. Runtime errors carry the operator that raised
/// them and chain the errors that caused them.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (lexer, parser, evaluator).
/// - Attaches origin tags and node values for context.
/// - Exposes wrapped causes through `std::error::Error::source`.
pub mod error;
/// Orchestrates the entire process of expression evaluation.
///
/// This module ties together the tokenizer, the parser, the type system, the
/// value representations and the evaluator.
///
/// # Responsibilities
/// - Coordinates all core components: tokenizer, parser, inference and
///   evaluator.
/// - Provides the configuration tables of the standard syntax.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// General utilities for safe numeric conversion and helpers.
///
/// This module provides conversions between integers, addresses and `f64`
/// that never lose data silently, and the number formatting shared by value
/// display and tree materialization.
pub mod util;

/// An interpreter session.
///
/// Owns one arena, one set of memory cells, a parser, an evaluator and a
/// type cache, and keeps the parser's syntax tables and the evaluator's
/// registry in sync when operators are added. Memory cells survive
/// [`Calculator::free_all`]; trees and node pointers do not.
///
/// # Example
/// ```
/// use calctree::{Calculator, interpreter::value::core::Value};
///
/// let mut calc = Calculator::new().unwrap();
///
/// assert_eq!(calc.evaluate_str("2 ^ 3 ^ 2").unwrap(), Value::from(64.0));
/// assert_eq!(calc.evaluate_str("{x, y | x * y}[6, 7]").unwrap(), Value::from(42.0));
///
/// calc.evaluate_str("1 <- 5").unwrap();
/// calc.free_all();
/// assert_eq!(calc.evaluate_str("1 mem").unwrap(), Value::from(5.0));
/// ```
#[derive(Debug)]
pub struct Calculator {
    arena:     Arena,
    memory:    MemoryCells,
    parser:    Parser,
    evaluator: Evaluator,
    types:     TypeCache,
}

impl Calculator {
    /// Creates a session with the standard syntax and the built-in operator
    /// catalog.
    pub fn new() -> EvalResult<Self> {
        Ok(Self { arena:     Arena::new(),
                  memory:    MemoryCells::new(),
                  parser:    Parser::standard(),
                  evaluator: Evaluator::with_builtins()?,
                  types:     TypeCache::new(), })
    }

    /// Tokenizes `text` and reassembles its numbers.
    ///
    /// # Example
    /// ```
    /// use calctree::Calculator;
    ///
    /// let calc = Calculator::new().unwrap();
    /// assert_eq!(calc.tokens("12+3.5*2").unwrap(), ["12", "+", "3.5", "*", "2"]);
    /// ```
    pub fn tokens(&self, text: &str) -> ParseResult<Vec<Lexeme>> {
        let lexemes = self.parser.tokenize(text)?;
        Ok(self.parser.merge_numbers(&lexemes))
    }

    /// Parses `text` into the session's arena.
    pub fn parse(&mut self, text: &str) -> ParseResult<NodePos> {
        self.parser.parse(text, &mut self.arena)
    }

    /// Infers the type of the tree at `root`.
    pub fn infer(&mut self, root: NodePos) -> EvalResult<RuntimeType> {
        self.evaluator.infer(&self.arena, root, &mut self.types)
    }

    /// Evaluates the tree at `root`.
    pub fn evaluate(&mut self, root: NodePos) -> EvalResult<Value> {
        self.evaluator.evaluate(&mut self.arena, &mut self.memory, root)
    }

    /// Parses and type-checks `text`, returning its type.
    pub fn infer_str(&mut self, text: &str) -> Result<RuntimeType, Box<dyn Error>> {
        let root = self.parse(text)?;
        Ok(self.infer(root)?)
    }

    /// Parses, type-checks and evaluates `text`.
    ///
    /// Type errors are reported before anything is evaluated, so a rejected
    /// expression never writes a memory cell.
    pub fn evaluate_str(&mut self, text: &str) -> Result<Value, Box<dyn Error>> {
        let root = self.parse(text)?;
        self.infer(root)?;
        Ok(self.evaluate(root)?)
    }

    /// Renders the tree at `root` as parenthesized-by-fixity text.
    #[must_use]
    pub fn tree_text(&self, root: NodePos) -> String {
        tree_to_string(&self.arena, root)
    }

    /// Renders `value` for display. Functions show their tree form, other
    /// values their plain text.
    pub fn render(&mut self, value: &Value) -> String {
        if value.as_function().is_some() {
            let tree = value.tree(&mut self.arena);
            tree_to_string(&self.arena, tree)
        } else {
            value.to_string()
        }
    }

    /// Registers `function` as an operator at precedence `level`: the
    /// evaluator's registry, the parser's level and fixity tables and the
    /// tokenizer's keywords all learn the new lexeme.
    ///
    /// # Errors
    /// Returns `RuntimeError::LambdaConstruction` if the function is unnamed
    /// or its parameter count does not fit its notation.
    ///
    /// # Example
    /// ```
    /// use calctree::{
    ///     Calculator,
    ///     ast::Notation,
    ///     interpreter::{types::core::RuntimeType, value::{core::Value, function::Function}},
    /// };
    ///
    /// let mut calc = Calculator::new().unwrap();
    /// let square = Function::native("sq",
    ///                               Notation::Postfix,
    ///                               RuntimeType::number(),
    ///                               RuntimeType::number(),
    ///                               1,
    ///                               |_, args| {
    ///                                   let x = args[0].as_number("sq")?;
    ///                                   Ok(Value::from(x * x))
    ///                               })
    ///                 .unwrap();
    /// calc.register_operator(square, 9).unwrap();
    ///
    /// assert_eq!(calc.evaluate_str("1 + 3 sq").unwrap(), Value::from(10.0));
    /// ```
    pub fn register_operator(&mut self, function: Function, level: u8) -> EvalResult<()> {
        let notation = function.notation();
        let lexeme = function.signature().map(ToString::to_string);
        self.evaluator.register(function)?;
        if let Some(lexeme) = lexeme {
            self.parser.register_operator(&lexeme, notation, level);
        }
        self.types.clear();
        Ok(())
    }

    /// The session's arena.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// The session's memory cells.
    #[must_use]
    pub const fn memory(&self) -> &MemoryCells {
        &self.memory
    }

    /// The session's memory cells, for the host to seed or clear.
    pub const fn memory_mut(&mut self) -> &mut MemoryCells {
        &mut self.memory
    }

    /// The session's evaluator.
    #[must_use]
    pub const fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Wipes every tree. Handles and node pointers taken before this call
    /// must not be used afterwards.
    pub fn free_all(&mut self) {
        self.arena.free_all();
        self.types.clear();
    }
}

/// Evaluates every line of `source` and returns the rendering of the last
/// result.
///
/// Blank lines and lines starting with `#` are skipped. All lines share one
/// [`Calculator`], so memory cells written by one line are visible to the
/// next; the arena is wiped between lines.
///
/// # Errors
/// Returns the first lexing, parsing, type or evaluation error, or an error
/// if `source` holds no expression.
///
/// # Examples
/// ```
/// use calctree::get_result;
///
/// assert_eq!(get_result("3 + 4 * 2").unwrap(), "11");
/// assert_eq!(get_result("2 <- 21\n2 mem * 2").unwrap(), "42");
///
/// // Unknown constant.
/// assert!(get_result("y + 1").is_err());
/// ```
pub fn get_result(source: &str) -> Result<String, Box<dyn Error>> {
    let mut calc = Calculator::new()?;
    let mut result = None;

    for line in source.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        calc.free_all();
        let value = calc.evaluate_str(line)?;
        result = Some(calc.render(&value));
    }

    result.ok_or_else(|| "nothing to evaluate".into())
}
