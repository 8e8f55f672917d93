/// Core evaluation logic and context management.
///
/// Contains the evaluation context threaded through native operators, the
/// iterative tree walk, and the [`core::Evaluator`] that owns the operator
/// registry.
pub mod core;

/// The operator registry.
///
/// Maps lexemes to functions, with one table per notation. Lambda bodies run
/// under copies of the registry extended with their parameter bindings.
pub mod registry;

/// Addressable memory cells.
///
/// A store of values keyed by integer address, owned by the host and lent to
/// every evaluation. Unlike the arena it is never wiped by
/// [`crate::ast::Arena::free_all`].
pub mod memory;

/// The built-in operator catalog.
///
/// Declares every standard operator with its notation, precedence level,
/// declared types and native body.
pub mod catalog;
