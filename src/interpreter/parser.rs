/// Core parser state, readiness checks and the text-to-tree pipeline.
pub mod core;

/// Numeric literal reassembly.
///
/// Joins digit runs, decimal points and leading signs back into single
/// numeric lexemes, deciding from the preceding lexeme whether a `-` is a sign
/// or a subtraction.
pub mod numbers;

/// Shunting-yard tree construction.
///
/// Builds operator trees under the configured levels and fixities, with
/// grouping brackets, postfix operand binding and application of callees to
/// tuple literals.
pub mod tree;

/// Tuple and function literals.
///
/// Splits the verbatim body of a raw bracket region into elements or into a
/// parameter header and a body expression, and parses each part as a nested
/// expression.
pub mod literal;

/// Parameter declarations and type annotations.
pub mod declaration;
