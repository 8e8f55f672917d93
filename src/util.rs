/// Numeric conversion helpers.
///
/// This module provides safe functions for converting between `f64` and the
/// integer types the interpreter needs (factorial operands, memory-cell
/// addresses), recognizing strict numeric literals, and formatting numbers so
/// that they parse back exactly.
///
/// All conversions return a `Result`, which is `Ok` if the conversion is
/// valid, or a `RuntimeError` tagged with the requesting operator otherwise.
pub mod num;
