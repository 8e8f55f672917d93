/// Lexing and parsing errors.
///
/// Defines all error types that can occur while tokenizing text, reassembling
/// numbers, building trees and reading parameter declarations, plus the
/// readiness failure of an unconfigured parser.
pub mod parse_error;
/// Runtime errors.
///
/// Contains all error types that can be raised during type inference,
/// function construction and evaluation. Runtime errors chain: lambda and
/// storage failures wrap the error that caused them.
pub mod runtime_error;

pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;
