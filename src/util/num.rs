use crate::{error::RuntimeError, interpreter::evaluator::core::EvalResult};

/// Largest integer value exactly representable as an `f64` (`2^53 - 1`).
pub const MAX_SAFE_U64_INT: u64 = 9_007_199_254_740_991;
/// Largest signed integer exactly representable as an `f64` (`2^53 - 1`).
pub const MAX_SAFE_I64_INT: i64 = 9_007_199_254_740_991;

/// Safely converts a `u64` to `f64` if and only if it is exactly representable.
///
/// ## Errors
/// Returns `RuntimeError::LiteralTooLarge` if the value exceeds
/// `MAX_SAFE_U64_INT`.
///
/// ## Example
/// ```
/// use calctree::{
///     error::RuntimeError,
///     util::num::{MAX_SAFE_U64_INT, u64_to_f64_checked},
/// };
///
/// assert_eq!(u64_to_f64_checked(1234, "!").unwrap(), 1234.0);
///
/// let err = u64_to_f64_checked(MAX_SAFE_U64_INT + 1, "!").unwrap_err();
/// assert!(matches!(err, RuntimeError::LiteralTooLarge { .. }));
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn u64_to_f64_checked(value: u64, origin: &str) -> EvalResult<f64> {
    if value > MAX_SAFE_U64_INT {
        return Err(RuntimeError::LiteralTooLarge { origin: origin.to_string() });
    }

    Ok(value as f64)
}

/// Safely converts an `f64` to `u64` if the value is finite, non-negative,
/// within range, and not fractional.
///
/// ## Errors
/// Returns an error for non-finite, negative, out-of-range, or fractional
/// values.
///
/// ## Example
/// ```
/// use calctree::{error::RuntimeError, util::num::f64_to_u64_checked};
///
/// assert_eq!(f64_to_u64_checked(7.0, "!").unwrap(), 7);
///
/// let err = f64_to_u64_checked(1.23, "!").unwrap_err();
/// assert!(matches!(err, RuntimeError::RealIsFractional { .. }));
/// ```
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_sign_loss)]
pub fn f64_to_u64_checked(value: f64, origin: &str) -> EvalResult<u64> {
    if !value.is_finite() {
        return Err(RuntimeError::InvalidArgument { details: format!("cannot convert non-finite value {value} to an integer"),
                                                   origin:  origin.to_string(), });
    }
    if value < 0.0 || value > MAX_SAFE_U64_INT as f64 {
        return Err(RuntimeError::LiteralTooLarge { origin: origin.to_string() });
    }
    if value.fract() != 0.0 {
        return Err(RuntimeError::RealIsFractional { origin: origin.to_string() });
    }
    Ok(value as u64)
}

/// Truncates an `f64` towards zero and converts it to a memory-cell address.
///
/// Unlike [`f64_to_u64_checked`], fractional values are accepted: `2.9`
/// addresses cell `2` and `-1.5` addresses cell `-1`.
///
/// ## Errors
/// Returns an error for non-finite values or values outside the exactly
/// representable integer range.
///
/// ## Example
/// ```
/// use calctree::util::num::f64_to_address;
///
/// assert_eq!(f64_to_address(2.9, "mem").unwrap(), 2);
/// assert_eq!(f64_to_address(-1.5, "mem").unwrap(), -1);
/// assert!(f64_to_address(f64::NAN, "mem").is_err());
/// ```
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
pub fn f64_to_address(value: f64, origin: &str) -> EvalResult<i64> {
    if !value.is_finite() {
        return Err(RuntimeError::InvalidArgument { details: format!("{value} is not a valid address"),
                                                   origin:  origin.to_string(), });
    }
    let truncated = value.trunc();
    if truncated.abs() > MAX_SAFE_I64_INT as f64 {
        return Err(RuntimeError::LiteralTooLarge { origin: origin.to_string() });
    }
    Ok(truncated as i64)
}

/// Returns `true` if `text` is a strict numeric literal: an optional leading
/// `-`, digits with at most one decimal point, and at least one digit.
///
/// Words such as `inf` or `NaN`, which `f64::from_str` would accept, are not
/// literals.
///
/// ## Example
/// ```
/// use calctree::util::num::is_numeric_literal;
///
/// assert!(is_numeric_literal("3.5"));
/// assert!(is_numeric_literal("-.5"));
/// assert!(!is_numeric_literal("."));
/// assert!(!is_numeric_literal("-"));
/// assert!(!is_numeric_literal("inf"));
/// ```
#[must_use]
pub fn is_numeric_literal(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let mut digits = 0;
    let mut points = 0;
    for c in unsigned.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return false,
        }
    }
    digits > 0 && points <= 1
}

/// Formats a number the way it is written back into a tree.
///
/// The output is the shortest text that parses back to exactly the same
/// `f64`, so materialized number nodes reproduce their values bit for bit.
#[must_use]
pub fn format_number(value: f64) -> String {
    format!("{value}")
}
