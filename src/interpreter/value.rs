/// The runtime value type and its conversions.
///
/// Defines [`core::Value`], a closed sum of numbers, tuples, functions and
/// node pointers, with type queries, numeric access, pointer dereferencing
/// and the memoized tree form of every value.
pub mod core;
/// Tuple values.
///
/// A tuple ("storage") is an ordered, fixed-length sequence of values of any
/// types. Its structural type is computed once when the tuple is built.
pub mod storage;
/// Function values.
///
/// A function is either a native closure supplied by the host or a lambda: a
/// function literal of the arena together with the registry it closes over.
/// Both kinds carry their notation, signature and declared types, and both
/// are applied through the same argument checks.
pub mod function;
/// Turning values back into trees.
pub mod materialize;
