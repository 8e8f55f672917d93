/// Structural types, their hashes and compatibility rules.
pub mod core;

/// Static type inference over trees, memoized per node.
///
/// Inference walks a subtree with an explicit stack in post-order, resolving
/// operator leaves against an operator registry and function parameters
/// against registries shadowed with the declared parameter types.
pub mod infer;
