use crate::interpreter::types::core::RuntimeType;

#[derive(Debug, Clone, PartialEq)]
/// Represents all errors that can occur during type inference and evaluation.
///
/// Variants that wrap a `cause` form a chain which is exposed through
/// [`std::error::Error::source`], so a front-end can print every layer of a
/// failure.
pub enum RuntimeError {
    /// An operand or argument had a structurally different type than the
    /// operator or function declares.
    TypeMismatch {
        /// The declared parameter type.
        expected: RuntimeType,
        /// The type that was actually supplied.
        found:    RuntimeType,
        /// The operator or function that performed the check.
        origin:   String,
    },
    /// A function was applied to the wrong number of arguments.
    ArgumentCountMismatch {
        /// The declared parameter count.
        expected: usize,
        /// The number of supplied arguments.
        found:    usize,
        /// The function that performed the check.
        origin:   String,
    },
    /// A lexeme does not name any registered operator of the required
    /// notation.
    UnknownOperator {
        /// The unknown lexeme.
        lexeme: String,
    },
    /// A function's declared signature is inconsistent.
    LambdaConstruction {
        /// Details about the inconsistency.
        details: String,
        /// The function being constructed.
        origin:  String,
        /// The error that made construction fail, if any.
        cause:   Option<Box<Self>>,
    },
    /// A function body failed while being evaluated.
    LambdaEvaluation {
        /// Details about the failure (for panics, the panic message).
        details: String,
        /// The function being evaluated.
        origin:  String,
        /// The nested error, if the body returned one.
        cause:   Option<Box<Self>>,
    },
    /// A tuple element could not be evaluated, or the tuple was empty.
    StorageEvaluation {
        /// The index of the failing element, if one failed.
        index: Option<usize>,
        /// The nested error raised by the element.
        cause: Option<Box<Self>>,
    },
    /// Attaches the textual value of the node at which an error surfaced.
    AtNode {
        /// The node's value.
        value: String,
        /// The error raised at that node.
        cause: Box<Self>,
    },
    /// A node handle does not point into the current arena.
    DanglingNode {
        /// The handle's index.
        index: usize,
    },
    /// A numeric literal node holds text that is not a number.
    InvalidNumber {
        /// The literal text.
        text: String,
    },
    /// A numeric value was expected, but not found.
    ExpectedNumber {
        /// The operator that required the number.
        origin: String,
    },
    /// A node pointer was expected, but not found.
    ExpectedPointer {
        /// The operator that required the pointer.
        origin: String,
    },
    /// Attempted division by zero.
    DivisionByZero {
        /// The operator that divided.
        origin: String,
    },
    /// An argument was invalid or out of range.
    InvalidArgument {
        /// Details about why the argument is invalid.
        details: String,
        /// The operator that rejected the argument.
        origin:  String,
    },
    /// A value was too large to be represented safely.
    LiteralTooLarge {
        /// The operator that performed the conversion.
        origin: String,
    },
    /// Tried to use a fractional number where an integer was required.
    RealIsFractional {
        /// The operator that performed the conversion.
        origin: String,
    },
}

impl RuntimeError {
    /// Returns `true` if this error, or the error it wraps at a node, is a
    /// structural type error (including arity mismatches and unknown
    /// operators met during inference).
    #[must_use]
    pub fn is_type_error(&self) -> bool {
        match self {
            Self::TypeMismatch { .. }
            | Self::ArgumentCountMismatch { .. }
            | Self::UnknownOperator { .. } => true,
            Self::AtNode { cause, .. } => cause.is_type_error(),
            _ => false,
        }
    }

    /// Follows the chain of wrapped errors down to the deepest one.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        while let Some(next) = current.cause() {
            current = next;
        }
        current
    }

    /// The tag naming the operator, function or node that raised this error.
    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        match self {
            Self::TypeMismatch { origin, .. }
            | Self::ArgumentCountMismatch { origin, .. }
            | Self::LambdaConstruction { origin, .. }
            | Self::LambdaEvaluation { origin, .. }
            | Self::ExpectedNumber { origin }
            | Self::ExpectedPointer { origin }
            | Self::DivisionByZero { origin }
            | Self::InvalidArgument { origin, .. }
            | Self::LiteralTooLarge { origin }
            | Self::RealIsFractional { origin } => Some(origin),
            Self::UnknownOperator { lexeme } => Some(lexeme),
            Self::AtNode { value, .. } => Some(value),
            Self::StorageEvaluation { .. } => Some("storage"),
            Self::DanglingNode { .. } | Self::InvalidNumber { .. } => None,
        }
    }

    /// Wraps `self` with the textual value of the node where it surfaced.
    #[must_use]
    pub fn at_node(self, value: &str) -> Self {
        Self::AtNode { value: value.to_string(),
                       cause: Box::new(self), }
    }

    fn cause(&self) -> Option<&Self> {
        match self {
            Self::LambdaConstruction { cause, .. }
            | Self::LambdaEvaluation { cause, .. }
            | Self::StorageEvaluation { cause, .. } => cause.as_deref(),
            Self::AtNode { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeMismatch { expected,
                                 found,
                                 origin, } => write!(f,
                                                     "Type error in '{origin}': expected {expected}, found {found}."),
            Self::ArgumentCountMismatch { expected,
                                          found,
                                          origin, } => write!(f,
                                                              "Type error in '{origin}': expected {expected} argument(s), found {found}."),
            Self::UnknownOperator { lexeme } => {
                write!(f, "Type error: '{lexeme}' is not a registered operator.")
            },
            Self::LambdaConstruction { details, origin, .. } => {
                write!(f, "Cannot construct function '{origin}': {details}.")
            },
            Self::LambdaEvaluation { details, origin, .. } => {
                write!(f, "Evaluation of function '{origin}' failed: {details}.")
            },
            Self::StorageEvaluation { index: Some(index),
                                      .. } => write!(f, "Cannot evaluate tuple element {index}."),
            Self::StorageEvaluation { index: None, .. } => {
                write!(f, "Cannot evaluate nothing: the tuple is empty.")
            },
            Self::AtNode { value, cause } => write!(f, "{cause} (at '{value}')"),
            Self::DanglingNode { index } => {
                write!(f, "Node {index} does not exist in the current arena.")
            },
            Self::InvalidNumber { text } => write!(f, "'{text}' is not a valid number."),
            Self::ExpectedNumber { origin } => write!(f, "'{origin}' expected a number."),
            Self::ExpectedPointer { origin } => write!(f, "'{origin}' expected a node pointer."),
            Self::DivisionByZero { origin } => write!(f, "Division by zero in '{origin}'."),
            Self::InvalidArgument { details, origin } => {
                write!(f, "Invalid argument to '{origin}': {details}.")
            },
            Self::LiteralTooLarge { origin } => {
                write!(f, "Value passed to '{origin}' is too large.")
            },
            Self::RealIsFractional { origin } => write!(f,
                                                        "Value passed to '{origin}' is fractional and cannot be used as an integer."),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause().map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}
