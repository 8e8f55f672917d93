use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// The closed set of base kinds.
///
/// `Number` and `NodePointer` are user-visible types. `Tuple` and `Function`
/// tag compound types, and `AnyTuple` is the wildcard parameter type of
/// variadic native operators: it accepts every tuple shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BaseType {
    /// A floating-point number.
    Number,
    /// A reference to a node of the arena.
    NodePointer,
    /// Marker kind of tuple compound types.
    Tuple,
    /// Marker kind of function compound types.
    Function,
    /// Wildcard accepting any tuple.
    AnyTuple,
}

/// A type built from other types.
///
/// A tuple lists its element types in order. A function always has exactly
/// two children: its return type and its parameter type.
#[derive(Debug, Clone)]
pub struct CompoundType {
    kind:     BaseType,
    children: Vec<RuntimeType>,
    hash:     u64,
}

impl CompoundType {
    /// `Tuple` or `Function`.
    #[must_use]
    pub const fn kind(&self) -> BaseType {
        self.kind
    }

    /// The child types.
    #[must_use]
    pub fn children(&self) -> &[RuntimeType] {
        &self.children
    }
}

/// A structural type.
///
/// Two types are equal when they have the same shape. Every type carries a
/// structural hash computed bottom-up when it is built; equality compares the
/// hashes first and only falls back to walking both structures when they
/// agree, so a hash collision can never make two different shapes equal.
///
/// # Example
/// ```
/// use calctree::interpreter::types::core::RuntimeType;
///
/// let a = RuntimeType::tuple(vec![RuntimeType::number(), RuntimeType::pointer()]);
/// let b = RuntimeType::tuple(vec![RuntimeType::number(), RuntimeType::pointer()]);
///
/// assert_eq!(a, b);
/// assert_eq!(a.structural_hash(), b.structural_hash());
/// assert_eq!(a.to_string(), "[Number, Pointer]");
/// ```
#[derive(Debug, Clone)]
pub enum RuntimeType {
    /// A base kind.
    Base(BaseType),
    /// A tuple or function type.
    Compound(CompoundType),
}

impl RuntimeType {
    /// The number type.
    #[must_use]
    pub const fn number() -> Self {
        Self::Base(BaseType::Number)
    }

    /// The node pointer type.
    #[must_use]
    pub const fn pointer() -> Self {
        Self::Base(BaseType::NodePointer)
    }

    /// The wildcard accepting any tuple.
    #[must_use]
    pub const fn any_tuple() -> Self {
        Self::Base(BaseType::AnyTuple)
    }

    /// A tuple of the given element types.
    #[must_use]
    pub fn tuple(children: Vec<Self>) -> Self {
        Self::compound(BaseType::Tuple, children)
    }

    /// A function returning `returns` and taking `params`.
    #[must_use]
    pub fn function(returns: Self, params: Self) -> Self {
        Self::compound(BaseType::Function, vec![returns, params])
    }

    /// The parameter type of a function taking arguments of `types`: the sole
    /// type itself for one argument, a tuple of them otherwise.
    #[must_use]
    pub fn params_of(mut types: Vec<Self>) -> Self {
        if types.len() == 1 {
            types.remove(0)
        } else {
            Self::tuple(types)
        }
    }

    fn compound(kind: BaseType, children: Vec<Self>) -> Self {
        let mut hasher = FxHasher::default();
        kind.hash(&mut hasher);
        children.len().hash(&mut hasher);
        for child in &children {
            hasher.write_u64(child.structural_hash());
        }
        Self::Compound(CompoundType { kind,
                                      children,
                                      hash: hasher.finish() })
    }

    /// The structural hash of this type.
    #[must_use]
    pub fn structural_hash(&self) -> u64 {
        match self {
            Self::Base(base) => {
                let mut hasher = FxHasher::default();
                base.hash(&mut hasher);
                hasher.finish()
            },
            Self::Compound(compound) => compound.hash,
        }
    }

    /// The base kind of this type; `Tuple` or `Function` for compounds.
    #[must_use]
    pub const fn kind(&self) -> BaseType {
        match self {
            Self::Base(base) => *base,
            Self::Compound(compound) => compound.kind,
        }
    }

    /// Returns `true` for tuple types (not for the wildcard).
    #[must_use]
    pub const fn is_tuple(&self) -> bool {
        matches!(self, Self::Compound(CompoundType { kind: BaseType::Tuple, .. }))
    }

    /// Returns `true` for function types.
    #[must_use]
    pub const fn is_function(&self) -> bool {
        matches!(self, Self::Compound(CompoundType { kind: BaseType::Function, .. }))
    }

    /// The element types of a tuple type.
    #[must_use]
    pub fn elements(&self) -> Option<&[Self]> {
        match self {
            Self::Compound(compound) if compound.kind == BaseType::Tuple => Some(&compound.children),
            _ => None,
        }
    }

    /// The return type of a function type.
    #[must_use]
    pub fn return_type(&self) -> Option<&Self> {
        match self {
            Self::Compound(compound) if compound.kind == BaseType::Function => compound.children.first(),
            _ => None,
        }
    }

    /// The parameter type of a function type.
    #[must_use]
    pub fn params_type(&self) -> Option<&Self> {
        match self {
            Self::Compound(compound) if compound.kind == BaseType::Function => compound.children.get(1),
            _ => None,
        }
    }

    /// Returns `true` if a value of type `found` may be passed where `self`
    /// is declared: the types are equal, or `self` is the wildcard and
    /// `found` is a tuple.
    #[must_use]
    pub fn accepts(&self, found: &Self) -> bool {
        self == found || (matches!(self, Self::Base(BaseType::AnyTuple)) && found.is_tuple())
    }

    /// Returns `true` if arguments of `types` may be passed to a function
    /// whose parameter type is `self`.
    ///
    /// A single argument is checked against `self` directly; several
    /// arguments are checked as one tuple.
    ///
    /// # Example
    /// ```
    /// use calctree::interpreter::types::core::RuntimeType;
    ///
    /// let number = RuntimeType::number();
    /// let pair = RuntimeType::tuple(vec![number.clone(), number.clone()]);
    ///
    /// assert!(pair.accepts_arguments(&[number.clone(), number.clone()]));
    /// assert!(RuntimeType::any_tuple().accepts_arguments(&[number.clone(), pair.clone()]));
    /// assert!(!number.accepts_arguments(&[pair]));
    /// ```
    #[must_use]
    pub fn accepts_arguments(&self, types: &[Self]) -> bool {
        match types {
            [single] => self.accepts(single),
            _ => self.accepts(&Self::tuple(types.to_vec())),
        }
    }
}

impl PartialEq for RuntimeType {
    fn eq(&self, other: &Self) -> bool {
        if self.structural_hash() != other.structural_hash() {
            return false;
        }
        match (self, other) {
            (Self::Base(a), Self::Base(b)) => a == b,
            (Self::Compound(a), Self::Compound(b)) => a.kind == b.kind && a.children == b.children,
            _ => false,
        }
    }
}

impl Eq for RuntimeType {}

impl Hash for RuntimeType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.structural_hash());
    }
}

impl std::fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base(BaseType::Number) => write!(f, "Number"),
            Self::Base(BaseType::NodePointer) => write!(f, "Pointer"),
            Self::Base(BaseType::Tuple) => write!(f, "Tuple"),
            Self::Base(BaseType::Function) => write!(f, "Function"),
            Self::Base(BaseType::AnyTuple) => write!(f, "[..]"),
            Self::Compound(compound) => match compound.kind {
                BaseType::Function => match compound.children.as_slice() {
                    [returns, params] => write!(f, "fn {params} -> {returns}"),
                    _ => write!(f, "fn ?"),
                },
                _ => {
                    write!(f, "[")?;
                    for (index, child) in compound.children.iter().enumerate() {
                        if index > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{child}")?;
                    }
                    write!(f, "]")
                },
            },
        }
    }
}
