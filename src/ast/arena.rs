use crate::ast::Node;

/// A handle to a node stored in an [`Arena`].
///
/// Handles are plain indices: they carry no generation, so a handle taken
/// before [`Arena::free_all`] must not be used afterwards.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePos(u32);

impl NodePos {
    /// Creates a handle from a raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The raw index of this handle.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dense, append-only storage for every AST node.
///
/// The arena is the only owner of tree structure. Nodes are never removed
/// individually; [`Arena::free_all`] wipes the whole store and bumps the
/// arena's generation so that caches keyed by node handles can tell that
/// they are stale.
#[derive(Debug, Default)]
pub struct Arena {
    nodes:      Vec<Node>,
    generation: u32,
}

impl Arena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node and returns its handle.
    ///
    /// # Panics
    /// Panics if the arena already holds `u32::MAX` nodes.
    pub fn alloc(&mut self, node: Node) -> NodePos {
        let index = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
        assert!(index < u32::MAX, "arena is full");
        self.nodes.push(node);
        NodePos(index)
    }

    /// Returns the node behind `pos`, or `None` for a dangling handle.
    #[must_use]
    pub fn get(&self, pos: NodePos) -> Option<&Node> {
        self.nodes.get(pos.index())
    }

    /// Replaces the right child of the node at `pos`, returning the previous
    /// right child.
    ///
    /// This is the only in-place edit the arena allows: it attaches an
    /// argument tuple to a function literal when the literal is applied.
    /// Returns `None` if `pos` is dangling.
    pub fn set_right(&mut self, pos: NodePos, right: Option<NodePos>) -> Option<Option<NodePos>> {
        self.nodes
            .get_mut(pos.index())
            .map(|node| std::mem::replace(&mut node.right, right))
    }

    /// Number of nodes currently allocated.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node has been allocated since creation or the
    /// last [`Arena::free_all`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Counts how many times the arena has been wiped.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Drops every node at once. All outstanding handles become invalid.
    pub fn free_all(&mut self) {
        tracing::debug!(freed = self.nodes.len(), "arena wiped");
        self.nodes.clear();
        self.generation = self.generation.wrapping_add(1);
    }
}
