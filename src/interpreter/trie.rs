use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
struct TrieNode {
    children: HashMap<char, TrieNode>,
    terminal: bool,
}

/// A prefix-matching dictionary of keyword strings.
///
/// The tokenizer keeps one trie for keywords and one for raw-bracket
/// delimiters, and walks them character by character with a [`Matcher`].
///
/// # Example
/// ```
/// use calctree::interpreter::trie::Trie;
///
/// let mut trie = Trie::new();
/// trie.insert("sin");
/// trie.insert("sinh");
///
/// assert!(trie.search("sin"));
/// assert!(!trie.search("si"));
/// assert_eq!(trie.longest_match("sinhx".chars()), Some(4));
/// ```
#[derive(Debug, Default, Clone)]
pub struct Trie {
    root: TrieNode,
    len:  usize,
}

impl Trie {
    /// Creates an empty trie.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `word`. Returns `true` if it was not already present.
    ///
    /// The empty word is never stored.
    pub fn insert(&mut self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }
        let mut node = &mut self.root;
        for c in word.chars() {
            node = node.children.entry(c).or_default();
        }
        let inserted = !node.terminal;
        node.terminal = true;
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Removes `word`, pruning every branch that is left without children
    /// and without a terminal mark. Returns `true` if the word was present.
    pub fn remove(&mut self, word: &str) -> bool {
        let chars: Vec<char> = word.chars().collect();
        if chars.is_empty() {
            return false;
        }
        let removed = Self::remove_from(&mut self.root, &chars).is_some();
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Returns `Some(prune)` if the word was removed below `node`, where
    /// `prune` says whether `node` itself may now be dropped by its parent.
    fn remove_from(node: &mut TrieNode, rest: &[char]) -> Option<bool> {
        let Some((first, tail)) = rest.split_first() else {
            if !node.terminal {
                return None;
            }
            node.terminal = false;
            return Some(node.children.is_empty());
        };

        let child = node.children.get_mut(first)?;
        let prune_child = Self::remove_from(child, tail)?;
        if prune_child {
            node.children.remove(first);
        }
        Some(node.children.is_empty() && !node.terminal)
    }

    /// Returns `true` if `word` was inserted (exact match only).
    #[must_use]
    pub fn search(&self, word: &str) -> bool {
        let mut matcher = self.matcher();
        word.chars().all(|c| matcher.try_advance(c)) && matcher.is_match()
    }

    /// Returns `true` if some stored word starts with `prefix`.
    #[must_use]
    pub fn has_prefix(&self, prefix: &str) -> bool {
        let mut matcher = self.matcher();
        prefix.chars().all(|c| matcher.try_advance(c))
    }

    /// Length in characters of the longest stored word that is a prefix of
    /// `input`, if any.
    pub fn longest_match(&self, input: impl IntoIterator<Item = char>) -> Option<usize> {
        let mut matcher = self.matcher();
        let mut longest = None;
        for c in input {
            if !matcher.try_advance(c) {
                break;
            }
            if matcher.is_match() {
                longest = Some(matcher.depth());
            }
        }
        longest
    }

    /// Number of stored words.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no word is stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Creates a cursor positioned at the root of this trie.
    #[must_use]
    pub fn matcher(&self) -> Matcher<'_> {
        Matcher { root:    &self.root,
                  current: &self.root,
                  depth:   0, }
    }
}

/// An incremental matching cursor bound to one [`Trie`].
#[derive(Debug, Clone)]
pub struct Matcher<'a> {
    root:    &'a TrieNode,
    current: &'a TrieNode,
    depth:   usize,
}

impl Matcher<'_> {
    /// Advances along the edge labelled `c`. If there is no such edge, the
    /// cursor stays where it is and `false` is returned.
    pub fn try_advance(&mut self, c: char) -> bool {
        match self.current.children.get(&c) {
            Some(next) => {
                self.current = next;
                self.depth += 1;
                true
            },
            None => false,
        }
    }

    /// Returns `true` if the characters consumed so far form a stored word.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        self.current.terminal
    }

    /// Number of characters consumed since the last reset.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Moves the cursor back to the root.
    pub fn reset(&mut self) {
        self.current = self.root;
        self.depth = 0;
    }
}
