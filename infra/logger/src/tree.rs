//! Hierarchical selection trie.
//!
//! Paths are `/`-separated (`core/serializer/json_generator`). Lookups walk as far as
//! the trie matches and answer with the deepest matched node, so an unknown suffix
//! inherits its nearest ancestor's setting.

use crate::level::LogLevel;

/// One segment of the selection trie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    include: bool,
    level: LogLevel,
    children: Vec<Node>,
}

impl Node {
    fn new(name: impl Into<String>, include: bool, level: LogLevel) -> Self {
        Self { name: name.into(), include, level, children: Vec::new() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn include(&self) -> bool {
        self.include
    }

    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    fn child_index(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|c| c.name == name)
    }
}

/// The selection trie rooted at an implicit include flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    root: Node,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new(false, LogLevel::default())
    }
}

impl Tree {
    #[must_use]
    pub fn new(include: bool, level: LogLevel) -> Self {
        Self { root: Node::new("", include, level) }
    }

    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }

    pub const fn set_root_inclusion(&mut self, include: bool) {
        self.root.include = include;
    }

    pub const fn set_root_level(&mut self, level: LogLevel) {
        self.root.level = level;
    }

    /// Adds or updates the node at `path`.
    ///
    /// Missing intermediate segments are created with their parent's current settings;
    /// only the final segment receives `include` and `level` (`None` keeps the parent's
    /// level). An empty path addresses the root.
    pub fn add_node(&mut self, path: &str, include: bool, level: Option<LogLevel>) -> &Node {
        let mut node = &mut self.root;
        for segment in segments(path) {
            let idx = match node.child_index(segment) {
                Some(idx) => idx,
                None => {
                    let inherited = Node::new(segment, node.include, node.level);
                    node.children.push(inherited);
                    node.children.len() - 1
                },
            };
            node = &mut node.children[idx];
        }
        node.include = include;
        if let Some(level) = level {
            node.level = level;
        }
        node
    }

    /// Returns the deepest node matching a prefix of `path`.
    #[must_use]
    pub fn get_node(&self, path: &str) -> &Node {
        self.node_for(segments(path))
    }

    /// Walks pre-split segments; see [`Tree::get_node`].
    pub fn node_for<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> &Node {
        let mut node = &self.root;
        for segment in segments {
            match node.child(segment) {
                Some(child) => node = child,
                None => break,
            }
        }
        node
    }

    #[must_use]
    pub fn get_inclusion(&self, path: &str) -> bool {
        self.get_node(path).include
    }

    #[must_use]
    pub fn get_level(&self, path: &str) -> LogLevel {
        self.get_node(path).level
    }

    /// Whether an event at `level` under `path` should be emitted.
    #[must_use]
    pub fn is_enabled(&self, path: &str, level: LogLevel) -> bool {
        admits(self.get_node(path), level)
    }
}

pub(crate) fn admits(node: &Node, level: LogLevel) -> bool {
    node.include && level != LogLevel::None && level <= node.level
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
