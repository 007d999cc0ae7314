use std::collections::{HashSet, VecDeque};

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::instrument;

/// Deepest level `to_tree_string` renders.
pub const MAX_RENDER_DEPTH: usize = 256;

/// Room of the dungeon: one tree node.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Value carried by the room, compared against the escape value
    pub value: i64,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in insertion order
    pub children: Vec<Index>,
}

/// Arena-based tree structure holding one dungeon.
///
/// Nodes are owned by the arena and refer to each other by generational
/// index only, so a node can never be shared between two parents.
#[derive(Debug)]
pub struct TreeArena {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(capacity),
            root: None,
        }
    }

    /// Inserts a node and links it as the last child of `parent`.
    ///
    /// Inserting with `parent == None` makes the node the root.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, value: i64, parent: Option<Index>) -> Index {
        let node = TreeNode {
            value,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// Number of parent-child links.
    pub fn edge_count(&self) -> usize {
        self.arena.iter().map(|(_, node)| node.children.len()).sum()
    }

    /// Overwrites the value of a node. Returns false for a stale index.
    pub fn set_value(&mut self, idx: Index, value: i64) -> bool {
        match self.arena.get_mut(idx) {
            Some(node) => {
                node.value = value;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.arena.iter().any(|(_, node)| node.value == value)
    }

    /// Pre-order, left-to-right iteration.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Number of levels, using a breadth-first walk with (node, depth) pairs.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut max_depth = 0;
        let mut queue = VecDeque::new();
        queue.push_back((root, 1));

        while let Some((idx, depth)) = queue.pop_front() {
            max_depth = max_depth.max(depth);
            if let Some(node) = self.get_node(idx) {
                for &child in &node.children {
                    queue.push_back((child, depth + 1));
                }
            }
        }
        max_depth
    }

    /// Values on the way from the root down to `idx`, both included.
    pub fn path_to(&self, idx: Index) -> Vec<i64> {
        let mut path = Vec::new();
        let mut current = Some(idx);
        while let Some(node) = current.and_then(|i| self.get_node(i)) {
            path.push(node.value);
            current = node.parent;
        }
        path.reverse();
        path
    }

    /// Copies the tree into a fresh arena with identical shape, values and
    /// child order. The copy shares no storage with `self`.
    #[instrument(level = "debug", skip(self), fields(nodes = self.len()))]
    pub fn deep_clone(&self) -> TreeArena {
        let mut copy = TreeArena::with_capacity(self.len());
        let Some(root) = self.root else {
            return copy;
        };

        let mut stack: Vec<(Index, Option<Index>)> = vec![(root, None)];
        while let Some((idx, parent)) = stack.pop() {
            if let Some(node) = self.get_node(idx) {
                let new_idx = copy.insert_node(node.value, parent);
                // Reverse push keeps siblings in left-to-right order
                for &child in node.children.iter().rev() {
                    stack.push((child, Some(new_idx)));
                }
            }
        }
        copy
    }

    /// Checks the tree invariants: every node is reachable from the root
    /// exactly once, parent links agree with child lists, and there are
    /// exactly `len() - 1` edges.
    pub fn is_well_formed(&self) -> bool {
        let Some(root) = self.root else {
            return self.is_empty();
        };
        if self.get_node(root).map_or(true, |n| n.parent.is_some()) {
            return false;
        }

        let mut seen = HashSet::with_capacity(self.len());
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            if !seen.insert(idx) {
                return false;
            }
            let Some(node) = self.get_node(idx) else {
                return false;
            };
            for &child in &node.children {
                match self.get_node(child) {
                    Some(c) if c.parent == Some(idx) => stack.push(child),
                    _ => return false,
                }
            }
        }

        seen.len() == self.len() && self.edge_count() + 1 == self.len()
    }

    /// Renders the tree for terminal display.
    ///
    /// Levels below [`MAX_RENDER_DEPTH`] are collapsed into a single `...`
    /// leaf per cut subtree.
    pub fn to_tree_string(&self) -> Tree<String> {
        let Some((root_idx, root)) = self.root.and_then(|idx| self.get_node(idx).map(|n| (idx, n)))
        else {
            return Tree::new("Empty dungeon".to_string());
        };

        // (node, position of the next child, rendered subtree so far)
        let mut stack: Vec<(Index, usize, Tree<String>)> =
            vec![(root_idx, 0, Tree::new(root.value.to_string()))];

        loop {
            let depth = stack.len();
            let Some(frame) = stack.last_mut() else {
                return Tree::new("Empty dungeon".to_string());
            };
            let children = self
                .get_node(frame.0)
                .map(|n| n.children.as_slice())
                .unwrap_or_default();

            if depth >= MAX_RENDER_DEPTH && frame.1 == 0 && !children.is_empty() {
                frame.2.push(Tree::new("...".to_string()));
                frame.1 = children.len();
            }

            match children.get(frame.1).copied() {
                Some(child_idx) => {
                    frame.1 += 1;
                    if let Some(child) = self.get_node(child_idx) {
                        stack.push((child_idx, 0, Tree::new(child.value.to_string())));
                    }
                }
                None => {
                    let Some((_, _, done)) = stack.pop() else {
                        continue;
                    };
                    match stack.last_mut() {
                        Some(parent) => {
                            parent.2.push(done);
                        }
                        None => return done,
                    }
                }
            }
        }
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
