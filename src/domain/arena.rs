use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::domain::node_path::NodePath;

/// Stable handle to an item in an [`Outline`].
///
/// Generational: once an item is deleted its id never resolves again,
/// even if the arena slot is reused.
pub type NodeId = Index;

/// One item of the outline.
#[derive(Debug, Clone)]
pub struct ItemNode {
    /// Display/content label, opaque
    pub(super) text: String,
    /// Presentation state only, never persisted
    pub(super) expanded: bool,
    /// Index of parent node in the arena, None for the root
    pub(super) parent: Option<NodeId>,
    /// Indices of child nodes in the arena, in display order
    pub(super) children: Vec<NodeId>,
}

impl ItemNode {
    pub(super) fn new(text: String, parent: Option<NodeId>) -> Self {
        Self {
            text,
            expanded: false,
            parent,
            children: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn expanded(&self) -> bool {
        self.expanded
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Display for ItemNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Arena-based outline tree.
///
/// Owns every item exclusively. The root is implicit: it has no text,
/// is never displayed and can neither be deleted nor exported. Its
/// children are the top-level items.
#[derive(Debug, Clone)]
pub struct Outline {
    /// Arena storage for all items, root included
    pub(super) arena: Arena<ItemNode>,
    /// Index of the implicit root
    pub(super) root: NodeId,
}

impl Default for Outline {
    fn default() -> Self {
        Self::new()
    }
}

impl Outline {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let mut root = ItemNode::new(String::new(), None);
        root.expanded = true;
        let root = arena.insert(root);
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&ItemNode> {
        self.arena.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id)
    }

    /// Number of items, the implicit root excluded.
    pub fn len(&self) -> usize {
        self.arena.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn top_level(&self) -> &[NodeId] {
        self.arena
            .get(self.root)
            .map(|root| root.children.as_slice())
            .unwrap_or_default()
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(ItemNode::text)
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(ItemNode::parent)
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent_of(id)?;
        self.node(parent)?.children.iter().position(|&c| c == id)
    }

    /// A valid id that is not the root: the only kind of id a
    /// selection-requiring operation acts on.
    pub(super) fn is_item(&self, id: NodeId) -> bool {
        id != self.root && self.contains(id)
    }

    /// Appends a fresh collapsed leaf to `parent`'s children.
    pub(super) fn attach(&mut self, parent: NodeId, text: String) -> NodeId {
        let id = self.arena.insert(ItemNode::new(text, Some(parent)));
        if let Some(parent) = self.arena.get_mut(parent) {
            parent.children.push(id);
        }
        id
    }

    /// Resolves a path of child indices, starting at the root.
    /// The empty path resolves to the root.
    #[instrument(level = "trace", skip(self))]
    pub fn resolve(&self, path: &NodePath) -> Option<NodeId> {
        let mut current = self.root;
        for &index in path.indices() {
            current = *self.node(current)?.children.get(index)?;
        }
        Some(current)
    }

    /// Inverse of [`Outline::resolve`].
    #[instrument(level = "trace", skip(self))]
    pub fn path_of(&self, id: NodeId) -> Option<NodePath> {
        if !self.contains(id) {
            return None;
        }
        let mut indices = Vec::new();
        let mut current = id;
        while current != self.root {
            indices.push(self.index_in_parent(current)?);
            current = self.parent_of(current)?;
        }
        indices.reverse();
        Some(NodePath::new(indices))
    }

    /// Pre-order walk of `id` and all of its descendants.
    #[instrument(level = "trace", skip(self))]
    pub fn iter_from(&self, id: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, id)
    }

    /// Post-order walk of `id` and all of its descendants.
    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder_from(&self, id: NodeId) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, id)
    }

    /// All items in display order, root excluded.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ItemNode)> {
        let root = self.root;
        self.iter_from(root).filter(move |(id, _)| *id != root)
    }

    /// Nesting depth of the deepest item; 0 for an empty outline.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((idx, level)) = stack.pop() {
            max = max.max(level);
            if let Some(node) = self.node(idx) {
                stack.extend(node.children.iter().map(|&child| (child, level + 1)));
            }
        }
        max
    }

    /// Texts of all items without children, in display order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_texts(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(_, node)| node.text.clone())
            .collect()
    }
}

pub struct TreeIterator<'a> {
    outline: &'a Outline,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(outline: &'a Outline, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if outline.contains(start) {
            stack.push(start);
        }
        Self { outline, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a ItemNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.outline.node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    outline: &'a Outline,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(outline: &'a Outline, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if outline.contains(start) {
            stack.push((start, false));
        }
        Self { outline, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (NodeId, &'a ItemNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.outline.node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
