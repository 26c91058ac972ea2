//! Structural edits on an [`Outline`].
//!
//! Every operation takes the current selection as `Option<NodeId>`.
//! Insertions and paste fall back to the root when nothing is selected;
//! everything else is a silent no-op without a valid, non-root selection.

use tracing::{debug, instrument};

use crate::domain::arena::{NodeId, Outline};
use crate::domain::record::Record;

impl Outline {
    fn target_or_root(&self, target: Option<NodeId>) -> Option<NodeId> {
        match target {
            None => Some(self.root),
            Some(id) if self.contains(id) => Some(id),
            Some(_) => None,
        }
    }

    fn selected_item(&self, target: Option<NodeId>) -> Option<NodeId> {
        target.filter(|&id| self.is_item(id))
    }

    /// Appends a new collapsed leaf to the end of `parent`'s children,
    /// or to the top level when nothing is selected.
    #[instrument(level = "debug", skip(self))]
    pub fn insert_sibling(&mut self, parent: Option<NodeId>, text: &str) -> Option<NodeId> {
        if text.is_empty() {
            return None;
        }
        let parent = self.target_or_root(parent)?;
        Some(self.attach(parent, text.to_string()))
    }

    /// Appends a new collapsed leaf as the last child of `target`.
    ///
    /// The target is left collapsed, so a freshly added sub-item is
    /// hidden until the host expands it.
    #[instrument(level = "debug", skip(self))]
    pub fn insert_child(&mut self, target: Option<NodeId>, text: &str) -> Option<NodeId> {
        if text.is_empty() {
            return None;
        }
        let parent = self.target_or_root(target)?;
        let id = self.attach(parent, text.to_string());
        if parent != self.root {
            if let Some(node) = self.arena.get_mut(parent) {
                node.expanded = false;
            }
        }
        Some(id)
    }

    /// Replaces the text of `target` in place. Empty text is refused.
    #[instrument(level = "debug", skip(self))]
    pub fn edit(&mut self, target: Option<NodeId>, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let Some(id) = self.selected_item(target) else {
            return false;
        };
        match self.arena.get_mut(id) {
            Some(node) => {
                node.text = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Removes `target` and its entire subtree. The root cannot be deleted.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&mut self, target: Option<NodeId>) -> bool {
        let Some(id) = self.selected_item(target) else {
            return false;
        };
        if let Some(parent) = self.parent_of(id).and_then(|p| self.arena.get_mut(p)) {
            parent.children.retain(|&c| c != id);
        }
        let doomed: Vec<NodeId> = self.iter_postorder_from(id).map(|(idx, _)| idx).collect();
        debug!("delete: removing {} items", doomed.len());
        for idx in doomed {
            self.arena.remove(idx);
        }
        true
    }

    /// Moves `target` to `index + delta` within its parent.
    ///
    /// A destination outside the sibling list is a no-op: no clamping to
    /// the end, no wrap-around.
    #[instrument(level = "debug", skip(self))]
    pub fn move_by(&mut self, target: Option<NodeId>, delta: isize) -> bool {
        let Some(id) = self.selected_item(target) else {
            return false;
        };
        let (Some(parent), Some(index)) = (self.parent_of(id), self.index_in_parent(id)) else {
            return false;
        };
        let Some(siblings) = self.arena.get_mut(parent).map(|p| &mut p.children) else {
            return false;
        };
        let destination = match index.checked_add_signed(delta) {
            Some(d) if d < siblings.len() => d,
            _ => return false,
        };
        if destination == index {
            return false;
        }
        let moved = siblings.remove(index);
        siblings.insert(destination, moved);
        true
    }

    pub fn move_up(&mut self, target: Option<NodeId>) -> bool {
        self.move_by(target, -1)
    }

    pub fn move_down(&mut self, target: Option<NodeId>) -> bool {
        self.move_by(target, 1)
    }

    /// Sets `expanded` on `target` and every descendant.
    #[instrument(level = "debug", skip(self))]
    pub fn set_expanded_recursive(&mut self, target: Option<NodeId>, state: bool) -> bool {
        let Some(id) = self.selected_item(target) else {
            return false;
        };
        let subtree: Vec<NodeId> = self.iter_from(id).map(|(idx, _)| idx).collect();
        for idx in subtree {
            if let Some(node) = self.arena.get_mut(idx) {
                node.expanded = state;
            }
        }
        true
    }

    /// Disconnected deep copy of `target`.
    #[instrument(level = "debug", skip(self))]
    pub fn export_subtree(&self, target: Option<NodeId>) -> Option<Record> {
        self.to_record(self.selected_item(target)?)
    }

    /// Export followed by delete; the copy is taken before anything is removed.
    #[instrument(level = "debug", skip(self))]
    pub fn cut(&mut self, target: Option<NodeId>) -> Option<Record> {
        let record = self.export_subtree(target)?;
        self.delete(target);
        Some(record)
    }

    /// Appends fresh items built from `records` under `target`, or under the
    /// root when nothing is selected. Returns the ids of the new top items.
    #[instrument(level = "debug", skip(self, records), fields(count = records.len()))]
    pub fn paste_into(&mut self, target: Option<NodeId>, records: &[Record]) -> Vec<NodeId> {
        match self.target_or_root(target) {
            Some(parent) => self.append_records(parent, records),
            None => Vec::new(),
        }
    }
}
