//! Conversion between arena items and disconnected [`Record`] values.
//!
//! All walks use explicit stacks; outline depth is bounded by memory only.

use tracing::instrument;

use crate::domain::arena::{ItemNode, NodeId, Outline};
use crate::domain::record::Record;

impl Outline {
    /// Deep copy of `id` and its subtree. `None` for an unknown id.
    #[instrument(level = "trace", skip(self))]
    pub fn to_record(&self, id: NodeId) -> Option<Record> {
        self.project(id, |_| true)
    }

    /// Records of the top-level items; the root itself is never serialized.
    #[instrument(level = "debug", skip(self))]
    pub fn to_records(&self) -> Vec<Record> {
        self.top_level()
            .iter()
            .filter_map(|&id| self.to_record(id))
            .collect()
    }

    /// Builds a fresh outline whose top-level items are `records`, in order.
    #[instrument(level = "debug", skip(records), fields(count = records.len()))]
    pub fn from_records(records: &[Record]) -> Outline {
        let mut outline = Outline::new();
        let root = outline.root();
        outline.append_records(root, records);
        outline
    }

    /// Appends fresh items built from `records` as the last children of
    /// `parent`. Returns the ids of the new top items, in order.
    pub(crate) fn append_records(&mut self, parent: NodeId, records: &[Record]) -> Vec<NodeId> {
        if !self.contains(parent) {
            return Vec::new();
        }
        let mut created = Vec::with_capacity(records.len());
        // Reverse push so siblings are attached left to right.
        let mut stack: Vec<(&Record, NodeId, bool)> =
            records.iter().rev().map(|r| (r, parent, true)).collect();

        while let Some((record, parent_idx, top)) = stack.pop() {
            let id = self.attach(parent_idx, record.text.clone());
            if top {
                created.push(id);
            }
            stack.extend(record.children.iter().rev().map(|c| (c, id, false)));
        }
        created
    }

    /// Post-order projection of a subtree into records.
    ///
    /// An item survives when `keep(text)` holds or at least one of its
    /// children survived. Children keep their original order.
    pub(super) fn project<P>(&self, id: NodeId, keep: P) -> Option<Record>
    where
        P: Fn(&str) -> bool,
    {
        struct Frame<'a> {
            node: &'a ItemNode,
            next: usize,
            kept: Vec<Record>,
        }

        let mut stack = vec![Frame {
            node: self.node(id)?,
            next: 0,
            kept: Vec::new(),
        }];

        loop {
            let child = {
                let top = stack.last_mut()?;
                let child = top.node.children.get(top.next).copied();
                if child.is_some() {
                    top.next += 1;
                }
                child
            };

            if let Some(child) = child {
                if let Some(node) = self.node(child) {
                    stack.push(Frame {
                        node,
                        next: 0,
                        kept: Vec::new(),
                    });
                }
                continue;
            }

            let done = stack.pop()?;
            let survives = !done.kept.is_empty() || keep(&done.node.text);
            let record = survives.then(|| Record {
                text: done.node.text.clone(),
                children: done.kept,
            });
            match stack.last_mut() {
                Some(parent) => parent.kept.extend(record),
                None => return record,
            }
        }
    }
}
