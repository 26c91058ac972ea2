//! Document: one outline bound to an optional file, with dirty tracking.
//!
//! Byte-level load/save only; reading and writing files is done by
//! [`OutlineService`](crate::application::services::OutlineService).

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::domain::{codec, DomainResult, NodeId, NodePath, Outline, Record};

#[derive(Debug, Clone, Default)]
pub struct Document {
    outline: Outline,
    path: Option<PathBuf>,
    dirty: bool,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Decodes a whole document from its file bytes.
    pub fn from_bytes(bytes: &[u8]) -> DomainResult<Self> {
        let mut document = Self::new();
        document.load(bytes)?;
        Ok(document)
    }

    /// Replaces the whole outline with the decoded content of `bytes`.
    ///
    /// All or nothing: on error the current outline is untouched.
    #[instrument(level = "debug", skip(self, bytes), fields(len = bytes.len()))]
    pub fn load(&mut self, bytes: &[u8]) -> DomainResult<()> {
        let records = codec::decode_records(bytes)?;
        self.outline = Outline::from_records(&records);
        self.dirty = false;
        debug!("load: {} items", self.outline.len());
        Ok(())
    }

    /// Compact, deterministic file encoding of the outline.
    #[instrument(level = "debug", skip(self))]
    pub fn to_bytes(&self) -> DomainResult<Vec<u8>> {
        codec::encode_records(&self.outline.to_records())
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// File name of the bound path, else `fallback` (e.g. "List 3").
    pub fn title(&self, fallback: &str) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn resolve(&self, path: &NodePath) -> Option<NodeId> {
        self.outline.resolve(path)
    }

    fn touched<T>(&mut self, changed: bool, value: T) -> T {
        if changed {
            self.dirty = true;
        }
        value
    }

    pub fn insert_sibling(&mut self, parent: Option<NodeId>, text: &str) -> Option<NodeId> {
        let id = self.outline.insert_sibling(parent, text);
        self.touched(id.is_some(), id)
    }

    pub fn insert_child(&mut self, target: Option<NodeId>, text: &str) -> Option<NodeId> {
        let id = self.outline.insert_child(target, text);
        self.touched(id.is_some(), id)
    }

    pub fn edit(&mut self, target: Option<NodeId>, text: &str) -> bool {
        let changed = self.outline.edit(target, text);
        self.touched(changed, changed)
    }

    pub fn delete(&mut self, target: Option<NodeId>) -> bool {
        let changed = self.outline.delete(target);
        self.touched(changed, changed)
    }

    pub fn move_by(&mut self, target: Option<NodeId>, delta: isize) -> bool {
        let changed = self.outline.move_by(target, delta);
        self.touched(changed, changed)
    }

    pub fn move_up(&mut self, target: Option<NodeId>) -> bool {
        self.move_by(target, -1)
    }

    pub fn move_down(&mut self, target: Option<NodeId>) -> bool {
        self.move_by(target, 1)
    }

    /// Presentation only; does not dirty the document.
    pub fn set_expanded_recursive(&mut self, target: Option<NodeId>, state: bool) -> bool {
        self.outline.set_expanded_recursive(target, state)
    }

    pub fn export_subtree(&self, target: Option<NodeId>) -> Option<Record> {
        self.outline.export_subtree(target)
    }

    pub fn cut(&mut self, target: Option<NodeId>) -> Option<Record> {
        let record = self.outline.cut(target);
        self.touched(record.is_some(), record)
    }

    pub fn paste_into(&mut self, target: Option<NodeId>, records: &[Record]) -> Vec<NodeId> {
        let created = self.outline.paste_into(target, records);
        self.touched(!created.is_empty(), created)
    }

    pub fn filter_subtree<P>(&self, id: NodeId, predicate: P) -> Option<Record>
    where
        P: Fn(&str) -> bool,
    {
        self.outline.filter_subtree(id, predicate)
    }

    pub fn search<P>(&self, predicate: P) -> Vec<Record>
    where
        P: Fn(&str) -> bool,
    {
        self.outline.search(predicate)
    }
}
