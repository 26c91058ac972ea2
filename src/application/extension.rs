//! Typed extension interface.
//!
//! Extensions are compiled-in values implementing [`Extension`]. They get
//! a mutable handle to the workspace once when registered and to every
//! document, open now or later. Nothing is loaded at runtime.

use crate::application::{ApplicationResult, Document, Workspace};

pub trait Extension {
    /// Unique name, used in error messages and for de-duplication.
    fn name(&self) -> &str;

    /// Called once when the extension is registered.
    fn on_workspace(&self, _workspace: &mut Workspace) -> ApplicationResult<()> {
        Ok(())
    }

    /// Called for each open document and each document added afterwards.
    fn on_document(&self, _document: &mut Document) -> ApplicationResult<()> {
        Ok(())
    }
}

/// Extensions in registration order.
#[derive(Default)]
pub struct ExtensionRegistry {
    extensions: Vec<Box<dyn Extension>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.extensions.iter().any(|e| e.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.extensions.iter().map(|e| e.name()).collect()
    }

    pub(crate) fn push(&mut self, extension: Box<dyn Extension>) {
        self.extensions.push(extension);
    }

    pub(crate) fn apply_to(&self, document: &mut Document) -> ApplicationResult<()> {
        for extension in &self.extensions {
            extension.on_document(document)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
