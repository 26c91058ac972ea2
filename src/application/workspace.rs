//! Workspace: the set of open documents (one per tab) and the session file
//! that remembers them between runs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::application::extension::{Extension, ExtensionRegistry};
use crate::application::services::OutlineService;
use crate::application::{ApplicationError, ApplicationResult, Document, IoResultExt};
use crate::infrastructure::traits::FileSystem;

/// Persisted list of document paths, in tab order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub file_paths: Vec<PathBuf>,
}

impl Session {
    /// Missing session file is an empty session.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> ApplicationResult<Self> {
        if !fs.exists(path) {
            return Ok(Self::default());
        }
        let content = fs
            .read_to_string(path)
            .with_path_context("read session", path)?;
        serde_json::from_str(&content).map_err(|e| ApplicationError::Config {
            message: format!("parse session {}: {}", path.display(), e),
        })
    }

    pub fn save(&self, fs: &dyn FileSystem, path: &Path) -> ApplicationResult<()> {
        let content = serde_json::to_string(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize session: {e}"),
        })?;
        fs.ensure_parent(path)
            .with_path_context("create directory for", path)?;
        fs.write_atomic(path, content.as_bytes()).with_path_context("write session", path)
    }

    /// Adds `path` unless already listed. Returns true if added.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.file_paths.contains(&path) {
            return false;
        }
        self.file_paths.push(path);
        true
    }

    /// Returns true if `path` was listed.
    pub fn remove(&mut self, path: &Path) -> bool {
        let before = self.file_paths.len();
        self.file_paths.retain(|p| p != path);
        self.file_paths.len() < before
    }
}

/// Open documents in tab order, plus registered extensions.
pub struct Workspace {
    service: Arc<OutlineService>,
    documents: Vec<Document>,
    extensions: ExtensionRegistry,
}

impl Workspace {
    pub fn new(service: Arc<OutlineService>) -> Self {
        Self {
            service,
            documents: Vec::new(),
            extensions: ExtensionRegistry::new(),
        }
    }

    pub fn service(&self) -> &OutlineService {
        &self.service
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, tab: usize) -> Option<&Document> {
        self.documents.get(tab)
    }

    pub fn document_mut(&mut self, tab: usize) -> Option<&mut Document> {
        self.documents.get_mut(tab)
    }

    /// Tab label: file name, else "List N" (1-based).
    pub fn title(&self, tab: usize) -> Option<String> {
        self.documents
            .get(tab)
            .map(|doc| doc.title(&format!("List {}", tab + 1)))
    }

    fn push(&mut self, mut document: Document) -> ApplicationResult<usize> {
        self.extensions.apply_to(&mut document)?;
        self.documents.push(document);
        Ok(self.documents.len() - 1)
    }

    /// New unbound document in a new tab. Returns its tab index.
    pub fn add_empty(&mut self) -> ApplicationResult<usize> {
        self.push(Document::new())
    }

    /// Open `path` in a new tab. Returns its tab index.
    #[instrument(level = "debug", skip(self))]
    pub fn open(&mut self, path: &Path) -> ApplicationResult<usize> {
        let document = self.service.open(path)?;
        self.push(document)
    }

    /// Save (if bound to a file) and close a tab.
    ///
    /// Unbound documents are closed without saving; the host asks for a
    /// path first if it wants to keep them.
    #[instrument(level = "debug", skip(self))]
    pub fn close(&mut self, tab: usize) -> ApplicationResult<Document> {
        let document = self
            .documents
            .get_mut(tab)
            .ok_or(ApplicationError::NoSuchDocument(tab))?;
        if document.path().is_some() {
            self.service.save(document)?;
        }
        Ok(self.documents.remove(tab))
    }

    /// Save every bound document. Unbound ones are skipped. Stops at the
    /// first failure.
    #[instrument(level = "debug", skip(self))]
    pub fn save_all(&mut self) -> ApplicationResult<usize> {
        let mut saved = 0;
        for document in self.documents.iter_mut().filter(|d| d.path().is_some()) {
            self.service.save(document)?;
            saved += 1;
        }
        debug!("save_all: {} documents", saved);
        Ok(saved)
    }

    /// Paths of bound documents in tab order.
    pub fn session(&self) -> Session {
        Session {
            file_paths: self
                .documents
                .iter()
                .filter_map(|d| d.path().map(Path::to_path_buf))
                .collect(),
        }
    }

    /// Open every file in `session`. Files that fail to open are skipped
    /// and returned with their error.
    #[instrument(level = "debug", skip(self, session))]
    pub fn restore(&mut self, session: &Session) -> Vec<(PathBuf, ApplicationError)> {
        let mut failures = Vec::new();
        for path in &session.file_paths {
            if let Err(e) = self.open(path) {
                warn!("restore: skipping {}: {}", path.display(), e);
                failures.push((path.clone(), e));
            }
        }
        failures
    }

    /// Save all documents and write the session file.
    pub fn shutdown(&mut self, session_file: &Path) -> ApplicationResult<()> {
        self.save_all()?;
        self.session().save(self.service.fs(), session_file)
    }

    /// Register an extension: run its workspace hook, then its document
    /// hook on every open document.
    #[instrument(level = "debug", skip(self, extension), fields(name = extension.name()))]
    pub fn register(&mut self, extension: Box<dyn Extension>) -> ApplicationResult<()> {
        let name = extension.name().to_string();
        if self.extensions.contains(&name) {
            return Err(ApplicationError::Extension {
                name,
                message: "already registered".into(),
            });
        }
        extension.on_workspace(self)?;
        for document in &mut self.documents {
            extension.on_document(document)?;
        }
        self.extensions.push(extension);
        Ok(())
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }
}
