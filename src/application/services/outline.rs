//! Outline service
//!
//! Host-facing commands that need I/O: document files, the clipboard
//! channel and the link opener. Tree edits themselves live on
//! [`Document`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, Document, IoResultExt};
use crate::domain::{codec, contains, NodeId, Record};
use crate::infrastructure::traits::{Clipboard, CommandRunner, FileSystem};

/// Service for document persistence and clipboard exchange.
pub struct OutlineService {
    fs: Arc<dyn FileSystem>,
    clipboard: Option<Arc<dyn Clipboard>>,
    cmd: Arc<dyn CommandRunner>,
    browser: Option<String>,
}

impl OutlineService {
    /// Create a new outline service. `clipboard: None` means the host has
    /// no clipboard channel.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        clipboard: Option<Arc<dyn Clipboard>>,
        cmd: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            fs,
            clipboard,
            cmd,
            browser: None,
        }
    }

    /// Use `browser` instead of the platform opener for links.
    pub fn with_browser(mut self, browser: Option<String>) -> Self {
        self.browser = browser;
        self
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn has_clipboard(&self) -> bool {
        self.clipboard.is_some()
    }

    fn clipboard(&self) -> ApplicationResult<&Arc<dyn Clipboard>> {
        self.clipboard
            .as_ref()
            .ok_or(ApplicationError::ClipboardUnavailable)
    }

    // ------------------------------------------------------------
    // Files
    // ------------------------------------------------------------

    /// Read and decode a document bound to `path`.
    #[instrument(level = "debug", skip(self))]
    pub fn open(&self, path: &Path) -> ApplicationResult<Document> {
        let bytes = self.fs.read(path).with_path_context("read outline", path)?;
        let mut document = Document::from_bytes(&bytes)?;
        document.set_path(path);
        info!("opened {} ({} items)", path.display(), document.outline().len());
        Ok(document)
    }

    /// Reload `document` from `path`, rebinding it on success.
    ///
    /// On any error the document keeps its current tree and path.
    #[instrument(level = "debug", skip(self, document))]
    pub fn load_into(&self, document: &mut Document, path: &Path) -> ApplicationResult<()> {
        let bytes = self.fs.read(path).with_path_context("read outline", path)?;
        document.load(&bytes)?;
        document.set_path(path);
        Ok(())
    }

    /// Write `document` to its bound path.
    #[instrument(level = "debug", skip(self, document))]
    pub fn save(&self, document: &mut Document) -> ApplicationResult<()> {
        let path = document
            .path()
            .map(Path::to_path_buf)
            .ok_or(ApplicationError::NoFilePath)?;
        self.write(document, &path)
    }

    /// Bind `document` to `path` and write it there.
    #[instrument(level = "debug", skip(self, document))]
    pub fn save_as(&self, document: &mut Document, path: &Path) -> ApplicationResult<()> {
        self.write(document, path)?;
        document.set_path(path);
        Ok(())
    }

    fn write(&self, document: &mut Document, path: &Path) -> ApplicationResult<()> {
        let bytes = document.to_bytes()?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create directory for", path)?;
        self.fs
            .write_atomic(path, &bytes)
            .with_path_context("write outline", path)?;
        document.mark_saved();
        debug!("saved {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    /// Create an empty document file at `path`, adding `extension` when the
    /// name has none.
    pub fn create(&self, path: &Path, extension: &str) -> ApplicationResult<Document> {
        let path: PathBuf = if path.extension().is_none() && !extension.is_empty() {
            path.with_extension(extension)
        } else {
            path.to_path_buf()
        };
        let mut document = Document::new();
        self.save_as(&mut document, &path)?;
        Ok(document)
    }

    // ------------------------------------------------------------
    // Clipboard
    // ------------------------------------------------------------

    /// Copy the selected subtree to the clipboard as `[record]`.
    ///
    /// Returns `Ok(None)` when nothing is selected.
    #[instrument(level = "debug", skip(self, document))]
    pub fn copy(
        &self,
        document: &Document,
        target: Option<NodeId>,
    ) -> ApplicationResult<Option<Record>> {
        let clipboard = self.clipboard()?;
        let Some(record) = document.export_subtree(target) else {
            return Ok(None);
        };
        self.put(clipboard, std::slice::from_ref(&record))?;
        Ok(Some(record))
    }

    /// Copy then delete. The item is only removed once the clipboard
    /// accepted the export.
    #[instrument(level = "debug", skip(self, document))]
    pub fn cut(
        &self,
        document: &mut Document,
        target: Option<NodeId>,
    ) -> ApplicationResult<Option<Record>> {
        let clipboard = self.clipboard()?;
        let Some(record) = document.export_subtree(target) else {
            return Ok(None);
        };
        self.put(clipboard, std::slice::from_ref(&record))?;
        document.delete(target);
        Ok(Some(record))
    }

    /// Paste clipboard records under `target`, or at the top level when
    /// nothing is selected. Malformed clipboard content leaves the
    /// document unchanged.
    #[instrument(level = "debug", skip(self, document))]
    pub fn paste(
        &self,
        document: &mut Document,
        target: Option<NodeId>,
    ) -> ApplicationResult<Vec<NodeId>> {
        let clipboard = self.clipboard()?;
        let text = clipboard
            .get_text()
            .map_err(|message| ApplicationError::Clipboard { message })?;
        let records = codec::decode_payload(&text)?;
        let created = document.paste_into(target, &records);
        debug!("paste: {} top items", created.len());
        Ok(created)
    }

    /// Put the search projection for `needle` on the clipboard.
    #[instrument(level = "debug", skip(self, document))]
    pub fn find_to_clipboard(
        &self,
        document: &Document,
        needle: &str,
    ) -> ApplicationResult<Vec<Record>> {
        let clipboard = self.clipboard()?;
        let records = document.search(contains(needle));
        self.put(clipboard, &records)?;
        Ok(records)
    }

    /// Make the last clipboard export outlive this process. May block
    /// while the host clipboard serves the content.
    #[instrument(level = "debug", skip(self))]
    pub fn hand_off_clipboard(&self) -> ApplicationResult<()> {
        match &self.clipboard {
            Some(clipboard) => clipboard
                .hand_off()
                .map_err(|message| ApplicationError::Clipboard { message }),
            None => Ok(()),
        }
    }

    /// True when [`OutlineService::hand_off_clipboard`] will block.
    pub fn clipboard_serves_until_taken(&self) -> bool {
        self.clipboard
            .as_ref()
            .is_some_and(|clipboard| clipboard.serves_until_taken())
    }

    fn put(&self, clipboard: &Arc<dyn Clipboard>, records: &[Record]) -> ApplicationResult<()> {
        let payload = codec::encode_payload(records)?;
        clipboard
            .set_text(&payload)
            .map_err(|message| ApplicationError::Clipboard { message })
    }

    // ------------------------------------------------------------
    // Links
    // ------------------------------------------------------------

    /// Open the selected item's text in a browser if it is an http(s) URL.
    ///
    /// Returns `Ok(None)` when nothing is selected.
    #[instrument(level = "debug", skip(self, document))]
    pub fn open_link(
        &self,
        document: &Document,
        target: Option<NodeId>,
    ) -> ApplicationResult<Option<String>> {
        let Some(text) = target
            .filter(|&id| id != document.outline().root())
            .and_then(|id| document.outline().text(id))
        else {
            return Ok(None);
        };
        if !is_link(text) {
            return Err(ApplicationError::NotALink(text.to_string()));
        }

        let opener = self.browser.as_deref().unwrap_or(default_opener());
        let output = self
            .cmd
            .run(opener, &[text])
            .map_err(|e| ApplicationError::Launch {
                target: text.to_string(),
                message: format!("{opener}: {e}"),
            })?;
        if !output.status.success() {
            return Err(ApplicationError::Launch {
                target: text.to_string(),
                message: format!(
                    "{opener} exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(Some(text.to_string()))
    }
}

pub fn is_link(text: &str) -> bool {
    text.starts_with("http://") || text.starts_with("https://")
}

fn default_opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    }
}
