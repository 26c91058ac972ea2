//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::debug;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents as bytes.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace file content in one step: write a sibling temp file, then rename.
    fn write_atomic(&self, path: &Path, content: &[u8]) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Canonicalize path (resolve symlinks, make absolute).
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// External command runner abstraction.
pub trait CommandRunner: Send + Sync {
    /// Run a command with arguments.
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output>;
}

/// Text clipboard channel provided by the host environment.
pub trait Clipboard: Send + Sync {
    /// Replace clipboard content.
    fn set_text(&self, text: &str) -> Result<(), String>;

    /// Current clipboard content.
    fn get_text(&self) -> Result<String, String>;

    /// Keep the last text available after this process exits.
    /// May block until another owner takes the content over.
    fn hand_off(&self) -> Result<(), String> {
        Ok(())
    }

    /// True when [`Clipboard::hand_off`] blocks to serve the content.
    fn serves_until_taken(&self) -> bool {
        false
    }
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_atomic(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Real command runner implementation.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
        std::process::Command::new(cmd).args(args).output()
    }
}

/// System clipboard via arboard (X11/Wayland, macOS, Windows).
///
/// The handle is kept for the lifetime of the value: on X11 and Wayland
/// this process owns the selection and must stay alive to answer paste
/// requests, see [`Clipboard::hand_off`].
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub struct SystemClipboard {
    inner: Mutex<arboard::Clipboard>,
    last: Mutex<Option<String>>,
    hold: Option<Duration>,
}

impl SystemClipboard {
    /// `None` when the environment has no clipboard (headless, no display).
    pub fn new() -> Option<Self> {
        match arboard::Clipboard::new() {
            Ok(cb) => Some(Self {
                inner: Mutex::new(cb),
                last: Mutex::new(None),
                hold: None,
            }),
            Err(e) => {
                debug!("arboard clipboard init failed: {}", e);
                None
            }
        }
    }

    /// Stop serving after `hold` instead of waiting for a new owner.
    pub fn with_hold(mut self, hold: Option<Duration>) -> Self {
        self.hold = hold;
        self
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), String> {
        let mut guard = self.inner.lock().map_err(|e| e.to_string())?;
        guard.set_text(text).map_err(|e| e.to_string())?;
        *self.last.lock().map_err(|e| e.to_string())? = Some(text.to_string());
        Ok(())
    }

    fn get_text(&self) -> Result<String, String> {
        let mut guard = self.inner.lock().map_err(|e| e.to_string())?;
        guard.get_text().map_err(|e| e.to_string())
    }

    #[cfg(target_os = "linux")]
    fn hand_off(&self) -> Result<(), String> {
        use arboard::SetExtLinux;

        let Some(text) = self.last.lock().map_err(|e| e.to_string())?.take() else {
            return Ok(());
        };
        let mut guard = self.inner.lock().map_err(|e| e.to_string())?;
        tracing::info!("serving clipboard until another owner takes it ({:?})", self.hold);
        let set = guard.set();
        let set = match self.hold {
            Some(hold) => set.wait_until(std::time::Instant::now() + hold),
            None => set.wait(),
        };
        set.text(text).map_err(|e| e.to_string())
    }

    #[cfg(target_os = "linux")]
    fn serves_until_taken(&self) -> bool {
        self.last.lock().map(|last| last.is_some()).unwrap_or(false)
    }
}

/// Clipboard kept in a file, shared by successive processes.
/// Used for `clipboard = "internal"` by the command line host.
pub struct FileClipboard {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl FileClipboard {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Clipboard for FileClipboard {
    fn set_text(&self, text: &str) -> Result<(), String> {
        self.fs
            .ensure_parent(&self.path)
            .and_then(|_| self.fs.write_atomic(&self.path, text.as_bytes()))
            .map_err(|e| format!("write {}: {}", self.path.display(), e))
    }

    /// Empty text when nothing was put yet.
    fn get_text(&self) -> Result<String, String> {
        match self.fs.read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(format!("read {}: {}", self.path.display(), e)),
        }
    }
}

/// Process-local clipboard for in-process hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    content: Mutex<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            content: Mutex::new(text.into()),
        }
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&self, text: &str) -> Result<(), String> {
        let mut guard = self.content.lock().map_err(|e| e.to_string())?;
        *guard = text.to_string();
        Ok(())
    }

    fn get_text(&self) -> Result<String, String> {
        let guard = self.content.lock().map_err(|e| e.to_string())?;
        Ok(guard.clone())
    }
}
