//! Service container for dependency injection
//!
//! Wires up the outline service with its I/O boundaries.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::application::services::OutlineService;
use crate::application::Workspace;
use crate::config::{ClipboardMode, Settings};
use crate::infrastructure::traits::{
    Clipboard, CommandRunner, FileClipboard, FileSystem, RealCommandRunner, RealFileSystem,
    SystemClipboard,
};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Command runner abstraction
    pub cmd: Arc<dyn CommandRunner>,

    /// Clipboard channel, absent when the host has none
    pub clipboard: Option<Arc<dyn Clipboard>>,

    /// Document persistence, clipboard and link commands
    pub outline: Arc<OutlineService>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let clipboard = clipboard_for(&settings, fs.clone());
        Self::with_deps(settings, fs, Arc::new(RealCommandRunner), clipboard)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        clipboard: Option<Arc<dyn Clipboard>>,
    ) -> Self {
        let settings = Arc::new(settings);
        let outline = Arc::new(
            OutlineService::new(fs.clone(), clipboard.clone(), cmd.clone())
                .with_browser(settings.browser.clone()),
        );

        Self {
            settings,
            fs,
            cmd,
            clipboard,
            outline,
        }
    }

    /// Empty workspace backed by this container's outline service.
    pub fn workspace(&self) -> Workspace {
        Workspace::new(self.outline.clone())
    }
}

fn clipboard_for(settings: &Settings, fs: Arc<dyn FileSystem>) -> Option<Arc<dyn Clipboard>> {
    debug!("clipboard mode: {:?}", settings.clipboard);
    match settings.clipboard {
        ClipboardMode::System => match SystemClipboard::new() {
            Some(cb) => {
                let hold = settings.clipboard_hold_secs.map(Duration::from_secs);
                Some(Arc::new(cb.with_hold(hold)))
            }
            None => {
                warn!("system clipboard not available, clipboard commands disabled");
                None
            }
        },
        ClipboardMode::Internal => Some(Arc::new(FileClipboard::new(
            fs,
            settings.clipboard_file.clone(),
        ))),
        ClipboardMode::None => None,
    }
}
