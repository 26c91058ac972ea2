//! Shared test setup and test doubles

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::services::OutlineService;
use crate::infrastructure::traits::{Clipboard, CommandRunner, MemoryClipboard, RealFileSystem};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "debug");
        }
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_test_writer()
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Writes `json` to `dir/name` and returns the path.
pub fn write_outline(dir: &Path, name: &str, json: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, json).unwrap_or_else(|e| panic!("write {}: {}", path.display(), e));
    path
}

/// Outline service on the real filesystem with an in-memory clipboard.
pub fn memory_service(
    clipboard: Option<Arc<MemoryClipboard>>,
    cmd: Arc<dyn CommandRunner>,
) -> OutlineService {
    let clipboard = clipboard.map(|cb| cb as Arc<dyn Clipboard>);
    OutlineService::new(Arc::new(RealFileSystem), clipboard, cmd)
}

/// Command runner that records invocations and reports a fixed exit code.
#[derive(Debug, Default)]
pub struct RecordingCommandRunner {
    calls: Mutex<Vec<Vec<String>>>,
    exit_code: i32,
}

impl RecordingCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::default()
        }
    }

    /// Each call as `[cmd, args...]`.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CommandRunner for RecordingCommandRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
        let mut call = vec![cmd.to_string()];
        call.extend(args.iter().map(|a| a.to_string()));
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        Ok(Output {
            status: exit_status(self.exit_code),
            stdout: Vec::new(),
            stderr: if self.exit_code == 0 {
                Vec::new()
            } else {
                b"no display".to_vec()
            },
        })
    }
}

/// Clipboard whose owner has gone away: every call fails.
#[derive(Debug, Default)]
pub struct FailingClipboard;

impl Clipboard for FailingClipboard {
    fn set_text(&self, _text: &str) -> Result<(), String> {
        Err("clipboard owner vanished".into())
    }

    fn get_text(&self) -> Result<String, String> {
        Err("clipboard owner vanished".into())
    }

    fn hand_off(&self) -> Result<(), String> {
        Err("clipboard owner vanished".into())
    }
}

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}
