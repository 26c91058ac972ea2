//! Tests for Workspace: tabs, session file, extensions

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use rsoutline::application::{
    ApplicationError, ApplicationResult, Document, Extension, Session, Workspace,
};
use rsoutline::infrastructure::traits::{FileSystem, RealCommandRunner, RealFileSystem};
use rsoutline::util::testing::{init_test_setup, memory_service, write_outline};

fn workspace() -> Workspace {
    init_test_setup();
    Workspace::new(Arc::new(memory_service(None, Arc::new(RealCommandRunner))))
}

// ============================================================
// Tabs
// ============================================================

#[test]
fn given_open_and_empty_tabs_when_title_then_file_name_or_list_number() {
    let temp = TempDir::new().unwrap();
    let path = write_outline(temp.path(), "shop.json", r#"[{"t":"milk"}]"#);
    let mut ws = workspace();

    let first = ws.add_empty().unwrap();
    let second = ws.open(&path).unwrap();

    assert_eq!(ws.len(), 2);
    assert_eq!(ws.title(first).as_deref(), Some("List 1"));
    assert_eq!(ws.title(second).as_deref(), Some("shop.json"));
    assert_eq!(ws.title(7), None);
}

#[test]
fn given_edited_bound_tab_when_close_then_saved_first() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_outline(temp.path(), "shop.json", r#"[{"t":"milk"}]"#);
    let mut ws = workspace();
    let tab = ws.open(&path).unwrap();
    ws.document_mut(tab).unwrap().insert_sibling(None, "bread");

    // Act
    let closed = ws.close(tab).unwrap();

    // Assert
    assert!(ws.is_empty());
    assert!(!closed.is_dirty());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        r#"[{"t":"milk"},{"t":"bread"}]"#
    );
}

#[test]
fn given_unknown_tab_when_close_then_no_such_document() {
    let mut ws = workspace();

    let err = ws.close(3).unwrap_err();

    assert!(matches!(err, ApplicationError::NoSuchDocument(3)));
}

#[test]
fn given_bound_and_unbound_tabs_when_save_all_then_only_bound_written() {
    let temp = TempDir::new().unwrap();
    let path = write_outline(temp.path(), "a.json", "[]");
    let mut ws = workspace();
    let bound = ws.open(&path).unwrap();
    let unbound = ws.add_empty().unwrap();
    ws.document_mut(bound).unwrap().insert_sibling(None, "x");
    ws.document_mut(unbound).unwrap().insert_sibling(None, "y");

    let saved = ws.save_all().unwrap();

    assert_eq!(saved, 1);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"[{"t":"x"}]"#);
    assert!(ws.document(unbound).unwrap().is_dirty());
}

// ============================================================
// Session
// ============================================================

#[test]
fn given_workspace_when_shutdown_and_restore_then_same_files_reopen() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let a = write_outline(temp.path(), "a.json", r#"[{"t":"a"}]"#);
    let b = write_outline(temp.path(), "b.json", r#"[{"t":"b"}]"#);
    let session_file = temp.path().join("state").join("session.json");
    let mut ws = workspace();
    ws.open(&a).unwrap();
    ws.add_empty().unwrap();
    ws.open(&b).unwrap();

    // Act
    ws.shutdown(&session_file).unwrap();
    let session = Session::load(&RealFileSystem, &session_file).unwrap();
    let mut restored = workspace();
    let failures = restored.restore(&session);

    // Assert
    assert_eq!(session.file_paths, vec![a.clone(), b.clone()]);
    assert!(failures.is_empty());
    assert_eq!(restored.len(), 2);
    assert_eq!(restored.title(1).as_deref(), Some("b.json"));
}

#[test]
fn given_session_with_missing_file_when_restore_then_skipped_and_reported() {
    let temp = TempDir::new().unwrap();
    let good = write_outline(temp.path(), "good.json", "[]");
    let gone = temp.path().join("gone.json");
    let session = Session {
        file_paths: vec![gone.clone(), good],
    };
    let mut ws = workspace();

    let failures = ws.restore(&session);

    assert_eq!(ws.len(), 1);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, gone);
    assert!(matches!(failures[0].1, ApplicationError::Storage { .. }));
}

#[test]
fn given_no_session_file_when_load_then_empty_session() {
    let temp = TempDir::new().unwrap();

    let session = Session::load(&RealFileSystem, &temp.path().join("none.json")).unwrap();

    assert!(session.file_paths.is_empty());
}

#[test]
fn given_session_when_add_and_remove_then_deduplicated() {
    let mut session = Session::default();

    assert!(session.add("/x/a.json"));
    assert!(!session.add("/x/a.json"));
    assert!(session.add("/x/b.json"));
    assert!(session.remove(std::path::Path::new("/x/a.json")));
    assert!(!session.remove(std::path::Path::new("/x/a.json")));

    assert_eq!(session.file_paths, vec![std::path::PathBuf::from("/x/b.json")]);
}

#[test]
fn given_session_file_when_written_then_uses_file_paths_key() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("session.json");
    let session = Session {
        file_paths: vec!["/lists/a.json".into()],
    };

    session.save(&RealFileSystem, &file).unwrap();

    assert_eq!(
        std::fs::read_to_string(&file).unwrap(),
        r#"{"file_paths":["/lists/a.json"]}"#
    );
}

/// Real filesystem that counts atomic writes.
#[derive(Default)]
struct CountingFileSystem {
    atomic_writes: AtomicUsize,
}

impl FileSystem for CountingFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        RealFileSystem.read(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        RealFileSystem.read_to_string(path)
    }

    fn write_atomic(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        self.atomic_writes.fetch_add(1, Ordering::SeqCst);
        RealFileSystem.write_atomic(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        RealFileSystem.exists(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        RealFileSystem.create_dir_all(path)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        RealFileSystem.canonicalize(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        RealFileSystem.ensure_parent(path)
    }
}

#[test]
fn given_existing_session_file_when_saved_then_replaced_atomically() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("session.json");
    std::fs::write(&file, r#"{"file_paths":["/old.json"]}"#).unwrap();
    let fs = CountingFileSystem::default();
    let session = Session {
        file_paths: vec!["/new.json".into()],
    };

    // Act
    session.save(&fs, &file).unwrap();

    // Assert
    assert_eq!(fs.atomic_writes.load(Ordering::SeqCst), 1);
    assert_eq!(Session::load(&fs, &file).unwrap(), session);
    let names: Vec<_> = std::fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("session.json")]);
}

// ============================================================
// Extensions
// ============================================================

/// Adds a marker item to every document it sees.
struct Stamp {
    workspace_calls: Arc<AtomicUsize>,
}

impl Extension for Stamp {
    fn name(&self) -> &str {
        "stamp"
    }

    fn on_workspace(&self, _workspace: &mut Workspace) -> ApplicationResult<()> {
        self.workspace_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_document(&self, document: &mut Document) -> ApplicationResult<()> {
        document.insert_sibling(None, "stamped");
        Ok(())
    }
}

#[test]
fn given_extension_when_registered_then_applied_to_open_and_later_documents() {
    // Arrange
    let calls = Arc::new(AtomicUsize::new(0));
    let mut ws = workspace();
    ws.add_empty().unwrap();

    // Act
    ws.register(Box::new(Stamp {
        workspace_calls: calls.clone(),
    }))
    .unwrap();
    let later = ws.add_empty().unwrap();

    // Assert
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    for tab in [0, later] {
        assert_eq!(ws.document(tab).unwrap().outline().leaf_texts(), vec!["stamped"]);
    }
    assert_eq!(ws.extensions().names(), vec!["stamp"]);
}

#[test]
fn given_duplicate_name_when_register_then_rejected() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut ws = workspace();
    ws.register(Box::new(Stamp {
        workspace_calls: calls.clone(),
    }))
    .unwrap();

    let err = ws
        .register(Box::new(Stamp {
            workspace_calls: calls.clone(),
        }))
        .unwrap_err();

    assert!(matches!(err, ApplicationError::Extension { ref name, .. } if name == "stamp"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
