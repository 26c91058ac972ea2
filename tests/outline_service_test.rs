//! Tests for OutlineService: files, clipboard exchange, links

use std::sync::Arc;

use tempfile::TempDir;

use rsoutline::application::services::{is_link, OutlineService};
use rsoutline::application::{ApplicationError, Document};
use rsoutline::domain::{DomainError, NodePath, Record};
use rsoutline::infrastructure::traits::{
    Clipboard, FileClipboard, MemoryClipboard, RealCommandRunner, RealFileSystem,
};
use rsoutline::util::testing::{
    init_test_setup, memory_service, write_outline, FailingClipboard, RecordingCommandRunner,
};

const GROCERIES: &str = r#"[{"t":"Groceries","s":[{"t":"Milk"},{"t":"Eggs"}]},{"t":"https://example.com"}]"#;

fn at(document: &Document, path: &str) -> rsoutline::domain::NodeId {
    let path: NodePath = path.parse().unwrap();
    document.resolve(&path).unwrap()
}

fn service_with_clipboard() -> (OutlineService, Arc<MemoryClipboard>) {
    init_test_setup();
    let clipboard = Arc::new(MemoryClipboard::new());
    let service = memory_service(Some(clipboard.clone()), Arc::new(RealCommandRunner));
    (service, clipboard)
}

fn service_without_clipboard() -> OutlineService {
    init_test_setup();
    memory_service(None, Arc::new(RealCommandRunner))
}

// ============================================================
// Files
// ============================================================

#[test]
fn given_file_when_open_edit_save_then_file_contains_edit() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_outline(temp.path(), "list.json", GROCERIES);
    let (service, _) = service_with_clipboard();

    // Act
    let mut document = service.open(&path).unwrap();
    let milk = at(&document, "0/0");
    document.edit(Some(milk), "Oat milk");
    service.save(&mut document).unwrap();

    // Assert
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with(r#"[{"t":"Groceries","s":[{"t":"Oat milk"}"#));
    assert!(!document.is_dirty());
    assert_eq!(document.path(), Some(path.as_path()));
}

#[test]
fn given_missing_file_when_open_then_storage_error() {
    let temp = TempDir::new().unwrap();
    let service = service_without_clipboard();

    let err = service.open(&temp.path().join("nope.json")).unwrap_err();

    assert!(matches!(err, ApplicationError::Storage { .. }), "got {err:?}");
}

#[test]
fn given_corrupt_file_when_load_into_then_document_and_binding_unchanged() {
    let temp = TempDir::new().unwrap();
    let good = write_outline(temp.path(), "good.json", GROCERIES);
    let bad = write_outline(temp.path(), "bad.json", r#"{"t":"#);
    let service = service_without_clipboard();
    let mut document = service.open(&good).unwrap();

    let err = service.load_into(&mut document, &bad).unwrap_err();

    assert!(err.is_data_error());
    assert_eq!(document.path(), Some(good.as_path()));
    assert_eq!(document.outline().len(), 4);
}

#[test]
fn given_unbound_document_when_save_then_no_file_path() {
    let service = service_without_clipboard();
    let mut document = Document::new();

    let err = service.save(&mut document).unwrap_err();

    assert!(matches!(err, ApplicationError::NoFilePath));
}

#[test]
fn given_nested_target_when_save_as_then_directories_created_and_bound() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("a").join("b").join("list.json");
    let service = service_without_clipboard();
    let mut document = Document::new();
    document.insert_sibling(None, "x");

    service.save_as(&mut document, &target).unwrap();

    assert_eq!(std::fs::read_to_string(&target).unwrap(), r#"[{"t":"x"}]"#);
    assert_eq!(document.path(), Some(target.as_path()));
}

#[test]
fn given_name_without_extension_when_create_then_default_extension_added() {
    let temp = TempDir::new().unwrap();
    let service = service_without_clipboard();

    let document = service.create(&temp.path().join("todo"), "json").unwrap();

    let expected = temp.path().join("todo.json");
    assert_eq!(document.path(), Some(expected.as_path()));
    assert_eq!(std::fs::read_to_string(expected).unwrap(), "[]");
}

// ============================================================
// Clipboard
// ============================================================

#[test]
fn given_item_when_copy_then_clipboard_holds_array_payload() {
    let (service, clipboard) = service_with_clipboard();
    let document = Document::from_bytes(GROCERIES.as_bytes()).unwrap();

    let record = service
        .copy(&document, Some(at(&document, "0")))
        .unwrap()
        .unwrap();

    assert_eq!(record.count(), 3);
    assert_eq!(
        clipboard.get_text().unwrap(),
        r#"[{"t":"Groceries","s":[{"t":"Milk"},{"t":"Eggs"}]}]"#
    );
    assert_eq!(document.outline().len(), 4);
}

#[test]
fn given_no_clipboard_when_cut_then_unavailable_and_nothing_deleted() {
    let service = service_without_clipboard();
    let mut document = Document::from_bytes(GROCERIES.as_bytes()).unwrap();
    let groceries = at(&document, "0");

    let err = service.cut(&mut document, Some(groceries)).unwrap_err();

    assert!(matches!(err, ApplicationError::ClipboardUnavailable));
    assert!(document.outline().contains(groceries));
    assert!(!document.is_dirty());
}

#[test]
fn given_no_clipboard_when_copy_paste_find_then_unavailable() {
    let service = service_without_clipboard();
    let mut document = Document::from_bytes(GROCERIES.as_bytes()).unwrap();

    assert!(matches!(
        service.copy(&document, None),
        Err(ApplicationError::ClipboardUnavailable)
    ));
    assert!(matches!(
        service.paste(&mut document, None),
        Err(ApplicationError::ClipboardUnavailable)
    ));
    assert!(matches!(
        service.find_to_clipboard(&document, "Milk"),
        Err(ApplicationError::ClipboardUnavailable)
    ));
    assert_eq!(document.outline().len(), 4);
}

fn service_with(clipboard: Arc<dyn Clipboard>) -> OutlineService {
    init_test_setup();
    OutlineService::new(
        Arc::new(RealFileSystem),
        Some(clipboard),
        Arc::new(RealCommandRunner),
    )
}

#[test]
fn given_failing_clipboard_when_cut_then_nothing_deleted() {
    // Arrange
    let service = service_with(Arc::new(FailingClipboard));
    let mut document = Document::from_bytes(GROCERIES.as_bytes()).unwrap();
    let groceries = at(&document, "0");

    // Act
    let err = service.cut(&mut document, Some(groceries)).unwrap_err();

    // Assert
    assert!(
        matches!(err, ApplicationError::Clipboard { ref message } if message.contains("vanished")),
        "got {err:?}"
    );
    assert!(document.outline().contains(groceries));
    assert_eq!(document.outline().len(), 4);
    assert!(!document.is_dirty());
}

#[test]
fn given_failing_clipboard_when_hand_off_then_clipboard_error() {
    let service = service_with(Arc::new(FailingClipboard));

    let err = service.hand_off_clipboard().unwrap_err();

    assert!(matches!(err, ApplicationError::Clipboard { .. }));
    assert!(!service.clipboard_serves_until_taken());
}

#[test]
fn given_no_clipboard_when_hand_off_then_nothing_to_do() {
    let service = service_without_clipboard();

    assert!(service.hand_off_clipboard().is_ok());
}

#[test]
fn given_file_clipboard_when_cut_then_later_service_pastes_it() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_outline(temp.path(), "list.json", GROCERIES);
    let clip_file = temp.path().join("state").join("clipboard.json");
    let clipboard = || Arc::new(FileClipboard::new(Arc::new(RealFileSystem), &clip_file));

    // Act: one process cuts and saves
    let cutter = service_with(clipboard());
    let mut document = cutter.open(&path).unwrap();
    let milk = at(&document, "0/0");
    cutter.cut(&mut document, Some(milk)).unwrap();
    cutter.save(&mut document).unwrap();
    cutter.hand_off_clipboard().unwrap();
    drop(cutter);

    // a later one pastes
    let paster = service_with(clipboard());
    let mut reopened = paster.open(&path).unwrap();
    let created = paster.paste(&mut reopened, None).unwrap();

    // Assert
    assert_eq!(created.len(), 1);
    assert_eq!(reopened.outline().text(created[0]), Some("Milk"));
    assert_eq!(reopened.outline().len(), 4);
}

#[test]
fn given_empty_file_clipboard_when_get_text_then_empty() {
    let temp = TempDir::new().unwrap();
    let clipboard = FileClipboard::new(Arc::new(RealFileSystem), temp.path().join("none.json"));

    assert_eq!(clipboard.get_text().unwrap(), "");
}

#[test]
fn given_cut_when_pasted_elsewhere_then_subtree_moves() {
    // Arrange
    let (service, _) = service_with_clipboard();
    let mut document = Document::from_bytes(GROCERIES.as_bytes()).unwrap();
    let milk = at(&document, "0/0");

    // Act
    let record = service.cut(&mut document, Some(milk)).unwrap().unwrap();
    let link = at(&document, "1");
    let created = service.paste(&mut document, Some(link)).unwrap();

    // Assert
    assert_eq!(record, Record::leaf("Milk"));
    assert_eq!(created.len(), 1);
    assert_eq!(
        document.outline().to_records(),
        vec![
            Record::with_children("Groceries", vec![Record::leaf("Eggs")]),
            Record::with_children("https://example.com", vec![Record::leaf("Milk")]),
        ]
    );
    assert!(document.is_dirty());
}

#[test]
fn given_single_object_payload_when_paste_without_selection_then_top_level() {
    init_test_setup();
    let clipboard = Arc::new(MemoryClipboard::with_text(r#"{"text":"legacy","subitems":[{"text":"kid"}]}"#));
    let service = memory_service(Some(clipboard), Arc::new(RealCommandRunner));
    let mut document = Document::new();

    let created = service.paste(&mut document, None).unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(
        document.outline().to_records(),
        vec![Record::with_children("legacy", vec![Record::leaf("kid")])]
    );
}

#[test]
fn given_malformed_payload_when_paste_then_error_and_document_unchanged() {
    init_test_setup();
    let clipboard = Arc::new(MemoryClipboard::with_text("shopping list: milk"));
    let service = memory_service(Some(clipboard.clone()), Arc::new(RealCommandRunner));
    let mut document = Document::from_bytes(GROCERIES.as_bytes()).unwrap();

    let err = service.paste(&mut document, None).unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::Format(_))));

    clipboard.set_text("[42]").unwrap();
    let err = service.paste(&mut document, None).unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::Shape { .. })));

    assert_eq!(document.outline().len(), 4);
    assert!(!document.is_dirty());
}

#[test]
fn given_needle_when_find_then_projection_on_clipboard() {
    let (service, clipboard) = service_with_clipboard();
    let document = Document::from_bytes(GROCERIES.as_bytes()).unwrap();

    let results = service.find_to_clipboard(&document, "Egg").unwrap();

    assert_eq!(
        results,
        vec![Record::with_children("Groceries", vec![Record::leaf("Eggs")])]
    );
    assert_eq!(
        clipboard.get_text().unwrap(),
        r#"[{"t":"Groceries","s":[{"t":"Eggs"}]}]"#
    );
    assert_eq!(document.outline().len(), 4);
}

// ============================================================
// Links
// ============================================================

#[test]
fn given_link_item_when_open_link_then_browser_invoked_with_url() {
    init_test_setup();
    let runner = Arc::new(RecordingCommandRunner::new());
    let service = memory_service(None, runner.clone()).with_browser(Some("firefox".into()));
    let document = Document::from_bytes(GROCERIES.as_bytes()).unwrap();

    let opened = service.open_link(&document, Some(at(&document, "1"))).unwrap();

    assert_eq!(opened.as_deref(), Some("https://example.com"));
    assert_eq!(runner.calls(), vec![vec!["firefox", "https://example.com"]]);
}

#[test]
fn given_plain_item_when_open_link_then_not_a_link_and_nothing_run() {
    init_test_setup();
    let runner = Arc::new(RecordingCommandRunner::new());
    let service = memory_service(None, runner.clone());
    let document = Document::from_bytes(GROCERIES.as_bytes()).unwrap();

    let err = service.open_link(&document, Some(at(&document, "0"))).unwrap_err();

    assert!(matches!(err, ApplicationError::NotALink(ref t) if t == "Groceries"));
    assert!(runner.calls().is_empty());
}

#[test]
fn given_failing_browser_when_open_link_then_launch_error() {
    init_test_setup();
    let runner = Arc::new(RecordingCommandRunner::failing(1));
    let service = memory_service(None, runner);
    let document = Document::from_bytes(GROCERIES.as_bytes()).unwrap();

    let err = service.open_link(&document, Some(at(&document, "1"))).unwrap_err();

    assert!(matches!(err, ApplicationError::Launch { .. }), "got {err:?}");
}

#[test]
fn given_texts_when_is_link_then_only_http_schemes() {
    assert!(is_link("http://a.b"));
    assert!(is_link("https://a.b/c?d"));
    assert!(!is_link("ftp://a.b"));
    assert!(!is_link("see https://a.b"));
    assert!(!is_link("HTTPS://A.B"));
}
