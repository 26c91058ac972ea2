//! Integration tests for Settings loading with layered precedence.
//!
//! These tests run against temp directories only, so the local layer is
//! merged over compiled defaults (or whatever global config the machine has
//! for keys the local file does not set).

use std::fs;

use tempfile::TempDir;

use rsoutline::config::{expand_env_vars, local_config_path, ClipboardMode, Settings};

#[test]
fn given_local_config_when_load_then_local_values_win() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
clipboard = "internal"
browser = "firefox"
default_extension = "outline"
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.clipboard, ClipboardMode::Internal);
    assert_eq!(settings.browser.as_deref(), Some("firefox"));
    assert_eq!(settings.default_extension, "outline");
}

#[test]
fn given_tilde_session_file_when_load_then_expanded() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"session_file = "~/lists/session.json""#,
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    let home = std::env::var("HOME").expect("HOME should be set");
    assert_eq!(
        settings.session_file,
        std::path::PathBuf::from(format!("{home}/lists/session.json"))
    );
}

#[test]
fn given_invalid_local_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "clipboard = [unterminated").unwrap();

    let err = Settings::load(Some(dir.path())).unwrap_err();

    assert!(err.to_string().contains(".rsoutline.toml"), "got {err}");
}

#[test]
fn given_unknown_clipboard_mode_in_file_when_load_then_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), r#"clipboard = "x11""#).unwrap();

    assert!(Settings::load(Some(dir.path())).is_err());
}

#[test]
fn given_template_when_parsed_then_valid_toml_with_defaults() {
    let template = Settings::template();

    let parsed: Settings = toml::from_str(&template).expect("template parses");

    assert_eq!(parsed.clipboard, ClipboardMode::System);
    assert_eq!(parsed.default_extension, "json");
}

#[test]
fn given_plain_and_variable_paths_when_expand_then_only_variables_change() {
    assert_eq!(expand_env_vars("/abs/path.json"), "/abs/path.json");
    assert_eq!(
        expand_env_vars("$RSOUTLINE_TEST_SURELY_UNSET/x"),
        "$RSOUTLINE_TEST_SURELY_UNSET/x"
    );

    let home = std::env::var("HOME").expect("HOME should be set");
    assert_eq!(expand_env_vars("$HOME/lists"), format!("{home}/lists"));
}

#[test]
fn given_internal_clipboard_settings_when_load_then_file_expanded_and_hold_read() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
clipboard = "internal"
clipboard_file = "~/lists/clipboard.json"
clipboard_hold_secs = 20
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    let home = std::env::var("HOME").expect("HOME should be set");
    assert_eq!(
        settings.clipboard_file,
        std::path::PathBuf::from(format!("{home}/lists/clipboard.json"))
    );
    assert_eq!(settings.clipboard_hold_secs, Some(20));
}
