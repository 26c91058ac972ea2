//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rsoutline/rsoutline.toml`
//! 3. Local config: `<dir>/.rsoutline.toml`
//! 4. Environment variables: `RSOUTLINE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Which clipboard channel the host offers.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardMode {
    /// System clipboard (X11/Wayland, macOS, Windows)
    #[default]
    System,
    /// rsoutline's own clipboard file, shared between invocations
    Internal,
    /// No clipboard: copy/cut/paste/find report unavailable
    None,
}

impl ClipboardMode {
    fn parse(value: &str) -> Result<Self, ApplicationError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(Self::System),
            "internal" => Ok(Self::Internal),
            "none" => Ok(Self::None),
            other => Err(ApplicationError::Config {
                message: format!("unknown clipboard mode: {other} (system|internal|none)"),
            }),
        }
    }
}

/// Raw settings for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub session_file: Option<PathBuf>,
    pub clipboard: Option<ClipboardMode>,
    pub clipboard_file: Option<PathBuf>,
    pub clipboard_hold_secs: Option<u64>,
    pub browser: Option<String>,
    pub default_extension: Option<String>,
}

/// Unified configuration for rsoutline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// JSON file listing the documents open in the workspace
    pub session_file: PathBuf,
    /// Clipboard channel for copy/cut/paste/find
    pub clipboard: ClipboardMode,
    /// Backing file of the internal clipboard
    pub clipboard_file: PathBuf,
    /// Seconds the system clipboard is served after a command
    /// (unset: until another application takes it over)
    pub clipboard_hold_secs: Option<u64>,
    /// Command used to open links (default: platform opener)
    pub browser: Option<String>,
    /// Extension appended to new document names without one
    pub default_extension: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_file: default_state_file("session.json"),
            clipboard: ClipboardMode::default(),
            clipboard_file: default_state_file("clipboard.json"),
            clipboard_hold_secs: None,
            browser: None,
            default_extension: "json".into(),
        }
    }
}

fn default_state_file(name: &str) -> PathBuf {
    global_config_dir()
        .map(|dir| dir.join(name))
        .unwrap_or_else(|| PathBuf::from("~/.rsoutline").join(name))
}

/// Get the XDG config directory for rsoutline.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rsoutline").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rsoutline.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".rsoutline.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}`; leave the input alone if expansion fails.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.session_file.to_string_lossy().as_ref());
        self.session_file = PathBuf::from(expanded);

        let expanded = expand_env_vars(self.clipboard_file.to_string_lossy().as_ref());
        self.clipboard_file = PathBuf::from(expanded);

        if let Some(browser) = &self.browser {
            self.browser = Some(expand_env_vars(browser));
        }
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            session_file: overlay
                .session_file
                .clone()
                .unwrap_or_else(|| self.session_file.clone()),
            clipboard: overlay.clipboard.unwrap_or(self.clipboard),
            clipboard_file: overlay
                .clipboard_file
                .clone()
                .unwrap_or_else(|| self.clipboard_file.clone()),
            clipboard_hold_secs: overlay.clipboard_hold_secs.or(self.clipboard_hold_secs),
            browser: overlay.browser.clone().or_else(|| self.browser.clone()),
            default_extension: overlay
                .default_extension
                .clone()
                .unwrap_or_else(|| self.default_extension.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.rsoutline.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply RSOUTLINE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("RSOUTLINE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("session_file") {
            settings.session_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("clipboard") {
            settings.clipboard = ClipboardMode::parse(&val)?;
        }
        if let Ok(val) = config.get_string("clipboard_file") {
            settings.clipboard_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("clipboard_hold_secs") {
            let secs = val.trim().parse().map_err(|_| ApplicationError::Config {
                message: format!("clipboard_hold_secs must be a number of seconds: {val}"),
            })?;
            settings.clipboard_hold_secs = Some(secs);
        }
        if let Ok(val) = config.get_string("browser") {
            settings.browser = Some(val);
        }
        if let Ok(val) = config.get_string("default_extension") {
            settings.default_extension = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# rsoutline configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/rsoutline/rsoutline.toml
#   Local:  <dir>/.rsoutline.toml
#   Env:    RSOUTLINE_* environment variables

# File listing the documents of the workspace
# session_file = "~/.config/rsoutline/session.json"

# Clipboard channel: "system", "internal" or "none"
# clipboard = "system"

# Backing file of the "internal" clipboard
# clipboard_file = "~/.config/rsoutline/clipboard.json"

# X11/Wayland: seconds to keep serving the system clipboard after a
# copy, cut or find (default: until another application takes it over)
# clipboard_hold_secs = 30

# Command used to open links (default: xdg-open / open)
# browser = "firefox"

# Extension added to new documents without one
# default_extension = "json"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
