//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::NodePath;

/// Hierarchical list editor: nested items stored as JSON outlines
#[derive(Parser, Debug)]
#[command(name = "rsoutline")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Directory holding a local .rsoutline.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty outline file
    New {
        /// Outline file (default extension added if missing)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show an outline as a tree with item paths
    Show {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Show only the subtree at this path
        #[arg(short, long)]
        at: Option<NodePath>,
    },

    /// Append an item to the top level or under --under
    Add {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Item text
        text: String,
        /// Parent item (default: top level)
        #[arg(short, long)]
        under: Option<NodePath>,
    },

    /// Append a sub-item to an item
    AddChild {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Item path, e.g. 0/2
        path: NodePath,
        /// Item text
        text: String,
    },

    /// Replace an item's text
    Edit {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Item path
        path: NodePath,
        /// New text
        text: String,
    },

    /// Delete an item and all its sub-items
    Rm {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Item path
        path: NodePath,
    },

    /// Move an item one place up among its siblings
    Up {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Item path
        path: NodePath,
    },

    /// Move an item one place down among its siblings
    Down {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Item path
        path: NodePath,
    },

    /// Show the tree with an item and all its sub-items expanded
    Expand {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Item path
        path: NodePath,
    },

    /// Show the tree with an item and all its sub-items collapsed
    Collapse {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Item path
        path: NodePath,
    },

    /// Copy an item and its sub-items to the clipboard
    Copy {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Item path
        path: NodePath,
        /// Print the payload instead of using the clipboard
        #[arg(long)]
        stdout: bool,
    },

    /// Copy an item to the clipboard, then delete it
    Cut {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Item path
        path: NodePath,
    },

    /// Paste clipboard items under --under (default: top level)
    Paste {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Target item (default: top level)
        #[arg(short, long)]
        under: Option<NodePath>,
        /// Read the payload from stdin instead of the clipboard
        #[arg(long)]
        stdin: bool,
    },

    /// Copy items containing NEEDLE, with their ancestors, to the clipboard
    Find {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Case-sensitive substring
        needle: String,
        /// Print the result instead of using the clipboard
        #[arg(long)]
        stdout: bool,
    },

    /// Print an item and its sub-items as JSON
    Export {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Item path (default: whole outline)
        path: Option<NodePath>,
    },

    /// Open an item's text in the browser if it is an http(s) link
    OpenLink {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Item path
        path: NodePath,
    },

    /// Manage the list of open outline files
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// List session files with their titles
    List,

    /// Add a file to the session
    Add {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Remove a file from the session
    Remove {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Open every session file and report the ones that fail
    Check,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
