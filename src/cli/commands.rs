//! Command dispatch: one function per subcommand

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use colored::Colorize;
use tracing::{debug, instrument};

use crate::application::services::OutlineService;
use crate::application::{Document, Session};
use crate::cli::args::{Cli, Commands, ConfigCommands, SessionCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{codec, contains, NodeId, NodePath};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Ok(());
    };

    // No services needed: avoid touching the clipboard
    match command {
        Commands::Completion { shell } => return cmd_completion(*shell),
        Commands::Config { command } => return cmd_config(cli, command),
        _ => {}
    }

    let container = ServiceContainer::new(load_settings(cli)?);
    let service = container.outline.as_ref();

    match command {
        Commands::New { file } => cmd_new(&container, file),
        Commands::Show { file, at } => cmd_show(service, file, at.as_ref()),
        Commands::Add { file, text, under } => cmd_add(service, file, text, under.as_ref()),
        Commands::AddChild { file, path, text } => cmd_add_child(service, file, path, text),
        Commands::Edit { file, path, text } => cmd_edit(service, file, path, text),
        Commands::Rm { file, path } => cmd_rm(service, file, path),
        Commands::Up { file, path } => cmd_move(service, file, path, -1),
        Commands::Down { file, path } => cmd_move(service, file, path, 1),
        Commands::Expand { file, path } => cmd_fold(service, file, path, true),
        Commands::Collapse { file, path } => cmd_fold(service, file, path, false),
        Commands::Copy { file, path, stdout } => cmd_copy(service, file, path, *stdout),
        Commands::Cut { file, path } => cmd_cut(service, file, path),
        Commands::Paste { file, under, stdin } => {
            cmd_paste(service, file, under.as_ref(), *stdin)
        }
        Commands::Find {
            file,
            needle,
            stdout,
        } => cmd_find(service, file, needle, *stdout),
        Commands::Export { file, path } => cmd_export(service, file, path.as_ref()),
        Commands::OpenLink { file, path } => cmd_open_link(service, file, path),
        Commands::Session { command } => cmd_session(&container, command),
        Commands::Completion { .. } | Commands::Config { .. } => Ok(()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let dir = config_dir(cli)?;
    Ok(Settings::load(Some(&dir))?)
}

fn config_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.config_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| CliError::Infra(InfraError::io("current directory", e))),
    }
}

// ============================================================
// Helpers
// ============================================================

/// Item at `path`; the root is not an item.
fn item(document: &Document, path: &NodePath) -> CliResult<NodeId> {
    document
        .resolve(path)
        .filter(|&id| id != document.outline().root())
        .ok_or_else(|| CliError::InvalidArgs(format!("no item at path '{}'", path)))
}

/// Item at `path`, or `None` (top level) when no path was given.
fn target(document: &Document, path: Option<&NodePath>) -> CliResult<Option<NodeId>> {
    match path {
        Some(path) if !path.is_root() => item(document, path).map(Some),
        _ => Ok(None),
    }
}

fn path_label(document: &Document, id: NodeId) -> String {
    document
        .outline()
        .path_of(id)
        .map(|p| p.to_string())
        .unwrap_or_default()
}

/// Writes the document back if the command changed it.
fn persist(service: &OutlineService, document: &mut Document) -> CliResult<()> {
    if document.is_dirty() {
        service.save(document)?;
        debug!("saved {:?}", document.path());
    }
    Ok(())
}

/// Runs after the command's file work: a cut item is already gone from
/// disk, so the exported payload must stay reachable once we exit.
fn keep_clipboard(service: &OutlineService) -> CliResult<()> {
    if service.clipboard_serves_until_taken() {
        output::info(
            &"Serving the clipboard until another application takes it over (Ctrl-C stops)"
                .dimmed(),
        );
    }
    service.hand_off_clipboard()?;
    Ok(())
}

fn title(document: &Document) -> String {
    document.title("outline")
}

// ============================================================
// Document commands
// ============================================================

#[instrument(skip(container))]
fn cmd_new(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let document = container
        .outline
        .create(file, &container.settings.default_extension)?;
    let path = document.path().unwrap_or(file);
    output::action("Created", &path.display());
    Ok(())
}

#[instrument(skip(service))]
fn cmd_show(service: &OutlineService, file: &Path, at: Option<&NodePath>) -> CliResult<()> {
    let document = service.open(file)?;
    let start = match at {
        Some(path) => document
            .resolve(path)
            .ok_or_else(|| CliError::InvalidArgs(format!("no item at path '{}'", path)))?,
        None => document.outline().root(),
    };
    let tree = output::render_tree(document.outline(), start, &title(&document), None);
    output::info(&tree);
    Ok(())
}

#[instrument(skip(service))]
fn cmd_add(
    service: &OutlineService,
    file: &Path,
    text: &str,
    under: Option<&NodePath>,
) -> CliResult<()> {
    let mut document = service.open(file)?;
    let parent = target(&document, under)?;
    let id = document
        .insert_sibling(parent, text)
        .ok_or_else(|| CliError::InvalidArgs("item text must not be empty".into()))?;
    persist(service, &mut document)?;
    output::action("Added", &format!("{} {}", path_label(&document, id), text));
    Ok(())
}

#[instrument(skip(service))]
fn cmd_add_child(service: &OutlineService, file: &Path, path: &NodePath, text: &str) -> CliResult<()> {
    let mut document = service.open(file)?;
    let parent = target(&document, Some(path))?;
    let id = document
        .insert_child(parent, text)
        .ok_or_else(|| CliError::InvalidArgs("item text must not be empty".into()))?;
    persist(service, &mut document)?;
    output::action("Added", &format!("{} {}", path_label(&document, id), text));
    Ok(())
}

#[instrument(skip(service))]
fn cmd_edit(service: &OutlineService, file: &Path, path: &NodePath, text: &str) -> CliResult<()> {
    let mut document = service.open(file)?;
    let id = item(&document, path)?;
    if !document.edit(Some(id), text) {
        return Err(CliError::InvalidArgs("item text must not be empty".into()));
    }
    persist(service, &mut document)?;
    output::action("Edited", &format!("{} {}", path, text));
    Ok(())
}

#[instrument(skip(service))]
fn cmd_rm(service: &OutlineService, file: &Path, path: &NodePath) -> CliResult<()> {
    let mut document = service.open(file)?;
    let id = item(&document, path)?;
    let count = document.outline().iter_from(id).count();
    document.delete(Some(id));
    persist(service, &mut document)?;
    output::action("Deleted", &format!("{} ({} items)", path, count));
    Ok(())
}

#[instrument(skip(service))]
fn cmd_move(service: &OutlineService, file: &Path, path: &NodePath, delta: isize) -> CliResult<()> {
    let mut document = service.open(file)?;
    let id = item(&document, path)?;
    if !document.move_by(Some(id), delta) {
        output::warning(&format!("{} is already at the edge", path));
        return Ok(());
    }
    persist(service, &mut document)?;
    output::action("Moved", &format!("{} -> {}", path, path_label(&document, id)));
    Ok(())
}

/// Expand or collapse a subtree and show the result. Presentation
/// state is not persisted, so nothing is written.
#[instrument(skip(service))]
fn cmd_fold(service: &OutlineService, file: &Path, path: &NodePath, expanded: bool) -> CliResult<()> {
    let mut document = service.open(file)?;
    let id = item(&document, path)?;
    document.set_expanded_recursive(Some(id), expanded);
    let tree = output::render_tree(
        document.outline(),
        document.outline().root(),
        &title(&document),
        Some(id),
    );
    output::info(&tree);
    Ok(())
}

// ============================================================
// Clipboard commands
// ============================================================

#[instrument(skip(service))]
fn cmd_copy(service: &OutlineService, file: &Path, path: &NodePath, stdout: bool) -> CliResult<()> {
    let document = service.open(file)?;
    let id = item(&document, path)?;
    if stdout {
        let records: Vec<_> = document.export_subtree(Some(id)).into_iter().collect();
        output::info(&codec::encode_payload(&records)?);
        return Ok(());
    }
    if let Some(record) = service.copy(&document, Some(id))? {
        output::action("Copied", &format!("{} ({} items)", path, record.count()));
        keep_clipboard(service)?;
    }
    Ok(())
}

#[instrument(skip(service))]
fn cmd_cut(service: &OutlineService, file: &Path, path: &NodePath) -> CliResult<()> {
    let mut document = service.open(file)?;
    let id = item(&document, path)?;
    if let Some(record) = service.cut(&mut document, Some(id))? {
        persist(service, &mut document)?;
        output::action("Cut", &format!("{} ({} items)", path, record.count()));
        keep_clipboard(service)?;
    }
    Ok(())
}

#[instrument(skip(service))]
fn cmd_paste(
    service: &OutlineService,
    file: &Path,
    under: Option<&NodePath>,
    stdin: bool,
) -> CliResult<()> {
    let mut document = service.open(file)?;
    let parent = target(&document, under)?;
    let created = if stdin {
        let mut payload = String::new();
        io::stdin()
            .read_to_string(&mut payload)
            .map_err(|e| CliError::Infra(InfraError::io("read stdin", e)))?;
        let records = codec::decode_payload(&payload)?;
        document.paste_into(parent, &records)
    } else {
        service.paste(&mut document, parent)?
    };
    persist(service, &mut document)?;
    for id in &created {
        output::success_detail(&format!(
            "{} {}",
            path_label(&document, *id),
            document.outline().text(*id).unwrap_or_default()
        ));
    }
    output::action("Pasted", &format!("{} items", created.len()));
    Ok(())
}

#[instrument(skip(service))]
fn cmd_find(service: &OutlineService, file: &Path, needle: &str, stdout: bool) -> CliResult<()> {
    let document = service.open(file)?;
    let records = if stdout {
        let records = document.search(contains(needle));
        output::info(&codec::encode_payload(&records)?);
        records
    } else {
        service.find_to_clipboard(&document, needle)?
    };
    if records.is_empty() {
        output::warning(&format!("no item contains '{}'", needle));
    } else if !stdout {
        output::action("Found", &format!("{} top items copied to clipboard", records.len()));
    }
    if !stdout {
        keep_clipboard(service)?;
    }
    Ok(())
}

#[instrument(skip(service))]
fn cmd_export(service: &OutlineService, file: &Path, path: Option<&NodePath>) -> CliResult<()> {
    let document = service.open(file)?;
    let records = match target(&document, path)? {
        Some(id) => document.export_subtree(Some(id)).into_iter().collect(),
        None => document.outline().to_records(),
    };
    let payload = codec::encode_payload(&records)?;
    output::info(&payload);
    Ok(())
}

#[instrument(skip(service))]
fn cmd_open_link(service: &OutlineService, file: &Path, path: &NodePath) -> CliResult<()> {
    let document = service.open(file)?;
    let id = item(&document, path)?;
    if let Some(url) = service.open_link(&document, Some(id))? {
        output::action("Opened", &url);
    }
    Ok(())
}

// ============================================================
// Session commands
// ============================================================

#[instrument(skip(container))]
fn cmd_session(container: &ServiceContainer, command: &SessionCommands) -> CliResult<()> {
    let session_file = &container.settings.session_file;
    let fs = container.fs.as_ref();
    let mut session = Session::load(fs, session_file)?;

    match command {
        SessionCommands::List => {
            output::header(&format!("Session: {}", session_file.display()));
            if session.file_paths.is_empty() {
                output::info(&"  (empty)");
            }
            for (tab, path) in session.file_paths.iter().enumerate() {
                output::info(&format!("  {}: {}", tab, path.display()));
            }
        }
        SessionCommands::Add { file } => {
            let path = container
                .fs
                .canonicalize(file)
                .map_err(|e| CliError::Infra(InfraError::io(format!("resolve {}", file.display()), e)))?;
            if session.add(path.clone()) {
                session.save(fs, session_file)?;
                output::action("Added", &path.display());
            } else {
                output::warning(&format!("{} already in session", path.display()));
            }
        }
        SessionCommands::Remove { file } => {
            let path = container.fs.canonicalize(file).unwrap_or_else(|_| file.clone());
            if session.remove(&path) || session.remove(file) {
                session.save(fs, session_file)?;
                output::action("Removed", &path.display());
            } else {
                output::warning(&format!("{} not in session", file.display()));
            }
        }
        SessionCommands::Check => {
            let mut workspace = container.workspace();
            let failures = workspace.restore(&session);
            for tab in 0..workspace.len() {
                if let Some(name) = workspace.title(tab) {
                    output::success_detail(&name);
                }
            }
            for (path, e) in &failures {
                output::failure(&format!("{}: {}", path.display(), e));
            }
            if !failures.is_empty() {
                return Err(CliError::Usage(format!(
                    "{} of {} session files cannot be opened",
                    failures.len(),
                    session.file_paths.len()
                )));
            }
            output::success(&format!("{} documents open", workspace.len()));
        }
    }
    Ok(())
}

// ============================================================
// Config and completion
// ============================================================

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let dir = config_dir(cli)?;
            match global_config_path() {
                Some(path) => output::info(&format!("global: {}", path.display())),
                None => output::info(&"global: (no config directory)"),
            }
            output::info(&format!("local:  {}", local_config_path(&dir).display()));
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("no global config directory".into()))?
            } else {
                local_config_path(&config_dir(cli)?)
            };
            if path.exists() {
                return Err(CliError::Usage(format!(
                    "{} already exists",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CliError::Infra(InfraError::io(format!("create {}", parent.display()), e)))?;
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| CliError::Infra(InfraError::io(format!("write {}", path.display()), e)))?;
            output::action("Created", &path.display());
        }
    }
    Ok(())
}

fn cmd_completion(shell: clap_complete::Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
