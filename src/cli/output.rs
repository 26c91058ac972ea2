//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::collections::HashSet;

use colored::Colorize;
use termtree::Tree;

use crate::domain::{NodeId, Outline};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print success status indented (green checkmark with leading spaces)
pub fn success_detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print failure status (red X, indented)
pub fn failure(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "✗".red(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print plain output (no color, for data/JSON)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Builds a printable tree of `start` and its descendants.
///
/// Items are labelled with their path. With `fold = Some(focus)` the
/// children of collapsed items are hidden (marked `+`), except along the
/// ancestor chain of `focus`, which stays open so `focus` is visible.
pub fn render_tree(
    outline: &Outline,
    start: NodeId,
    title: &str,
    fold: Option<NodeId>,
) -> Tree<String> {
    struct Frame {
        id: NodeId,
        next: usize,
        tree: Tree<String>,
    }

    let view = TreeView::new(outline, title, fold);
    let mut stack = vec![Frame {
        id: start,
        next: 0,
        tree: Tree::new(view.label(start)),
    }];

    while let Some(mut frame) = stack.pop() {
        match view.visible(frame.id).get(frame.next).copied() {
            Some(child) => {
                frame.next += 1;
                stack.push(frame);
                stack.push(Frame {
                    id: child,
                    next: 0,
                    tree: Tree::new(view.label(child)),
                });
            }
            None => match stack.last_mut() {
                Some(parent) => {
                    parent.tree.push(frame.tree);
                }
                None => return frame.tree,
            },
        }
    }
    Tree::new(view.label(start))
}

struct TreeView<'a> {
    outline: &'a Outline,
    title: &'a str,
    folding: bool,
    forced: HashSet<NodeId>,
}

impl<'a> TreeView<'a> {
    fn new(outline: &'a Outline, title: &'a str, fold: Option<NodeId>) -> Self {
        let mut forced = HashSet::new();
        if let Some(focus) = fold {
            let mut current = outline.parent_of(focus);
            while let Some(id) = current {
                forced.insert(id);
                current = outline.parent_of(id);
            }
        }
        Self {
            outline,
            title,
            folding: fold.is_some(),
            forced,
        }
    }

    fn visible(&self, id: NodeId) -> &'a [NodeId] {
        match self.outline.node(id) {
            Some(node) if !self.folding || node.expanded() || self.forced.contains(&id) => {
                node.children()
            }
            _ => &[],
        }
    }

    fn label(&self, id: NodeId) -> String {
        if id == self.outline.root() {
            return self.title.bold().to_string();
        }
        let path = self
            .outline
            .path_of(id)
            .map(|p| p.to_string())
            .unwrap_or_default();
        let text = self.outline.text(id).unwrap_or_default();
        let folded = self.visible(id).is_empty()
            && self.outline.node(id).is_some_and(|node| !node.is_leaf());
        if folded {
            format!("{} {} {}", path.dimmed(), text, "+".yellow())
        } else {
            format!("{} {}", path.dimmed(), text)
        }
    }
}
