//! rsoutline: hierarchical list editor core
//!
//! Layers, innermost first: `domain` (outline tree, records, codec),
//! `application` (documents, workspace, services), `infrastructure`
//! (I/O boundaries, DI), `cli`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
