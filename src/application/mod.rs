//! Application layer: documents, workspace and services
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod document;
pub mod error;
pub mod error_ext;
pub mod extension;
pub mod services;
pub mod workspace;

pub use document::Document;
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use extension::{Extension, ExtensionRegistry};
pub use workspace::{Session, Workspace};
