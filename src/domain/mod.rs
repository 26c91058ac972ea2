//! Domain layer: the outline tree and its edit/serialize/search algebra
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod codec;
pub mod error;
pub mod filter;
mod mutator;
pub mod node_path;
pub mod record;
mod serializer;

pub use arena::{ItemNode, NodeId, Outline, PostOrderIterator, TreeIterator};
pub use error::{DomainError, DomainResult};
pub use filter::contains;
pub use node_path::NodePath;
pub use record::Record;
