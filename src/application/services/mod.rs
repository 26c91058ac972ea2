//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, CommandRunner,
//! Clipboard) but are themselves concrete structs, not traits.

mod outline;

pub use outline::{is_link, OutlineService};
