//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) but are themselves
//! concrete structs, not traits.

mod scheme;

pub use scheme::{backup_path, PruneOptions, PruneOutcome, SchemeReferences, SchemeService};
