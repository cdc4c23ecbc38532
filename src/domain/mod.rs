//! Domain layer: XML document model and the prune transform
//!
//! This layer is independent of external concerns (no file I/O, no CLI, no config loading).

pub mod document;
pub mod error;
pub mod prune;
pub mod scheme;

pub use document::{Document, Element, Node};
pub use error::{DomainError, DomainResult};
pub use prune::{prune, prune_with_report, references, Pruned, ReferenceListing, Removal};
pub use scheme::Section;
