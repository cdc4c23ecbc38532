//! Prune build target references from Xcode scheme files.
//!
//! A scheme (`*.xcscheme`) lists build targets in its Build, Test, Launch and
//! Profile actions. When a target is removed from a project, its references
//! linger there. This crate removes them:
//!
//! - **[`domain`]**: XML document tree and the pure `prune` transform.
//!   No I/O, fully testable in isolation.
//! - **[`application`]**: `SchemeService`, which loads, prunes and rewrites files.
//! - **[`infrastructure`]**: the `FileSystem` boundary and its real implementation.
//! - **[`cli`]**: argument parsing, command dispatch and terminal output.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{prune, prune_with_report, Document};
