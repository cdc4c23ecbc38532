//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Prune build target references from Xcode scheme files
#[derive(Parser, Debug)]
#[command(name = "schemeprune")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remove a build target from scheme actions
    Prune {
        /// Scheme file, or directory searched for .xcscheme files (default: config `scheme`)
        #[arg(value_hint = ValueHint::AnyPath)]
        path: Option<PathBuf>,
        /// Build target name (default: config `target`)
        #[arg(short, long)]
        target: Option<String>,
        /// Show what would be removed, write nothing
        #[arg(short = 'n', long)]
        dry_run: bool,
        /// Keep a <file>.orig copy before overwriting
        #[arg(short, long)]
        backup: bool,
    },

    /// Show build target references per scheme action
    List {
        /// Scheme file, or directory searched for .xcscheme files (default: config `scheme`)
        #[arg(value_hint = ValueHint::AnyPath)]
        path: Option<PathBuf>,
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
