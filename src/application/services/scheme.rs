//! Scheme pruning service
//!
//! Loads scheme files, runs the prune transform and writes the result back.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::scheme::SCHEME_EXTENSION;
use crate::domain::{
    prune_with_report, references, Document, DomainError, ReferenceListing, Removal,
};
use crate::infrastructure::traits::FileSystem;

/// How a prune run treats the files it touches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneOptions {
    /// Report what would be removed without writing anything
    pub dry_run: bool,
    /// Copy the original to `<file>.orig` before overwriting
    pub backup: bool,
}

/// What happened to one scheme file.
#[derive(Debug, Clone)]
pub struct PruneOutcome {
    pub path: PathBuf,
    pub removals: Vec<Removal>,
    /// Whether the file was rewritten
    pub written: bool,
}

/// References found in one scheme file.
#[derive(Debug, Clone)]
pub struct SchemeReferences {
    pub path: PathBuf,
    pub references: Vec<ReferenceListing>,
}

/// Service for pruning build target references from scheme files.
pub struct SchemeService {
    fs: Arc<dyn FileSystem>,
}

impl SchemeService {
    /// Create a new scheme service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Scheme files addressed by `path`.
    ///
    /// A directory (e.g. an `.xcodeproj`) yields every `.xcscheme` below it;
    /// anything else is taken as a scheme file.
    pub fn schemes(&self, path: &Path) -> ApplicationResult<Vec<PathBuf>> {
        if !self.fs.is_dir(path) {
            return Ok(vec![path.to_path_buf()]);
        }
        let files = self
            .fs
            .find_files(path, SCHEME_EXTENSION)
            .with_path_context("search schemes in", path)?;
        debug!("schemes: found {} under {}", files.len(), path.display());
        if files.is_empty() {
            return Err(ApplicationError::NoSchemes(path.to_path_buf()));
        }
        Ok(files)
    }

    /// Prune every scheme addressed by `path`, stopping at the first failure.
    pub fn prune_path(
        &self,
        path: &Path,
        target: &str,
        options: PruneOptions,
    ) -> ApplicationResult<Vec<PruneOutcome>> {
        self.schemes(path)?
            .iter()
            .map(|scheme| self.prune_file(scheme, target, options))
            .collect()
    }

    /// Remove all references to `target` from one scheme file.
    ///
    /// The file is only rewritten when something was removed and this is not
    /// a dry run. Parse failures leave the file untouched.
    #[instrument(skip(self))]
    pub fn prune_file(
        &self,
        path: &Path,
        target: &str,
        options: PruneOptions,
    ) -> ApplicationResult<PruneOutcome> {
        let document = self.load(path)?;
        let pruned = prune_with_report(&document, target);
        for removal in &pruned.removals {
            debug!("prune_file: removing {}", removal);
        }

        let mut outcome = PruneOutcome {
            path: path.to_path_buf(),
            removals: Vec::new(),
            written: false,
        };
        if !pruned.is_changed() {
            debug!("prune_file: no reference to {} in {}", target, path.display());
            return Ok(outcome);
        }
        if options.dry_run {
            outcome.removals = pruned.removals;
            return Ok(outcome);
        }

        let xml = pruned.document.to_xml_string()?;
        if options.backup {
            let backup = backup_path(path);
            self.fs
                .copy(path, &backup)
                .with_path_context("back up scheme to", &backup)?;
            debug!("prune_file: backup at {}", backup.display());
        }
        self.fs
            .write_atomic(path, &xml)
            .with_path_context("write scheme", path)?;
        info!(
            "removed {} reference(s) to {} from {}",
            pruned.removals.len(),
            target,
            path.display()
        );

        outcome.removals = pruned.removals;
        outcome.written = true;
        Ok(outcome)
    }

    /// List references in every scheme addressed by `path`.
    pub fn list_path(&self, path: &Path) -> ApplicationResult<Vec<SchemeReferences>> {
        self.schemes(path)?
            .into_iter()
            .map(|scheme| self.list_file(&scheme))
            .collect()
    }

    /// List the references of one scheme file.
    #[instrument(skip(self))]
    pub fn list_file(&self, path: &Path) -> ApplicationResult<SchemeReferences> {
        let document = self.load(path)?;
        Ok(SchemeReferences {
            path: path.to_path_buf(),
            references: references(&document),
        })
    }

    fn load(&self, path: &Path) -> ApplicationResult<Document> {
        let content = match self.fs.read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(ApplicationError::InvalidScheme {
                    path: path.to_path_buf(),
                    source: DomainError::parse("file is not valid UTF-8", 0),
                });
            }
            Err(e) => return Err(e).with_path_context("read scheme", path),
        };
        debug!("load: read {} bytes from {}", content.len(), path.display());

        Document::parse(&content).map_err(|source| ApplicationError::InvalidScheme {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// `<file>.orig` next to the scheme.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".orig");
    PathBuf::from(name)
}
