//! Reference path resolution
//!
//! References live next to the test source:
//!
//! ```text
//! <dir of source>/__Snapshots__/<source stem>/<test>.<identifier>.<ext>
//! ```
//!
//! `identifier` is the sanitized explicit name when one is given, otherwise
//! the next value of the per-test [`IdentityCounter`]. Apart from that
//! counter read, resolution is pure: no filesystem access happens here.

use crate::counter::IdentityCounter;
use regex::Regex;
use snapverify_core::{Result, SnapshotError, SnapshotIdentity, SnapshotPath};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Directory name inserted between the source directory and the per-file folder.
pub const SNAPSHOTS_DIR_NAME: &str = "__Snapshots__";

/// Replace every run of non-word characters with `-` and trim one `-` from each end.
///
/// The result may be empty; callers that need a file name reject that case.
pub fn sanitize_path_component(name: &str) -> String {
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    let regex = NON_WORD.get_or_init(|| Regex::new(r"\W+").expect("static pattern compiles"));

    let replaced = regex.replace_all(name, "-");
    let trimmed = replaced.strip_prefix('-').unwrap_or(&replaced);
    let trimmed = trimmed.strip_suffix('-').unwrap_or(trimmed);
    trimmed.to_string()
}

fn sanitized_component(name: &str) -> Result<String> {
    let sanitized = sanitize_path_component(name);
    if sanitized.is_empty() {
        return Err(SnapshotError::InvalidName(name.to_string()));
    }
    Ok(sanitized)
}

/// Default snapshot directory for a source file, ignoring any override.
pub fn snapshot_directory(source_file: &Path) -> PathBuf {
    let parent = source_file.parent().unwrap_or_else(|| Path::new(""));
    let stem = source_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    parent.join(SNAPSHOTS_DIR_NAME).join(stem)
}

/// Maps assertion identities onto reference paths.
#[derive(Debug, Clone)]
pub struct PathResolver {
    counter: Arc<IdentityCounter>,
}

impl PathResolver {
    /// Create a resolver that allocates identifiers from `counter`.
    pub fn new(counter: Arc<IdentityCounter>) -> Self {
        Self { counter }
    }

    /// Counter backing unnamed snapshots.
    pub fn counter(&self) -> &Arc<IdentityCounter> {
        &self.counter
    }

    /// Build the identity for one assertion call.
    ///
    /// An override directory is used verbatim; otherwise the directory is
    /// derived from `source_file`.
    pub fn identity(
        &self,
        source_file: &Path,
        test_name: &str,
        explicit_name: Option<&str>,
        override_dir: Option<&Path>,
    ) -> SnapshotIdentity {
        let directory = match override_dir {
            Some(dir) => dir.to_path_buf(),
            None => snapshot_directory(source_file),
        };
        SnapshotIdentity {
            directory,
            test_name: test_name.to_string(),
            explicit_name: explicit_name.map(str::to_string),
        }
    }

    /// Resolve a reference path for one assertion call.
    pub fn resolve(
        &self,
        source_file: &Path,
        test_name: &str,
        explicit_name: Option<&str>,
        override_dir: Option<&Path>,
        extension: Option<&str>,
    ) -> Result<SnapshotPath> {
        let identity = self.identity(source_file, test_name, explicit_name, override_dir);
        self.path_for(&identity, extension)
    }

    /// Resolve the path for an identity.
    ///
    /// Explicit names never touch the counter: the same name twice in one
    /// test targets the same file.
    ///
    /// # Errors
    ///
    /// `InvalidName` when the test name or explicit name has no word characters.
    pub fn path_for(
        &self,
        identity: &SnapshotIdentity,
        extension: Option<&str>,
    ) -> Result<SnapshotPath> {
        let test = sanitized_component(&identity.test_name)?;
        let identifier = match &identity.explicit_name {
            Some(name) => sanitized_component(name)?,
            None => self.counter.next(&identity.directory, &test).to_string(),
        };
        Ok(SnapshotPath {
            directory: identity.directory.clone(),
            file_stem: format!("{}.{}", test, identifier),
            extension: extension.filter(|e| !e.is_empty()).map(str::to_string),
        })
    }
}
