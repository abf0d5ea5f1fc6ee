//! End-of-group audit for unused references
//!
//! Each test group reports its teardowns along with how many tests it
//! owns. When the teardown count for a snapshot directory reaches that
//! number, the directory listing is compared against the paths recorded in
//! the [`CheckedRegistry`]; anything on disk that no assertion touched is
//! reported as orphaned.
//!
//! The directory is always derived from the source file. Assertions that
//! used an override directory are not audited.

use crate::checked::CheckedRegistry;
use crate::path::snapshot_directory;
use parking_lot::Mutex;
use snapverify_core::{AuditOutcome, Result, SnapshotError};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Naming convention for test methods counted by [`TestGroup::from_method_names`].
pub const TEST_METHOD_PREFIX: &str = "test";

/// A group of tests sharing one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestGroup {
    /// Source file the group's assertions come from
    pub source_file: PathBuf,
    /// Number of tests in the group
    pub test_count: usize,
}

impl TestGroup {
    /// Group with an explicitly declared test count.
    pub fn new(source_file: impl Into<PathBuf>, test_count: usize) -> Self {
        Self {
            source_file: source_file.into(),
            test_count,
        }
    }

    /// Group whose count is the number of method names with the test prefix.
    pub fn from_method_names<'a, I>(source_file: impl Into<PathBuf>, names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let test_count = names
            .into_iter()
            .filter(|name| name.starts_with(TEST_METHOD_PREFIX))
            .count();
        Self::new(source_file, test_count)
    }
}

/// Tracks teardowns per snapshot directory and audits once all have run.
#[derive(Debug)]
pub struct CompletionAuditor {
    checked: Arc<CheckedRegistry>,
    teardowns: Mutex<HashMap<PathBuf, usize>>,
}

impl CompletionAuditor {
    /// Create an auditor reading from `checked`.
    pub fn new(checked: Arc<CheckedRegistry>) -> Self {
        Self {
            checked,
            teardowns: Mutex::new(HashMap::new()),
        }
    }

    /// Record one teardown for `group`.
    ///
    /// Returns `Pending` until the teardown count equals the group's test
    /// count, then the audit result. Later calls return `AlreadyAudited`.
    /// A group declaring zero tests is never audited and stays `Pending`.
    ///
    /// # Errors
    ///
    /// Listing the snapshot directory fails for any reason other than the
    /// directory not existing.
    pub fn note_teardown(&self, group: &TestGroup) -> Result<AuditOutcome> {
        let directory = snapshot_directory(&group.source_file);

        let seen = {
            let mut teardowns = self.teardowns.lock();
            let count = teardowns.entry(directory.clone()).or_insert(0);
            *count += 1;
            *count
        };

        if group.test_count == 0 {
            warn!(
                target: "snapverify::audit",
                source = %group.source_file.display(),
                "Test group declares no tests; skipping audit"
            );
            return Ok(AuditOutcome::Pending { seen, expected: 0 });
        }
        if seen < group.test_count {
            return Ok(AuditOutcome::Pending {
                seen,
                expected: group.test_count,
            });
        }
        if seen > group.test_count {
            return Ok(AuditOutcome::AlreadyAudited);
        }

        let outcome = self.audit(&directory)?;
        match &outcome {
            AuditOutcome::Orphaned(files) => warn!(
                target: "snapverify::audit",
                directory = %directory.display(),
                orphaned = files.len(),
                "Unused snapshot references"
            ),
            _ => info!(
                target: "snapverify::audit",
                directory = %directory.display(),
                "All snapshot references exercised"
            ),
        }
        Ok(outcome)
    }

    /// Compare the directory listing against checked paths.
    pub fn audit(&self, directory: &Path) -> Result<AuditOutcome> {
        let entries = match std::fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AuditOutcome::Clean),
            Err(e) => return Err(SnapshotError::io("list snapshot directory", directory, e)),
        };

        let checked: HashSet<PathBuf> = self.checked.checked(directory).into_iter().collect();
        let mut orphaned = BTreeSet::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| SnapshotError::io("list snapshot directory", directory, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| SnapshotError::io("stat snapshot file", entry.path(), e))?;
            if !file_type.is_file() || entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let path = directory.join(entry.file_name());
            if !checked.contains(&path) {
                orphaned.insert(path);
            }
        }

        if orphaned.is_empty() {
            Ok(AuditOutcome::Clean)
        } else {
            Ok(AuditOutcome::Orphaned(orphaned.into_iter().collect()))
        }
    }
}
