//! Bookkeeping of references exercised during this run
//!
//! Every verification appends its resolved path under its snapshot
//! directory, whether it compared or recorded. The list only grows; the
//! completion audit reads it but never clears it.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Process-lifetime map of snapshot directory to checked reference paths.
#[derive(Debug, Default)]
pub struct CheckedRegistry {
    checked: Mutex<HashMap<PathBuf, Vec<PathBuf>>>,
}

impl CheckedRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reference path. Duplicates are kept.
    pub fn record(&self, directory: &Path, path: PathBuf) {
        self.checked
            .lock()
            .entry(directory.to_path_buf())
            .or_default()
            .push(path);
    }

    /// Paths checked so far under `directory`, in call order.
    pub fn checked(&self, directory: &Path) -> Vec<PathBuf> {
        self.checked
            .lock()
            .get(directory)
            .cloned()
            .unwrap_or_default()
    }

    /// True if `path` was checked under `directory`.
    pub fn contains(&self, directory: &Path, path: &Path) -> bool {
        self.checked
            .lock()
            .get(directory)
            .map(|paths| paths.iter().any(|p| p == path))
            .unwrap_or(false)
    }
}
