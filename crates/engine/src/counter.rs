//! Sequential identifiers for unnamed snapshots
//!
//! A test that takes several unnamed snapshots gets `test.1`, `test.2`, ...
//! Counters are keyed by (snapshot directory, sanitized test name) and live
//! for the whole process, so repeated calls within one run never collide.
//!
//! All reads and increments go through one `parking_lot::Mutex` guarding the
//! whole map. Values for one key are handed out in lock-acquisition order.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Process-lifetime registry of per-test snapshot counters.
#[derive(Debug, Default)]
pub struct IdentityCounter {
    counters: Mutex<HashMap<(PathBuf, String), u64>>,
}

impl IdentityCounter {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next identifier for `(directory, test_name)`.
    ///
    /// Starts at 1 for a new key and increases by exactly one per call.
    pub fn next(&self, directory: &Path, test_name: &str) -> u64 {
        let mut counters = self.counters.lock();
        let slot = counters
            .entry((directory.to_path_buf(), test_name.to_string()))
            .or_insert(0);
        *slot += 1;
        *slot
    }

    /// Last identifier handed out for a key, 0 if none.
    pub fn current(&self, directory: &Path, test_name: &str) -> u64 {
        self.counters
            .lock()
            .get(&(directory.to_path_buf(), test_name.to_string()))
            .copied()
            .unwrap_or(0)
    }
}
