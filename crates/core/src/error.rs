//! Error types for snapshot verification
//!
//! This module defines all error types surfaced by the engine.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Mismatches and freshly recorded references are not errors: they are
//! reported through [`crate::VerificationResult`]. Only conditions that stop
//! a verification from reaching a decision live here.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Result type alias for snapshot operations
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Error types for the snapshot engine
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The rendering producer did not complete within the allotted time
    #[error("exceeded timeout waiting for snapshot ({}ms)", .0.as_millis())]
    Timeout(Duration),

    /// The rendering producer completed without delivering a value
    #[error("could not produce snapshot: {0}")]
    RenderingFailed(String),

    /// I/O error (directory creation, file read/write, directory listing)
    #[error("failed to {op} '{}': {source}", path.display())]
    Io {
        /// Operation that was attempted
        op: &'static str,
        /// Path the operation targeted
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A reference file exists but could not be decoded
    #[error("corrupt reference '{}': {reason}", path.display())]
    CorruptReference {
        /// Reference path
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// A snapshot or test name sanitizes to nothing usable on disk
    #[error("invalid snapshot name {0:?}: no word characters remain after sanitizing")]
    InvalidName(String),

    /// A blocking verification was started on a current-thread async runtime
    #[error(
        "cannot block on snapshot verification inside a current-thread async runtime; \
         await SnapshotContext::verify instead"
    )]
    BlockingInRuntime,

    /// Configuration could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),
}

impl SnapshotError {
    /// Wrap an `io::Error` with the operation and path it came from.
    pub fn io(op: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        SnapshotError::Io {
            op,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// True for failures of the rendering step (timeout or abnormal completion).
    pub fn is_rendering(&self) -> bool {
        matches!(
            self,
            SnapshotError::Timeout(_) | SnapshotError::RenderingFailed(_)
        )
    }
}
