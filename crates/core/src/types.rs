//! Data model for a single verification
//!
//! - SnapshotIdentity: where an assertion came from (file, test, name)
//! - SnapshotPath: the resolved reference location
//! - Difference / Attachment: what a diffing strategy reports on mismatch
//! - VerificationResult: the outcome of one assertion call
//! - AuditOutcome: the outcome of one teardown notification

use crate::error::SnapshotError;
use std::fmt;
use std::path::{Path, PathBuf};

// ============================================================================
// Identity and Paths
// ============================================================================

/// Source-location identity of one assertion call.
///
/// Constructed per call and discarded afterwards. When `explicit_name` is
/// present it alone determines the file stem; otherwise a per-test counter
/// does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotIdentity {
    /// Snapshot directory the reference lives in
    pub directory: PathBuf,
    /// Name of the enclosing test
    pub test_name: String,
    /// Caller-supplied snapshot name, if any
    pub explicit_name: Option<String>,
}

impl SnapshotIdentity {
    /// Create an identity for an unnamed snapshot.
    pub fn new(directory: impl Into<PathBuf>, test_name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            test_name: test_name.into(),
            explicit_name: None,
        }
    }

    /// Attach an explicit snapshot name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.explicit_name = Some(name.into());
        self
    }
}

/// Resolved on-disk location of a reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotPath {
    /// Directory holding the reference
    pub directory: PathBuf,
    /// File name without extension (`<test>.<counter>` or `<test>.<name>`)
    pub file_stem: String,
    /// Extension declared by the rendering strategy
    pub extension: Option<String>,
}

impl SnapshotPath {
    /// File name including the extension, if any.
    pub fn file_name(&self) -> String {
        match &self.extension {
            Some(ext) => format!("{}.{}", self.file_stem, ext),
            None => self.file_stem.clone(),
        }
    }

    /// Full path of the reference file.
    pub fn to_path_buf(&self) -> PathBuf {
        self.directory.join(self.file_name())
    }
}

impl fmt::Display for SnapshotPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path_buf().display())
    }
}

// ============================================================================
// Differences
// ============================================================================

/// Supplementary material attached to a mismatch (e.g. a rendered image).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Display name
    pub name: String,
    /// Uniform type / media type hint, e.g. `public.png`
    pub kind: Option<String>,
    /// Raw payload
    pub data: Vec<u8>,
}

impl Attachment {
    /// Create an attachment with no type hint.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            data,
        }
    }

    /// Set the type hint.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

/// A difference reported by a diffing strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    /// Human-readable explanation of how the values differ
    pub explanation: String,
    /// Zero or more supplementary attachments
    pub attachments: Vec<Attachment>,
}

impl Difference {
    /// Create a difference with no attachments.
    pub fn new(explanation: impl Into<String>) -> Self {
        Self {
            explanation: explanation.into(),
            attachments: Vec::new(),
        }
    }

    /// Add an attachment.
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

// ============================================================================
// Verification Result
// ============================================================================

/// Why a reference was written instead of compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordReason {
    /// Recording was requested (per call or globally)
    Requested,
    /// No reference existed at the resolved path
    Missing,
}

/// Outcome of a single verification.
///
/// Only [`VerificationResult::Match`] is a silent success. A recorded
/// reference still requires attention: the calling layer fails the current
/// run so the new reference gets reviewed and verified on a re-run.
#[derive(Debug)]
pub enum VerificationResult {
    /// The rendering matches the reference
    Match,
    /// A reference was written
    Recorded {
        /// Reference path that was written
        path: PathBuf,
        /// Why the reference was written
        reason: RecordReason,
        /// Message for the human running the tests
        message: String,
    },
    /// The rendering differs from the reference
    ComparisonFailure {
        /// Full failure message (header, diff hint, explanation)
        message: String,
        /// Where the failing rendering was written
        artifact: PathBuf,
    },
    /// Verification could not reach a decision
    Error(SnapshotError),
}

impl VerificationResult {
    /// True only for a silent match.
    pub fn is_match(&self) -> bool {
        matches!(self, VerificationResult::Match)
    }

    /// True when a reference was written.
    pub fn is_recorded(&self) -> bool {
        matches!(self, VerificationResult::Recorded { .. })
    }

    /// Failure message for the caller, `None` on a match.
    pub fn failure_message(&self) -> Option<String> {
        match self {
            VerificationResult::Match => None,
            VerificationResult::Recorded { message, .. } => Some(message.clone()),
            VerificationResult::ComparisonFailure { message, .. } => Some(message.clone()),
            VerificationResult::Error(err) => Some(err.to_string()),
        }
    }
}

// ============================================================================
// Audit
// ============================================================================

/// Outcome of a teardown notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    /// Not every test in the group has torn down yet
    Pending {
        /// Teardowns observed so far
        seen: usize,
        /// Tests in the group
        expected: usize,
    },
    /// The audit already ran for this directory
    AlreadyAudited,
    /// Every reference on disk was exercised
    Clean,
    /// References on disk that no assertion touched this run
    Orphaned(Vec<PathBuf>),
}

impl AuditOutcome {
    /// Failure message naming the orphaned references, if any.
    pub fn failure_message(&self, directory: &Path) -> Option<String> {
        match self {
            AuditOutcome::Orphaned(files) => {
                let names: Vec<String> = files
                    .iter()
                    .map(|f| format!("  {}", f.display()))
                    .collect();
                Some(format!(
                    "{} unused snapshot reference(s) in '{}':\n{}",
                    files.len(),
                    directory.display(),
                    names.join("\n")
                ))
            }
            _ => None,
        }
    }
}
