//! Verification engine for Snapverify
//!
//! This crate orchestrates snapshot verification:
//! - PathResolver: reference paths from source location and test name
//! - IdentityCounter: sequential identifiers for unnamed snapshots
//! - Verifier: render, resolve, record-or-compare
//! - ArtifactReporter: failing artifacts and mismatch messages
//! - CompletionAuditor: unused-reference detection after a test group
//! - SnapshotContext: the shared registries tying these together
//!
//! Rendering strategies and test-framework integration live elsewhere.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod audit;
pub mod checked;
pub mod context;
pub mod counter;
pub mod path;
pub mod verifier;

pub use artifact::{ArtifactReporter, MISMATCH_HEADER};
pub use audit::{CompletionAuditor, TestGroup};
pub use checked::CheckedRegistry;
pub use context::SnapshotContext;
pub use counter::IdentityCounter;
pub use path::{sanitize_path_component, snapshot_directory, PathResolver, SNAPSHOTS_DIR_NAME};
pub use verifier::{SnapshotRequest, Verifier};
