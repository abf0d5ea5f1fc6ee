//! Core types and traits for Snapverify
//!
//! This crate defines the foundational types used throughout the system:
//! - SnapshotIdentity / SnapshotPath: where a reference lives
//! - VerificationResult: outcome of one assertion
//! - AuditOutcome: outcome of one teardown notification
//! - SnapshotError: error type hierarchy
//! - Traits: collaborator seams (Snapshotting, Diffing, Rendering, AttachmentSink)
//! - SnapshotConfig: record flag, diff tool, artifact and reference roots

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types and traits
pub use config::{format_diff_tool, SnapshotConfig, CONFIG_FILE_NAME};
pub use error::{Result, SnapshotError};
pub use traits::{
    AttachmentSink, Diffing, Pullback, RenderFuture, Rendering, Snapshotting, SnapshottingExt,
};
pub use types::{
    Attachment, AuditOutcome, Difference, RecordReason, SnapshotIdentity, SnapshotPath,
    VerificationResult,
};
