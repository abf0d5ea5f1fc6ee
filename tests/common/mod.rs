//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use std::time::Duration;
use tempfile::TempDir;

pub use snapverify::testing::{LineDiffing, Lines, Unproducible};
pub use snapverify::{
    AuditOutcome, RecordReason, SnapshotConfig, SnapshotContext, SnapshotError, SnapshotRequest,
    TestGroup, VerificationResult,
};

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route engine logs to the test writer (visible with `--nocapture`).
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

// ============================================================================
// TestEnv - isolated context over a temp directory
// ============================================================================

/// Context with its own registries plus a temp directory holding a fake
/// test source file, its snapshot directory and an artifacts root.
pub struct TestEnv {
    pub ctx: SnapshotContext,
    pub dir: TempDir,
    pub source: PathBuf,
}

impl TestEnv {
    /// Fresh environment whose test source is `<tmp>/<source_name>`.
    pub fn new(source_name: &str) -> Self {
        init_tracing();
        let dir = TempDir::new().expect("create temp dir");
        let source = dir.path().join(source_name);
        std::fs::write(&source, "// test source\n").expect("write fake source");
        let ctx = SnapshotContext::new(SnapshotConfig {
            artifacts_dir: Some(dir.path().join("artifacts")),
            ..Default::default()
        });
        Self { ctx, dir, source }
    }

    /// Request for an unnamed snapshot in `test`.
    pub fn request(&self, test: &str) -> SnapshotRequest {
        SnapshotRequest::new(&self.source, test)
    }

    /// Default snapshot directory for the fake source.
    pub fn snapshots(&self) -> PathBuf {
        snapverify::snapshot_directory(&self.source)
    }

    /// Artifacts root configured for this environment.
    pub fn artifacts(&self) -> PathBuf {
        self.dir.path().join("artifacts")
    }

    /// Verify text with the line strategy.
    pub fn verify_text(&self, text: &str, request: &SnapshotRequest) -> VerificationResult {
        self.ctx.verify_blocking(text, &Lines::new(), request)
    }
}

/// Extract the path of a `Recorded` result or panic.
pub fn recorded_path(result: VerificationResult) -> PathBuf {
    match result {
        VerificationResult::Recorded { path, .. } => path,
        other => panic!("expected Recorded, got {:?}", other),
    }
}
