//! Record-or-compare orchestration for one assertion
//!
//! ## Verification Sequence
//!
//! ```text
//! 1. render value              - bounded by the request/config timeout
//! 2. resolve reference path    - explicit name or next counter value
//! 3. create snapshot directory - recursive, idempotent
//! 4. note path as checked      - feeds the completion audit
//! 5. IF recording OR no reference:
//!        write reference (temp file + rename), return Recorded
//!    ELSE:
//!        read + deserialize reference, compare
//!        match    -> Match
//!        mismatch -> write failing artifact, return ComparisonFailure
//! ```
//!
//! Recording and first-time references share one write path; they differ
//! only in the message. A recorded reference is still reported to the
//! caller as needing attention.
//!
//! Concurrent verifications of different paths are independent. Two
//! verifications of the same path (same explicit name from concurrent
//! threads) are logged and remain last-writer-wins.

use crate::artifact::ArtifactReporter;
use crate::checked::CheckedRegistry;
use crate::path::PathResolver;
use parking_lot::{Mutex, RwLock};
use snapverify_core::{
    Diffing, RecordReason, Result, SnapshotConfig, SnapshotError, Snapshotting,
    VerificationResult,
};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, info, warn};

// ============================================================================
// Request
// ============================================================================

/// Source location and per-call options for one assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRequest {
    /// File the assertion is written in
    pub source_file: PathBuf,
    /// Enclosing test name
    pub test_name: String,
    /// Explicit snapshot name; `None` uses the per-test counter
    pub name: Option<String>,
    /// Re-record this reference regardless of the global flag
    pub record: bool,
    /// Reference directory override for this call
    pub snapshot_dir: Option<PathBuf>,
    /// Rendering wait for this call; `None` uses the configured timeout
    pub timeout: Option<Duration>,
}

impl SnapshotRequest {
    /// Request for an unnamed snapshot with default options.
    pub fn new(source_file: impl Into<PathBuf>, test_name: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            test_name: test_name.into(),
            name: None,
            record: false,
            snapshot_dir: None,
            timeout: None,
        }
    }

    /// Use an explicit snapshot name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Force recording for this call.
    pub fn recording(mut self, record: bool) -> Self {
        self.record = record;
        self
    }

    /// Override the reference directory for this call.
    pub fn in_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }

    /// Override the rendering timeout for this call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// ============================================================================
// Verifier
// ============================================================================

/// Executes the record-or-compare decision for each assertion.
#[derive(Debug)]
pub struct Verifier {
    config: Arc<RwLock<SnapshotConfig>>,
    resolver: PathResolver,
    checked: Arc<CheckedRegistry>,
    reporter: ArtifactReporter,
    in_flight: Mutex<HashSet<PathBuf>>,
}

impl Verifier {
    /// Create a verifier over shared configuration and registries.
    pub fn new(
        config: Arc<RwLock<SnapshotConfig>>,
        resolver: PathResolver,
        checked: Arc<CheckedRegistry>,
        reporter: ArtifactReporter,
    ) -> Self {
        Self {
            config,
            resolver,
            checked,
            reporter,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Shared configuration.
    pub fn config(&self) -> &Arc<RwLock<SnapshotConfig>> {
        &self.config
    }

    /// Verify `value` against its reference.
    ///
    /// Never panics on I/O or rendering problems; those come back as
    /// [`VerificationResult::Error`].
    pub async fn verify<V, S>(
        &self,
        value: &V,
        strategy: &S,
        request: &SnapshotRequest,
    ) -> VerificationResult
    where
        V: ?Sized,
        S: Snapshotting<V>,
    {
        match self.try_verify(value, strategy, request).await {
            Ok(result) => result,
            Err(e) => VerificationResult::Error(e),
        }
    }

    /// Blocking form of [`Verifier::verify`] for synchronous tests.
    ///
    /// Outside a runtime the rendering is driven on a private current-thread
    /// runtime. Inside a multi-thread runtime the worker is handed off with
    /// `block_in_place` and the ambient runtime drives it. A current-thread
    /// runtime cannot be blocked on, so that case returns
    /// [`SnapshotError::BlockingInRuntime`]; await [`Verifier::verify`] there.
    pub fn verify_blocking<V, S>(
        &self,
        value: &V,
        strategy: &S,
        request: &SnapshotRequest,
    ) -> VerificationResult
    where
        V: ?Sized,
        S: Snapshotting<V>,
    {
        if let Ok(handle) = Handle::try_current() {
            return match handle.runtime_flavor() {
                RuntimeFlavor::MultiThread => tokio::task::block_in_place(|| {
                    handle.block_on(self.verify(value, strategy, request))
                }),
                _ => {
                    warn!(
                        target: "snapverify::engine",
                        test = %request.test_name,
                        "Blocking verification inside a current-thread runtime"
                    );
                    VerificationResult::Error(SnapshotError::BlockingInRuntime)
                }
            };
        }

        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                return VerificationResult::Error(SnapshotError::RenderingFailed(format!(
                    "failed to start rendering runtime: {}",
                    e
                )))
            }
        };
        runtime.block_on(self.verify(value, strategy, request))
    }

    async fn try_verify<V, S>(
        &self,
        value: &V,
        strategy: &S,
        request: &SnapshotRequest,
    ) -> Result<VerificationResult>
    where
        V: ?Sized,
        S: Snapshotting<V>,
    {
        let config = self.config.read().clone();
        let timeout = request.timeout.unwrap_or_else(|| config.timeout());

        // Step 1: Render (the only suspension point)
        let rendered = match tokio::time::timeout(timeout, strategy.render(value)).await {
            Ok(Ok(rendered)) => rendered,
            Ok(Err(e)) => {
                warn!(target: "snapverify::engine", test = %request.test_name, error = %e, "Rendering failed");
                return Err(e);
            }
            Err(_) => {
                warn!(
                    target: "snapverify::engine",
                    test = %request.test_name,
                    timeout_ms = timeout.as_millis() as u64,
                    "Rendering timed out"
                );
                return Err(SnapshotError::Timeout(timeout));
            }
        };

        // Step 2: Resolve
        let override_dir = request
            .snapshot_dir
            .as_deref()
            .or(config.snapshot_dir.as_deref());
        let snapshot = self.resolver.resolve(
            &request.source_file,
            &request.test_name,
            request.name.as_deref(),
            override_dir,
            strategy.extension(),
        )?;
        let path = snapshot.to_path_buf();

        // Step 3: Directory
        std::fs::create_dir_all(&snapshot.directory).map_err(|e| {
            SnapshotError::io("create snapshot directory", &snapshot.directory, e)
        })?;

        // Step 4: Bookkeeping
        self.checked.record(&snapshot.directory, path.clone());
        let _claim = self.claim(&path);

        let diffing = strategy.diffing();
        let exists = path
            .try_exists()
            .map_err(|e| SnapshotError::io("check reference", &path, e))?;

        // Step 5: Decide
        let recording = request.record || config.record;
        if recording || !exists {
            let reason = if recording {
                RecordReason::Requested
            } else {
                RecordReason::Missing
            };
            write_reference(&path, &diffing.serialize(&rendered))?;
            info!(
                target: "snapverify::engine",
                path = %path.display(),
                reason = ?reason,
                "Reference recorded"
            );
            let message = recorded_message(reason, &path, &request.test_name);
            return Ok(VerificationResult::Recorded {
                path,
                reason,
                message,
            });
        }

        let bytes =
            std::fs::read(&path).map_err(|e| SnapshotError::io("read reference", &path, e))?;
        let reference = diffing
            .deserialize(&bytes)
            .map_err(|reason| SnapshotError::CorruptReference {
                path: path.clone(),
                reason,
            })?;

        match diffing.compare(&reference, &rendered) {
            None => {
                debug!(target: "snapverify::engine", path = %path.display(), "Reference matched");
                Ok(VerificationResult::Match)
            }
            Some(difference) => self.reporter.report(
                &config,
                &diffing.serialize(&rendered),
                difference,
                &path,
                &request.source_file,
            ),
        }
    }

    fn claim(&self, path: &Path) -> InFlight<'_> {
        let owned = self.in_flight.lock().insert(path.to_path_buf());
        if !owned {
            warn!(
                target: "snapverify::engine",
                path = %path.display(),
                "Concurrent verification of the same reference; last writer wins"
            );
        }
        InFlight {
            set: &self.in_flight,
            path: path.to_path_buf(),
            owned,
        }
    }
}

/// Marks a reference path as being verified until dropped.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<PathBuf>>,
    path: PathBuf,
    owned: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.owned {
            self.set.lock().remove(&self.path);
        }
    }
}

// ============================================================================
// Reference I/O
// ============================================================================

/// Write a reference atomically.
///
/// Uses a uniquely named hidden temp file + rename so a crash never leaves
/// a partial reference and concurrent writers never share a temp file.
/// The temp file is removed if any step fails.
fn write_reference(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = tempfile::Builder::new()
        .prefix(".snapverify-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| SnapshotError::io("create temp reference", dir, e))?;
    temp.write_all(bytes)
        .map_err(|e| SnapshotError::io("write reference", temp.path(), e))?;
    temp.persist(path).map_err(|e| {
        warn!(
            target: "snapverify::engine",
            path = %path.display(),
            error = %e.error,
            "Rename failed, cleaning up temp file"
        );
        SnapshotError::io("write reference", path, e.error)
    })?;
    Ok(())
}

fn recorded_message(reason: RecordReason, path: &Path, test_name: &str) -> String {
    match reason {
        RecordReason::Requested => format!(
            "Record mode is on. Recorded snapshot to \"{}\".\n\n\
             Turn record mode off and re-run \"{}\" to test against the newly-recorded snapshot.",
            path.display(),
            test_name
        ),
        RecordReason::Missing => format!(
            "No reference was found on disk. Automatically recorded snapshot to \"{}\".\n\n\
             Re-run \"{}\" to test against the newly-recorded snapshot.",
            path.display(),
            test_name
        ),
    }
}
