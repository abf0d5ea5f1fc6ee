//! Assertion layer over the verification engine
//!
//! Thin wrappers that turn a [`VerificationResult`] into either `None`
//! (match) or a failure message, plus helpers that recover the calling
//! test's source file and name. The macros in the crate root capture
//! `file!()` and `CARGO_MANIFEST_DIR` at the call site.

use snapverify_core::{AuditOutcome, Snapshotting, VerificationResult};
use snapverify_engine::{snapshot_directory, SnapshotContext, SnapshotRequest, TestGroup};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the currently running test.
///
/// The Rust test harness names each test thread after the test's path
/// (`module::test_name`); the last segment is used. Outside the harness
/// this falls back to the thread name or `"unnamed"`.
pub fn current_test_name() -> String {
    let thread = std::thread::current();
    match thread.name() {
        Some(name) => name.rsplit("::").next().unwrap_or(name).to_string(),
        None => "unnamed".to_string(),
    }
}

/// Absolute path of a `file!()` location.
///
/// `file!()` is relative to the workspace root while tests run from the
/// package root, so each ancestor of `manifest_dir` is tried in turn.
pub fn resolve_source_file(manifest_dir: &str, file: &str) -> PathBuf {
    let file = Path::new(file);
    if file.is_absolute() {
        return file.to_path_buf();
    }
    let manifest_dir = Path::new(manifest_dir);
    manifest_dir
        .ancestors()
        .map(|base| base.join(file))
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| manifest_dir.join(file))
}

/// Verify against the global context. `None` means the snapshot matched.
pub fn verify_snapshot<V, S>(value: &V, strategy: &S, request: &SnapshotRequest) -> Option<String>
where
    V: ?Sized,
    S: Snapshotting<V>,
{
    verify_snapshot_in(SnapshotContext::global(), value, strategy, request)
}

/// Verify against a specific context. `None` means the snapshot matched.
pub fn verify_snapshot_in<V, S>(
    context: &SnapshotContext,
    value: &V,
    strategy: &S,
    request: &SnapshotRequest,
) -> Option<String>
where
    V: ?Sized,
    S: Snapshotting<V>,
{
    context
        .verify_blocking(value, strategy, request)
        .failure_message()
}

/// Verify against the global context and panic on anything but a match.
#[track_caller]
pub fn assert_snapshot<V, S>(value: &V, strategy: &S, request: &SnapshotRequest)
where
    V: ?Sized,
    S: Snapshotting<V>,
{
    if let Some(message) = verify_snapshot(value, strategy, request) {
        panic!("{}", message);
    }
}

/// A strategy with its format erased, so several can be listed together.
pub trait AnyStrategy<V: ?Sized> {
    /// Run one verification.
    fn verify_with(
        &self,
        context: &SnapshotContext,
        value: &V,
        request: &SnapshotRequest,
    ) -> VerificationResult;
}

impl<V: ?Sized, S: Snapshotting<V>> AnyStrategy<V> for S {
    fn verify_with(
        &self,
        context: &SnapshotContext,
        value: &V,
        request: &SnapshotRequest,
    ) -> VerificationResult {
        context.verify_blocking(value, self, request)
    }
}

/// Verify one value against several named strategies.
///
/// Each strategy's name becomes the explicit snapshot name. Returns every
/// failure, each prefixed with its strategy name.
pub fn verify_snapshots_in<V: ?Sized>(
    context: &SnapshotContext,
    value: &V,
    strategies: &[(&str, &dyn AnyStrategy<V>)],
    request: &SnapshotRequest,
) -> Vec<String> {
    strategies
        .iter()
        .filter_map(|(name, strategy)| {
            let request = request.clone().named(*name);
            strategy
                .verify_with(context, value, &request)
                .failure_message()
                .map(|message| format!("[{}] {}", name, message))
        })
        .collect()
}

/// Assert one value against several named strategies on the global context.
#[track_caller]
pub fn assert_snapshots<V: ?Sized>(
    value: &V,
    strategies: &[(&str, &dyn AnyStrategy<V>)],
    request: &SnapshotRequest,
) {
    let failures = verify_snapshots_in(SnapshotContext::global(), value, strategies, request);
    if !failures.is_empty() {
        panic!("{}", failures.join("\n\n"));
    }
}

/// Report a teardown for `group` on the global context.
///
/// Panics when the audit finds unused references or cannot list the
/// snapshot directory.
#[track_caller]
pub fn finish_test(group: &TestGroup) -> AuditOutcome {
    match SnapshotContext::global().note_teardown(group) {
        Ok(outcome) => {
            let directory = snapshot_directory(&group.source_file);
            debug!(
                target: "snapverify::audit",
                source = %group.source_file.display(),
                outcome = ?outcome,
                "Teardown noted"
            );
            if let Some(message) = outcome.failure_message(&directory) {
                panic!("{}", message);
            }
            outcome
        }
        Err(e) => panic!("snapshot audit failed: {}", e),
    }
}
