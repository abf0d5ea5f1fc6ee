//! Shared verification state
//!
//! A [`SnapshotContext`] owns the process-lifetime registries (identity
//! counters, checked paths, teardown counts) and the live configuration,
//! and hands out the verifier and auditor that share them.
//!
//! Tests and hosts that want isolation build their own context. The
//! assertion layer uses [`SnapshotContext::global`], created on first use
//! from `snapverify.toml` in the working directory and the environment.

use crate::artifact::ArtifactReporter;
use crate::audit::{CompletionAuditor, TestGroup};
use crate::checked::CheckedRegistry;
use crate::counter::IdentityCounter;
use crate::path::PathResolver;
use crate::verifier::{SnapshotRequest, Verifier};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use snapverify_core::{
    AttachmentSink, AuditOutcome, Result, SnapshotConfig, Snapshotting, VerificationResult,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Process-wide default context
static GLOBAL: Lazy<SnapshotContext> = Lazy::new(|| {
    let dir = std::env::current_dir().unwrap_or_else(|e| {
        warn!(target: "snapverify::engine", error = %e, "Cannot read working directory");
        PathBuf::from(".")
    });
    SnapshotContext::new(startup_config(&dir, |key| std::env::var(key).ok()))
});

/// Config file from `dir` overlaid with `lookup`.
///
/// An unreadable file falls back to defaults; a bad variable is skipped
/// while the valid ones still apply. Both are logged, never fatal.
fn startup_config<L>(dir: &Path, lookup: L) -> SnapshotConfig
where
    L: Fn(&str) -> Option<String>,
{
    let mut config = SnapshotConfig::from_dir(dir).unwrap_or_else(|e| {
        warn!(target: "snapverify::engine", error = %e, "Invalid snapshot config file; using defaults");
        SnapshotConfig::default()
    });
    if let Err(e) = config.apply_env(lookup) {
        warn!(target: "snapverify::engine", error = %e, "Ignoring invalid snapshot environment variables");
    }
    config
}

/// Registries, configuration, verifier and auditor for one process (or test).
#[derive(Debug)]
pub struct SnapshotContext {
    config: Arc<RwLock<SnapshotConfig>>,
    counter: Arc<IdentityCounter>,
    checked: Arc<CheckedRegistry>,
    verifier: Verifier,
    auditor: CompletionAuditor,
}

impl SnapshotContext {
    /// Fresh context with empty registries.
    pub fn new(config: SnapshotConfig) -> Self {
        Self::build(config, ArtifactReporter::new())
    }

    /// Fresh context that forwards mismatch attachments to `sink`.
    pub fn with_attachment_sink(config: SnapshotConfig, sink: Arc<dyn AttachmentSink>) -> Self {
        Self::build(config, ArtifactReporter::with_sink(sink))
    }

    fn build(config: SnapshotConfig, reporter: ArtifactReporter) -> Self {
        let config = Arc::new(RwLock::new(config));
        let counter = Arc::new(IdentityCounter::new());
        let checked = Arc::new(CheckedRegistry::new());
        let verifier = Verifier::new(
            Arc::clone(&config),
            PathResolver::new(Arc::clone(&counter)),
            Arc::clone(&checked),
            reporter,
        );
        let auditor = CompletionAuditor::new(Arc::clone(&checked));
        Self {
            config,
            counter,
            checked,
            verifier,
            auditor,
        }
    }

    /// The process-wide context.
    pub fn global() -> &'static SnapshotContext {
        &GLOBAL
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> SnapshotConfig {
        self.config.read().clone()
    }

    /// Mutate the live configuration (e.g. flip record mode at test start).
    pub fn update_config<F>(&self, update: F)
    where
        F: FnOnce(&mut SnapshotConfig),
    {
        update(&mut self.config.write());
    }

    /// Global record-all flag.
    pub fn set_record(&self, record: bool) {
        self.update_config(|c| c.record = record);
    }

    /// Global diff tool template.
    pub fn set_diff_tool(&self, diff_tool: Option<String>) {
        self.update_config(|c| c.diff_tool = diff_tool);
    }

    /// Identity counters.
    pub fn counter(&self) -> &Arc<IdentityCounter> {
        &self.counter
    }

    /// Checked-path registry.
    pub fn checked(&self) -> &Arc<CheckedRegistry> {
        &self.checked
    }

    /// The verifier.
    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    /// The completion auditor.
    pub fn auditor(&self) -> &CompletionAuditor {
        &self.auditor
    }

    /// See [`Verifier::verify`].
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
        self.verifier.verify(value, strategy, request).await
    }

    /// See [`Verifier::verify_blocking`].
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
        self.verifier.verify_blocking(value, strategy, request)
    }

    /// See [`CompletionAuditor::note_teardown`].
    pub fn note_teardown(&self, group: &TestGroup) -> Result<AuditOutcome> {
        self.auditor.note_teardown(group)
    }
}
