//! Failing-artifact persistence and mismatch messages
//!
//! On mismatch the fresh rendering is written to
//! `<artifacts root>/<source stem>/<reference file name>` so it can be
//! inspected or collected by CI, and a message is built from a fixed
//! header, a comparison hint and the diffing strategy's explanation.

use crate::path::snapshot_directory;
use snapverify_core::{
    AttachmentSink, Difference, Result, SnapshotConfig, SnapshotError, VerificationResult,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// First line of every mismatch message.
pub const MISMATCH_HEADER: &str = "Snapshot does not match reference.";

/// Writes failing renderings and formats mismatch reports.
#[derive(Clone, Default)]
pub struct ArtifactReporter {
    sink: Option<Arc<dyn AttachmentSink>>,
}

impl std::fmt::Debug for ArtifactReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactReporter")
            .field("attachments", &self.sink.is_some())
            .finish()
    }
}

impl ArtifactReporter {
    /// Reporter that drops attachments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reporter that forwards attachments to `sink`.
    pub fn with_sink(sink: Arc<dyn AttachmentSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Replace the attachment sink.
    pub fn set_sink(&mut self, sink: Option<Arc<dyn AttachmentSink>>) {
        self.sink = sink;
    }

    /// Where the failing rendering for `reference` is written.
    pub fn artifact_path(artifacts_root: &Path, source_file: &Path, reference: &Path) -> PathBuf {
        let group = snapshot_directory(source_file)
            .file_name()
            .map(|s| s.to_os_string())
            .unwrap_or_default();
        let file_name = reference.file_name().map(|s| s.to_os_string()).unwrap_or_default();
        artifacts_root.join(group).join(file_name)
    }

    /// Persist the failing rendering and build the comparison failure.
    ///
    /// # Errors
    ///
    /// I/O failures creating the artifact directory or writing the file.
    pub fn report(
        &self,
        config: &SnapshotConfig,
        rendered: &[u8],
        difference: Difference,
        reference: &Path,
        source_file: &Path,
    ) -> Result<VerificationResult> {
        let artifact = Self::artifact_path(&config.artifacts_root(), source_file, reference);
        if let Some(parent) = artifact.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SnapshotError::io("create artifacts directory", parent, e))?;
        }
        std::fs::write(&artifact, rendered)
            .map_err(|e| SnapshotError::io("write failing artifact", &artifact, e))?;

        let Difference {
            explanation,
            attachments,
        } = difference;
        self.forward(attachments);

        let message = format!(
            "{}\n\n{}\n\n{}",
            MISMATCH_HEADER,
            config.diff_hint(reference, &artifact),
            explanation.trim()
        );

        warn!(
            target: "snapverify::engine",
            reference = %reference.display(),
            artifact = %artifact.display(),
            "Snapshot mismatch"
        );

        Ok(VerificationResult::ComparisonFailure { message, artifact })
    }

    fn forward(&self, attachments: Vec<snapverify_core::Attachment>) {
        if attachments.is_empty() {
            return;
        }
        match &self.sink {
            Some(sink) => {
                for attachment in attachments {
                    sink.attach(attachment);
                }
            }
            None => {
                debug!(
                    count = attachments.len(),
                    "No attachment sink registered; dropping attachments"
                );
            }
        }
    }
}
