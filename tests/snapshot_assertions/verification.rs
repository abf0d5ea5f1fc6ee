//! Record-or-compare tests
//!
//! - First verification records and fails; second matches
//! - Record mode always rewrites and always reports
//! - Mismatch leaves an artifact identical to the fresh rendering
//! - I/O and decode failures surface as errors

use crate::common::*;
use std::time::Duration;

// ============================================================================
// First write
// ============================================================================

#[test]
fn missing_reference_is_recorded_not_matched() {
    let env = TestEnv::new("first_write.rs");
    let request = env.request("test_first_write");

    let result = env.verify_text("alpha\nbeta", &request);
    assert!(!result.is_match());
    let message = result.failure_message().unwrap();
    assert!(message.contains("No reference was found on disk"));

    let path = recorded_path(result);
    assert_eq!(path, env.snapshots().join("test_first_write.1.txt"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "alpha\nbeta");
}

#[test]
fn second_run_with_same_input_matches() {
    let env = TestEnv::new("second_run.rs");
    let request = env.request("test_rerun").named("doc");

    assert!(env.verify_text("same", &request).is_recorded());
    let result = env.verify_text("same", &request);
    assert!(result.is_match(), "{:?}", result);
    assert!(result.failure_message().is_none());
}

#[test]
fn fresh_context_matches_existing_unnamed_reference() {
    // A new process sees the same counter sequence again
    let env = TestEnv::new("rerun_process.rs");
    let request = env.request("test_counted");
    assert!(env.verify_text("v1", &request).is_recorded());

    let next_process = SnapshotContext::new(env.ctx.config());
    let result = next_process.verify_blocking("v1", &Lines::new(), &request);
    assert!(result.is_match(), "{:?}", result);
}

// ============================================================================
// Recording
// ============================================================================

#[test]
fn record_request_overwrites_identical_reference() {
    let env = TestEnv::new("record.rs");
    let request = env.request("test_record").named("n");
    let path = recorded_path(env.verify_text("content", &request));
    let before = std::fs::metadata(&path).unwrap().modified().unwrap();

    std::thread::sleep(Duration::from_millis(20));
    let result = env.verify_text("content", &request.clone().recording(true));
    match result {
        VerificationResult::Recorded { reason, message, .. } => {
            assert_eq!(reason, RecordReason::Requested);
            assert!(message.contains("Turn record mode off"));
        }
        other => panic!("expected Recorded, got {:?}", other),
    }
    let after = std::fs::metadata(&path).unwrap().modified().unwrap();
    assert!(after >= before);
}

#[test]
fn global_record_flag_replaces_changed_reference() {
    let env = TestEnv::new("record_all.rs");
    let request = env.request("test_all").named("n");
    let path = recorded_path(env.verify_text("old", &request));

    env.ctx.set_record(true);
    assert!(env.verify_text("new", &request).is_recorded());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");

    env.ctx.set_record(false);
    assert!(env.verify_text("new", &request).is_match());
}

#[test]
fn recording_leaves_no_temp_files() {
    let env = TestEnv::new("atomic.rs");
    env.verify_text("x", &env.request("test_atomic").named("a"));

    let names: Vec<String> = std::fs::read_dir(env.snapshots())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["test_atomic.a.txt".to_string()]);
}

// ============================================================================
// Mismatch
// ============================================================================

#[test]
fn mismatch_produces_artifact_and_message() {
    let env = TestEnv::new("mismatch.rs");
    let request = env.request("test_mismatch").named("value");
    env.verify_text("A", &request);

    match env.verify_text("B", &request) {
        VerificationResult::ComparisonFailure { message, artifact } => {
            assert_eq!(artifact, env.artifacts().join("mismatch/test_mismatch.value.txt"));
            assert_eq!(std::fs::read_to_string(&artifact).unwrap(), "B");
            assert!(message.starts_with(snapverify::MISMATCH_HEADER));
            assert!(message.contains("--- expected"));
            assert!(message.contains("+++ actual"));
            assert!(message.contains("@@ line 1 @@\n-A\n+B"));
        }
        other => panic!("expected ComparisonFailure, got {:?}", other),
    }
}

#[test]
fn mismatch_message_uses_configured_diff_tool() {
    let env = TestEnv::new("difftool.rs");
    env.ctx.set_diff_tool(Some("ksdiff".to_string()));
    let request = env.request("test_tool").named("v");
    env.verify_text("A", &request);

    let message = env.verify_text("B", &request).failure_message().unwrap();
    let reference = env.snapshots().join("test_tool.v.txt");
    let artifact = env.artifacts().join("difftool/test_tool.v.txt");
    let expected = format!(
        "ksdiff \"{}\" \"{}\"",
        reference.display(),
        artifact.display()
    );
    assert!(message.contains(&expected), "{}", message);
    assert!(!message.contains("--- expected"));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn unreadable_reference_is_an_io_error() {
    let env = TestEnv::new("unreadable.rs");
    // A directory where the reference file should be
    std::fs::create_dir_all(env.snapshots().join("test_io.r.txt")).unwrap();

    let result = env.verify_text("x", &env.request("test_io").named("r"));
    match result {
        VerificationResult::Error(SnapshotError::Io { op, .. }) => assert_eq!(op, "read reference"),
        other => panic!("expected Io error, got {:?}", other),
    }
}

#[test]
fn uncreatable_snapshot_directory_is_an_io_error() {
    let env = TestEnv::new("blocked.rs");
    let blocker = env.dir.path().join("blocker");
    std::fs::write(&blocker, "file").unwrap();

    let request = env.request("test_dir").in_directory(blocker.join("refs"));
    let message = env.verify_text("x", &request).failure_message().unwrap();
    assert!(message.contains("create snapshot directory"), "{}", message);
}

#[test]
fn override_directory_is_used_verbatim() {
    let env = TestEnv::new("override.rs");
    let refs = env.dir.path().join("custom-refs");
    let request = env.request("test_override").in_directory(&refs);

    let path = recorded_path(env.verify_text("x", &request));
    assert_eq!(path, refs.join("test_override.1.txt"));
}

#[test]
fn configured_reference_directory_applies_to_all_requests() {
    let env = TestEnv::new("configured.rs");
    let refs = env.dir.path().join("ci-refs");
    env.ctx.update_config(|c| c.snapshot_dir = Some(refs.clone()));

    let path = recorded_path(env.verify_text("x", &env.request("test_cfg")));
    assert!(path.starts_with(&refs));
}
