//! Blocking verification from async callers
//!
//! - A current-thread runtime cannot be blocked on: reported, never a panic
//! - A multi-thread runtime hands the worker off and completes normally

use crate::common::*;
use snapverify::verify_snapshot_in;
use std::time::Duration;

#[tokio::test]
async fn blocking_verification_on_current_thread_runtime_is_an_error() {
    let env = TestEnv::new("current_thread.rs");
    let request = env.request("test_current_thread").named("a");

    let result = env.verify_text("inside", &request);
    assert!(matches!(
        result,
        VerificationResult::Error(SnapshotError::BlockingInRuntime)
    ));
    assert!(!env.snapshots().join("test_current_thread.a.txt").exists());

    let message = verify_snapshot_in(&env.ctx, "inside", &Lines::new(), &request).unwrap();
    assert!(message.contains("SnapshotContext::verify"), "{}", message);

    // The async entry point works on the same runtime
    assert!(env.ctx.verify("inside", &Lines::new(), &request).await.is_recorded());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_verification_on_multi_thread_runtime_completes() {
    let env = TestEnv::new("multi_thread.rs");
    let request = env.request("test_multi_thread").named("a");
    let strategy = Lines::delayed(Duration::from_millis(10));

    assert!(env.ctx.verify_blocking("tick", &strategy, &request).is_recorded());
    assert!(verify_snapshot_in(&env.ctx, "tick", &strategy, &request).is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_verification_on_multi_thread_runtime_still_times_out() {
    let env = TestEnv::new("multi_thread_slow.rs");
    let request = env
        .request("test_multi_thread_slow")
        .with_timeout(Duration::from_millis(50));

    let result = env
        .ctx
        .verify_blocking("late", &Lines::delayed(Duration::from_secs(10)), &request);
    assert!(matches!(
        result,
        VerificationResult::Error(SnapshotError::Timeout(_))
    ));
}
