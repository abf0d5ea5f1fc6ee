//! Completion audit tests
//!
//! - Orphans are reported only after the last teardown of the group
//! - Exercised references (compared or recorded) are never orphans
//! - Override directories are outside the audit

use crate::common::*;

#[test]
fn orphan_reported_only_after_last_teardown() {
    let env = TestEnv::new("audited.rs");
    let group = TestGroup::new(&env.source, 3);
    let tests = ["test_one", "test_two", "test_three"];

    // Seed references so the run compares rather than records
    for test in tests {
        env.verify_text(test, &env.request(test).named("snap"));
    }
    let seeded = SnapshotContext::new(env.ctx.config());

    let stray = env.snapshots().join("test_removed.snap.txt");
    std::fs::write(&stray, "stale").unwrap();

    for (i, test) in tests.iter().enumerate() {
        let result = seeded.verify_blocking(*test, &Lines::new(), &env.request(test).named("snap"));
        assert!(result.is_match(), "{:?}", result);

        let outcome = seeded.note_teardown(&group).unwrap();
        if i < 2 {
            assert_eq!(
                outcome,
                AuditOutcome::Pending {
                    seen: i + 1,
                    expected: 3
                }
            );
        } else {
            assert_eq!(outcome, AuditOutcome::Orphaned(vec![stray.clone()]));
            let message = outcome.failure_message(&env.snapshots()).unwrap();
            assert!(message.contains("test_removed.snap.txt"));
        }
    }
}

#[test]
fn recorded_references_count_as_exercised() {
    let env = TestEnv::new("recorded.rs");
    let group = TestGroup::from_method_names(&env.source, ["test_a", "test_b", "helper"]);

    env.verify_text("a", &env.request("test_a"));
    assert!(matches!(
        env.ctx.note_teardown(&group).unwrap(),
        AuditOutcome::Pending { .. }
    ));
    env.verify_text("b1", &env.request("test_b"));
    env.verify_text("b2", &env.request("test_b"));
    assert_eq!(env.ctx.note_teardown(&group).unwrap(), AuditOutcome::Clean);
}

#[test]
fn audit_runs_once_per_directory() {
    let env = TestEnv::new("once.rs");
    let group = TestGroup::new(&env.source, 1);
    env.verify_text("x", &env.request("test_once"));

    assert_eq!(env.ctx.note_teardown(&group).unwrap(), AuditOutcome::Clean);
    std::fs::write(env.snapshots().join("late.1.txt"), "x").unwrap();
    assert_eq!(
        env.ctx.note_teardown(&group).unwrap(),
        AuditOutcome::AlreadyAudited
    );
}

#[test]
fn override_directory_references_are_not_audited() {
    let env = TestEnv::new("elsewhere.rs");
    let refs = env.dir.path().join("refs");
    env.verify_text("x", &env.request("test_x").in_directory(&refs));
    std::fs::write(refs.join("unrelated.txt"), "y").unwrap();

    let outcome = env.ctx.note_teardown(&TestGroup::new(&env.source, 1)).unwrap();
    assert_eq!(outcome, AuditOutcome::Clean);
}
