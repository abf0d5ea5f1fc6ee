//! Concurrency tests
//!
//! - Parallel unnamed snapshots in one test get disjoint paths
//! - Slow renderings do not block other verifications
//! - Parallel named snapshots of the same path stay last-writer-wins

use crate::common::*;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn parallel_unnamed_snapshots_get_distinct_paths() {
    const THREADS: usize = 8;

    let env = Arc::new(TestEnv::new("parallel.rs"));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let env = Arc::clone(&env);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let text = format!("thread {}", i);
                recorded_path(env.verify_text(&text, &env.request("test_parallel")))
            })
        })
        .collect();

    let paths: HashSet<PathBuf> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(paths.len(), THREADS);

    let expected: HashSet<PathBuf> = (1..=THREADS)
        .map(|n| env.snapshots().join(format!("test_parallel.{}.txt", n)))
        .collect();
    assert_eq!(paths, expected);
    assert_eq!(
        env.ctx.checked().checked(&env.snapshots()).len(),
        THREADS
    );
}

#[test]
fn slow_rendering_does_not_block_other_threads() {
    let env = Arc::new(TestEnv::new("slow.rs"));

    let slow = {
        let env = Arc::clone(&env);
        thread::spawn(move || {
            let request = env
                .request("test_slow")
                .with_timeout(Duration::from_millis(300));
            env.ctx
                .verify_blocking("late", &Lines::delayed(Duration::from_secs(10)), &request)
        })
    };

    let started = Instant::now();
    let fast = env.verify_text("quick", &env.request("test_fast"));
    assert!(fast.is_recorded());
    assert!(started.elapsed() < Duration::from_millis(300));

    let slow = slow.join().unwrap();
    assert!(matches!(
        slow,
        VerificationResult::Error(SnapshotError::Timeout(_))
    ));
}

#[test]
fn concurrent_writes_to_same_name_are_last_writer_wins() {
    const THREADS: usize = 4;

    let env = Arc::new(TestEnv::new("same_path.rs"));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let env = Arc::clone(&env);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let request = env.request("test_same").named("shared").recording(true);
                env.verify_text(&format!("writer {}", i), &request)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_recorded());
    }

    let content =
        std::fs::read_to_string(env.snapshots().join("test_same.shared.txt")).unwrap();
    assert!(content.starts_with("writer "));
}
