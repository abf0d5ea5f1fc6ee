//! Snapverify - snapshot verification for Rust tests
//!
//! Renders a value through a pluggable strategy, then either records it as
//! the on-disk reference or compares it against the reference already
//! there. Mismatches leave the failing rendering in an artifacts directory
//! and describe how to diff it.
//!
//! # Quick Start
//!
//! ```ignore
//! use snapverify::assert_snapshot;
//!
//! #[test]
//! fn test_greeting() {
//!     assert_snapshot!("hello", MyTextStrategy);
//!     assert_snapshot!(&render_page(), MyTextStrategy, named: "page");
//! }
//! ```
//!
//! References land in `__Snapshots__/<source stem>/<test>.<id>.<ext>` next
//! to the test file. Set `SNAPSHOT_RECORD=1` to re-record everything and
//! `SNAPSHOT_ARTIFACTS` to choose where failing renderings go.
//!
//! # Architecture
//!
//! The engine lives in `snapverify-engine` and the shared types in
//! `snapverify-core`; both are re-exported here.

pub mod assert;

pub use assert::{
    assert_snapshot, assert_snapshots, current_test_name, finish_test, resolve_source_file,
    verify_snapshot, verify_snapshot_in, verify_snapshots_in, AnyStrategy,
};
pub use snapverify_core::*;
pub use snapverify_engine::*;

/// Build a [`SnapshotRequest`] for the calling test.
#[macro_export]
macro_rules! snapshot_request {
    () => {
        $crate::SnapshotRequest::new(
            $crate::resolve_source_file(env!("CARGO_MANIFEST_DIR"), file!()),
            $crate::current_test_name(),
        )
    };
}

/// Assert a value against its reference, panicking on anything but a match.
///
/// ```ignore
/// assert_snapshot!(value, strategy);
/// assert_snapshot!(value, strategy, named: "wide");
/// assert_snapshot!(value, strategy, record: true);
/// ```
#[macro_export]
macro_rules! assert_snapshot {
    ($value:expr, $strategy:expr $(,)?) => {
        $crate::assert_snapshot($value, &$strategy, &$crate::snapshot_request!())
    };
    ($value:expr, $strategy:expr, named: $name:expr $(,)?) => {
        $crate::assert_snapshot(
            $value,
            &$strategy,
            &$crate::snapshot_request!().named($name),
        )
    };
    ($value:expr, $strategy:expr, record: $record:expr $(,)?) => {
        $crate::assert_snapshot(
            $value,
            &$strategy,
            &$crate::snapshot_request!().recording($record),
        )
    };
}

/// Report the calling test group's teardown; panics on unused references.
#[macro_export]
macro_rules! finish_test {
    ($test_count:expr) => {
        $crate::finish_test(&$crate::TestGroup::new(
            $crate::resolve_source_file(env!("CARGO_MANIFEST_DIR"), file!()),
            $test_count,
        ))
    };
}
