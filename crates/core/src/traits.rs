//! Collaborator traits for snapshot verification
//!
//! This module defines the seams between the engine and the strategies it
//! drives:
//! - Rendering: a producer that delivers exactly one comparable value
//! - Diffing: serialize/deserialize/compare for one comparable format
//! - Snapshotting: turns a value into a Rendering, declares its Diffing
//! - AttachmentSink: where rich mismatch attachments go, when supported
//!
//! The engine owns none of these. Concrete strategies (text, images,
//! structured dumps) live with the host.

use crate::error::{Result, SnapshotError};
use crate::types::{Attachment, Difference};
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

// ============================================================================
// Rendering
// ============================================================================

/// Boxed future delivering a rendered value
pub type RenderFuture<F> = Pin<Box<dyn Future<Output = Result<F>> + Send + 'static>>;

/// A pending rendering.
///
/// Resolves to exactly one value or to [`SnapshotError::RenderingFailed`].
/// The engine bounds the wait; a rendering that never resolves is reported
/// as a timeout.
pub struct Rendering<F> {
    future: RenderFuture<F>,
}

impl<F: Send + 'static> Rendering<F> {
    /// A rendering that is already complete.
    pub fn ready(value: F) -> Self {
        Self {
            future: Box::pin(std::future::ready(Ok(value))),
        }
    }

    /// A rendering that has already failed.
    pub fn failed(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            future: Box::pin(std::future::ready(Err(SnapshotError::RenderingFailed(
                reason,
            )))),
        }
    }

    /// Wrap a future that always yields a value.
    pub fn from_future<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = F> + Send + 'static,
    {
        Self {
            future: Box::pin(async move { Ok(future.await) }),
        }
    }

    /// Wrap a fallible future.
    pub fn from_result_future<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = Result<F>> + Send + 'static,
    {
        Self {
            future: Box::pin(future),
        }
    }

    /// Wait on a one-shot channel. A dropped sender is an abnormal completion.
    pub fn from_receiver(receiver: oneshot::Receiver<F>) -> Self {
        Self {
            future: Box::pin(async move {
                receiver.await.map_err(|_| {
                    SnapshotError::RenderingFailed(
                        "producer was dropped before delivering a value".to_string(),
                    )
                })
            }),
        }
    }

    /// Create a sender/rendering pair for callback-style producers.
    pub fn channel() -> (oneshot::Sender<F>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self::from_receiver(rx))
    }

    /// Transform the rendered value once it arrives.
    pub fn map<G, M>(self, transform: M) -> Rendering<G>
    where
        G: Send + 'static,
        M: FnOnce(F) -> G + Send + 'static,
    {
        let future = self.future;
        Rendering {
            future: Box::pin(async move { future.await.map(transform) }),
        }
    }
}

impl<F> Future for Rendering<F> {
    type Output = Result<F>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.as_mut().poll(cx)
    }
}

// ============================================================================
// Diffing
// ============================================================================

/// Serialization and comparison for one comparable format.
///
/// `deserialize(serialize(x))` must compare equal to `x`.
pub trait Diffing {
    /// Comparable form handled by this strategy
    type Format;

    /// Encode a value for storage on disk.
    fn serialize(&self, value: &Self::Format) -> Vec<u8>;

    /// Decode a stored reference. The error string describes the corruption.
    fn deserialize(&self, bytes: &[u8]) -> std::result::Result<Self::Format, String>;

    /// Compare a reference against a fresh rendering. `None` means match.
    fn compare(&self, reference: &Self::Format, actual: &Self::Format) -> Option<Difference>;
}

// ============================================================================
// Snapshotting
// ============================================================================

/// A strategy that renders values of type `V` into a comparable format.
pub trait Snapshotting<V: ?Sized> {
    /// Comparable form produced by rendering
    type Format: Send + 'static;

    /// Diffing strategy for the format
    type Diffing: Diffing<Format = Self::Format>;

    /// Start rendering `value`.
    fn render(&self, value: &V) -> Rendering<Self::Format>;

    /// Diffing strategy used to persist and compare renderings.
    fn diffing(&self) -> &Self::Diffing;

    /// File extension for references, without the leading dot.
    fn extension(&self) -> Option<&str> {
        None
    }
}

/// A strategy for `B` built from a strategy for `A` and a projection `B -> A`.
///
/// Created with [`SnapshottingExt::pullback`].
pub struct Pullback<S, T, A> {
    inner: S,
    transform: T,
    _source: PhantomData<fn() -> A>,
}

impl<S, T, A, B> Snapshotting<B> for Pullback<S, T, A>
where
    B: ?Sized,
    S: Snapshotting<A>,
    T: Fn(&B) -> A,
{
    type Format = S::Format;
    type Diffing = S::Diffing;

    fn render(&self, value: &B) -> Rendering<Self::Format> {
        let projected = (self.transform)(value);
        self.inner.render(&projected)
    }

    fn diffing(&self) -> &Self::Diffing {
        self.inner.diffing()
    }

    fn extension(&self) -> Option<&str> {
        self.inner.extension()
    }
}

/// Adapters available on every strategy.
pub trait SnapshottingExt<A>: Snapshotting<A> + Sized {
    /// Reuse this strategy for another value type by projecting into `A`.
    ///
    /// Extension and diffing are inherited unchanged.
    fn pullback<B, T>(self, transform: T) -> Pullback<Self, T, A>
    where
        B: ?Sized,
        T: Fn(&B) -> A,
    {
        Pullback {
            inner: self,
            transform,
            _source: PhantomData,
        }
    }
}

impl<A, S: Snapshotting<A>> SnapshottingExt<A> for S {}

// ============================================================================
// Attachments
// ============================================================================

/// Receiver for mismatch attachments.
///
/// Hosts that can display rich attachments register a sink; without one,
/// attachments are dropped.
pub trait AttachmentSink: Send + Sync {
    /// Accept one attachment for the current test.
    fn attach(&self, attachment: Attachment);
}
