//! In-flight upstream exchange tracking.
//!
//! # Responsibilities
//! - Count upstream exchanges from request start until the relayed body ends
//! - Release the count on every exit path (success, error, timeout, caller gone)
//! - Generate exchange IDs for tracing

use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes, HttpBody};
use hyper::body::{Frame, SizeHint};

/// Global atomic counter for exchange IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static EXCHANGE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an upstream exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeId(u64);

impl ExchangeId {
    pub fn new() -> Self {
        Self(EXCHANGE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ExchangeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "exch-{}", self.0)
    }
}

/// Tracks open upstream exchanges.
#[derive(Debug, Clone, Default)]
pub struct InFlightTracker {
    active_count: Arc<AtomicU64>,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new exchange. Returns a guard that decrements on drop.
    pub fn track(&self) -> InFlightGuard {
        self.active_count.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            active_count: Arc::clone(&self.active_count),
            id: ExchangeId::new(),
        }
    }

    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }
}

/// Guard held for the lifetime of one upstream exchange.
///
/// Owned by the handler future until response headers arrive, then by the
/// relayed body, so a disconnected caller releases it either way.
#[derive(Debug)]
pub struct InFlightGuard {
    active_count: Arc<AtomicU64>,
    id: ExchangeId,
}

impl InFlightGuard {
    pub fn id(&self) -> ExchangeId {
        self.id
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(exchange_id = %self.id, "Upstream exchange released");
    }
}

/// Response body that keeps its exchange tracked while it streams.
#[derive(Debug)]
pub struct InFlightBody {
    inner: Body,
    guard: Option<InFlightGuard>,
}

impl InFlightBody {
    pub fn new(inner: Body, guard: InFlightGuard) -> Self {
        Self {
            inner,
            guard: Some(guard),
        }
    }
}

impl HttpBody for InFlightBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let frame = Pin::new(&mut this.inner).poll_frame(cx);
        if matches!(frame, Poll::Ready(None) | Poll::Ready(Some(Err(_)))) {
            drop(this.guard.take());
        }
        frame
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_id_unique() {
        assert_ne!(ExchangeId::new(), ExchangeId::new());
    }

    #[test]
    fn tracker_counts() {
        let tracker = InFlightTracker::new();
        assert_eq!(tracker.active_count(), 0);

        let guard1 = tracker.track();
        let guard2 = tracker.clone().track();
        assert_eq!(tracker.active_count(), 2);

        drop(guard1);
        assert_eq!(tracker.active_count(), 1);

        drop(guard2);
        assert_eq!(tracker.active_count(), 0);
    }

    #[tokio::test]
    async fn body_holds_exchange_until_finished() {
        let tracker = InFlightTracker::new();
        let mut body = InFlightBody::new(Body::from("chunk"), tracker.track());
        assert_eq!(tracker.active_count(), 1);

        let frame = std::future::poll_fn(|cx| Pin::new(&mut body).poll_frame(cx)).await;
        assert!(frame.is_some());
        assert_eq!(tracker.active_count(), 1);

        let end = std::future::poll_fn(|cx| Pin::new(&mut body).poll_frame(cx)).await;
        assert!(end.is_none());
        assert_eq!(tracker.active_count(), 0);
    }

    #[test]
    fn dropped_body_releases_exchange() {
        let tracker = InFlightTracker::new();
        let body = InFlightBody::new(Body::empty(), tracker.track());
        assert_eq!(tracker.active_count(), 1);
        drop(body);
        assert_eq!(tracker.active_count(), 0);
    }
}
