//! Per-request lifecycle
//!
//! ```text
//! Start -> ShownExisting
//! Start -> Creating -> Configuring -> AwaitingShow -> Visible -> AwaitingClose -> Closed
//! ```
//!
//! A window may close before it was ever shown, so `Closed` is reachable from
//! every state after `Creating`. `Error` is reachable from every non-terminal
//! state. Reaching a terminal state resolves the request's outcome.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::OverlayOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Start,
    ShownExisting,
    Creating,
    Configuring,
    AwaitingShow,
    Visible,
    AwaitingClose,
    Closed,
    Error,
}

impl OverlayState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OverlayState::ShownExisting | OverlayState::Closed | OverlayState::Error
        )
    }

    pub fn outcome(self) -> Option<OverlayOutcome> {
        match self {
            OverlayState::ShownExisting => Some(OverlayOutcome::Shown),
            OverlayState::Closed => Some(OverlayOutcome::Closed),
            OverlayState::Error => Some(OverlayOutcome::Error),
            _ => None,
        }
    }

    pub fn can_transition_to(self, next: OverlayState) -> bool {
        use OverlayState::*;

        if self.is_terminal() {
            return false;
        }

        match (self, next) {
            (_, Error) => true,
            (Start, ShownExisting | Creating) => true,
            (Creating, Configuring) => true,
            (Configuring, AwaitingShow) => true,
            (AwaitingShow, Visible) => true,
            (Visible, AwaitingClose) => true,
            (Creating | Configuring | AwaitingShow | Visible | AwaitingClose, Closed) => true,
            _ => false,
        }
    }
}

struct Inner {
    state: OverlayState,
    resolver: Option<oneshot::Sender<OverlayOutcome>>,
}

/// State of one open request, shared with the window callbacks that drive it
pub struct RequestLifecycle {
    route: String,
    inner: Mutex<Inner>,
}

impl RequestLifecycle {
    pub fn new(route: impl Into<String>) -> (Arc<Self>, PendingOutcome) {
        let (tx, rx) = oneshot::channel();
        let lifecycle = Arc::new(Self {
            route: route.into(),
            inner: Mutex::new(Inner {
                state: OverlayState::Start,
                resolver: Some(tx),
            }),
        });
        (lifecycle, PendingOutcome::new(rx))
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn state(&self) -> OverlayState {
        self.lock().state
    }

    /// Move to `next`; returns false (and changes nothing) if the edge is illegal.
    pub fn advance(&self, next: OverlayState) -> bool {
        let mut inner = self.lock();
        let current = inner.state;

        if !current.can_transition_to(next) {
            warn!(
                route = %self.route,
                "Ignoring overlay transition {:?} -> {:?}",
                current,
                next
            );
            return false;
        }

        debug!(route = %self.route, "Overlay {:?} -> {:?}", current, next);
        inner.state = next;

        if let Some(outcome) = next.outcome() {
            if let Some(tx) = inner.resolver.take() {
                // The caller may have stopped waiting
                let _ = tx.send(outcome);
            }
        }

        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Outcome of an open request, available once the request reaches a terminal state.
///
/// If the lifecycle is dropped without ever terminating (the window vanished
/// without a close event) the future stays pending forever.
pub struct PendingOutcome {
    rx: oneshot::Receiver<OverlayOutcome>,
    abandoned: bool,
}

impl PendingOutcome {
    fn new(rx: oneshot::Receiver<OverlayOutcome>) -> Self {
        Self {
            rx,
            abandoned: false,
        }
    }

    /// Outcome if already resolved, without waiting
    pub fn try_outcome(&mut self) -> Option<OverlayOutcome> {
        if self.abandoned {
            return None;
        }
        self.rx.try_recv().ok()
    }
}

impl Future for PendingOutcome {
    type Output = OverlayOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.abandoned {
            return Poll::Pending;
        }

        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => {
                this.abandoned = true;
                Poll::Pending
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn happy_path_edges_are_legal() {
        use OverlayState::*;
        let path = [
            Start,
            Creating,
            Configuring,
            AwaitingShow,
            Visible,
            AwaitingClose,
            Closed,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{:?}", pair);
        }
    }

    #[test]
    fn terminal_states_are_final() {
        use OverlayState::*;
        for terminal in [ShownExisting, Closed, Error] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(Error));
            assert!(!terminal.can_transition_to(Closed));
        }
    }

    #[test]
    fn close_before_show_is_legal_but_skipping_creation_is_not() {
        use OverlayState::*;
        assert!(AwaitingShow.can_transition_to(Closed));
        assert!(!Start.can_transition_to(Closed));
        assert!(!Start.can_transition_to(Visible));
    }

    #[tokio::test]
    async fn outcome_is_resolved_once() {
        let (lifecycle, pending) = RequestLifecycle::new("/x");
        assert!(lifecycle.advance(OverlayState::Creating));
        assert!(lifecycle.advance(OverlayState::Error));
        assert!(!lifecycle.advance(OverlayState::Closed));
        assert_eq!(lifecycle.state(), OverlayState::Error);
        assert_eq!(pending.await, OverlayOutcome::Error);
    }

    #[tokio::test]
    async fn abandoned_request_stays_pending() {
        let (lifecycle, mut pending) = RequestLifecycle::new("/x");
        lifecycle.advance(OverlayState::Creating);
        drop(lifecycle);

        assert_eq!(pending.try_outcome(), None);
        let waited = tokio::time::timeout(Duration::from_millis(20), pending).await;
        assert!(waited.is_err());
    }
}
