//! Query context - cancellation and deadlines
//!
//! Every catalog query takes a `QueryContext`. The storage layer checks it
//! before a statement starts, between rows, and from inside SQLite through
//! a progress handler, so a long-running statement is interrupted promptly.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use crate::{Error, Result};

/// Cancellation flag plus an optional deadline.
///
/// Cheap to clone; clones share the same cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl QueryContext {
    /// A context that never cancels and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().deadline_in(timeout)
    }

    /// A context with an absolute deadline
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Some(deadline),
        }
    }

    /// Derive a context sharing this cancellation flag, with the earlier of
    /// the existing deadline and `now + timeout`
    pub fn deadline_in(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        };
        Self {
            cancelled: self.cancelled.clone(),
            deadline: Some(deadline),
        }
    }

    /// A handle that can cancel this context from another thread
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancelled: self.cancelled.clone(),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, if one is set
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Whether the query should stop (cancelled or past the deadline)
    pub fn is_done(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// `Ok(())` while the query may proceed; cancellation wins over the deadline
    pub fn check(&self) -> Result<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(Error::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(Error::DeadlineExceeded);
        }
        Ok(())
    }
}

/// Cancels the `QueryContext` it was taken from.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_never_done() {
        let ctx = QueryContext::background();
        assert!(!ctx.is_done());
        assert!(ctx.check().is_ok());
        assert!(ctx.remaining().is_none());
    }

    #[test]
    fn test_cancel_through_handle() {
        let ctx = QueryContext::background();
        let handle = ctx.cancel_handle();
        let derived = ctx.deadline_in(Duration::from_secs(60));

        handle.cancel();

        assert!(ctx.is_done());
        assert!(matches!(ctx.check(), Err(Error::Cancelled)));
        // derived contexts share the flag
        assert!(matches!(derived.check(), Err(Error::Cancelled)));
    }

    #[test]
    fn test_elapsed_deadline() {
        let ctx = QueryContext::with_deadline(Instant::now() - Duration::from_millis(1));
        assert!(ctx.is_done());
        assert!(matches!(ctx.check(), Err(Error::DeadlineExceeded)));
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_deadline_in_keeps_earlier_deadline() {
        let ctx = QueryContext::with_timeout(Duration::from_secs(1));
        let original = ctx.deadline().unwrap();
        let derived = ctx.deadline_in(Duration::from_secs(3600));
        assert_eq!(derived.deadline(), Some(original));
    }

    #[test]
    fn test_cancel_wins_over_deadline() {
        let ctx = QueryContext::with_deadline(Instant::now() - Duration::from_millis(1));
        ctx.cancel();
        assert!(matches!(ctx.check(), Err(Error::Cancelled)));
    }
}
