#![forbid(unsafe_code)]

//! Cooperative cancellation for outstanding remote calls.
//!
//! The engine keeps the [`CancellationSource`] and hands a
//! [`CancellationToken`] to whoever executes the request. Cancelling never
//! interrupts a call already on the wire; the executor checks the token and
//! reports [`FetchError::Cancelled`](crate::error::FetchError::Cancelled)
//! instead of a result, and the engine drops stale settlements on its own
//! regardless.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Read side: observed by the executor.
#[derive(Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

/// Control side: owned by the engine.
///
/// Dropping the source does not cancel; call [`cancel`](Self::cancel).
pub struct CancellationSource {
    cancelled: Arc<AtomicBool>,
}

impl CancellationSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A token observing this source.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancellationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationSource")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancellationToken {
    /// A token that is never cancelled.
    #[must_use]
    pub fn never() -> Self {
        CancellationSource::new().token()
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn cancel_reaches_every_token() {
        let source = CancellationSource::new();
        let t1 = source.token();
        let t2 = t1.clone();
        assert!(!t1.is_cancelled());
        source.cancel();
        source.cancel();
        assert!(t1.is_cancelled());
        assert!(t2.is_cancelled());
        assert!(source.is_cancelled());
    }

    #[test]
    fn drop_source_does_not_cancel() {
        let source = CancellationSource::new();
        let token = source.token();
        drop(source);
        assert!(!token.is_cancelled());
    }

    #[test]
    fn token_observes_cancel_from_other_thread() {
        let source = CancellationSource::new();
        let token = source.token();
        let handle = thread::spawn(move || source.cancel());
        handle.join().unwrap();
        assert!(token.is_cancelled());
    }

    #[test]
    fn never_token_is_live() {
        assert!(!CancellationToken::never().is_cancelled());
    }
}
