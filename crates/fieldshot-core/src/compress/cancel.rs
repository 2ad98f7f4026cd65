//! Cooperative cancellation for in-flight compression calls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared flag a caller can set to abort an in-flight compression call.
///
/// The engine checks the token at every step boundary (before decode,
/// before resize, around each encode attempt). Cancelling between checks
/// does not interrupt the step already running; the call fails with
/// [`CompressError::Cancelled`](super::CompressError::Cancelled) at the
/// next boundary and releases its buffers normally.
///
/// Tokens are cheap to clone; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
