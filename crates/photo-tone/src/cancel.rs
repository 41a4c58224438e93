//! Cooperative cancellation for in-flight processing.
//!
//! Processing stages poll an [`enough::Stop`] once per output row. The
//! [`CancelToken`] here is the shared flag a caller keeps to abandon a
//! computation that has been superseded by newer settings.

use enough::{Stop, StopReason};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cancellation flag.
///
/// All clones observe the same flag; cancelling one cancels them all.
///
/// ```
/// use photo_tone::{CancelToken, Stop};
///
/// let token = CancelToken::new();
/// let worker_view = token.clone();
/// assert!(worker_view.check().is_ok());
///
/// token.cancel();
/// assert!(worker_view.is_cancelled());
/// assert!(worker_view.check().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Stop for CancelToken {
    fn check(&self) -> Result<(), StopReason> {
        if self.is_cancelled() {
            Err(StopReason::Cancelled)
        } else {
            Ok(())
        }
    }
}
