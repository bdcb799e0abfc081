//! Cooperative cancellation.
//!
//! The pipeline performs no I/O and never suspends, so cancellation is
//! checked explicitly at stage boundaries rather than via an async runtime.
//! Modeled on the lock-free `Arc<AtomicU64>` state the teacher keeps in its
//! log matcher rather than pulling in `tokio_util::sync::CancellationToken`,
//! since nothing else in this crate is async.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};

/// A cheaply-`Clone`-able flag that can be flipped from another thread to
/// abort an in-flight [`crate::learn_patterns`] call at the next checked
/// stage boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Returns `Err(CoreError::Cancelled)` if cancellation was requested.
    /// Called at group boundaries, between C7 strategies, inside Strategy
    /// 1's center loop, and between AP iterations (spec §5).
    pub fn check(&self) -> CoreResult<()> {
        if self.is_cancelled() {
            Err(CoreError::Cancelled)
        } else {
            Ok(())
        }
    }
}
