//! Error taxonomy surfaced at the crate boundary.
//!
//! Per-host filtering decisions and per-template quality rejections are not
//! errors — they are data decisions the caller may log via `tracing`. The
//! only things that can actually fail are configuration validity and
//! cooperative cancellation.

use thiserror::Error;

/// Errors surfaced by [`crate::learn_patterns`].
#[derive(Debug, Error)]
pub enum CoreError {
    /// The supplied [`crate::config::Config`] is internally inconsistent
    /// (empty distance range, non-positive thresholds, `min_patterns` above
    /// `max_patterns`, a `target_coverage` outside `(0, 1]`, ...).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A cooperative [`crate::cancel::CancelToken`] was observed at a stage
    /// boundary. Partial results are discarded; nothing is returned.
    #[error("pattern learning was cancelled")]
    Cancelled,
}

pub type CoreResult<T> = Result<T, CoreError>;
