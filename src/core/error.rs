// ============================================================================
// spark-observables - Errors
// Synchronous, local failures of container and view operations
// ============================================================================

use thiserror::Error;

/// Failure of a container, view or cursor operation.
///
/// Every variant is raised before anything is mutated, so a rejected call
/// never emits an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    /// A cursor was asked to mutate without a current element: either
    /// nothing has been produced yet, or the current element was already
    /// removed (or followed by an insertion).
    #[error("cursor has no current element")]
    InvalidState,

    /// The view does not support the requested structural operation.
    #[error("{view} does not support {operation}")]
    Unsupported {
        view: &'static str,
        operation: &'static str,
    },

    /// Positional access outside of `0..len` (or `0..=len` for insertion).
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A sub-range request whose bounds do not fit the view.
    #[error("range {from}..{to} out of range for length {len}")]
    InvalidRange { from: usize, to: usize, len: usize },
}

impl CollectionError {
    pub(crate) fn unsupported(view: &'static str, operation: &'static str) -> Self {
        let err = CollectionError::Unsupported { view, operation };
        tracing::debug!(%err, "rejected operation");
        err
    }

    pub(crate) fn out_of_range(index: usize, len: usize) -> Self {
        let err = CollectionError::IndexOutOfRange { index, len };
        tracing::debug!(%err, "rejected operation");
        err
    }

    pub(crate) fn invalid_state() -> Self {
        tracing::debug!("cursor mutated without a current element");
        CollectionError::InvalidState
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = CollectionError> = std::result::Result<T, E>;
