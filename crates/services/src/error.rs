//! Shared error types for the services crate.

use thiserror::Error;

use memoria_core::model::RatingError;
use storage::StorageError;

/// Errors emitted by the session engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// Sequential ordering was requested while cards still await their first
    /// rating; the mode stays random until the initial pass is done.
    #[error("initial review pending, queue order is forced to random")]
    InitialReviewPending,

    #[error(transparent)]
    Rating(#[from] RatingError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
