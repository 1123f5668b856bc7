//! Domain error type shared by all crates.
//!
//! The api crate maps each variant onto an HTTP status in its own
//! `AppError`; repositories return `sqlx::Error` directly and are
//! classified separately.

/// Domain-level error for the orchestration core.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A referenced entity does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity kind, e.g. `"Job"`.
        entity: &'static str,
        /// The id that was looked up (jobs use opaque UUIDs).
        id: String,
    },

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
