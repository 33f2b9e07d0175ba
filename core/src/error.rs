//! Error type for the todo data-access layer.
//!
//! # Design
//! Every variant means "the backing-store operation failed"; callers treat
//! them alike and only log. `NotFound` is split out because the store
//! answers "no row matched" for update/delete with an empty representation,
//! and tests need to tell that apart from a rejected request.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No row matched the id filter, or the store answered 404.
    #[error("resource not found")]
    NotFound,

    /// The store returned a non-success status. `code` is the PostgREST /
    /// PostgreSQL error code when the body carried one.
    #[error("store returned HTTP {status}: {message}")]
    StoreError {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request never produced a response (connection refused, timeout).
    #[error("transport failed: {0}")]
    Transport(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// A `due_date` was not a valid `YYYY-MM-DD` calendar date.
    #[error("invalid due date: {0:?}")]
    InvalidDueDate(String),

    /// The store answered with a success status but an unusable body.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}
