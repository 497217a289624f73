//! Centralized error handling for the booking core
//!
//! Every guard failure in the lifecycle engine is returned as a typed
//! variant so callers must handle each kind rather than catching a blanket
//! error. Storage failures carry their own kinds; `Serialization` marks a
//! transactional conflict the engine may retry once.

use serde::Serialize;
use thiserror::Error;

/// Booking domain error type
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Capacity exceeded: maximum {max_guests} guests allowed, requested {requested}")]
    CapacityExceeded { max_guests: i32, requested: i32 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Storage serialization failure")]
    Serialization,
}

/// Machine-readable error payload for embedding layers
#[derive(Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

impl BookingError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            BookingError::NotFound(_) => "NOT_FOUND",
            BookingError::InvalidRange(_) => "INVALID_RANGE",
            BookingError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            BookingError::Conflict(_) => "CONFLICT",
            BookingError::InvalidTransition(_) => "INVALID_TRANSITION",
            BookingError::InvalidState(_) => "INVALID_STATE",
            BookingError::Validation(_) => "VALIDATION_ERROR",
            BookingError::Storage(_) => "STORAGE_ERROR",
            BookingError::Serialization => "SERIALIZATION_FAILURE",
        }
    }

    /// Build a serializable error payload
    pub fn details(&self) -> ErrorDetails {
        ErrorDetails {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

// Convenience conversions from common error types

impl From<sqlx::Error> for BookingError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => BookingError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db) => match db.code().as_deref() {
                // exclusion_violation: the overlap constraint on bookings
                Some("23P01") => BookingError::Conflict(
                    "Accommodation is not available for the selected dates".to_string(),
                ),
                // serialization_failure: retryable transactional conflict
                Some("40001") => BookingError::Serialization,
                // unique_violation
                Some("23505") => {
                    BookingError::InvalidState("Unique constraint violated".to_string())
                }
                _ => BookingError::Storage(err.to_string()),
            },
            _ => BookingError::Storage(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for BookingError {
    fn from(err: validator::ValidationErrors) -> Self {
        BookingError::Validation(err.to_string())
    }
}

/// Result type alias using BookingError
pub type BookingResult<T> = Result<T, BookingError>;
