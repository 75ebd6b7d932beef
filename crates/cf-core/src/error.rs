//! # AppError
//!
//! Centralized error handling for the CampusFind ecosystem.
//! Adapters translate provider-level failures (sqlx, reqwest, password
//! hashing) into one of these kinds; no provider error shape crosses a port.

use thiserror::Error;

/// The primary error type for all cf-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Referenced record missing (e.g., Item, UserProfile)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Malformed submission (e.g., description too short, unknown category)
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing or invalid session credentials
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not permitted (e.g., non-owner marking returned)
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Record already exists (e.g., duplicate sign-up email)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Backing store rejected the operation (transient, safe to retry)
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The external AI judgment call failed (transient, safe to retry)
    #[error("external call failed: {0}")]
    ExternalCallFailure(String),

    /// Infrastructure failure inside the process (e.g., hashing)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for failures that a caller may simply retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::StoreUnavailable(_) | AppError::ExternalCallFailure(_)
        )
    }
}

/// A specialized Result type for CampusFind logic.
pub type Result<T> = std::result::Result<T, AppError>;
