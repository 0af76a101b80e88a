//! # AppError
//!
//! Centralized error handling for Rusty-Profile.
//! Every failure a handler can surface maps to one of these variants.

use thiserror::Error;

/// The primary error type for all rp-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g. unknown username, unknown post id)
    #[error("{0} not found: {1}")]
    NotFound(String, String),

    /// Registration with an email that already has an account
    #[error("user already registered: {0}")]
    AlreadyRegistered(String),

    #[error("username already taken: {0}")]
    UsernameTaken(String),

    /// Login with an email that has no account
    #[error("no account for {0}")]
    UserNotFound(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    /// Missing, invalid or expired session token
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to touch this resource
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Validation failure (e.g. blank post, blank username)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Infrastructure failure (e.g. store unreachable, hashing failed)
    #[error("internal service error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// A uniqueness clash reported by a `UserDirectory` when `create_user` loses
/// a race (or skips the pre-check). Stores return it inside `anyhow::Error`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UniqueViolation {
    #[error("email already registered: {0}")]
    Email(String),

    #[error("username already taken: {0}")]
    Username(String),
}

impl From<UniqueViolation> for AppError {
    fn from(clash: UniqueViolation) -> Self {
        match clash {
            UniqueViolation::Email(email) => AppError::AlreadyRegistered(email),
            UniqueViolation::Username(username) => AppError::UsernameTaken(username),
        }
    }
}

/// A specialized Result type for Rusty-Profile logic.
pub type Result<T> = std::result::Result<T, AppError>;
