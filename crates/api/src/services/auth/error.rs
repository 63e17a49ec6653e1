//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::email::EmailError;

/// Errors that can occur during the one-time code sign-in flow.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] meridian_core::EmailError),

    /// Too many code requests for this address in the rolling window.
    #[error("too many code requests")]
    RateLimited,

    /// No active code for this email.
    #[error("no active verification code")]
    CodeNotFound,

    /// The active code has passed its expiry.
    #[error("verification code expired")]
    CodeExpired,

    /// The attempt budget for the active code is used up.
    #[error("too many failed attempts")]
    TooManyAttempts,

    /// Submitted code didn't match.
    #[error("wrong verification code ({attempts_left} attempts left)")]
    WrongCode {
        /// Attempts remaining before the code locks out.
        attempts_left: i32,
    },

    /// Code hashing error.
    #[error("code hashing error")]
    Hash,

    /// The code email could not be delivered.
    #[error("email dispatch failed: {0}")]
    Dispatch(#[from] EmailError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
