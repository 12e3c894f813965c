//! Authentication error types.

use thiserror::Error;

use goria_core::EmailError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username/password combination is wrong. Deliberately covers the
    /// unknown-user case too, so login failures don't leak which accounts
    /// exist.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("account already exists")]
    UserAlreadyExists,

    /// Password doesn't meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Underlying repository operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Session read/write failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}
