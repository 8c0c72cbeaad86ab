//! Authentication and session logic.
//!
//! Provides password hashing, session token generation, the persistent
//! session store and the [`service::AuthService`] façade used by the web
//! layer.

pub mod email;
pub mod password;
pub mod queries;
pub mod service;
pub mod session;
pub mod token;

use thiserror::Error;

/// Why a voucher code was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VoucherError {
    #[error("Invalid voucher")]
    NotFound,

    #[error("Voucher expired")]
    Expired,
}

/// Closed error taxonomy. Callers branch on this, never on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input (email shape, voucher parameters).
    Validation,
    /// Uniqueness conflict (email, voucher code, admin login).
    Conflict,
    /// Voucher missing or expired.
    Voucher,
    /// Wrong email, login or password.
    WrongCredential,
    /// Absent, unknown or deleted session token. The caller must drop any
    /// token it holds.
    NotAuthenticated,
    /// Store unreachable or statement failure.
    Storage,
    /// Random source failure.
    Entropy,
    /// Any other internal failure (hashing).
    Internal,
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Voucher code already exists: {0}")]
    DuplicateVoucher(String),

    #[error("Admin login already exists: {0}")]
    DuplicateLogin(String),

    #[error(transparent)]
    Voucher(#[from] VoucherError),

    #[error("Incorrect email")]
    IncorrectEmail,

    #[error("Incorrect login")]
    IncorrectLogin,

    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Entropy source failure: {0}")]
    Entropy(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Structural classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidEmail | AuthError::Validation(_) => ErrorKind::Validation,
            AuthError::DuplicateEmail
            | AuthError::DuplicateVoucher(_)
            | AuthError::DuplicateLogin(_) => ErrorKind::Conflict,
            AuthError::Voucher(_) => ErrorKind::Voucher,
            AuthError::IncorrectEmail | AuthError::IncorrectLogin | AuthError::IncorrectPassword => {
                ErrorKind::WrongCredential
            }
            AuthError::NotAuthenticated => ErrorKind::NotAuthenticated,
            AuthError::DbError(_) => ErrorKind::Storage,
            AuthError::Entropy(_) => ErrorKind::Entropy,
            AuthError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether this is an internal failure rather than an expected outcome.
    pub fn is_internal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Storage | ErrorKind::Entropy | ErrorKind::Internal
        )
    }

    /// Message safe to show to an end user.
    ///
    /// Internal failures collapse to an opaque message so SQL, hashes and
    /// driver details never leave the process.
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            "Internal error".to_string()
        } else {
            self.to_string()
        }
    }
}
