//! Identity, admin and session domain models.
//!
//! Password hashes only travel inside [`IdentityWithPassword`] and
//! [`AdminWithPassword`], neither of which is serializable.

use serde::{Deserialize, Serialize};

/// A registered member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Identity {
    pub id: i64,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    /// Identity whose voucher admitted this one. `None` for identities
    /// created by the system bootstrap.
    pub sponsor_id: Option<i64>,
}

/// Identity with password hash (for internal auth flows).
#[derive(Debug, Clone)]
pub struct IdentityWithPassword {
    pub identity: Identity,
    pub password_hash: String,
}

/// Profile fields submitted at registration.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    /// Plaintext password, hashed before it reaches the store.
    pub password: String,
}

/// Admin account, without its password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub id: i64,
    pub login: String,
}

/// Admin with password hash (for internal auth flows).
#[derive(Debug, Clone)]
pub struct AdminWithPassword {
    pub admin: Admin,
    pub password_hash: String,
}

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub identity_id: i64,
    /// User-namespace session token issued for the new identity.
    pub token: String,
}
