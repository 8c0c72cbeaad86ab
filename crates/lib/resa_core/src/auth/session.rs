//! Persistent session store.
//!
//! Tokens map to exactly one id. User and admin sessions live in separate
//! tables, so a token issued in one namespace never resolves in the other.

use sqlx::SqliteExecutor;
use tracing::debug;

use super::AuthError;
use super::queries::{IdentityRow, identity_from_row};
use super::token::generate_session_token;
use crate::models::auth::IdentityWithPassword;

/// Session namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionNamespace {
    User,
    Admin,
}

impl SessionNamespace {
    fn insert_sql(self) -> &'static str {
        match self {
            SessionNamespace::User => "INSERT INTO session (token, identity_id) VALUES (?, ?)",
            SessionNamespace::Admin => "INSERT INTO admin_session (token, admin_id) VALUES (?, ?)",
        }
    }

    fn delete_sql(self) -> &'static str {
        match self {
            SessionNamespace::User => "DELETE FROM session WHERE token = ?",
            SessionNamespace::Admin => "DELETE FROM admin_session WHERE token = ?",
        }
    }
}

/// Issue a new session for `id` and return its token.
///
/// Existing sessions for the same id are left alone.
pub async fn create_session<'e, E>(
    executor: E,
    namespace: SessionNamespace,
    id: i64,
) -> Result<String, AuthError>
where
    E: SqliteExecutor<'e>,
{
    let token = generate_session_token()?;
    sqlx::query(namespace.insert_sql())
        .bind(&token)
        .bind(id)
        .execute(executor)
        .await?;
    debug!(?namespace, id, "session created");
    Ok(token)
}

/// Resolve a user session to its identity, password hash included.
pub async fn resolve_user_session<'e, E>(
    executor: E,
    token: &str,
) -> Result<Option<IdentityWithPassword>, AuthError>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, IdentityRow>(
        "SELECT i.id, i.name, i.surname, i.email, i.password_hash, i.phone, i.sponsor_id \
         FROM session s \
         JOIN identity i ON i.id = s.identity_id \
         WHERE s.token = ?",
    )
    .bind(token)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(identity_from_row))
}

/// Whether an admin session token exists.
pub async fn verify_admin_session<'e, E>(executor: E, token: &str) -> Result<bool, AuthError>
where
    E: SqliteExecutor<'e>,
{
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM admin_session WHERE token = ?)",
    )
    .bind(token)
    .fetch_one(executor)
    .await?;
    Ok(exists)
}

/// Delete a session. Unknown tokens are a no-op.
pub async fn delete_session<'e, E>(
    executor: E,
    namespace: SessionNamespace,
    token: &str,
) -> Result<(), AuthError>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(namespace.delete_sql())
        .bind(token)
        .execute(executor)
        .await?;
    Ok(())
}
