//! Identity and admin database queries.
//!
//! Queries take any SQLite executor so they run equally against the pool or
//! inside a transaction.

use sqlx::SqliteExecutor;

use super::AuthError;
use crate::models::auth::{Admin, AdminWithPassword, Identity, IdentityWithPassword};

/// Column row for an identity including its password hash.
pub(crate) type IdentityRow = (
    i64,
    Option<String>,
    Option<String>,
    String,
    String,
    Option<String>,
    Option<i64>,
);

pub(crate) fn identity_from_row(row: IdentityRow) -> IdentityWithPassword {
    let (id, name, surname, email, password_hash, phone, sponsor_id) = row;
    IdentityWithPassword {
        identity: Identity {
            id,
            name,
            surname,
            email,
            phone,
            sponsor_id,
        },
        password_hash,
    }
}

/// Fetch an identity and its password hash by email.
pub async fn find_identity_by_email<'e, E>(
    executor: E,
    email: &str,
) -> Result<Option<IdentityWithPassword>, AuthError>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, IdentityRow>(
        "SELECT id, name, surname, email, password_hash, phone, sponsor_id \
         FROM identity WHERE email = ? ORDER BY id LIMIT 1",
    )
    .bind(email)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(identity_from_row))
}

/// Check whether an email is already registered.
pub async fn email_exists<'e, E>(executor: E, email: &str) -> Result<bool, AuthError>
where
    E: SqliteExecutor<'e>,
{
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM identity WHERE email = ?)")
            .bind(email)
            .fetch_one(executor)
            .await?;
    Ok(exists)
}

/// Insert a new identity, returning its id.
///
/// `password_hash` must already be hashed.
pub async fn insert_identity<'e, E>(
    executor: E,
    name: Option<&str>,
    surname: Option<&str>,
    email: &str,
    password_hash: &str,
    phone: Option<&str>,
    sponsor_id: Option<i64>,
) -> Result<i64, AuthError>
where
    E: SqliteExecutor<'e>,
{
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO identity (name, surname, email, password_hash, phone, sponsor_id) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(surname)
    .bind(email)
    .bind(password_hash)
    .bind(phone)
    .bind(sponsor_id)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

/// Fetch an identity by id.
pub async fn get_identity<'e, E>(executor: E, id: i64) -> Result<Option<Identity>, AuthError>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, Identity>(
        "SELECT id, name, surname, email, phone, sponsor_id FROM identity WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

/// Every identity, ordered by name.
pub async fn list_identities<'e, E>(executor: E) -> Result<Vec<Identity>, AuthError>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, Identity>(
        "SELECT id, name, surname, email, phone, sponsor_id FROM identity ORDER BY name, id",
    )
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

/// Insert an admin, returning its id.
pub async fn insert_admin<'e, E>(
    executor: E,
    login: &str,
    password_hash: &str,
) -> Result<i64, AuthError>
where
    E: SqliteExecutor<'e>,
{
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO admin (login, password_hash) VALUES (?, ?) RETURNING id",
    )
    .bind(login)
    .bind(password_hash)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

/// Fetch an admin and its password hash by login.
pub async fn find_admin_by_login<'e, E>(
    executor: E,
    login: &str,
) -> Result<Option<AdminWithPassword>, AuthError>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, (i64, String, String)>(
        "SELECT id, login, password_hash FROM admin WHERE login = ?",
    )
    .bind(login)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(|(id, login, password_hash)| AdminWithPassword {
        admin: Admin { id, login },
        password_hash,
    }))
}
