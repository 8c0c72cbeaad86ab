//! First-run bootstrap.
//!
//! Resets the schema, creates the first admin and a default identity that
//! belongs to no sponsor. The default identity exists so an admin has someone
//! to attach the very first voucher to.

use sqlx::SqlitePool;
use tracing::info;

use crate::auth::email::is_valid_email;
use crate::auth::password::PasswordHasher;
use crate::auth::{AuthError, queries};
use crate::db::BEGIN_IMMEDIATE;
use crate::schema::reset_schema;

/// Email of the default identity unless overridden.
pub const DEFAULT_IDENTITY_EMAIL: &str = "contact@resa.com";

/// Inputs for [`initialize`].
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    pub admin_login: String,
    pub admin_password: String,
    pub default_email: String,
    pub default_password: String,
}

/// Ids created by [`initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    pub admin_id: i64,
    pub default_identity_id: i64,
}

/// Create an admin account, returning its id.
pub async fn create_admin(
    pool: &SqlitePool,
    hasher: &PasswordHasher,
    login: &str,
    password: &str,
) -> Result<i64, AuthError> {
    let login = login.trim();
    if login.is_empty() {
        return Err(AuthError::Validation("Admin login must not be empty".into()));
    }
    if password.is_empty() {
        return Err(AuthError::Validation("Admin password must not be empty".into()));
    }
    if queries::find_admin_by_login(pool, login).await?.is_some() {
        return Err(AuthError::DuplicateLogin(login.to_string()));
    }

    let hash = hasher.hash(password)?;
    let id = queries::insert_admin(pool, login, &hash).await?;
    info!(admin_id = id, login, "admin created");
    Ok(id)
}

/// Create the sponsor-less default identity, returning its id.
pub async fn create_default_identity(
    pool: &SqlitePool,
    hasher: &PasswordHasher,
    email: &str,
    password: &str,
) -> Result<i64, AuthError> {
    if !is_valid_email(email) {
        return Err(AuthError::InvalidEmail);
    }
    if password.is_empty() {
        return Err(AuthError::Validation(
            "Default identity password must not be empty".into(),
        ));
    }

    let hash = hasher.hash(password)?;
    let mut tx = pool.begin_with(BEGIN_IMMEDIATE).await?;
    if queries::email_exists(&mut *tx, email).await? {
        return Err(AuthError::DuplicateEmail);
    }
    let id = queries::insert_identity(
        &mut *tx,
        Some("admin"),
        Some("admin"),
        email,
        &hash,
        None,
        None,
    )
    .await?;
    tx.commit().await?;

    info!(identity_id = id, email, "default identity created");
    Ok(id)
}

/// Destructive first-run sequence: reset the schema, then create the admin and
/// the default identity.
pub async fn initialize(
    pool: &SqlitePool,
    hasher: &PasswordHasher,
    options: &BootstrapOptions,
) -> Result<BootstrapReport, AuthError> {
    reset_schema(pool).await?;
    let admin_id = create_admin(pool, hasher, &options.admin_login, &options.admin_password).await?;
    let default_identity_id = create_default_identity(
        pool,
        hasher,
        &options.default_email,
        &options.default_password,
    )
    .await?;
    Ok(BootstrapReport {
        admin_id,
        default_identity_id,
    })
}
