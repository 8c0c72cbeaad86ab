//! Voucher-gated registration.
//!
//! The email uniqueness check, voucher resolution and identity insert run in
//! one immediate transaction, so concurrent registrations queue on the write
//! lock instead of racing between check and insert. The session is issued once
//! that transaction commits.

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::auth::email::is_valid_email;
use crate::auth::password::PasswordHasher;
use crate::auth::session::{SessionNamespace, create_session};
use crate::auth::{AuthError, VoucherError, queries};
use crate::db::BEGIN_IMMEDIATE;
use crate::models::auth::{Profile, Registration};
use crate::voucher::resolve_sponsor;

/// Register a new identity by redeeming `voucher_code`.
///
/// Gates run in order and the first failure wins: email shape, email
/// uniqueness, voucher validity. The password is hashed before the write lock
/// is taken. The voucher owner becomes the new identity's sponsor.
pub async fn register(
    pool: &SqlitePool,
    hasher: &PasswordHasher,
    profile: &Profile,
    voucher_code: &str,
) -> Result<Registration, AuthError> {
    if !is_valid_email(&profile.email) {
        return Err(AuthError::InvalidEmail);
    }

    let password_hash = hasher.hash(&profile.password)?;

    let mut tx = pool.begin_with(BEGIN_IMMEDIATE).await?;

    if queries::email_exists(&mut *tx, &profile.email).await? {
        return Err(AuthError::DuplicateEmail);
    }

    let sponsor_id = match resolve_sponsor(&mut *tx, voucher_code).await? {
        Some(id) => id,
        None => {
            warn!("voucher has no owning identity, refusing registration");
            return Err(VoucherError::NotFound.into());
        }
    };

    let identity_id = queries::insert_identity(
        &mut *tx,
        profile.name.as_deref(),
        profile.surname.as_deref(),
        &profile.email,
        &password_hash,
        profile.phone.as_deref(),
        Some(sponsor_id),
    )
    .await?;

    tx.commit().await?;

    let token = create_session(pool, SessionNamespace::User, identity_id).await?;
    info!(identity_id, sponsor_id, "identity registered");

    Ok(Registration { identity_id, token })
}
