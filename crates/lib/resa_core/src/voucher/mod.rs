//! Voucher validation and administration.
//!
//! A voucher is valid while its expiration is strictly in the future.
//! Disabling a voucher pins its expiration to the Unix epoch, so a disabled
//! voucher always reads as expired. Vouchers are never consumed: a valid code
//! admits any number of registrants until it expires or is disabled.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::info;

use crate::auth::{AuthError, VoucherError};
use crate::db::BEGIN_IMMEDIATE;
use crate::models::voucher::{Voucher, VoucherStatus};

/// Expiration written by [`disable_voucher`].
pub const DISABLED_EXPIRATION: DateTime<Utc> = DateTime::UNIX_EPOCH;

/// Fetch the voucher with `code`, if any.
pub async fn find_voucher<'e, E>(executor: E, code: &str) -> Result<Option<Voucher>, AuthError>
where
    E: SqliteExecutor<'e>,
{
    let voucher = sqlx::query_as::<_, Voucher>(
        "SELECT id, code, expiration, owner_id FROM voucher WHERE code = ? ORDER BY id LIMIT 1",
    )
    .bind(code)
    .fetch_optional(executor)
    .await?;
    Ok(voucher)
}

/// Check a voucher code against the current time.
pub async fn check_voucher<'e, E>(executor: E, code: &str) -> Result<VoucherStatus, AuthError>
where
    E: SqliteExecutor<'e>,
{
    check_voucher_at(executor, code, Utc::now()).await
}

/// Check a voucher code against an explicit `now`.
pub async fn check_voucher_at<'e, E>(
    executor: E,
    code: &str,
    now: DateTime<Utc>,
) -> Result<VoucherStatus, AuthError>
where
    E: SqliteExecutor<'e>,
{
    Ok(find_voucher(executor, code)
        .await?
        .map_or(VoucherStatus::NotFound, |v| v.status_at(now)))
}

/// Validate a voucher and return the id of the identity that owns it.
///
/// `Ok(None)` means the voucher is valid but no owning identity exists,
/// which is distinct from the voucher itself being refused.
pub async fn resolve_sponsor<'e, E>(executor: E, code: &str) -> Result<Option<i64>, AuthError>
where
    E: SqliteExecutor<'e>,
{
    resolve_sponsor_at(executor, code, Utc::now()).await
}

/// [`resolve_sponsor`] against an explicit `now`.
pub async fn resolve_sponsor_at<'e, E>(
    executor: E,
    code: &str,
    now: DateTime<Utc>,
) -> Result<Option<i64>, AuthError>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, (DateTime<Utc>, Option<i64>)>(
        "SELECT v.expiration, i.id \
         FROM voucher v \
         LEFT JOIN identity i ON i.id = v.owner_id \
         WHERE v.code = ? \
         ORDER BY v.id LIMIT 1",
    )
    .bind(code)
    .fetch_optional(executor)
    .await?;

    match row {
        None => Err(VoucherError::NotFound.into()),
        Some((expiration, _)) if expiration <= now => Err(VoucherError::Expired.into()),
        Some((_, sponsor_id)) => Ok(sponsor_id),
    }
}

/// Add a voucher for `owner_id` (or the system when `None`), returning its id.
///
/// Refuses empty codes, expirations that are not in the future (which also
/// keeps the disabled sentinel out of real data), unknown owners and codes
/// already in use.
pub async fn add_voucher(
    pool: &SqlitePool,
    code: &str,
    expiration: DateTime<Utc>,
    owner_id: Option<i64>,
) -> Result<i64, AuthError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AuthError::Validation("Voucher code must not be empty".into()));
    }
    if expiration <= Utc::now() {
        return Err(AuthError::Validation(
            "Voucher expiration must be in the future".into(),
        ));
    }

    let mut tx = pool.begin_with(BEGIN_IMMEDIATE).await?;

    if let Some(owner) = owner_id
        && crate::auth::queries::get_identity(&mut *tx, owner)
            .await?
            .is_none()
    {
        return Err(AuthError::Validation(format!("Unknown voucher owner {owner}")));
    }

    let inserted = sqlx::query_scalar::<_, i64>(
        "INSERT INTO voucher (code, expiration, owner_id) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(code)
    .bind(expiration)
    .bind(owner_id)
    .fetch_one(&mut *tx)
    .await;

    let id = match inserted {
        Ok(id) => id,
        Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
            return Err(AuthError::DuplicateVoucher(code.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    tx.commit().await?;
    info!(voucher_id = id, ?owner_id, %expiration, "voucher added");
    Ok(id)
}

/// Disable every voucher owned by `owner_id`. Returns the number of vouchers
/// touched.
pub async fn disable_voucher<'e, E>(executor: E, owner_id: i64) -> Result<u64, AuthError>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE voucher SET expiration = ? WHERE owner_id = ?")
        .bind(DISABLED_EXPIRATION)
        .bind(owner_id)
        .execute(executor)
        .await?;
    info!(owner_id, disabled = result.rows_affected(), "vouchers disabled");
    Ok(result.rows_affected())
}

/// Every voucher, oldest first.
pub async fn list_vouchers<'e, E>(executor: E) -> Result<Vec<Voucher>, AuthError>
where
    E: SqliteExecutor<'e>,
{
    let vouchers = sqlx::query_as::<_, Voucher>(
        "SELECT id, code, expiration, owner_id FROM voucher ORDER BY id",
    )
    .fetch_all(executor)
    .await?;
    Ok(vouchers)
}

/// Most recent voucher per owning identity. System vouchers are skipped.
pub async fn latest_voucher_by_owner<'e, E>(
    executor: E,
) -> Result<HashMap<i64, Voucher>, AuthError>
where
    E: SqliteExecutor<'e>,
{
    let mut by_owner = HashMap::new();
    for voucher in list_vouchers(executor).await? {
        if let Some(owner) = voucher.owner_id {
            by_owner.insert(owner, voucher);
        }
    }
    Ok(by_owner)
}
