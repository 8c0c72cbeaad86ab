//! Voucher domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::auth::Identity;

/// A referral voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Voucher {
    pub id: i64,
    pub code: String,
    pub expiration: DateTime<Utc>,
    /// Identity entitled to hand out the code. `None` for system-issued vouchers.
    pub owner_id: Option<i64>,
}

impl Voucher {
    /// A voucher is disabled when its expiration sits on the epoch sentinel.
    pub fn is_disabled(&self) -> bool {
        self.expiration == DateTime::UNIX_EPOCH
    }

    /// Status of this voucher at `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> VoucherStatus {
        if self.expiration > now {
            VoucherStatus::Valid
        } else {
            VoucherStatus::Expired
        }
    }
}

/// Result of looking a voucher code up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherStatus {
    Valid,
    /// Expiration is not strictly after now. Disabled vouchers land here too.
    Expired,
    NotFound,
}

/// One row of the admin overview: an identity, its sponsor and its voucher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityOverview {
    pub identity: Identity,
    pub sponsor_email: Option<String>,
    pub voucher: Option<VoucherSummary>,
}

/// Voucher details shown next to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherSummary {
    pub code: String,
    pub expiration: DateTime<Utc>,
    pub disabled: bool,
}

impl From<&Voucher> for VoucherSummary {
    fn from(voucher: &Voucher) -> Self {
        Self {
            code: voucher.code.clone(),
            expiration: voucher.expiration,
            disabled: voucher.is_disabled(),
        }
    }
}
