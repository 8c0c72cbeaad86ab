//! Authentication façade for the web layer.
//!
//! Every outcome a user can trigger comes back as an [`AuthError`] variant;
//! internal failures are logged here before they are returned so the caller
//! only needs [`AuthError::public_message`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use super::password::PasswordHasher;
use super::session::{
    SessionNamespace, create_session, delete_session, resolve_user_session, verify_admin_session,
};
use super::{AuthError, queries};
use crate::config::ResaConfig;
use crate::models::auth::{Identity, Profile, Registration};
use crate::models::voucher::{IdentityOverview, VoucherSummary};
use crate::{registration, voucher};

/// Login, registration and session handling over a shared pool.
#[derive(Debug, Clone)]
pub struct AuthService {
    pool: SqlitePool,
    hasher: PasswordHasher,
}

fn log_internal<T>(operation: &str, result: Result<T, AuthError>) -> Result<T, AuthError> {
    if let Err(e) = &result
        && e.is_internal()
    {
        error!(operation, error = %e, "auth operation failed");
    }
    result
}

impl AuthService {
    pub fn new(pool: SqlitePool, hasher: PasswordHasher) -> Self {
        Self { pool, hasher }
    }

    /// Build the service from the runtime configuration.
    pub fn from_config(pool: SqlitePool, config: &ResaConfig) -> Self {
        Self::new(pool, PasswordHasher::new(config.bcrypt_cost))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Authenticate with email + password and issue a user session.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        log_internal("login", self.login_inner(email, password).await)
    }

    async fn login_inner(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let Some(found) = queries::find_identity_by_email(&self.pool, email).await? else {
            warn!("login with unknown email");
            return Err(AuthError::IncorrectEmail);
        };

        if !self.hasher.verify(password, &found.password_hash) {
            warn!(identity_id = found.identity.id, "login with incorrect password");
            return Err(AuthError::IncorrectPassword);
        }

        let token = create_session(&self.pool, SessionNamespace::User, found.identity.id).await?;
        info!(identity_id = found.identity.id, "user logged in");
        Ok(token)
    }

    /// Register a new identity with a voucher code.
    pub async fn register(
        &self,
        profile: &Profile,
        voucher_code: &str,
    ) -> Result<Registration, AuthError> {
        log_internal(
            "register",
            registration::register(&self.pool, &self.hasher, profile, voucher_code).await,
        )
    }

    /// Resolve a user session token.
    ///
    /// [`AuthError::NotAuthenticated`] means the token is unknown or was
    /// deleted; the caller must discard it.
    pub async fn resume_session(&self, token: &str) -> Result<Identity, AuthError> {
        log_internal("resume_session", self.resume_session_inner(token).await)
    }

    async fn resume_session_inner(&self, token: &str) -> Result<Identity, AuthError> {
        if token.is_empty() {
            return Err(AuthError::NotAuthenticated);
        }
        resolve_user_session(&self.pool, token)
            .await?
            .map(|found| found.identity)
            .ok_or(AuthError::NotAuthenticated)
    }

    /// Delete a user session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        log_internal(
            "logout",
            delete_session(&self.pool, SessionNamespace::User, token).await,
        )
    }

    /// Authenticate an admin with login + password and issue an admin session.
    pub async fn admin_login(&self, login: &str, password: &str) -> Result<String, AuthError> {
        log_internal("admin_login", self.admin_login_inner(login, password).await)
    }

    async fn admin_login_inner(&self, login: &str, password: &str) -> Result<String, AuthError> {
        let Some(found) = queries::find_admin_by_login(&self.pool, login).await? else {
            warn!("admin login with unknown login");
            return Err(AuthError::IncorrectLogin);
        };

        if !self.hasher.verify(password, &found.password_hash) {
            warn!(admin_id = found.admin.id, "admin login with incorrect password");
            return Err(AuthError::IncorrectPassword);
        }

        let token = create_session(&self.pool, SessionNamespace::Admin, found.admin.id).await?;
        info!(admin_id = found.admin.id, "admin logged in");
        Ok(token)
    }

    /// Whether `token` is a live admin session.
    pub async fn resume_admin_session(&self, token: &str) -> Result<bool, AuthError> {
        if token.is_empty() {
            return Ok(false);
        }
        log_internal(
            "resume_admin_session",
            verify_admin_session(&self.pool, token).await,
        )
    }

    /// Delete an admin session. Unknown tokens are ignored.
    pub async fn admin_logout(&self, token: &str) -> Result<(), AuthError> {
        log_internal(
            "admin_logout",
            delete_session(&self.pool, SessionNamespace::Admin, token).await,
        )
    }

    async fn require_admin(&self, admin_token: &str) -> Result<(), AuthError> {
        if self.resume_admin_session(admin_token).await? {
            Ok(())
        } else {
            Err(AuthError::NotAuthenticated)
        }
    }

    /// Add a voucher on behalf of an authenticated admin.
    pub async fn add_voucher(
        &self,
        admin_token: &str,
        code: &str,
        expiration: DateTime<Utc>,
        owner_id: Option<i64>,
    ) -> Result<i64, AuthError> {
        self.require_admin(admin_token).await?;
        log_internal(
            "add_voucher",
            voucher::add_voucher(&self.pool, code, expiration, owner_id).await,
        )
    }

    /// Disable every voucher of `owner_id` on behalf of an authenticated admin.
    pub async fn disable_voucher(&self, admin_token: &str, owner_id: i64) -> Result<u64, AuthError> {
        self.require_admin(admin_token).await?;
        log_internal(
            "disable_voucher",
            voucher::disable_voucher(&self.pool, owner_id).await,
        )
    }

    /// Every identity with its sponsor's email and current voucher.
    pub async fn admin_overview(
        &self,
        admin_token: &str,
    ) -> Result<Vec<IdentityOverview>, AuthError> {
        self.require_admin(admin_token).await?;
        log_internal("admin_overview", overview(&self.pool).await)
    }
}

/// Build the identity overview without an admin check. Used by the operator
/// CLI, which runs with direct database access.
pub async fn overview(pool: &SqlitePool) -> Result<Vec<IdentityOverview>, AuthError> {
    let identities = queries::list_identities(pool).await?;
    let mut vouchers = voucher::latest_voucher_by_owner(pool).await?;
    let emails: HashMap<i64, &str> = identities
        .iter()
        .map(|identity| (identity.id, identity.email.as_str()))
        .collect();

    let rows = identities
        .iter()
        .map(|identity| IdentityOverview {
            sponsor_email: identity
                .sponsor_id
                .and_then(|sponsor| emails.get(&sponsor))
                .map(|email| email.to_string()),
            voucher: vouchers
                .remove(&identity.id)
                .as_ref()
                .map(VoucherSummary::from),
            identity: identity.clone(),
        })
        .collect();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ErrorKind;
    use crate::db::ephemeral_pool;
    use chrono::Duration;

    async fn service() -> AuthService {
        let pool = ephemeral_pool().await.unwrap();
        AuthService::new(pool, PasswordHasher::new(crate::auth::password::MIN_BCRYPT_COST))
    }

    async fn seed_identity(svc: &AuthService, email: &str, password: &str) -> i64 {
        let hash = svc.hasher.hash(password).unwrap();
        queries::insert_identity(svc.pool(), Some("Alice"), None, email, &hash, None, None)
            .await
            .unwrap()
    }

    async fn seed_admin(svc: &AuthService) -> String {
        let hash = svc.hasher.hash("adminpw").unwrap();
        queries::insert_admin(svc.pool(), "root", &hash).await.unwrap();
        svc.admin_login("root", "adminpw").await.unwrap()
    }

    #[tokio::test]
    async fn login_outcomes() {
        let svc = service().await;
        let id = seed_identity(&svc, "alice@example.com", "secret").await;

        assert!(matches!(
            svc.login("nobody@example.com", "secret").await,
            Err(AuthError::IncorrectEmail)
        ));
        assert!(matches!(
            svc.login("alice@example.com", "wrong").await,
            Err(AuthError::IncorrectPassword)
        ));

        let token = svc.login("alice@example.com", "secret").await.unwrap();
        assert_eq!(id, svc.resume_session(&token).await.unwrap().id);
    }

    #[tokio::test]
    async fn logout_invalidates_only_that_session() {
        let svc = service().await;
        seed_identity(&svc, "alice@example.com", "secret").await;
        let a = svc.login("alice@example.com", "secret").await.unwrap();
        let b = svc.login("alice@example.com", "secret").await.unwrap();

        svc.logout(&a).await.unwrap();

        let err = svc.resume_session(&a).await.unwrap_err();
        assert_eq!(ErrorKind::NotAuthenticated, err.kind());
        assert!(svc.resume_session(&b).await.is_ok());
    }

    #[tokio::test]
    async fn logout_unknown_token_is_ok() {
        let svc = service().await;
        svc.logout("never-issued").await.unwrap();
        svc.admin_logout("never-issued").await.unwrap();
    }

    #[tokio::test]
    async fn empty_token_is_not_authenticated() {
        let svc = service().await;
        assert!(matches!(
            svc.resume_session("").await,
            Err(AuthError::NotAuthenticated)
        ));
        assert!(!svc.resume_admin_session("").await.unwrap());
    }

    #[tokio::test]
    async fn admin_login_outcomes() {
        let svc = service().await;
        let token = seed_admin(&svc).await;

        assert!(svc.resume_admin_session(&token).await.unwrap());
        assert!(matches!(
            svc.admin_login("ghost", "adminpw").await,
            Err(AuthError::IncorrectLogin)
        ));
        assert!(matches!(
            svc.admin_login("root", "nope").await,
            Err(AuthError::IncorrectPassword)
        ));

        svc.admin_logout(&token).await.unwrap();
        assert!(!svc.resume_admin_session(&token).await.unwrap());
    }

    #[tokio::test]
    async fn user_token_is_not_an_admin_token() {
        let svc = service().await;
        seed_identity(&svc, "alice@example.com", "secret").await;
        let user_token = svc.login("alice@example.com", "secret").await.unwrap();

        assert!(!svc.resume_admin_session(&user_token).await.unwrap());
        let err = svc
            .disable_voucher(&user_token, 1)
            .await
            .expect_err("not an admin");
        assert!(matches!(err, AuthError::NotAuthenticated));
    }

    #[tokio::test]
    async fn voucher_admin_actions_require_admin_session() {
        let svc = service().await;
        let owner = seed_identity(&svc, "alice@example.com", "secret").await;
        let tomorrow = Utc::now() + Duration::days(1);

        assert!(matches!(
            svc.add_voucher("bogus", "V1", tomorrow, Some(owner)).await,
            Err(AuthError::NotAuthenticated)
        ));

        let admin = seed_admin(&svc).await;
        svc.add_voucher(&admin, "V1", tomorrow, Some(owner))
            .await
            .unwrap();
        assert_eq!(1, svc.disable_voucher(&admin, owner).await.unwrap());
    }

    #[tokio::test]
    async fn overview_lists_sponsor_and_voucher_state() {
        let svc = service().await;
        let alice = seed_identity(&svc, "alice@example.com", "secret").await;
        let admin = seed_admin(&svc).await;
        svc.add_voucher(&admin, "V1", Utc::now() + Duration::days(1), Some(alice))
            .await
            .unwrap();

        let profile = Profile {
            name: Some("Bob".into()),
            email: "bob@example.com".into(),
            password: "pw".into(),
            ..Profile::default()
        };
        let reg = svc.register(&profile, "V1").await.unwrap();
        svc.disable_voucher(&admin, alice).await.unwrap();

        let rows = svc.admin_overview(&admin).await.unwrap();
        assert_eq!(2, rows.len());

        let alice_row = rows.iter().find(|r| r.identity.id == alice).unwrap();
        assert_eq!(None, alice_row.sponsor_email);
        let voucher = alice_row.voucher.as_ref().unwrap();
        assert_eq!("V1", voucher.code);
        assert!(voucher.disabled);

        let bob_row = rows
            .iter()
            .find(|r| r.identity.id == reg.identity_id)
            .unwrap();
        assert_eq!(Some("alice@example.com"), bob_row.sponsor_email.as_deref());
        assert!(bob_row.voucher.is_none());
    }
}
