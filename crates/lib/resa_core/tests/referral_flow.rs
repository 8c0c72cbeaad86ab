//! End-to-end referral flow: bootstrap, vouchers, registration, sessions.

use chrono::{Duration, Utc};
use resa_core::auth::password::PasswordHasher;
use resa_core::auth::service::AuthService;
use resa_core::auth::{AuthError, ErrorKind, VoucherError};
use resa_core::bootstrap::{self, BootstrapOptions};
use resa_core::db::ephemeral_pool;
use resa_core::models::auth::Profile;
use resa_core::models::voucher::VoucherStatus;
use resa_core::voucher::check_voucher;

fn hasher() -> PasswordHasher {
    PasswordHasher::new(4)
}

fn profile(email: &str, password: &str) -> Profile {
    Profile {
        name: Some("Bob".into()),
        surname: Some("Builder".into()),
        email: email.into(),
        phone: None,
        password: password.into(),
    }
}

#[tokio::test]
async fn sponsor_chain_from_bootstrap_to_disable() {
    let pool = ephemeral_pool().await.expect("ephemeral pool");
    let report = bootstrap::initialize(
        &pool,
        &hasher(),
        &BootstrapOptions {
            admin_login: "root".into(),
            admin_password: "adminpw".into(),
            default_email: "alice@example.com".into(),
            default_password: "alicepw".into(),
        },
    )
    .await
    .expect("bootstrap");
    let alice = report.default_identity_id;

    let svc = AuthService::new(pool.clone(), hasher());
    let admin = svc.admin_login("root", "adminpw").await.expect("admin login");

    svc.add_voucher(&admin, "V1", Utc::now() + Duration::hours(24), Some(alice))
        .await
        .expect("add voucher");

    // Bob redeems Alice's voucher.
    let reg = svc
        .register(&profile("bob@example.com", "bobpw"), "V1")
        .await
        .expect("register bob");
    let bob = svc.resume_session(&reg.token).await.expect("resume bob");
    assert_eq!(reg.identity_id, bob.id);
    assert_eq!(Some(alice), bob.sponsor_id);
    assert_eq!("bob@example.com", bob.email);

    // Bob can log in again with his own password.
    let second = svc.login("bob@example.com", "bobpw").await.expect("login");
    assert_ne!(reg.token, second);

    // Disabling Alice's voucher closes the door.
    svc.disable_voucher(&admin, alice).await.expect("disable");
    assert_eq!(
        VoucherStatus::Expired,
        check_voucher(&pool, "V1").await.expect("check")
    );
    let err = svc
        .register(&profile("carol@example.com", "carolpw"), "V1")
        .await
        .expect_err("disabled voucher");
    assert!(matches!(err, AuthError::Voucher(VoucherError::Expired)));

    // Existing sessions are unaffected by the disable.
    assert!(svc.resume_session(&reg.token).await.is_ok());

    // Logging out drops the session; the caller must discard it.
    svc.logout(&reg.token).await.expect("logout");
    let err = svc.resume_session(&reg.token).await.expect_err("logged out");
    assert_eq!(ErrorKind::NotAuthenticated, err.kind());
}

#[tokio::test]
async fn bob_can_sponsor_carol() {
    let pool = ephemeral_pool().await.expect("ephemeral pool");
    let report = bootstrap::initialize(
        &pool,
        &hasher(),
        &BootstrapOptions {
            admin_login: "root".into(),
            admin_password: "adminpw".into(),
            default_email: bootstrap::DEFAULT_IDENTITY_EMAIL.into(),
            default_password: "defaultpw".into(),
        },
    )
    .await
    .expect("bootstrap");

    let svc = AuthService::new(pool, hasher());
    let admin = svc.admin_login("root", "adminpw").await.expect("admin login");
    let tomorrow = Utc::now() + Duration::days(1);

    svc.add_voucher(&admin, "ROOT", tomorrow, Some(report.default_identity_id))
        .await
        .expect("root voucher");
    let bob = svc
        .register(&profile("bob@example.com", "pw"), "ROOT")
        .await
        .expect("bob");

    svc.add_voucher(&admin, "BOB", tomorrow, Some(bob.identity_id))
        .await
        .expect("bob voucher");
    let carol = svc
        .register(&profile("carol@example.com", "pw"), "BOB")
        .await
        .expect("carol");

    let carol = svc.resume_session(&carol.token).await.expect("resume carol");
    assert_eq!(Some(bob.identity_id), carol.sponsor_id);

    let rows = svc.admin_overview(&admin).await.expect("overview");
    let carol_row = rows
        .iter()
        .find(|r| r.identity.id == carol.id)
        .expect("carol row");
    assert_eq!(Some("bob@example.com"), carol_row.sponsor_email.as_deref());
}
