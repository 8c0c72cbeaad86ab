//! Database schema.
//!
//! [`reset_schema`] is destructive: it drops and recreates every table. It is
//! only reachable from the bootstrap path and from test pools.

use sqlx::SqlitePool;
use tracing::warn;

/// Drop statements, children before parents so foreign keys never dangle.
const DROP_STATEMENTS: [&str; 5] = [
    "DROP TABLE IF EXISTS session",
    "DROP TABLE IF EXISTS admin_session",
    "DROP TABLE IF EXISTS voucher",
    "DROP TABLE IF EXISTS identity",
    "DROP TABLE IF EXISTS admin",
];

const CREATE_STATEMENTS: [&str; 5] = [
    "CREATE TABLE identity (
        id INTEGER PRIMARY KEY,
        name TEXT,
        surname TEXT,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        phone TEXT,
        sponsor_id INTEGER REFERENCES identity(id)
    )",
    // Codes are unique so a lookup by code is never ambiguous.
    "CREATE TABLE voucher (
        id INTEGER PRIMARY KEY,
        code TEXT NOT NULL UNIQUE,
        expiration TIMESTAMP NOT NULL,
        owner_id INTEGER REFERENCES identity(id)
    )",
    "CREATE TABLE admin (
        id INTEGER PRIMARY KEY,
        login TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )",
    "CREATE TABLE session (
        token TEXT NOT NULL PRIMARY KEY,
        identity_id INTEGER NOT NULL REFERENCES identity(id)
    )",
    "CREATE TABLE admin_session (
        token TEXT NOT NULL PRIMARY KEY,
        admin_id INTEGER NOT NULL
    )",
];

/// Drop and recreate all five tables in a single transaction.
pub async fn reset_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    warn!("resetting database schema, all existing data is dropped");

    let mut tx = pool.begin().await?;
    for statement in DROP_STATEMENTS.iter().chain(CREATE_STATEMENTS.iter()) {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ephemeral_pool;

    #[tokio::test]
    async fn reset_schema_discards_existing_rows() {
        let pool = ephemeral_pool().await.expect("pool");
        sqlx::query("INSERT INTO admin (login, password_hash) VALUES ('root', 'x')")
            .execute(&pool)
            .await
            .expect("insert admin");

        reset_schema(&pool).await.expect("reset");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(0, count);
    }

    #[tokio::test]
    async fn voucher_codes_are_unique() {
        let pool = ephemeral_pool().await.expect("pool");
        let insert = "INSERT INTO voucher (code, expiration) VALUES ('V1', '2100-01-01T00:00:00Z')";
        sqlx::query(insert).execute(&pool).await.expect("first insert");

        let err = sqlx::query(insert)
            .execute(&pool)
            .await
            .expect_err("duplicate code must fail");
        assert!(
            err.as_database_error()
                .is_some_and(|e| e.is_unique_violation())
        );
    }
}
