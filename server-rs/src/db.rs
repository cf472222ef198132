use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;

pub async fn create_pool(config: &Config) -> PgPool {
    let url = config.database_url();
    PgPoolOptions::new()
        .min_connections(config.db.pool_min)
        .max_connections(config.db.pool_max)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .connect(&url)
        .await
        .expect("Failed to connect to PostgreSQL")
}

/// Idempotent DDL, run once at startup. The partial unique index on bookings
/// is what actually guarantees the single-Confirmed-booking-per-slot
/// invariant under concurrent approvals, and the unique owner_id enforces
/// one venue per owner.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    let statements = [
        r#"CREATE TABLE IF NOT EXISTS accounts (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'Player',
            phone TEXT,
            reset_token_hash TEXT,
            reset_token_expires_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            last_login_at TIMESTAMPTZ
        )"#,
        r#"CREATE TABLE IF NOT EXISTS venues (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            location TEXT NOT NULL,
            opening_time TEXT NOT NULL,
            closing_time TEXT NOT NULL,
            contact TEXT NOT NULL,
            price_per_hour INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'Pending',
            image_url TEXT,
            owner_id UUID NOT NULL UNIQUE REFERENCES accounts(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
        r#"CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY,
            venue_id UUID NOT NULL REFERENCES venues(id) ON DELETE CASCADE,
            account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            date DATE NOT NULL,
            time_slot TEXT NOT NULL,
            phone TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'Pending',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
        r#"CREATE UNIQUE INDEX IF NOT EXISTS bookings_confirmed_slot
            ON bookings (venue_id, date, time_slot)
            WHERE status = 'Confirmed'"#,
        r#"CREATE INDEX IF NOT EXISTS bookings_account_idx ON bookings (account_id)"#,
        r#"CREATE INDEX IF NOT EXISTS bookings_venue_idx ON bookings (venue_id)"#,
    ];

    for sql in statements {
        sqlx::query(sql).execute(pool).await?;
    }
    Ok(())
}
