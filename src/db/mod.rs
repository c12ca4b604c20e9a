//! Database module for PostgreSQL persistence

pub mod models;
pub mod repository;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::env;

// Environment variable names
const ENV_POSTGRES_HOST: &str = "RFPFLOW_POSTGRES_HOST";
const ENV_POSTGRES_PORT: &str = "RFPFLOW_POSTGRES_PORT";
const ENV_POSTGRES_USER: &str = "RFPFLOW_POSTGRES_USER";
const ENV_POSTGRES_PASSWORD: &str = "RFPFLOW_POSTGRES_PASSWORD";
const ENV_POSTGRES_DB: &str = "RFPFLOW_POSTGRES_DB";

// Default values
const DEFAULT_POSTGRES_HOST: &str = "127.0.0.1";
const DEFAULT_POSTGRES_PORT: &str = "5432";
const DEFAULT_POSTGRES_USER: &str = "rfpflow";
const DEFAULT_POSTGRES_PASSWORD: &str = "rfpflow";
const DEFAULT_POSTGRES_DB: &str = "rfpflow";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Record is still referenced: {0}")]
    Referenced(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Create a new database connection pool
pub async fn create_pool() -> Result<PgPool, DbError> {
    let host = env::var(ENV_POSTGRES_HOST).unwrap_or_else(|_| DEFAULT_POSTGRES_HOST.to_string());
    let port = env::var(ENV_POSTGRES_PORT).unwrap_or_else(|_| DEFAULT_POSTGRES_PORT.to_string());
    let user = env::var(ENV_POSTGRES_USER).unwrap_or_else(|_| DEFAULT_POSTGRES_USER.to_string());
    let password =
        env::var(ENV_POSTGRES_PASSWORD).unwrap_or_else(|_| DEFAULT_POSTGRES_PASSWORD.to_string());
    let database = env::var(ENV_POSTGRES_DB).unwrap_or_else(|_| DEFAULT_POSTGRES_DB.to_string());

    let database_url = format!(
        "postgres://{}:{}@{}:{}/{}",
        user, password, host, port, database
    );

    tracing::debug!(host = %host, port = %port, database = %database, "Connecting to PostgreSQL");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    tracing::info!(host = %host, port = %port, "PostgreSQL connection established");

    Ok(pool)
}

/// Initialize database schema
pub async fn init_schema(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vendors (
            id VARCHAR(36) PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            contact_person TEXT,
            phone TEXT,
            address TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rfps (
            id VARCHAR(36) PRIMARY KEY,
            title TEXT NOT NULL,
            raw_input TEXT NOT NULL,
            description TEXT,
            budget DOUBLE PRECISION,
            currency VARCHAR(8) NOT NULL DEFAULT 'USD',
            delivery_days INTEGER,
            payment_terms TEXT,
            warranty_months INTEGER,
            status VARCHAR(16) NOT NULL DEFAULT 'DRAFT',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rfp_items (
            id VARCHAR(36) PRIMARY KEY,
            rfp_id VARCHAR(36) NOT NULL REFERENCES rfps(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT,
            quantity INTEGER NOT NULL DEFAULT 1,
            specifications JSONB NOT NULL DEFAULT '{}',
            position INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rfp_vendors (
            rfp_id VARCHAR(36) NOT NULL REFERENCES rfps(id) ON DELETE CASCADE,
            vendor_id VARCHAR(36) NOT NULL REFERENCES vendors(id) ON DELETE RESTRICT,
            sent_at TIMESTAMPTZ,
            status VARCHAR(16) NOT NULL,
            PRIMARY KEY (rfp_id, vendor_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS proposals (
            id VARCHAR(36) PRIMARY KEY,
            rfp_id VARCHAR(36) NOT NULL REFERENCES rfps(id) ON DELETE CASCADE,
            vendor_id VARCHAR(36) NOT NULL REFERENCES vendors(id) ON DELETE RESTRICT,
            raw_email TEXT NOT NULL,
            raw_subject TEXT,
            parsed_data JSONB NOT NULL DEFAULT '{}',
            total_price DOUBLE PRECISION,
            unit_prices JSONB NOT NULL DEFAULT '[]',
            delivery_days INTEGER,
            warranty TEXT,
            payment_terms TEXT,
            ai_score DOUBLE PRECISION,
            ai_summary TEXT,
            ai_strengths JSONB NOT NULL DEFAULT '[]',
            ai_weaknesses JSONB NOT NULL DEFAULT '[]',
            received_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (rfp_id, vendor_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes separately
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_rfp_items_rfp_id ON rfp_items(rfp_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_rfp_vendors_vendor_sent ON rfp_vendors(vendor_id, status, sent_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_proposals_rfp_id ON proposals(rfp_id)")
        .execute(pool)
        .await?;

    tracing::info!("Database schema initialized");

    Ok(())
}
