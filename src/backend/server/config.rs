/**
 * Server Configuration
 *
 * Loads the database configuration and brings the schema up to date.
 *
 * # Error Handling
 *
 * The store is this server's single source of truth: a connection or
 * migration failure at startup is fatal. There is no degraded
 * database-less mode.
 */

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Default database location when DATABASE_URL is not set
const DEFAULT_DATABASE_URL: &str = "sqlite://cartsync.db";

/// Connect to the database and run migrations
///
/// Reads `DATABASE_URL` from the environment, creating the SQLite file on
/// first start. Foreign keys are enabled so list deletion cascades to items
/// and sharing grants.
///
/// # Errors
///
/// Any connection or migration failure is returned to the caller, which is
/// expected to treat it as fatal.
pub async fn connect_database() -> Result<SqlitePool, sqlx::Error> {
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    tracing::info!("Connecting to database...");

    let options = SqliteConnectOptions::from_str(&database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    sqlx::migrate!().run(&pool).await?;
    tracing::info!("Database migrations completed successfully");

    Ok(pool)
}
