//! Database initialization
//!
//! Opens (or creates) the SQLite database and makes sure the `orders` table
//! exists. Schema creation is idempotent and safe to run on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Busy timeout applied to every connection, in milliseconds
pub const BUSY_TIMEOUT_MS: u32 = 5000;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets status/listing reads proceed while an import transaction writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query(&format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT_MS))
        .execute(&pool)
        .await?;

    create_orders_table(&pool).await?;

    Ok(pool)
}

/// In-memory database with the full schema
///
/// A single long-lived connection is used because every SQLite `:memory:`
/// connection owns a separate database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    create_orders_table(&pool).await?;

    Ok(pool)
}

/// Create the orders table
///
/// `position` is the row's index inside its import batch and defines table
/// order. `category` holds `hang_dry` or `wash_and_fold`.
pub async fn create_orders_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            position INTEGER PRIMARY KEY,
            identifier TEXT NOT NULL UNIQUE,
            customer TEXT NOT NULL,
            raw_date TEXT NOT NULL,
            weight TEXT,
            category TEXT NOT NULL CHECK (category IN ('hang_dry', 'wash_and_fold')),
            rush INTEGER NOT NULL DEFAULT 0 CHECK (rush IN (0, 1)),
            scanned INTEGER NOT NULL DEFAULT 0 CHECK (scanned IN (0, 1)),
            scan_date TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders(customer)")
        .execute(pool)
        .await?;

    Ok(())
}
