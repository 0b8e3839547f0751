//! Order table operations
//!
//! - `replace_all`: full-table replace inside one transaction
//! - `scan`: single-statement check-then-set on one row
//! - `status`, `list`, `known_names`: pure reads

use std::collections::HashSet;

use bagtrack_common::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::models::{Category, OrderRow, ScanKey, StatusReport};

/// Result of a scan attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Row flipped to scanned; carries the customer display name
    Scanned { customer: String },
    /// No row matches the key
    NotFound,
    /// Every matching row was already scanned
    AlreadyScanned { customer: String },
}

/// Replace the whole table with `rows`
///
/// Delete and inserts run in one transaction: either the new batch is fully
/// visible or the previous table is untouched.
pub async fn replace_all(pool: &SqlitePool, rows: &[OrderRow]) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM orders").execute(&mut *tx).await?;

    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO orders (
                position, identifier, customer, raw_date, weight,
                category, rush, scanned, scan_date
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(row.position)
        .bind(&row.identifier)
        .bind(&row.customer)
        .bind(&row.raw_date)
        .bind(&row.weight)
        .bind(row.category.as_str())
        .bind(row.rush)
        .bind(row.scanned)
        .bind(row.scan_date.map(|dt| dt.to_rfc3339()))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::debug!(rows = rows.len(), "Orders table replaced");
    Ok(())
}

/// Mark one row scanned
///
/// The `scanned = 0` predicate sits in the UPDATE itself, so two concurrent
/// scans of the same key cannot both succeed. A name shared by several rows
/// scans the first unscanned one in table order.
pub async fn scan(pool: &SqlitePool, key: &ScanKey, scanned_at: DateTime<Utc>) -> Result<ScanOutcome> {
    let scan_date = scanned_at.to_rfc3339();

    let updated: Option<String> = match key {
        ScanKey::Name(name) => {
            sqlx::query_scalar(
                r#"
                UPDATE orders SET scanned = 1, scan_date = ?
                WHERE position = (
                    SELECT position FROM orders
                    WHERE customer = ? AND scanned = 0
                    ORDER BY position
                    LIMIT 1
                )
                RETURNING customer
                "#,
            )
            .bind(&scan_date)
            .bind(name)
            .fetch_optional(pool)
            .await?
        }
        ScanKey::Identifier(identifier) => {
            sqlx::query_scalar(
                r#"
                UPDATE orders SET scanned = 1, scan_date = ?
                WHERE identifier = ? AND scanned = 0
                RETURNING customer
                "#,
            )
            .bind(&scan_date)
            .bind(identifier)
            .fetch_optional(pool)
            .await?
        }
    };

    if let Some(customer) = updated {
        return Ok(ScanOutcome::Scanned { customer });
    }

    // Nothing flipped: tell an unknown key from an already-scanned one
    let existing: Option<String> = match key {
        ScanKey::Name(name) => {
            sqlx::query_scalar("SELECT customer FROM orders WHERE customer = ? LIMIT 1")
                .bind(name)
                .fetch_optional(pool)
                .await?
        }
        ScanKey::Identifier(identifier) => {
            sqlx::query_scalar("SELECT customer FROM orders WHERE identifier = ?")
                .bind(identifier)
                .fetch_optional(pool)
                .await?
        }
    };

    Ok(match existing {
        Some(customer) => ScanOutcome::AlreadyScanned { customer },
        None => ScanOutcome::NotFound,
    })
}

/// Scan progress; `remaining == total - scanned`
///
/// Counts and list are read inside one transaction so a scan landing
/// between the two statements cannot make them disagree.
pub async fn status(pool: &SqlitePool) -> Result<StatusReport> {
    let mut tx = pool.begin().await?;

    let (total, scanned): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(scanned), 0) FROM orders")
            .fetch_one(&mut *tx)
            .await?;

    let unscanned: Vec<String> =
        sqlx::query_scalar("SELECT customer FROM orders WHERE scanned = 0 ORDER BY position")
            .fetch_all(&mut *tx)
            .await?;

    tx.commit().await?;

    Ok(StatusReport {
        total,
        scanned,
        remaining: total - scanned,
        remaining_list: dedup_in_order(unscanned),
    })
}

/// Every row, ordered by customer name then identifier
pub async fn list(pool: &SqlitePool) -> Result<Vec<OrderRow>> {
    let rows = sqlx::query(
        r#"
        SELECT position, identifier, customer, raw_date, weight,
               category, rush, scanned, scan_date
        FROM orders
        ORDER BY customer COLLATE NOCASE, identifier
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(order_from_row).collect()
}

/// Distinct customer names in table order
pub async fn known_names(pool: &SqlitePool) -> Result<Vec<String>> {
    let names: Vec<String> = sqlx::query_scalar("SELECT customer FROM orders ORDER BY position")
        .fetch_all(pool)
        .await?;

    Ok(dedup_in_order(names))
}

fn dedup_in_order(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

fn order_from_row(row: &SqliteRow) -> Result<OrderRow> {
    let category: String = row.get("category");
    let category = Category::from_db(&category)
        .ok_or_else(|| Error::Internal(format!("Unknown category in orders table: {}", category)))?;

    let scan_date: Option<String> = row.get("scan_date");
    let scan_date = scan_date
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| Error::Internal(format!("Failed to parse scan_date: {}", e)))
        })
        .transpose()?;

    Ok(OrderRow {
        position: row.get("position"),
        identifier: row.get("identifier"),
        customer: row.get("customer"),
        raw_date: row.get("raw_date"),
        weight: row.get("weight"),
        category,
        rush: row.get("rush"),
        scanned: row.get("scanned"),
        scan_date,
    })
}
