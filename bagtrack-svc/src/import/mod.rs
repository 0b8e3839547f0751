//! Spreadsheet import pipeline
//!
//! Column resolution → row filtering → rush detection → classification →
//! atomic replace of the `orders` table. Steps before the replace never
//! touch the database, so a rejected source leaves the previous table as is.

pub mod classify;
pub mod columns;
pub mod source;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::models::{ImportSummary, OrderRow};
use crate::AppState;
use classify::CandidateRow;
use columns::ColumnMap;
use source::SourceTable;

/// Import failures detected before any mutation
#[derive(Debug, Error)]
pub enum ImportError {
    /// A required column is missing or the batch violates a table invariant
    #[error("Schema error: {0}")]
    Schema(String),

    /// The source could not be read or parsed
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),
}

/// Classified rows ready to replace the table
#[derive(Debug, Clone)]
pub struct ImportBatch {
    pub rows: Vec<OrderRow>,
    pub summary: ImportSummary,
}

/// Resolve columns, filter and classify a parsed source
pub fn build_batch(table: &SourceTable, imported_at: DateTime<Utc>) -> Result<ImportBatch, ImportError> {
    let columns = ColumnMap::resolve(&table.headers)?;

    let mut candidates = Vec::with_capacity(table.rows.len());
    let mut skipped = 0;

    for (index, row) in table.rows.iter().enumerate() {
        // Line 1 is the header row
        let source_line = index + 2;

        let (Some(raw_date), Some(customer)) = (
            SourceTable::cell(row, columns.date),
            SourceTable::cell(row, columns.customer),
        ) else {
            debug!(source_line, "Skipping row without date or customer");
            skipped += 1;
            continue;
        };

        candidates.push(CandidateRow {
            source_line,
            customer: customer.to_string(),
            identifier: columns
                .identifier
                .and_then(|c| SourceTable::cell(row, c))
                .map(str::to_string),
            raw_date: raw_date.to_string(),
            weight: SourceTable::cell(row, columns.weight).map(str::to_string),
        });
    }

    let rows = classify::classify_rows(candidates, imported_at.timestamp_millis())?;
    let summary = ImportSummary::from_rows(&rows, skipped);

    Ok(ImportBatch { rows, summary })
}

/// Run a full import from CSV bytes
///
/// Holds the exclusive table guard only for the replace step; scans that
/// arrive meanwhile wait and then observe the new table.
pub async fn import_orders(state: &AppState, bytes: &[u8]) -> ApiResult<ImportSummary> {
    let table = source::parse_csv(bytes)?;
    let batch = build_batch(&table, Utc::now())?;

    {
        let _guard = state.table_guard.write().await;
        crate::db::orders::replace_all(&state.db, &batch.rows)
            .await
            .map_err(|e| ApiError::Persistence(e.to_string()))?;
    }

    info!(
        total = batch.summary.total,
        rush = batch.summary.rush,
        hang_dry = batch.summary.hang_dry,
        skipped = batch.summary.skipped,
        "Orders imported"
    );

    Ok(batch.summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_batch_end_to_end_example() {
        let csv = "Date,Customer,WF\n7/1 TODAY,Jane Doe,10\n7/1,John Roe,hang dry\n7/2,Ann Poe,4\n";
        let table = source::parse_csv(csv.as_bytes()).unwrap();

        let batch = build_batch(&table, Utc::now()).unwrap();

        let rush: Vec<bool> = batch.rows.iter().map(|r| r.rush).collect();
        assert_eq!(rush, vec![true, true, false]);
        assert_eq!(batch.summary.total, 3);
        assert_eq!(batch.summary.rush, 2);
        assert_eq!(batch.summary.non_rush, 1);
        assert_eq!(batch.summary.hang_dry, 1);
        assert_eq!(batch.summary.wash_and_fold, 2);
    }

    #[test]
    fn test_rows_missing_date_or_customer_are_skipped() {
        let csv = "Date,Customer,WF,QR\n7/1,,10,QR-1\n,Jane Doe,10,QR-2\n7/1,John Roe,,\n";
        let table = source::parse_csv(csv.as_bytes()).unwrap();

        let batch = build_batch(&table, Utc::now()).unwrap();

        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].customer, "John Roe");
        assert!(batch.rows[0].identifier.starts_with("AUTO-"));
        assert_eq!(batch.summary.skipped, 2);
    }

    #[test]
    fn test_summary_sums_hold() {
        let csv = "date,customer,lbs\n7/1 TODAY,A,1\n7/1,B,0\n7/3,C,x\n7/4,D,3\n";
        let table = source::parse_csv(csv.as_bytes()).unwrap();

        let summary = build_batch(&table, Utc::now()).unwrap().summary;

        assert_eq!(summary.total, summary.rush + summary.non_rush);
        assert_eq!(summary.total, summary.hang_dry + summary.wash_and_fold);
    }
}
