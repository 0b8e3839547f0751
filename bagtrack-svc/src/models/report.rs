//! Aggregate views returned by import and status

use serde::Serialize;

use super::{Category, OrderRow};

/// Counts produced by an import
///
/// `total == rush + non_rush == hang_dry + wash_and_fold` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub total: usize,
    pub rush: usize,
    pub non_rush: usize,
    pub hang_dry: usize,
    pub wash_and_fold: usize,
    /// Source rows dropped for a missing date or customer
    pub skipped: usize,
}

impl ImportSummary {
    pub fn from_rows(rows: &[OrderRow], skipped: usize) -> Self {
        let rush = rows.iter().filter(|r| r.rush).count();
        let hang_dry = rows
            .iter()
            .filter(|r| r.category == Category::HangDry)
            .count();

        Self {
            total: rows.len(),
            rush,
            non_rush: rows.len() - rush,
            hang_dry,
            wash_and_fold: rows.len() - hang_dry,
            skipped,
        }
    }
}

/// Scan progress over the current table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub total: i64,
    pub scanned: i64,
    pub remaining: i64,
    /// Unscanned customer names, de-duplicated, in table order
    pub remaining_list: Vec<String>,
}
