//! Order rows
//!
//! One row per imported spreadsheet line. `category` and `rush` are fixed at
//! import time; `scanned` only ever moves from false to true.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Service category of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Delicates hung to dry (no usable weight on the order)
    HangDry,
    /// Weighed laundry, washed and folded
    WashAndFold,
}

impl Category {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::HangDry => "hang_dry",
            Category::WashAndFold => "wash_and_fold",
        }
    }

    /// Parse the database representation
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "hang_dry" => Some(Category::HangDry),
            "wash_and_fold" => Some(Category::WashAndFold),
            _ => None,
        }
    }
}

/// A classified order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRow {
    /// Index inside the import batch; defines table order
    pub position: i64,
    /// External QR/order code, or a synthesized `AUTO-...` handle
    pub identifier: String,
    pub customer: String,
    /// Date cell as imported, rush marker included
    pub raw_date: String,
    /// Weight/order-type cell as imported
    pub weight: Option<String>,
    pub category: Category,
    pub rush: bool,
    pub scanned: bool,
    pub scan_date: Option<DateTime<Utc>>,
}

/// Lookup key accepted by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanKey {
    /// Customer display name (exact, trimmed)
    Name(String),
    /// QR / order identifier
    Identifier(String),
}

impl ScanKey {
    /// The raw key text, for messages
    pub fn value(&self) -> &str {
        match self {
            ScanKey::Name(name) => name,
            ScanKey::Identifier(id) => id,
        }
    }
}
