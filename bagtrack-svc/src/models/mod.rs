//! Data models for the bag tracking service
//!
//! - Order rows and their derived classification
//! - Import summary and status report shapes

pub mod order;
pub mod report;

pub use order::{Category, OrderRow, ScanKey};
pub use report::{ImportSummary, StatusReport};
