//! Database access for the bag tracking service
//!
//! Schema creation lives in `bagtrack_common::db`; this module holds the
//! queries over the `orders` table.

pub mod orders;
