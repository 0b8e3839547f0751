//! # Bagtrack Common Library
//!
//! Shared code for the bag tracking service:
//! - Error and result types
//! - Configuration loading (CLI / environment / TOML / defaults)
//! - Database initialization for the `orders` table

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
