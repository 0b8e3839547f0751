//! Tag photo recognition
//!
//! `client` talks to the cloud Read service (submit, then bounded polling);
//! `matcher` turns the returned text lines into a customer name and order
//! type without touching any stored row.

pub mod client;
pub mod matcher;

pub use client::{PollOutcome, RecognitionClient, RecognitionError};
pub use matcher::{detect_order_type, resolve_name, TagReading, UNKNOWN};
