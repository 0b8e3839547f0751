//! HTTP API handlers

pub mod health;
pub mod import;
pub mod ocr;
pub mod scan;
pub mod status;

pub use health::health_routes;
pub use import::import_routes;
pub use ocr::ocr_routes;
pub use scan::scan_routes;
pub use status::status_routes;
