//! Admin domain - dashboard queries.
//!
//! Product and category management reuses the catalog models directly.

pub mod models;

pub use models::Analytics;
