//! Catalog domain - products and categories.

pub mod models;

pub use models::{Category, Gender, Product, ProductFilter, ProductSummary};
