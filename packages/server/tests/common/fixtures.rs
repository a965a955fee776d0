//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly to create test data. Names,
//! phones and Telegram ids are randomized so tests sharing the database never
//! collide.

use anyhow::Result;
use rand::Rng;
use rust_decimal::Decimal;
use shop_core::common::CategoryId;
use shop_core::domains::accounts::{Account, NewAccount};
use shop_core::domains::catalog::models::{Category, NewProduct};
use shop_core::domains::catalog::{Gender, Product};
use sqlx::PgPool;

/// A canonical phone number nobody else in the run uses.
pub fn unique_phone() -> String {
    let subscriber: u32 = rand::thread_rng().gen_range(100_000_000..1_000_000_000);
    format!("+998{}", subscriber)
}

pub fn unique_telegram_id() -> String {
    rand::thread_rng()
        .gen_range(1_000_000_000u64..9_000_000_000u64)
        .to_string()
}

pub fn unique_name(prefix: &str) -> String {
    format!("{} {}", prefix, uuid::Uuid::new_v4().simple())
}

pub async fn create_test_category(pool: &PgPool) -> Result<Category> {
    Category::create(&unique_name("Category"), pool).await
}

pub async fn create_test_product(
    pool: &PgPool,
    category_id: CategoryId,
    name: &str,
    gender: Gender,
    tags: &[&str],
) -> Result<Product> {
    Product::create(
        &NewProduct {
            name: name.to_string(),
            description: format!("{} description", name),
            category_id,
            gender,
            price: Decimal::new(19_990, 2),
            sizes: vec!["M".to_string(), "L".to_string()],
            images: vec!["https://cdn.example.com/1.jpg".to_string()],
            colors: vec!["black".to_string()],
            tags: tags.iter().map(|t| t.to_string()).collect(),
        },
        pool,
    )
    .await
}

pub async fn create_test_account(pool: &PgPool) -> Result<Account> {
    Account::create(
        &NewAccount {
            telegram_id: unique_telegram_id(),
            phone_number: unique_phone(),
            full_name: "Test Shopper".to_string(),
            telegram_username: None,
        },
        pool,
    )
    .await
}
