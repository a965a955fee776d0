use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{CategoryId, ProductId};

/// Default page size for product listings.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page a public listing may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page size of the admin listing, which shows inactive products too.
pub const ADMIN_PAGE_SIZE: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "product_gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unisex,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub gender: Gender,
    pub price: Decimal,
    pub sizes: Vec<String>,
    pub images: Vec<String>,
    pub colors: Vec<String>,
    pub tags: Vec<String>,
    pub click_count: i32,
    pub like_count: i32,
    pub bookmark_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Compact view used by listings and the per-user product lists.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub images: Vec<String>,
    pub gender: Gender,
}

impl From<Product> for ProductSummary {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            images: product.images,
            gender: product.gender,
        }
    }
}

/// Listing filters. A gender filter also matches unisex products.
#[derive(Debug, Clone)]
pub struct ProductFilter {
    pub skip: i64,
    pub limit: i64,
    pub gender: Option<Gender>,
    pub category_id: Option<CategoryId>,
    pub search: Option<String>,
    pub include_inactive: bool,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_SIZE,
            gender: None,
            category_id: None,
            search: None,
            include_inactive: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub gender: Gender,
    pub price: Decimal,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update; only fields present in the request are written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub gender: Option<Gender>,
    pub price: Option<Decimal>,
    pub sizes: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Popularity counters kept on the product row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Clicks,
    Likes,
    Bookmarks,
}

impl Counter {
    fn column(self) -> &'static str {
        match self {
            Counter::Clicks => "click_count",
            Counter::Likes => "like_count",
            Counter::Bookmarks => "bookmark_count",
        }
    }
}

/// `%term%` for ILIKE, with the pattern metacharacters escaped.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Reorder `products` to follow `ids`, dropping ids with no product.
pub fn order_by_ids(mut products: Vec<Product>, ids: &[ProductId]) -> Vec<Product> {
    let mut ordered = Vec::with_capacity(products.len());
    for id in ids {
        if let Some(pos) = products.iter().position(|p| p.id == *id) {
            ordered.push(products.swap_remove(pos));
        }
    }
    ordered
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Product {
    pub async fn find_by_id(id: ProductId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Active product by id; inactive ones are hidden from shoppers.
    pub async fn find_active_by_id(id: ProductId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM products WHERE id = $1 AND is_active = TRUE")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Active products among `ids`, in `ids` order.
    pub async fn find_active_by_ids(ids: &[ProductId], pool: &PgPool) -> Result<Vec<Self>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let products = sqlx::query_as::<_, Self>(
            "SELECT * FROM products WHERE id = ANY($1) AND is_active = TRUE",
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(order_by_ids(products, ids))
    }

    pub async fn list(filter: &ProductFilter, pool: &PgPool) -> Result<Vec<Self>> {
        let pattern = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM products
            WHERE ($1 OR is_active = TRUE)
              AND ($2::product_gender IS NULL OR gender = $2 OR gender = 'unisex')
              AND ($3::uuid IS NULL OR category_id = $3)
              AND ($4::text IS NULL
                   OR name ILIKE $4
                   OR description ILIKE $4
                   OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE $4))
            ORDER BY created_at DESC
            OFFSET $5
            LIMIT $6
            "#,
        )
        .bind(filter.include_inactive)
        .bind(filter.gender)
        .bind(filter.category_id)
        .bind(pattern)
        .bind(filter.skip)
        .bind(filter.limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn create(new: &NewProduct, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO products (
                id, name, description, category_id, gender, price,
                sizes, images, colors, tags
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(ProductId::new())
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.category_id)
        .bind(new.gender)
        .bind(new.price)
        .bind(&new.sizes)
        .bind(&new.images)
        .bind(&new.colors)
        .bind(&new.tags)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn update(
        id: ProductId,
        update: &ProductUpdate,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                category_id = COALESCE($4, category_id),
                gender = COALESCE($5, gender),
                price = COALESCE($6, price),
                sizes = COALESCE($7, sizes),
                images = COALESCE($8, images),
                colors = COALESCE($9, colors),
                tags = COALESCE($10, tags),
                is_active = COALESCE($11, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.category_id)
        .bind(update.gender)
        .bind(update.price)
        .bind(&update.sizes)
        .bind(&update.images)
        .bind(&update.colors)
        .bind(&update.tags)
        .bind(update.is_active)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Returns whether a row was deleted.
    pub async fn delete(id: ProductId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_in_category(category_id: CategoryId, pool: &PgPool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn increment(id: ProductId, counter: Counter, pool: &PgPool) -> Result<()> {
        let column = counter.column();
        sqlx::query(&format!(
            "UPDATE products SET {column} = {column} + 1 WHERE id = $1"
        ))
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Decrement, stopping at zero.
    pub async fn decrement(id: ProductId, counter: Counter, pool: &PgPool) -> Result<()> {
        let column = counter.column();
        sqlx::query(&format!(
            "UPDATE products SET {column} = GREATEST({column} - 1, 0) WHERE id = $1"
        ))
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: ProductId) -> Product {
        Product {
            id,
            name: "Shirt".to_string(),
            description: "Cotton".to_string(),
            category_id: CategoryId::new(),
            gender: Gender::Unisex,
            price: Decimal::new(19999, 2),
            sizes: vec![],
            images: vec![],
            colors: vec![],
            tags: vec![],
            click_count: 0,
            like_count: 0,
            bookmark_count: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("shirt"), "%shirt%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_order_by_ids_follows_requested_order() {
        let (a, b, c) = (ProductId::new(), ProductId::new(), ProductId::new());
        let products = vec![product(a), product(b), product(c)];

        let ordered = order_by_ids(products, &[c, ProductId::new(), a]);
        let ids: Vec<_> = ordered.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![c, a]);
    }

    #[test]
    fn test_gender_wire_format() {
        assert_eq!(serde_json::to_string(&Gender::Unisex).unwrap(), "\"unisex\"");
        let parsed: Gender = serde_json::from_str("\"female\"").unwrap();
        assert_eq!(parsed, Gender::Female);
    }

    #[test]
    fn test_summary_from_product() {
        let id = ProductId::new();
        let summary = ProductSummary::from(product(id));
        assert_eq!(summary.id, id);
        assert_eq!(summary.price, Decimal::new(19999, 2));
    }

    #[test]
    fn test_partial_update_deserializes_missing_fields_as_none() {
        let update: ProductUpdate = serde_json::from_str(r#"{"price": "25.50"}"#).unwrap();
        assert_eq!(update.price, Some(Decimal::new(2550, 2)));
        assert!(update.name.is_none());
        assert!(update.is_active.is_none());
    }
}
