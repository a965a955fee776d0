use anyhow::Result;
use serde::Serialize;
use sqlx::PgPool;

/// Store-wide totals for the admin dashboard.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Analytics {
    pub total_users: i64,
    pub total_products: i64,
    pub active_products: i64,
    pub total_categories: i64,
    pub total_clicks: i64,
    pub total_likes: i64,
    pub total_bookmarks: i64,
}

impl Analytics {
    pub async fn collect(pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM products) AS total_products,
                (SELECT COUNT(*) FROM products WHERE is_active = TRUE) AS active_products,
                (SELECT COUNT(*) FROM categories) AS total_categories,
                (SELECT COALESCE(SUM(click_count), 0)::BIGINT FROM products) AS total_clicks,
                (SELECT COALESCE(SUM(like_count), 0)::BIGINT FROM products) AS total_likes,
                (SELECT COALESCE(SUM(bookmark_count), 0)::BIGINT FROM products) AS total_bookmarks
            "#,
        )
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
