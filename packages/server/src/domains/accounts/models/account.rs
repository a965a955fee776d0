use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{AccountId, ProductId};
use crate::domains::accounts::interactions::{self, InteractionList, CLICK_HISTORY_CAP};

/// Application user, created on the first successful phone verification.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: AccountId,
    pub telegram_id: String,
    pub phone_number: String,
    pub full_name: String,
    pub telegram_username: Option<String>,
    pub liked_products: Vec<ProductId>,
    pub bookmarked_products: Vec<ProductId>,
    /// Most recent first
    pub click_history: Vec<ProductId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub telegram_id: String,
    pub phone_number: String,
    pub full_name: String,
    pub telegram_username: Option<String>,
}

/// Profile fields a user may change themselves.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountUpdate {
    pub full_name: Option<String>,
}

impl Account {
    pub fn from_new(new: NewAccount) -> Self {
        Self {
            id: AccountId::new(),
            telegram_id: new.telegram_id,
            phone_number: new.phone_number,
            full_name: new.full_name,
            telegram_username: new.telegram_username,
            liked_products: Vec::new(),
            bookmarked_products: Vec::new(),
            click_history: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn list(&self, list: InteractionList) -> &[ProductId] {
        match list {
            InteractionList::Likes => &self.liked_products,
            InteractionList::Bookmarks => &self.bookmarked_products,
        }
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Account {
    pub async fn find_by_id(id: AccountId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_telegram_id(telegram_id: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE telegram_id = $1")
            .bind(telegram_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_phone(phone_number: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE phone_number = $1")
            .bind(phone_number)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn create(new: &NewAccount, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO users (id, telegram_id, phone_number, full_name, telegram_username)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(AccountId::new())
        .bind(&new.telegram_id)
        .bind(&new.phone_number)
        .bind(&new.full_name)
        .bind(&new.telegram_username)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Apply the fields present in `update`.
    pub async fn update(
        id: AccountId,
        update: &AccountUpdate,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.full_name)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn count(pool: &PgPool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    /// Add a product to the likes or bookmarks list. Returns whether it was new.
    pub async fn add_to_list(
        id: AccountId,
        list: InteractionList,
        product_id: ProductId,
        pool: &PgPool,
    ) -> Result<bool> {
        Self::modify_list(id, list.column(), pool, |ids| {
            interactions::add_unique(ids, product_id)
        })
        .await
    }

    /// Remove a product from the likes or bookmarks list. Returns whether it was present.
    pub async fn remove_from_list(
        id: AccountId,
        list: InteractionList,
        product_id: ProductId,
        pool: &PgPool,
    ) -> Result<bool> {
        Self::modify_list(id, list.column(), pool, |ids| {
            interactions::remove_item(ids, &product_id)
        })
        .await
    }

    pub async fn record_click(id: AccountId, product_id: ProductId, pool: &PgPool) -> Result<()> {
        Self::modify_list(id, "click_history", pool, |ids| {
            interactions::record_click(ids, product_id, CLICK_HISTORY_CAP);
            true
        })
        .await
        .map(|_| ())
    }

    /// Read-modify-write of one id array under a row lock, so concurrent
    /// requests from the same user cannot lose each other's changes.
    async fn modify_list<F>(
        id: AccountId,
        column: &'static str,
        pool: &PgPool,
        apply: F,
    ) -> Result<bool>
    where
        F: FnOnce(&mut Vec<ProductId>) -> bool,
    {
        let mut tx = pool.begin().await?;

        let mut ids = sqlx::query_scalar::<_, Vec<ProductId>>(&format!(
            "SELECT {column} FROM users WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let changed = apply(&mut ids);
        if changed {
            sqlx::query(&format!(
                "UPDATE users SET {column} = $2, updated_at = NOW() WHERE id = $1"
            ))
            .bind(id)
            .bind(&ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(changed)
    }
}
