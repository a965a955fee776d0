use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::ContactId;

/// A Telegram user who shared their contact with the bot.
///
/// Holds the phone number the bot vouched for; account provisioning reads
/// names and username from here.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlatformContact {
    pub id: ContactId,
    pub telegram_id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields written by an upsert. `None` keeps whatever is stored.
#[derive(Debug, Clone, Default)]
pub struct ContactUpsert {
    pub telegram_id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

impl PlatformContact {
    /// "First Last", falling back to the username.
    pub fn display_name(&self) -> Option<String> {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if name.is_empty() {
            self.username.clone().filter(|u| !u.trim().is_empty())
        } else {
            Some(name)
        }
    }

    /// Apply an upsert in memory with the same merge rules as the SQL.
    pub fn merged_with(mut self, update: &ContactUpsert) -> Self {
        if update.username.is_some() {
            self.username = update.username.clone();
        }
        if update.first_name.is_some() {
            self.first_name = update.first_name.clone();
        }
        if update.last_name.is_some() {
            self.last_name = update.last_name.clone();
        }
        if update.phone_number.is_some() {
            self.phone_number = update.phone_number.clone();
        }
        self.updated_at = Some(Utc::now());
        self
    }

    pub fn from_upsert(upsert: &ContactUpsert) -> Self {
        Self {
            id: ContactId::new(),
            telegram_id: upsert.telegram_id.clone(),
            username: upsert.username.clone(),
            first_name: upsert.first_name.clone(),
            last_name: upsert.last_name.clone(),
            phone_number: upsert.phone_number.clone(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl PlatformContact {
    pub async fn find_by_telegram_id(telegram_id: &str, pool: &PgPool) -> Result<Option<Self>> {
        let contact =
            sqlx::query_as::<_, PlatformContact>("SELECT * FROM bot_users WHERE telegram_id = $1")
                .bind(telegram_id)
                .fetch_optional(pool)
                .await?;
        Ok(contact)
    }

    /// Most recently updated contact holding this number.
    pub async fn find_by_phone(phone_number: &str, pool: &PgPool) -> Result<Option<Self>> {
        let contact = sqlx::query_as::<_, PlatformContact>(
            r#"
            SELECT * FROM bot_users
            WHERE phone_number = $1
            ORDER BY COALESCE(updated_at, created_at) DESC
            LIMIT 1
            "#,
        )
        .bind(phone_number)
        .fetch_optional(pool)
        .await?;
        Ok(contact)
    }

    /// Insert or update by Telegram id in one statement.
    pub async fn upsert(upsert: &ContactUpsert, pool: &PgPool) -> Result<Self> {
        let contact = sqlx::query_as::<_, PlatformContact>(
            r#"
            INSERT INTO bot_users (id, telegram_id, username, first_name, last_name, phone_number)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (telegram_id) DO UPDATE SET
                username = COALESCE(EXCLUDED.username, bot_users.username),
                first_name = COALESCE(EXCLUDED.first_name, bot_users.first_name),
                last_name = COALESCE(EXCLUDED.last_name, bot_users.last_name),
                phone_number = COALESCE(EXCLUDED.phone_number, bot_users.phone_number),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(ContactId::new())
        .bind(&upsert.telegram_id)
        .bind(&upsert.username)
        .bind(&upsert.first_name)
        .bind(&upsert.last_name)
        .bind(&upsert.phone_number)
        .fetch_one(pool)
        .await?;
        Ok(contact)
    }
}
