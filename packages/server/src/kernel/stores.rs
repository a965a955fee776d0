//! PostgreSQL implementations of the storage traits.
//!
//! Thin adapters: every query lives on the model types.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::debug;

use crate::domains::accounts::models::{Account, NewAccount};
use crate::domains::auth::mask_phone;
use crate::domains::auth::models::{ContactUpsert, OneTimeCode, PlatformContact};
use crate::domains::auth::CodeCheck;
use crate::kernel::{BaseAccountStore, BaseContactRegistry, BaseOtpLedger};

pub struct PostgresContactRegistry {
    pool: PgPool,
}

impl PostgresContactRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseContactRegistry for PostgresContactRegistry {
    async fn upsert(&self, contact: ContactUpsert) -> Result<PlatformContact> {
        PlatformContact::upsert(&contact, &self.pool).await
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<PlatformContact>> {
        PlatformContact::find_by_phone(phone_number, &self.pool).await
    }

    async fn find_by_identity(&self, telegram_id: &str) -> Result<Option<PlatformContact>> {
        PlatformContact::find_by_telegram_id(telegram_id, &self.pool).await
    }
}

pub struct PostgresOtpLedger {
    pool: PgPool,
}

impl PostgresOtpLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseOtpLedger for PostgresOtpLedger {
    async fn issue(&self, phone_number: &str, code: &str, ttl: Duration) -> Result<OneTimeCode> {
        let record = OneTimeCode::issue(phone_number, code, Utc::now() + ttl, &self.pool).await?;
        debug!(
            phone_number = %mask_phone(phone_number),
            expires_at = %record.expires_at,
            "Stored verification code"
        );
        Ok(record)
    }

    async fn verify_and_consume(&self, phone_number: &str, code: &str) -> Result<CodeCheck> {
        let consumed = OneTimeCode::consume(phone_number, code, &self.pool).await?;
        Ok(CodeCheck::from_consumed(
            consumed.map(|record| record.expires_at),
            Utc::now(),
        ))
    }

    async fn find_active(&self, phone_number: &str) -> Result<Option<OneTimeCode>> {
        OneTimeCode::find_active(phone_number, &self.pool).await
    }
}

pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseAccountStore for PostgresAccountStore {
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Account>> {
        Account::find_by_phone(phone_number, &self.pool).await
    }

    async fn find_by_identity(&self, telegram_id: &str) -> Result<Option<Account>> {
        Account::find_by_telegram_id(telegram_id, &self.pool).await
    }

    async fn create(&self, account: NewAccount) -> Result<Account> {
        Account::create(&account, &self.pool).await
    }
}
