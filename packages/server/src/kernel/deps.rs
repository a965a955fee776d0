//! Server dependencies (using traits for testability)
//!
//! This module provides the central dependency container used by the auth
//! activities, the HTTP handlers and the bot. External services and the auth
//! tables sit behind trait objects so tests can swap them for mocks.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use telegram::models::{SendMessage, Update};
use telegram::TelegramService;

use crate::domains::auth::{JwtService, PhonePlan};
use crate::kernel::stores::{PostgresAccountStore, PostgresContactRegistry, PostgresOtpLedger};
use crate::kernel::{BaseAccountStore, BaseChatService, BaseContactRegistry, BaseOtpLedger};

// =============================================================================
// TelegramService Adapter (implements BaseChatService trait)
// =============================================================================

/// Wrapper around TelegramService that implements BaseChatService trait
pub struct TelegramAdapter(pub Arc<TelegramService>);

impl TelegramAdapter {
    pub fn new(service: Arc<TelegramService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseChatService for TelegramAdapter {
    async fn send_message(&self, message: &SendMessage) -> Result<()> {
        self.0
            .send_message(message)
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    async fn get_updates(&self, offset: Option<i64>, timeout_secs: u32) -> Result<Vec<Update>> {
        self.0
            .get_updates(offset, timeout_secs)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

#[derive(Clone)]
pub struct ServerDeps {
    /// Catalog and interaction queries go straight to the pool
    pub db_pool: PgPool,
    pub contacts: Arc<dyn BaseContactRegistry>,
    pub otp_ledger: Arc<dyn BaseOtpLedger>,
    pub accounts: Arc<dyn BaseAccountStore>,
    pub jwt_service: Arc<JwtService>,
    pub phone_plan: PhonePlan,
    /// Telegram ids granted admin rights
    pub admin_telegram_ids: Vec<String>,
    /// Deep link handed to web clients asking for a code
    pub telegram_bot_url: String,
    pub app_name: String,
}

impl ServerDeps {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db_pool: PgPool,
        contacts: Arc<dyn BaseContactRegistry>,
        otp_ledger: Arc<dyn BaseOtpLedger>,
        accounts: Arc<dyn BaseAccountStore>,
        jwt_service: Arc<JwtService>,
        phone_plan: PhonePlan,
        admin_telegram_ids: Vec<String>,
        telegram_bot_url: String,
        app_name: String,
    ) -> Self {
        Self {
            db_pool,
            contacts,
            otp_ledger,
            accounts,
            jwt_service,
            phone_plan,
            admin_telegram_ids,
            telegram_bot_url,
            app_name,
        }
    }

    /// Production wiring: every store backed by the same Postgres pool.
    pub fn from_config(db_pool: PgPool, config: &crate::Config) -> Self {
        let jwt_service = JwtService::new(
            &config.jwt_secret,
            config.jwt_issuer.clone(),
            chrono::Duration::minutes(config.access_token_expire_minutes),
        );

        Self::new(
            db_pool.clone(),
            Arc::new(PostgresContactRegistry::new(db_pool.clone())),
            Arc::new(PostgresOtpLedger::new(db_pool.clone())),
            Arc::new(PostgresAccountStore::new(db_pool)),
            Arc::new(jwt_service),
            config.phone_plan.clone(),
            config.admin_telegram_ids.clone(),
            config.telegram_bot_url(),
            config.app_name.clone(),
        )
    }

    pub fn is_admin(&self, telegram_id: &str) -> bool {
        self.admin_telegram_ids.iter().any(|id| id == telegram_id)
    }
}
