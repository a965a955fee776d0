use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::domains::auth::PhonePlan;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub access_token_expire_minutes: i64,
    pub telegram_bot_token: String,
    pub telegram_bot_username: String,
    /// Public URL Telegram should POST updates to. Unset means the
    /// long-polling bot binary is used instead.
    pub telegram_webhook_url: Option<String>,
    /// Shared secret Telegram echoes in `X-Telegram-Bot-Api-Secret-Token`.
    pub telegram_webhook_secret: Option<String>,
    pub admin_telegram_ids: Vec<String>,
    pub phone_plan: PhonePlan,
    pub rate_limit_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let default_plan = PhonePlan::default();

        Ok(Self {
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "Clothing Shop API".to_string()),
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "inbazar".to_string()),
            access_token_expire_minutes: env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
                .unwrap_or_else(|_| "43200".to_string())
                .parse()
                .context("ACCESS_TOKEN_EXPIRE_MINUTES must be a valid number")?,
            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN")
                .context("TELEGRAM_BOT_TOKEN must be set")?,
            telegram_bot_username: env::var("TELEGRAM_BOT_USERNAME")
                .context("TELEGRAM_BOT_USERNAME must be set")?,
            telegram_webhook_url: env::var("TELEGRAM_WEBHOOK_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            telegram_webhook_secret: env::var("TELEGRAM_WEBHOOK_SECRET")
                .ok()
                .filter(|secret| !secret.trim().is_empty()),
            admin_telegram_ids: parse_list(&env::var("ADMIN_TELEGRAM_IDS").unwrap_or_default()),
            phone_plan: PhonePlan {
                country_code: env::var("PHONE_COUNTRY_CODE")
                    .unwrap_or(default_plan.country_code),
                subscriber_len: env::var("PHONE_SUBSCRIBER_LEN")
                    .map(|v| v.parse())
                    .unwrap_or(Ok(default_plan.subscriber_len))
                    .context("PHONE_SUBSCRIBER_LEN must be a valid number")?,
            },
            rate_limit_enabled: env::var("RATE_LIMIT_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse::<bool>()
                .unwrap_or(true),
        })
    }

    pub fn telegram_bot_url(&self) -> String {
        format!("https://t.me/{}", self.telegram_bot_username)
    }
}

/// Split a comma separated env value, dropping blanks.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
