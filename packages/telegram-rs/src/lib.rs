// https://core.telegram.org/bots/api

pub mod models;

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;

use crate::models::{ApiResponse, Message, SendMessage, Update};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("request to Telegram failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram returned an error ({code:?}): {description}")]
    Api {
        code: Option<i32>,
        description: String,
    },
}

#[derive(Debug, Clone)]
pub struct TelegramOptions {
    pub bot_token: String,
    pub api_base: String,
}

impl TelegramOptions {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelegramService {
    options: TelegramOptions,
    client: Client,
}

impl TelegramService {
    pub fn new(options: TelegramOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{base}/bot{token}/{method}",
            base = self.options.api_base.trim_end_matches('/'),
            token = self.options.bot_token,
        )
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?
            .json::<ApiResponse<T>>()
            .await?;

        match response {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                error_code,
                description,
                ..
            } => Err(TelegramError::Api {
                code: error_code,
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }

    pub async fn send_message(&self, message: &SendMessage) -> Result<Message, TelegramError> {
        self.call("sendMessage", message).await
    }

    /// Long-poll for updates newer than `offset`.
    ///
    /// Fails with a conflict error while a webhook is registered.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u32,
    ) -> Result<Vec<Update>, TelegramError> {
        let body = json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        self.call("getUpdates", &body).await
    }

    /// Register `url` for update delivery. Telegram echoes `secret_token` in
    /// the `X-Telegram-Bot-Api-Secret-Token` header of every request.
    pub async fn set_webhook(
        &self,
        url: &str,
        secret_token: Option<&str>,
    ) -> Result<bool, TelegramError> {
        let mut body = json!({ "url": url, "allowed_updates": ["message"] });
        if let Some(secret) = secret_token {
            body["secret_token"] = json!(secret);
        }
        self.call("setWebhook", &body).await
    }

    pub async fn delete_webhook(&self) -> Result<bool, TelegramError> {
        self.call("deleteWebhook", &json!({})).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url_trims_trailing_slash() {
        let service = TelegramService::new(TelegramOptions {
            bot_token: "123:abc".to_string(),
            api_base: "http://localhost:8081/".to_string(),
        });
        assert_eq!(
            service.method_url("getUpdates"),
            "http://localhost:8081/bot123:abc/getUpdates"
        );
    }

    #[test]
    fn test_error_envelope_deserializes() {
        let raw = r#"{"ok": false, "error_code": 409, "description": "Conflict: webhook is active"}"#;
        let response: ApiResponse<Vec<Update>> = serde_json::from_str(raw).unwrap();
        assert!(!response.ok);
        assert!(response.result.is_none());
        assert_eq!(response.error_code, Some(409));
    }
}
