use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use telegram::models::Update;
use tracing::warn;

use crate::domains::bot::handle_update;
use crate::server::app::AppState;
use crate::server::error::ApiError;

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Telegram webhook. The bot reply rides back on the HTTP response as an
/// inline `sendMessage` call; updates needing no reply get `{"ok": true}`.
pub async fn telegram_webhook(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Json(update): Json<Update>,
) -> Result<Response, ApiError> {
    if let Some(secret) = &state.webhook_secret {
        let presented = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if presented != Some(secret.as_str()) {
            warn!(update_id = update.update_id, "Webhook call with bad secret token");
            return Err(ApiError::Unauthorized);
        }
    }

    Ok(match handle_update(&update, &state.deps).await {
        Some(reply) => Json(reply.into_webhook_reply()).into_response(),
        None => Json(serde_json::json!({ "ok": true })).into_response(),
    })
}
