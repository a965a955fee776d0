use axum::{extract::Extension, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domains::auth::activities::authenticate;
use crate::domains::auth::mask_phone;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::ClientIp;

#[derive(Debug, Deserialize)]
pub struct RequestCodeRequest {
    pub phone_number: String,
}

#[derive(Debug, Serialize)]
pub struct RequestCodeResponse {
    pub message: String,
    pub telegram_url: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub phone_number: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires
    pub expires_in: i64,
}

pub fn router() -> Router {
    Router::new()
        .route("/request-code", post(request_code))
        .route("/verify-code", post(verify_code))
}

/// Point the client at the bot. Codes are only issued from inside Telegram,
/// where the contact card proves the number belongs to the sender.
pub async fn request_code(
    Extension(state): Extension<AppState>,
    client_ip: Option<Extension<ClientIp>>,
    Json(request): Json<RequestCodeRequest>,
) -> Json<RequestCodeResponse> {
    info!(
        phone_number = %mask_phone(&request.phone_number),
        client_ip = ?client_ip.map(|Extension(ClientIp(ip))| ip),
        "Verification code requested"
    );

    Json(RequestCodeResponse {
        message: "Open the Telegram bot and share your contact to receive a verification code"
            .to_string(),
        telegram_url: state.deps.telegram_bot_url.clone(),
    })
}

pub async fn verify_code(
    Extension(state): Extension<AppState>,
    Json(request): Json<VerifyCodeRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let session = authenticate(&request.phone_number, &request.code, &state.deps).await?;

    Ok(Json(TokenResponse {
        access_token: session.access_token,
        token_type: "bearer",
        expires_in: state.deps.jwt_service.ttl().num_seconds(),
    }))
}
