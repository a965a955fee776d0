// HTTP routes
pub mod admin;
pub mod auth;
pub mod categories;
pub mod health;
pub mod products;
pub mod users;
pub mod webhook;

pub use health::*;
pub use webhook::telegram_webhook;

use axum::Json;
use serde::Serialize;

/// Plain `{"message": ...}` acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn json(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}
