use axum::{extract::Extension, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::{AccountId, ProductId};
use crate::domains::accounts::{Account, AccountUpdate, RECENT_CLICKS_SHOWN};
use crate::domains::catalog::{Product, ProductSummary};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;

#[derive(Debug, Serialize)]
pub struct AccountProfile {
    pub id: AccountId,
    pub telegram_id: String,
    pub phone_number: String,
    pub full_name: String,
    pub telegram_username: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountProfile {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            telegram_id: account.telegram_id,
            phone_number: account.phone_number,
            full_name: account.full_name,
            telegram_username: account.telegram_username,
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InteractionsResponse {
    pub liked_products: Vec<ProductId>,
    pub bookmarked_products: Vec<ProductId>,
    pub click_history: Vec<ProductId>,
}

pub fn router() -> Router {
    Router::new()
        .route("/me", get(get_profile).put(update_profile))
        .route("/me/interactions", get(get_interactions))
        .route("/me/likes", get(get_liked_products))
        .route("/me/bookmarks", get(get_bookmarked_products))
        .route("/me/recent-clicks", get(get_recent_clicks))
}

/// The account behind a valid token. A token whose account has since
/// disappeared is treated like a bad token.
pub(crate) async fn current_account(
    state: &AppState,
    user: &AuthUser,
) -> Result<Account, ApiError> {
    state
        .deps
        .accounts
        .find_by_identity(&user.telegram_id)
        .await?
        .ok_or(ApiError::Unauthorized)
}

async fn summaries(
    ids: &[ProductId],
    state: &AppState,
) -> Result<Json<Vec<ProductSummary>>, ApiError> {
    let products = Product::find_active_by_ids(ids, &state.db_pool).await?;
    Ok(Json(products.into_iter().map(ProductSummary::from).collect()))
}

pub async fn get_profile(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> Result<Json<AccountProfile>, ApiError> {
    Ok(Json(current_account(&state, &user).await?.into()))
}

pub async fn update_profile(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(update): Json<AccountUpdate>,
) -> Result<Json<AccountProfile>, ApiError> {
    let account = current_account(&state, &user).await?;

    let update = AccountUpdate {
        full_name: match update.full_name.map(|name| name.trim().to_string()) {
            Some(name) if name.is_empty() => {
                return Err(ApiError::bad_request("Full name cannot be empty"))
            }
            other => other,
        },
    };

    let updated = Account::update(account.id, &update, &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::bad_request("Could not update profile"))?;

    Ok(Json(updated.into()))
}

pub async fn get_interactions(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> Result<Json<InteractionsResponse>, ApiError> {
    let account = current_account(&state, &user).await?;
    Ok(Json(InteractionsResponse {
        liked_products: account.liked_products,
        bookmarked_products: account.bookmarked_products,
        click_history: account.click_history,
    }))
}

pub async fn get_liked_products(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ProductSummary>>, ApiError> {
    let account = current_account(&state, &user).await?;
    summaries(&account.liked_products, &state).await
}

pub async fn get_bookmarked_products(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ProductSummary>>, ApiError> {
    let account = current_account(&state, &user).await?;
    summaries(&account.bookmarked_products, &state).await
}

pub async fn get_recent_clicks(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ProductSummary>>, ApiError> {
    let account = current_account(&state, &user).await?;
    let recent = &account.click_history[..account.click_history.len().min(RECENT_CLICKS_SHOWN)];
    summaries(recent, &state).await
}
