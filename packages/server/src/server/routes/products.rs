use axum::{
    extract::{Extension, Path, Query},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::common::{CategoryId, ProductId};
use crate::domains::accounts::activities::{add_interaction, record_click, remove_interaction};
use crate::domains::accounts::InteractionList;
use crate::domains::catalog::models::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::domains::catalog::{Gender, Product, ProductFilter, ProductSummary};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;
use crate::server::routes::users::current_account;
use crate::server::routes::MessageResponse;

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub gender: Option<Gender>,
    pub category_id: Option<CategoryId>,
    pub search: Option<String>,
}

impl ProductQuery {
    /// Validate paging and build the public (active only) filter.
    pub fn into_filter(self) -> Result<ProductFilter, ApiError> {
        let skip = self.skip.unwrap_or(0);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);

        if skip < 0 {
            return Err(ApiError::bad_request("skip must be zero or greater"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(ApiError::bad_request(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        Ok(ProductFilter {
            skip,
            limit,
            gender: self.gender,
            category_id: self.category_id,
            search: self.search,
            include_inactive: false,
        })
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/:product_id", get(get_product))
        .route("/:product_id/click", post(track_click))
        .route("/:product_id/like", post(like_product).delete(unlike_product))
        .route("/:product_id/bookmark", post(bookmark_product).delete(remove_bookmark))
}

async fn require_product(product_id: ProductId, state: &AppState) -> Result<Product, ApiError> {
    Product::find_by_id(product_id, &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))
}

pub async fn list_products(
    Extension(state): Extension<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<ProductSummary>>, ApiError> {
    let filter = query.into_filter()?;
    let products = Product::list(&filter, &state.db_pool).await?;
    Ok(Json(products.into_iter().map(ProductSummary::from).collect()))
}

pub async fn get_product(
    Extension(state): Extension<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Product>, ApiError> {
    let product = require_product(product_id, &state).await?;
    if !product.is_active {
        return Err(ApiError::not_found("Product not available"));
    }
    Ok(Json(product))
}

pub async fn track_click(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<MessageResponse>, ApiError> {
    let account = current_account(&state, &user).await?;
    require_product(product_id, &state).await?;

    record_click(account.id, product_id, &state.db_pool).await?;
    Ok(MessageResponse::json("Click tracked successfully"))
}

async fn toggle(
    state: &AppState,
    user: &AuthUser,
    product_id: ProductId,
    list: InteractionList,
    add: bool,
) -> Result<bool, ApiError> {
    let account = current_account(state, user).await?;
    require_product(product_id, state).await?;

    let changed = if add {
        add_interaction(account.id, list, product_id, &state.db_pool).await?
    } else {
        remove_interaction(account.id, list, product_id, &state.db_pool).await?
    };
    Ok(changed)
}

pub async fn like_product(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<MessageResponse>, ApiError> {
    let added = toggle(&state, &user, product_id, InteractionList::Likes, true).await?;
    Ok(MessageResponse::json(if added {
        "Product liked successfully"
    } else {
        "Product already liked"
    }))
}

pub async fn unlike_product(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = toggle(&state, &user, product_id, InteractionList::Likes, false).await?;
    Ok(MessageResponse::json(if removed {
        "Product unliked successfully"
    } else {
        "Product was not liked"
    }))
}

pub async fn bookmark_product(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<MessageResponse>, ApiError> {
    let added = toggle(&state, &user, product_id, InteractionList::Bookmarks, true).await?;
    Ok(MessageResponse::json(if added {
        "Product bookmarked successfully"
    } else {
        "Product already bookmarked"
    }))
}

pub async fn remove_bookmark(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = toggle(&state, &user, product_id, InteractionList::Bookmarks, false).await?;
    Ok(MessageResponse::json(if removed {
        "Bookmark removed successfully"
    } else {
        "Product was not bookmarked"
    }))
}
