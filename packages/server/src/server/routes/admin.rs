//! Admin endpoints - product and category management plus dashboard totals.
//!
//! Every handler takes `AdminUser`, so a missing token is 401 and a
//! non-admin token is 403 before any query runs.

use std::collections::HashMap;

use axum::{
    extract::{Extension, Path},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tracing::info;

use crate::common::{CategoryId, ProductId};
use crate::domains::admin::Analytics;
use crate::domains::catalog::models::{
    Category, CategoryInput, CategoryUpdate, NewProduct, Product, ProductFilter, ProductUpdate,
    ADMIN_PAGE_SIZE,
};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::AdminUser;
use crate::server::routes::MessageResponse;

/// Admin list row: the full product plus its category's name.
#[derive(Debug, Serialize)]
pub struct AdminProduct {
    #[serde(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
}

pub fn router() -> Router {
    Router::new()
        .route("/products", post(create_product).get(list_products))
        .route(
            "/products/:product_id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/categories", post(create_category))
        .route(
            "/categories/:category_id",
            put(update_category).delete(delete_category),
        )
        .route("/analytics", get(analytics))
}

async fn require_category(category_id: CategoryId, state: &AppState) -> Result<(), ApiError> {
    Category::find_by_id(category_id, &state.db_pool)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::bad_request("Category not found"))
}

fn non_blank(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Category name cannot be empty"));
    }
    Ok(name.to_string())
}

// =============================================================================
// Products
// =============================================================================

pub async fn create_product(
    Extension(state): Extension<AppState>,
    AdminUser(admin): AdminUser,
    Json(new): Json<NewProduct>,
) -> Result<Json<Product>, ApiError> {
    require_category(new.category_id, &state).await?;

    let product = Product::create(&new, &state.db_pool).await?;
    info!(product_id = %product.id, admin = %admin.telegram_id, "Product created");
    Ok(Json(product))
}

pub async fn list_products(
    Extension(state): Extension<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<AdminProduct>>, ApiError> {
    let filter = ProductFilter {
        skip: 0,
        limit: ADMIN_PAGE_SIZE,
        include_inactive: true,
        ..Default::default()
    };
    let products = Product::list(&filter, &state.db_pool).await?;

    let names: HashMap<CategoryId, String> = Category::list(&state.db_pool)
        .await?
        .into_iter()
        .map(|category| (category.id, category.name))
        .collect();

    Ok(Json(
        products
            .into_iter()
            .map(|product| AdminProduct {
                category_name: names.get(&product.category_id).cloned(),
                product,
            })
            .collect(),
    ))
}

pub async fn get_product(
    Extension(state): Extension<AppState>,
    _admin: AdminUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Product>, ApiError> {
    Product::find_by_id(product_id, &state.db_pool)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product not found"))
}

pub async fn update_product(
    Extension(state): Extension<AppState>,
    _admin: AdminUser,
    Path(product_id): Path<ProductId>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>, ApiError> {
    if let Some(category_id) = update.category_id {
        require_category(category_id, &state).await?;
    }

    Product::update(product_id, &update, &state.db_pool)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product not found"))
}

pub async fn delete_product(
    Extension(state): Extension<AppState>,
    AdminUser(admin): AdminUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !Product::delete(product_id, &state.db_pool).await? {
        return Err(ApiError::not_found("Product not found"));
    }
    info!(product_id = %product_id, admin = %admin.telegram_id, "Product deleted");
    Ok(MessageResponse::json("Product deleted successfully"))
}

// =============================================================================
// Categories
// =============================================================================

pub async fn create_category(
    Extension(state): Extension<AppState>,
    _admin: AdminUser,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>, ApiError> {
    let name = non_blank(&input.name)?;
    if Category::find_by_name(&name, &state.db_pool).await?.is_some() {
        return Err(ApiError::bad_request("Category already exists"));
    }

    Ok(Json(Category::create(&name, &state.db_pool).await?))
}

pub async fn update_category(
    Extension(state): Extension<AppState>,
    _admin: AdminUser,
    Path(category_id): Path<CategoryId>,
    Json(update): Json<CategoryUpdate>,
) -> Result<Json<Category>, ApiError> {
    let name = update.name.as_deref().map(non_blank).transpose()?;

    if let Some(name) = &name {
        if let Some(existing) = Category::find_by_name(name, &state.db_pool).await? {
            if existing.id != category_id {
                return Err(ApiError::bad_request("Category name already exists"));
            }
        }
    }

    Category::update(category_id, &CategoryUpdate { name }, &state.db_pool)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Category not found"))
}

pub async fn delete_category(
    Extension(state): Extension<AppState>,
    _admin: AdminUser,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<MessageResponse>, ApiError> {
    if Category::find_by_id(category_id, &state.db_pool).await?.is_none() {
        return Err(ApiError::not_found("Category not found"));
    }
    if Product::count_in_category(category_id, &state.db_pool).await? > 0 {
        return Err(ApiError::bad_request("Cannot delete category with products"));
    }

    Category::delete(category_id, &state.db_pool).await?;
    Ok(MessageResponse::json("Category deleted successfully"))
}

// =============================================================================
// Analytics
// =============================================================================

pub async fn analytics(
    Extension(state): Extension<AppState>,
    _admin: AdminUser,
) -> Result<Json<Analytics>, ApiError> {
    Ok(Json(Analytics::collect(&state.db_pool).await?))
}
