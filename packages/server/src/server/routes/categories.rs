use axum::{extract::Extension, routing::get, Json, Router};

use crate::domains::catalog::Category;
use crate::server::app::AppState;
use crate::server::error::ApiError;

pub fn router() -> Router {
    Router::new().route("/", get(list_categories))
}

pub async fn list_categories(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(Category::list(&state.db_pool).await?))
}
