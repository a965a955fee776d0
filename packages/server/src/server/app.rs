//! Application setup and server configuration.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::{extract_client_ip, jwt_auth_middleware};
use crate::server::routes::{
    admin, auth, categories, health_handler, products, root_handler, telegram_webhook, users,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub deps: Arc<ServerDeps>,
    /// Expected `X-Telegram-Bot-Api-Secret-Token` on webhook calls
    pub webhook_secret: Option<String>,
}

impl AppState {
    pub fn new(deps: Arc<ServerDeps>, webhook_secret: Option<String>) -> Self {
        Self {
            db_pool: deps.db_pool.clone(),
            deps,
            webhook_secret,
        }
    }
}

/// Build the Axum application router.
///
/// `rate_limit` guards the `/auth` endpoints per client IP. It needs the
/// peer address, so the server must be served with connect info.
pub fn build_app(state: AppState, rate_limit: bool) -> Result<Router> {
    let mut auth_routes = auth::router();

    if rate_limit {
        // Per IP: bursts of 5, then one request every 2 seconds
        let rate_limit_config = Arc::new(
            GovernorConfigBuilder::default()
                .per_second(2)
                .burst_size(5)
                .key_extractor(SmartIpKeyExtractor)
                .use_headers()
                .finish()
                .ok_or_else(|| anyhow!("Invalid rate limiter configuration"))?,
        );

        auth_routes = auth_routes.layer(GovernorLayer {
            config: rate_limit_config,
        });
    }

    // CORS configuration - allow any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let jwt_service = state.deps.jwt_service.clone();

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/webhook/telegram", post(telegram_webhook))
        .nest("/auth", auth_routes)
        .nest("/users", users::router())
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/admin", admin::router())
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(middleware::from_fn(extract_client_ip))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}
