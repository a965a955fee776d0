use std::time::{Duration, Instant};

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use sqlx::PgPool;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct RootResponse {
    message: String,
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    database: DatabaseHealth,
    connection_pool: PoolStats,
}

#[derive(Serialize)]
pub struct DatabaseHealth {
    ok: bool,
    latency_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
pub struct PoolStats {
    size: u32,
    idle: usize,
    max: u32,
}

const DB_PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness banner
pub async fn root_handler(Extension(state): Extension<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: state.deps.app_name.clone(),
        status: "running",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn ping_database(pool: &PgPool) -> DatabaseHealth {
    let started = Instant::now();
    let result = tokio::time::timeout(DB_PING_TIMEOUT, sqlx::query("SELECT 1").execute(pool)).await;
    let latency_ms = started.elapsed().as_millis();

    let error = match result {
        Ok(Ok(_)) => None,
        Ok(Err(e)) => Some(format!("Query failed: {}", e)),
        Err(_) => Some(format!("Query timeout (>{}s)", DB_PING_TIMEOUT.as_secs())),
    };

    DatabaseHealth {
        ok: error.is_none(),
        latency_ms,
        error,
    }
}

/// Database ping plus pool utilization. 503 when the database is unreachable.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = ping_database(&state.db_pool).await;

    let connection_pool = PoolStats {
        size: state.db_pool.size(),
        idle: state.db_pool.num_idle(),
        max: state.db_pool.options().get_max_connections(),
    };

    let (status_code, status) = if database.ok {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
            connection_pool,
        }),
    )
}
