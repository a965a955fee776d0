// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use shop_core::kernel::ServerDeps;
use shop_core::server::{build_app, AppState};
use shop_core::Config;
use sqlx::postgres::PgPoolOptions;
use telegram::{TelegramOptions, TelegramService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,shop_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Starting {}", config.app_name);

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Register the webhook so Telegram pushes updates here instead of the poller
    if let Some(url) = &config.telegram_webhook_url {
        let telegram = TelegramService::new(TelegramOptions::new(&config.telegram_bot_token));
        match telegram
            .set_webhook(url, config.telegram_webhook_secret.as_deref())
            .await
        {
            Ok(_) => tracing::info!(url = %url, "Telegram webhook registered"),
            Err(e) => tracing::warn!(error = %e, "Failed to register Telegram webhook"),
        }
    }

    let deps = Arc::new(ServerDeps::from_config(pool, &config));
    let state = AppState::new(deps, config.telegram_webhook_secret.clone());
    let app = build_app(state, config.rate_limit_enabled)?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
