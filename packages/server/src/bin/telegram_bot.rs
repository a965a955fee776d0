// Long-polling Telegram bot, for deployments without a public webhook URL

use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use shop_core::domains::bot::BotPoller;
use shop_core::kernel::{ServerDeps, TelegramAdapter};
use shop_core::Config;
use sqlx::postgres::PgPoolOptions;
use telegram::{TelegramOptions, TelegramService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,shop_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(bot = %config.telegram_bot_username, "Starting Telegram bot");

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let telegram = Arc::new(TelegramService::new(TelegramOptions::new(
        &config.telegram_bot_token,
    )));

    // getUpdates is refused while a webhook is set
    telegram
        .delete_webhook()
        .await
        .context("Failed to delete Telegram webhook")?;

    let deps = Arc::new(ServerDeps::from_config(pool, &config));
    let poller = BotPoller::new(Arc::new(TelegramAdapter::new(telegram)), deps);
    let shutdown = poller.shutdown_handle();

    let mut polling = tokio::spawn(poller.run());

    tokio::select! {
        result = &mut polling => {
            result.context("Bot poller task panicked")??;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown requested, finishing current poll");
            shutdown.store(true, Ordering::SeqCst);
            polling.await.context("Bot poller task panicked")??;
        }
    }

    Ok(())
}
