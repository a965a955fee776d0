//! Test harness with testcontainers for integration testing.
//!
//! One Postgres container is shared by every test in a binary. It starts
//! and runs migrations on first use, then each test gets its own pool.
//! Tests keep to their own rows (unique phones, names) instead of truncating.

use std::sync::Arc;

use anyhow::{Context, Result};
use shop_core::kernel::ServerDeps;
use shop_core::server::{build_app, AppState};
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use shop_core::domains::auth::{JwtService, PhonePlan};
use shop_core::kernel::{PostgresAccountStore, PostgresContactRegistry, PostgresOtpLedger};

pub const TEST_JWT_SECRET: &str = "integration_secret";
pub const ADMIN_TELEGRAM_ID: &str = "900000001";

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --ignored --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Test harness backed by a real database.
///
/// ```ignore
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let deps = ctx.deps();
/// }
/// ```
pub struct TestHarness {
    pub db_pool: PgPool,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        // Database pool is automatically dropped
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        Ok(Self { db_pool })
    }

    /// Production wiring over the test database, with one admin id.
    pub fn deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.db_pool.clone(),
            Arc::new(PostgresContactRegistry::new(self.db_pool.clone())),
            Arc::new(PostgresOtpLedger::new(self.db_pool.clone())),
            Arc::new(PostgresAccountStore::new(self.db_pool.clone())),
            Arc::new(JwtService::new(
                TEST_JWT_SECRET,
                "test_issuer".to_string(),
                chrono::Duration::days(30),
            )),
            PhonePlan::default(),
            vec![ADMIN_TELEGRAM_ID.to_string()],
            "https://t.me/test_shop_bot".to_string(),
            "Test Shop".to_string(),
        )
    }

    /// Full router without rate limiting.
    pub fn app(&self) -> axum::Router {
        let state = AppState::new(Arc::new(self.deps()), None);
        build_app(state, false).expect("router builds")
    }
}
