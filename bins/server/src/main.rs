//! Kasa API Server
//!
//! Main entry point for the ledger service. Runs against `PostgreSQL` when
//! `database.url` is set and against an in-memory store otherwise.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use kasa_api::{AppState, create_router};
use kasa_db::repositories::{HttpRateSource, RateSource, UnavailableRateSource};
use kasa_db::{Ledger, LedgerStore, MemoryStore, Migrator, PgStore};
use kasa_shared::{AppConfig, LoggingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.logging);

    let store = open_store(&config).await?;
    let rates = rate_source(&config)?;
    let ledger = Ledger::new(store, rates, &config);

    let app = create_router(AppState::new(ledger));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn LedgerStore>> {
    if config.database.url.is_none() {
        warn!("No database.url configured, using the in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = PgStore::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    if config.database.run_migrations {
        Migrator::up(store.connection(), None)
            .await
            .context("Failed to run migrations")?;
        info!("Migrations applied");
    }
    Ok(Arc::new(store))
}

fn rate_source(config: &AppConfig) -> anyhow::Result<Arc<dyn RateSource>> {
    let settings = &config.exchange_rates;
    match &settings.upstream_url {
        Some(url) => {
            let source = HttpRateSource::new(url.clone(), Duration::from_secs(settings.request_timeout_secs))
                .context("Failed to build rate source client")?;
            info!(upstream = %url, "Exchange rate upstream configured");
            Ok(Arc::new(source))
        }
        None => {
            warn!("No exchange rate upstream configured, only manual rates are available");
            Ok(Arc::new(UnavailableRateSource))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
