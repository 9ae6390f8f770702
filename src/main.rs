use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

use housing_market::api::{self, AppState};
use housing_market::config::{AppEnv, Config, StorageBackend};
use housing_market::store::{MarketStore, MemoryStore, PgStore};

fn init_tracing(app_env: AppEnv) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("housing_market=info,tower_http=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match app_env {
        AppEnv::Production => builder.json().init(),
        AppEnv::Local => builder.pretty().init(),
    }
}

async fn open_store(config: &Config) -> Result<Arc<dyn MarketStore>> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is not set")?;
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(Duration::from_secs(5))
                .connect(url)
                .await
                .context("Failed to connect to Postgres")?;

            let store = PgStore::new(pool);
            store.migrate().await.context("Failed to run migrations")?;
            info!("Database migrations applied");
            Ok(Arc::new(store))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env().context("Invalid configuration")?;
    init_tracing(config.app_env);
    config.log_defaults();
    info!(backend = %config.backend, env = %config.app_env, "Starting housing market API");

    let store = open_store(&config).await?;
    let app = api::router(AppState::new(store));

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
